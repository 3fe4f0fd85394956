use bevy::prelude::*;

/// 激活某个快捷栏格子（0 起）
#[derive(Event, Debug, Clone, Copy)]
pub struct SetActionSlotActive {
    pub action: usize,
}

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct UseHeldItem;

/// 吃掉手里的可消耗物品
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ConsumeHeldItem;
