use bevy::prelude::*;

/// 交互触发（按键 / 鼠标 / CLI），每帧最多生效一次
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct InteractTrigger;

/// 拾取能力提出的请求
#[derive(Event, Debug, Clone, Copy)]
pub struct PickupRequested {
    pub item: Entity,
}
