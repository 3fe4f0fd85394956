use bevy::prelude::*;

use super::store::DropTicket;

/// UI 代理对背包记录的反向引用（只用来解析拖拽和右键丢弃）
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotProxy {
    pub owner: Entity,
    pub slot: usize,
}

/// 丢弃预留：世界实例已生成但隐藏，等权限结果
#[derive(Component, Debug, Clone)]
pub struct PendingDrop {
    pub ticket: DropTicket,
}

/// 背包界面是否打开
#[derive(Resource, Debug, Default)]
pub struct InventoryOpen(pub bool);
