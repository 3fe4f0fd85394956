use bevy::prelude::*;

/// CLI 直接往背包塞东西
#[derive(Event)]
pub struct GiveItemEvent {
    pub name: String,
    pub count: u32,
}

#[derive(Event)]
pub struct ListInventoryEvent; // 让 CLI 请求打印背包

#[derive(Event)]
pub struct DumpInventoryEvent; // JSON 快照

/// 右键丢弃某个代理
#[derive(Event, Debug, Clone, Copy)]
pub struct DropRequested {
    pub proxy: Entity,
}

/// 拖拽落下；`destination` 为 None 表示没落在格子上
#[derive(Event, Debug, Clone, Copy)]
pub struct ItemMoveRequested {
    pub proxy: Entity,
    pub destination: Option<usize>,
}

/// 背包内容变了（移动 / 丢弃 / 消耗），手持需要对一次
#[derive(Event, Debug, Clone, Copy)]
pub struct ItemsRearranged {
    pub player: Entity,
}
