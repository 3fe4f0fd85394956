use bevy::prelude::Entity;
use thiserror::Error;

/// 背包操作失败；返回错误时不会留下半截修改
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("no slot is bound to proxy {0:?}")]
    ProxyNotFound(Entity),
    #[error("item definition `{0}` not found")]
    UnknownItem(String),
    #[error("slot {0} is out of range")]
    SlotOutOfRange(usize),
    #[error("inventory is full, `{0}` was not added")]
    Full(String),
    #[error("action slot {0} has no backing inventory slot")]
    UnboundActionSlot(usize),
}
