use bevy::prelude::*;

/// 把视线转向最近的同名物品（CLI 用）
#[derive(Event, Debug, Clone)]
pub struct FaceItem {
    pub name: String,
}
