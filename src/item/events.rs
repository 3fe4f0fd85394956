use bevy::prelude::*;

/// 按目录生成一个世界物品
#[derive(Event, Debug, Clone)]
pub struct SpawnWorldItem {
    pub name: String,
    pub at: Vec3,
    pub switch: bool,
}
