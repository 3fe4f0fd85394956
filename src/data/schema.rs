use bevy::asset::Asset;
use bevy::reflect::TypePath;
use serde::{Deserialize, Serialize};

/// 物品定义：名字就是堆叠键
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ItemDefinition {
    pub name: String,
    pub icon: String,
    #[serde(default)]
    pub consumable: bool,
}

/// 开局摆在场景里的物品
#[derive(Debug, Clone, Deserialize)]
pub struct WorldSpawn {
    pub item: String,
    pub at: (f32, f32, f32),
    /// 同时挂一个开关能力
    #[serde(default)]
    pub switch: bool,
}

#[derive(Asset, TypePath, Deserialize, Debug)]
pub struct ItemList {
    pub items: Vec<ItemDefinition>,
    #[serde(default)]
    pub spawns: Vec<WorldSpawn>,
}
