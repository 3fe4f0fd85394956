use bevy::prelude::*;

use crate::data::schema::ItemDefinition;

/// 世界里的物品实例（可拾取的那个，或者手里的代理）
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct WorldItem {
    pub name: String,
    pub icon: String,
}

impl From<&ItemDefinition> for WorldItem {
    fn from(definition: &ItemDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            icon: definition.icon.clone(),
        }
    }
}

impl WorldItem {
    /// 拾取时按实例自身的数据入包
    pub fn definition(&self) -> ItemDefinition {
        ItemDefinition {
            name: self.name.clone(),
            icon: self.icon.clone(),
            consumable: false,
        }
    }
}

/// 装备时新生成的手持实例，不是当初捡起的那个
#[derive(Component, Debug, Default)]
pub struct HeldProxy;
