//! 背包 / 手持对世界的副作用出口
//!
//! 存储层只通过这几个 trait 生成或销毁实体；游戏里由 `CommandsHost` 落到 `Commands`，
//! 测试里换成记录调用的假实现。

use bevy::prelude::*;

use super::components::SlotProxy;
use crate::data::schema::ItemDefinition;
use crate::equipment::components::SlotHighlight;
use crate::item::components::{HeldProxy, WorldItem};
use crate::network::components::{Body, NetworkOwner, PeerId};

/// UI 代理显示的内容（单向渲染命令，不是真相来源）
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct ProxyView {
    pub name: String,
    pub icon: String,
    pub amount: u32,
}

pub trait ProxyHost {
    fn spawn_proxy(&mut self, slot: usize, view: &ProxyView) -> Entity;
    /// 重新 Init：数量变化或被挪到别的格子
    fn refresh_proxy(&mut self, proxy: Entity, slot: usize, view: &ProxyView);
    fn despawn_proxy(&mut self, proxy: Entity);
}

pub trait ItemSpawner {
    /// 在手部挂点生成一个新的手持实例（kinematic）
    fn spawn_held(&mut self, definition: &ItemDefinition, anchor: Entity) -> Entity;
    fn despawn_item(&mut self, entity: Entity);
}

pub trait ActionSlotView {
    fn set_highlight(&mut self, widget: Entity, active: bool);
}

pub struct CommandsHost<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    owner: Entity,
    peer: PeerId,
}

impl<'a, 'w, 's> CommandsHost<'a, 'w, 's> {
    pub fn new(commands: &'a mut Commands<'w, 's>, owner: Entity, peer: PeerId) -> Self {
        Self {
            commands,
            owner,
            peer,
        }
    }
}

impl ProxyHost for CommandsHost<'_, '_, '_> {
    fn spawn_proxy(&mut self, slot: usize, view: &ProxyView) -> Entity {
        self.commands
            .spawn((
                Name::new(format!("slot {slot}: {}", view.name)),
                SlotProxy {
                    owner: self.owner,
                    slot,
                },
                view.clone(),
            ))
            .id()
    }

    fn refresh_proxy(&mut self, proxy: Entity, slot: usize, view: &ProxyView) {
        self.commands.entity(proxy).insert((
            SlotProxy {
                owner: self.owner,
                slot,
            },
            view.clone(),
        ));
    }

    fn despawn_proxy(&mut self, proxy: Entity) {
        self.commands.entity(proxy).despawn();
    }
}

impl ItemSpawner for CommandsHost<'_, '_, '_> {
    fn spawn_held(&mut self, definition: &ItemDefinition, anchor: Entity) -> Entity {
        self.commands
            .spawn((
                Name::new(format!("held {}", definition.name)),
                WorldItem::from(definition),
                HeldProxy,
                Body { kinematic: true },
                NetworkOwner(Some(self.peer)),
                Transform::default(),
                ChildOf(anchor),
            ))
            .id()
    }

    fn despawn_item(&mut self, entity: Entity) {
        self.commands.entity(entity).despawn();
    }
}

impl ActionSlotView for CommandsHost<'_, '_, '_> {
    fn set_highlight(&mut self, widget: Entity, active: bool) {
        self.commands.entity(widget).insert(SlotHighlight(active));
    }
}
