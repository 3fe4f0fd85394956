use super::{components::*, events::*};
use crate::character::components::LocalPlayer;
use crate::core::config::KeyBindings;
use crate::core::events::LogEvent;
use crate::data::ItemCatalog;
use crate::inventory::error::InventoryError;
use crate::inventory::events::ItemsRearranged;
use crate::inventory::host::CommandsHost;
use crate::inventory::store::Inventory;
use crate::network::components::LocalPeer;
use bevy::prelude::*;

/// 数字键切快捷栏，另外两个键是使用 / 吃
pub fn sample_action_keys(
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<KeyBindings>,
    mut activate: EventWriter<SetActionSlotActive>,
    mut use_item: EventWriter<UseHeldItem>,
    mut consume: EventWriter<ConsumeHeldItem>,
) {
    for (action, key) in bindings.action_slots.iter().enumerate() {
        if keys.just_pressed(*key) {
            activate.write(SetActionSlotActive { action });
        }
    }
    if keys.just_pressed(bindings.use_item) {
        use_item.write(UseHeldItem);
    }
    if keys.just_pressed(bindings.consume) {
        consume.write(ConsumeHeldItem);
    }
}

pub fn apply_action_slot(
    mut commands: Commands,
    mut ev_activate: EventReader<SetActionSlotActive>,
    mut players: Query<(Entity, &Inventory, &mut ActionBar, &mut Hand), With<LocalPlayer>>,
    catalog: Res<ItemCatalog>,
    local: Res<LocalPeer>,
    mut log: EventWriter<LogEvent>,
) {
    let Ok((player, inventory, mut bar, mut hand)) = players.single_mut() else {
        ev_activate.clear();
        return;
    };

    for ev in ev_activate.read() {
        let mut host = CommandsHost::new(&mut commands, player, local.0);
        match bar.set_action_slot_active(ev.action, inventory, &catalog, &mut hand, &mut host) {
            Ok(ActivateOutcome::AlreadyActive) => {}
            Ok(ActivateOutcome::Switched { .. }) => {
                let text = match hand.held_name() {
                    Some(name) => format!("快捷栏 {}：{name}", ev.action + 1),
                    None => format!("快捷栏 {}：空手", ev.action + 1),
                };
                log.write(LogEvent(text));
            }
            Err(err @ InventoryError::UnboundActionSlot(_)) => {
                log.write(LogEvent(err.to_string()));
            }
            Err(err) => error!("切换快捷栏失败: {err}"),
        }
    }
}

/// 背包变化后让手持和激活格重新对齐
pub fn resync_after_rearrange(
    mut commands: Commands,
    mut ev_rearranged: EventReader<ItemsRearranged>,
    mut players: Query<(&Inventory, &ActionBar, &mut Hand)>,
    catalog: Res<ItemCatalog>,
    local: Res<LocalPeer>,
) {
    for ev in ev_rearranged.read() {
        let Ok((inventory, bar, mut hand)) = players.get_mut(ev.player) else {
            continue;
        };
        let mut host = CommandsHost::new(&mut commands, ev.player, local.0);
        match bar.resync(inventory, &catalog, &mut hand, &mut host) {
            Ok(true) => debug!("手持已更新为 {:?}", hand.held_name()),
            Ok(false) => {}
            Err(err) => error!("手持同步失败: {err}"),
        }
    }
}

pub fn use_held_item(
    mut ev_use: EventReader<UseHeldItem>,
    players: Query<&Hand, With<LocalPlayer>>,
    mut log: EventWriter<LogEvent>,
) {
    for _ in ev_use.read() {
        let text = match players.single().ok().and_then(Hand::held_name) {
            Some(name) => format!("使用 {name}"),
            None => "手上没有东西".to_string(),
        };
        log.write(LogEvent(text));
    }
}

/// 从激活格扣一个可消耗物品；最后一个吃完就空手
pub fn consume_held_item(
    mut commands: Commands,
    mut ev_consume: EventReader<ConsumeHeldItem>,
    mut players: Query<(Entity, &mut Inventory, &mut ActionBar, &mut Hand), With<LocalPlayer>>,
    catalog: Res<ItemCatalog>,
    local: Res<LocalPeer>,
    mut log: EventWriter<LogEvent>,
) {
    let Ok((player, mut inventory, mut bar, mut hand)) = players.single_mut() else {
        ev_consume.clear();
        return;
    };

    for _ in ev_consume.read() {
        let Some(slot) = bar.active_backing() else {
            log.write(LogEvent("手上没有东西".into()));
            continue;
        };
        let Some(record) = inventory.occupant(slot) else {
            log.write(LogEvent("手上没有东西".into()));
            continue;
        };
        let Some(definition) = catalog.get(&record.item_name).cloned() else {
            error!("{}", InventoryError::UnknownItem(record.item_name.clone()));
            continue;
        };
        if !definition.consumable {
            log.write(LogEvent(format!("{} 不能吃", definition.name)));
            continue;
        }

        let mut host = CommandsHost::new(&mut commands, player, local.0);
        let remaining = match inventory.deduct(slot, &mut host) {
            Ok(remaining) => remaining,
            Err(err) => {
                error!("消耗失败: {err}");
                continue;
            }
        };
        if let Err(err) = bar.after_removal(slot, remaining, &inventory, &catalog, &mut hand, &mut host) {
            error!("手持同步失败: {err}");
        }
        log.write(LogEvent(format!("吃掉 {}，剩余 {remaining}", definition.name)));
    }
}
