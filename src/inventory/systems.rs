use super::{components::*, events::*};
use crate::character::components::LocalPlayer;
use crate::core::config::{GameConfig, KeyBindings};
use crate::core::events::LogEvent;
use crate::data::ItemCatalog;
use crate::equipment::components::{ActionBar, Hand};
use crate::interaction::facet::{InteractableRegistry, Interactive, PickupFacet};
use crate::interaction::resolver::Targetable;
use crate::inventory::error::InventoryError;
use crate::inventory::host::CommandsHost;
use crate::inventory::store::{Inventory, MoveOutcome};
use crate::item::components::WorldItem;
use crate::item::kinematic_for;
use crate::network::components::{Body, LocalPeer, NetworkOwner};
use crate::network::events::{AuthorityPurpose, AuthorityRequest, AuthorityResolved};
use bevy::prelude::*;

/// 处理"give"：按名字（或 uuid）逐个入包
pub fn give_item(
    mut commands: Commands,
    mut ev_give: EventReader<GiveItemEvent>,
    mut players: Query<(Entity, &mut Inventory), With<LocalPlayer>>,
    catalog: Res<ItemCatalog>,
    local: Res<LocalPeer>,
    mut rearranged: EventWriter<ItemsRearranged>,
    mut log: EventWriter<LogEvent>,
) {
    let Ok((player, mut inventory)) = players.single_mut() else {
        ev_give.clear();
        return;
    };

    for ev in ev_give.read() {
        let Some(definition) = catalog.find_loose(&ev.name) else {
            log.write(LogEvent(format!("不存在物品 {}", ev.name)));
            continue;
        };

        let mut host = CommandsHost::new(&mut commands, player, local.0);
        let mut added = 0;
        for _ in 0..ev.count {
            match inventory.add_item(definition, &mut host) {
                Ok(_) => added += 1,
                Err(err) => {
                    warn!("{err}");
                    break;
                }
            }
        }
        if added > 0 {
            // 新物品可能落进激活的空快捷栏格
            rearranged.write(ItemsRearranged { player });
        }
        log.write(LogEvent(format!("获得 {} ×{added}", definition.name)));
    }
}

/// 打印背包内容；快捷栏格子标 #n，激活的再加 *
pub fn print_inventory(
    mut ev_list: EventReader<ListInventoryEvent>,
    players: Query<(&Inventory, &ActionBar, &Hand), With<LocalPlayer>>,
) {
    if ev_list.is_empty() {
        return;
    }
    ev_list.clear();

    let Ok((inventory, bar, hand)) = players.single() else {
        println!("  (no player)");
        return;
    };

    let mut empty = true;
    for (idx, record) in inventory.slots().iter().enumerate() {
        let action = bar
            .bindings()
            .iter()
            .position(|binding| binding.backing == idx);
        if record.is_empty() && action.is_none() {
            continue;
        }
        empty &= record.is_empty();

        let tag = match action {
            Some(n) if bar.active() == Some(n) => format!(" #{}*", n + 1),
            Some(n) => format!(" #{}", n + 1),
            None => String::new(),
        };
        if record.is_empty() {
            println!("[{idx}]{tag} -");
        } else {
            println!("[{idx}]{tag} {} ×{}", record.item_name, record.amount);
        }
    }

    if empty {
        println!("  (empty)");
    }
    if let Some(held) = hand.held() {
        println!("  手持: {} ({:?})", held.name, held.entity);
    }
}

/// 背包快照输出成 JSON
pub fn dump_inventory_json(
    mut ev_dump: EventReader<DumpInventoryEvent>,
    players: Query<&Inventory, With<LocalPlayer>>,
) {
    if ev_dump.is_empty() {
        return;
    }
    ev_dump.clear();

    let Ok(inventory) = players.single() else {
        return;
    };
    match serde_json::to_string_pretty(inventory.slots()) {
        Ok(json) => println!("{json}"),
        Err(err) => error!("背包序列化失败: {err}"),
    }
}

pub fn toggle_inventory(
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<KeyBindings>,
    mut open: ResMut<InventoryOpen>,
) {
    if keys.just_pressed(bindings.inventory) {
        open.0 = !open.0;
        info!("背包 {}", if open.0 { "打开" } else { "关闭" });
    }
}

/// 拖拽落下
pub fn handle_item_moved(
    mut commands: Commands,
    mut moves: EventReader<ItemMoveRequested>,
    mut players: Query<(Entity, &mut Inventory), With<LocalPlayer>>,
    local: Res<LocalPeer>,
    mut rearranged: EventWriter<ItemsRearranged>,
) {
    let Ok((player, mut inventory)) = players.single_mut() else {
        moves.clear();
        return;
    };

    for ev in moves.read() {
        let mut host = CommandsHost::new(&mut commands, player, local.0);
        match inventory.item_moved(ev.proxy, ev.destination, &mut host) {
            Ok(MoveOutcome::Unchanged) => debug!("{:?} 留在原位", ev.proxy),
            Ok(outcome) => {
                debug!("{outcome:?}");
                rearranged.write(ItemsRearranged { player });
            }
            Err(err) => error!("移动失败: {err}"),
        }
    }
}

/// 丢弃第一步：校验，生成隐藏的预留实例，申请权限
pub fn begin_drop(
    mut commands: Commands,
    mut drops: EventReader<DropRequested>,
    players: Query<(Entity, &Inventory, &Transform), With<LocalPlayer>>,
    catalog: Res<ItemCatalog>,
    config: Res<GameConfig>,
    local: Res<LocalPeer>,
    mut requests: EventWriter<AuthorityRequest>,
) {
    let Ok((player, inventory, transform)) = players.single() else {
        drops.clear();
        return;
    };

    for ev in drops.read() {
        let ticket = match inventory.prepare_drop(ev.proxy, &catalog) {
            Ok(ticket) => ticket,
            Err(err) => {
                error!("丢弃失败: {err}");
                continue;
            }
        };

        let at = transform.translation
            + transform.forward() * config.inventory.drop_forward
            + Vec3::Y * config.inventory.drop_lift;
        let reserved = commands
            .spawn((
                Name::new(format!("drop {}", ticket.definition.name)),
                WorldItem::from(&ticket.definition),
                Transform::from_translation(at),
                Visibility::Hidden,
                Body { kinematic: true },
                NetworkOwner(None),
                PendingDrop { ticket },
            ))
            .id();

        requests.write(AuthorityRequest {
            entity: reserved,
            requester: local.0,
            purpose: AuthorityPurpose::Drop { player },
        });
    }
}

/// 丢弃第二步：拿到权限才扣背包，预留实例转正；被拒就撤掉预留
pub fn finish_drop(
    mut commands: Commands,
    mut resolved: EventReader<AuthorityResolved>,
    pending: Query<&PendingDrop>,
    mut players: Query<(&mut Inventory, &mut ActionBar, &mut Hand)>,
    catalog: Res<ItemCatalog>,
    local: Res<LocalPeer>,
    mut registry: ResMut<InteractableRegistry>,
    mut rearranged: EventWriter<ItemsRearranged>,
    mut log: EventWriter<LogEvent>,
) {
    for ev in resolved.read() {
        let AuthorityPurpose::Drop { player } = ev.purpose else {
            continue;
        };
        let Ok(reservation) = pending.get(ev.entity) else {
            continue;
        };
        if !ev.granted {
            commands.entity(ev.entity).despawn();
            log.write(LogEvent("这里不能丢东西".into()));
            continue;
        }
        let Ok((mut inventory, mut bar, mut hand)) = players.get_mut(player) else {
            error!("找不到玩家 {player:?} 的背包");
            commands.entity(ev.entity).despawn();
            continue;
        };

        let ticket = &reservation.ticket;
        let committed = {
            let mut host = CommandsHost::new(&mut commands, player, local.0);
            hand.unequip_item(Some(&ticket.definition), &mut host);
            let committed = inventory.commit_drop(ticket, &mut host);
            let settled = match &committed {
                Ok(commit) => bar.after_removal(
                    commit.slot,
                    commit.remaining,
                    &inventory,
                    &catalog,
                    &mut hand,
                    &mut host,
                ),
                Err(_) => bar.resync(&inventory, &catalog, &mut hand, &mut host),
            };
            if let Err(err) = settled {
                error!("手持同步失败: {err}");
            }
            committed
        };

        match committed {
            Ok(commit) => {
                commands
                    .entity(ev.entity)
                    .remove::<PendingDrop>()
                    .insert((
                        Visibility::Inherited,
                        Targetable::default(),
                        Interactive,
                        Body {
                            kinematic: kinematic_for(false, Some(local.0), local.0),
                        },
                    ));
                registry.register(ev.entity, PickupFacet::new(ticket.definition.name.clone()));
                rearranged.write(ItemsRearranged { player });
                log.write(LogEvent(format!(
                    "丢弃 {}，[{}] 剩余 {}",
                    ticket.definition.name, commit.slot, commit.remaining
                )));
            }
            Err(InventoryError::ProxyNotFound(_)) => {
                debug!("丢弃凭据已过期: {:?}", ticket.proxy);
                commands.entity(ev.entity).despawn();
            }
            Err(err) => {
                error!("丢弃失败: {err}");
                commands.entity(ev.entity).despawn();
            }
        }
    }
}
