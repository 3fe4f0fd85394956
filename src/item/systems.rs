use bevy::prelude::*;

use super::{components::*, events::*};
use crate::character::components::LocalPlayer;
use crate::core::events::LogEvent;
use crate::data::{schema::ItemDefinition, ItemCatalog};
use crate::equipment::components::Hand;
use crate::interaction::events::PickupRequested;
use crate::interaction::facet::{InteractableRegistry, Interactive, PickupFacet, SwitchFacet};
use crate::interaction::resolver::Targetable;
use crate::inventory::components::PendingDrop;
use crate::inventory::error::InventoryError;
use crate::inventory::events::ItemsRearranged;
use crate::inventory::host::CommandsHost;
use crate::inventory::store::Inventory;
use crate::network::components::{Body, LocalPeer, NetworkOwner, PeerId};
use crate::network::events::{AuthorityPurpose, AuthorityRequest, AuthorityResolved, OwnershipChanged};

/// 手持代理永远 kinematic；其余只有本机是所有者时才本地模拟
pub fn kinematic_for(held: bool, owner: Option<PeerId>, local: PeerId) -> bool {
    held || owner != Some(local)
}

/// 生成一个可拾取的世界物品，能力在这里一次性注册
pub fn spawn_world_item(
    commands: &mut Commands,
    registry: &mut InteractableRegistry,
    definition: &ItemDefinition,
    at: Vec3,
    switch: bool,
) -> Entity {
    let entity = commands
        .spawn((
            Name::new(definition.name.clone()),
            WorldItem::from(definition),
            Transform::from_translation(at),
            Targetable::default(),
            Interactive,
            Body { kinematic: true },
            NetworkOwner(None),
        ))
        .id();

    registry.register(entity, PickupFacet::new(definition.name.clone()));
    if switch {
        registry.register(entity, SwitchFacet::default());
    }
    entity
}

/// 进入游戏时按目录摆放物品
pub fn setup_world_items(
    mut commands: Commands,
    mut registry: ResMut<InteractableRegistry>,
    catalog: Res<ItemCatalog>,
) {
    for spawn in catalog.spawns() {
        let Some(definition) = catalog.get(&spawn.item) else {
            error!("场景物品 {} 不在物品表里", spawn.item);
            continue;
        };
        let (x, y, z) = spawn.at;
        spawn_world_item(
            &mut commands,
            &mut registry,
            definition,
            Vec3::new(x, y, z),
            spawn.switch,
        );
    }
}

pub fn handle_spawn_requests(
    mut commands: Commands,
    mut requests: EventReader<SpawnWorldItem>,
    mut registry: ResMut<InteractableRegistry>,
    catalog: Res<ItemCatalog>,
    mut log: EventWriter<LogEvent>,
) {
    for ev in requests.read() {
        let Some(definition) = catalog.find_loose(&ev.name) else {
            log.write(LogEvent(format!("不存在物品 {}", ev.name)));
            continue;
        };
        let entity = spawn_world_item(&mut commands, &mut registry, definition, ev.at, ev.switch);
        log.write(LogEvent(format!("生成 {} ({entity:?})", definition.name)));
    }
}

/// 拾取第一步：申请权限。手里的代理不能捡。
pub fn request_pickup(
    mut pickups: EventReader<PickupRequested>,
    items: Query<(), (With<WorldItem>, Without<PendingDrop>)>,
    hands: Query<&Hand>,
    players: Query<Entity, With<LocalPlayer>>,
    local: Res<LocalPeer>,
    mut requests: EventWriter<AuthorityRequest>,
) {
    let Ok(player) = players.single() else {
        pickups.clear();
        return;
    };

    for ev in pickups.read() {
        if items.get(ev.item).is_err() {
            debug!("拾取目标 {:?} 不是世界物品", ev.item);
            continue;
        }
        if hands.iter().any(|hand| hand.is_holding_item(ev.item)) {
            info!("不能拾取手上的物品");
            continue;
        }
        requests.write(AuthorityRequest {
            entity: ev.item,
            requester: local.0,
            purpose: AuthorityPurpose::Pickup { player },
        });
    }
}

/// 拾取第二步：权限到手 → 入包；入包成功才销毁世界实例
pub fn finish_pickup(
    mut commands: Commands,
    mut resolved: EventReader<AuthorityResolved>,
    items: Query<&WorldItem, Without<HeldProxy>>,
    mut players: Query<&mut Inventory>,
    local: Res<LocalPeer>,
    mut rearranged: EventWriter<ItemsRearranged>,
    mut log: EventWriter<LogEvent>,
) {
    for ev in resolved.read() {
        let AuthorityPurpose::Pickup { player } = ev.purpose else {
            continue;
        };
        if !ev.granted {
            log.write(LogEvent("物品已被别人拿走".into()));
            continue;
        }
        let Ok(item) = items.get(ev.entity) else {
            continue;
        };
        let Ok(mut inventory) = players.get_mut(player) else {
            error!("找不到玩家 {player:?} 的背包");
            continue;
        };

        let definition = item.definition();
        let mut host = CommandsHost::new(&mut commands, player, local.0);
        match inventory.add_item(&definition, &mut host) {
            Ok(outcome) => {
                commands.entity(ev.entity).despawn();
                rearranged.write(ItemsRearranged { player });
                log.write(LogEvent(format!(
                    "拾取 {} → [{}] ×{}",
                    definition.name, outcome.slot, outcome.amount
                )));
            }
            Err(InventoryError::Full(name)) => {
                warn!("背包已满，{name} 留在原地");
                log.write(LogEvent(format!("背包已满，无法拾取 {name}")));
            }
            Err(err) => error!("拾取失败: {err}"),
        }
    }
}

/// 所有权变化后重算 kinematic
pub fn on_ownership_changed(
    mut changes: EventReader<OwnershipChanged>,
    mut bodies: Query<&mut Body>,
    hands: Query<&Hand>,
    local: Res<LocalPeer>,
) {
    for ev in changes.read() {
        let Ok(mut body) = bodies.get_mut(ev.entity) else {
            continue;
        };
        let held = hands.iter().any(|hand| hand.is_holding_item(ev.entity));
        body.kinematic = kinematic_for(held, ev.new, local.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::host::testing::definition;

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<LocalPeer>()
            .add_event::<PickupRequested>()
            .add_event::<AuthorityRequest>()
            .add_event::<AuthorityResolved>()
            .add_event::<OwnershipChanged>()
            .add_event::<ItemsRearranged>()
            .add_event::<LogEvent>()
            .add_systems(
                Update,
                (request_pickup, finish_pickup, on_ownership_changed).chain(),
            );
        app
    }

    fn spawn_player(app: &mut App, slots: usize) -> Entity {
        let anchor = app.world_mut().spawn_empty().id();
        app.world_mut()
            .spawn((LocalPlayer, Inventory::with_slots(slots), Hand::new(anchor)))
            .id()
    }

    fn spawn_item(app: &mut App, name: &str) -> Entity {
        app.world_mut()
            .spawn((
                WorldItem::from(&definition(name)),
                Body { kinematic: true },
                NetworkOwner(None),
            ))
            .id()
    }

    fn grant(app: &mut App, entity: Entity, player: Entity, granted: bool) {
        app.world_mut().send_event(AuthorityResolved {
            entity,
            purpose: AuthorityPurpose::Pickup { player },
            granted,
        });
        app.update();
    }

    fn authority_requests(app: &App) -> usize {
        let events = app.world().resource::<Events<AuthorityRequest>>();
        let mut cursor = events.get_cursor();
        cursor.read(events).count()
    }

    #[test]
    fn kinematic_rules() {
        let me = PeerId(1);
        let other = PeerId(2);
        assert!(kinematic_for(true, Some(me), me));
        assert!(!kinematic_for(false, Some(me), me));
        assert!(kinematic_for(false, Some(other), me));
        assert!(kinematic_for(false, None, me));
    }

    #[test]
    fn granted_pickup_moves_item_into_inventory() {
        let mut app = test_app();
        let player = spawn_player(&mut app, 5);
        let torch = spawn_item(&mut app, "Torch");

        grant(&mut app, torch, player, true);

        let inventory = app.world().get::<Inventory>(player).unwrap();
        assert_eq!(inventory.slot(0).unwrap().item_name, "Torch");
        assert_eq!(inventory.slot(0).unwrap().amount, 1);
        assert!(app.world().get_entity(torch).is_err());

        let events = app.world().resource::<Events<ItemsRearranged>>();
        let rearranged: Vec<_> = events.get_cursor().read(events).map(|ev| ev.player).collect();
        assert_eq!(rearranged, vec![player]);
    }

    #[test]
    fn full_inventory_keeps_world_item() {
        let mut app = test_app();
        let player = spawn_player(&mut app, 1);
        let rock = spawn_item(&mut app, "Rock");
        let torch = spawn_item(&mut app, "Torch");

        grant(&mut app, rock, player, true);
        grant(&mut app, torch, player, true);

        let inventory = app.world().get::<Inventory>(player).unwrap();
        assert_eq!(inventory.total_amount(), 1);
        assert_eq!(inventory.slot(0).unwrap().item_name, "Rock");
        assert!(app.world().get_entity(torch).is_ok());
    }

    #[test]
    fn denied_pickup_leaves_inventory_untouched() {
        let mut app = test_app();
        let player = spawn_player(&mut app, 5);
        let torch = spawn_item(&mut app, "Torch");

        grant(&mut app, torch, player, false);

        let inventory = app.world().get::<Inventory>(player).unwrap();
        assert_eq!(inventory.total_amount(), 0);
        assert!(app.world().get_entity(torch).is_ok());
    }

    #[test]
    fn held_proxy_cannot_be_picked_up() {
        let mut app = test_app();
        let anchor = app.world_mut().spawn_empty().id();
        let held = spawn_item(&mut app, "Torch");
        let loose = spawn_item(&mut app, "Rock");
        app.world_mut().spawn((
            LocalPlayer,
            Inventory::with_slots(5),
            Hand::holding(anchor, held, "Torch"),
        ));

        app.world_mut().send_event(PickupRequested { item: held });
        app.update();
        assert_eq!(authority_requests(&app), 0);

        app.world_mut().send_event(PickupRequested { item: loose });
        app.update();
        assert_eq!(authority_requests(&app), 1);
    }

    #[test]
    fn held_proxy_stays_kinematic_through_ownership_changes() {
        let mut app = test_app();
        let anchor = app.world_mut().spawn_empty().id();
        let held = spawn_item(&mut app, "Torch");
        let loose = spawn_item(&mut app, "Rock");
        app.world_mut().spawn(Hand::holding(anchor, held, "Torch"));
        let me = app.world().resource::<LocalPeer>().0;

        for entity in [held, loose] {
            app.world_mut().send_event(OwnershipChanged {
                entity,
                old: None,
                new: Some(me),
            });
        }
        app.update();

        assert_eq!(app.world().get::<Body>(held), Some(&Body { kinematic: true }));
        assert_eq!(app.world().get::<Body>(loose), Some(&Body { kinematic: false }));

        app.world_mut().send_event(OwnershipChanged {
            entity: held,
            old: Some(me),
            new: Some(PeerId(9)),
        });
        app.update();
        assert_eq!(app.world().get::<Body>(held), Some(&Body { kinematic: true }));
    }
}
