use super::{components::*, events::*};
use crate::core::config::GameConfig;
use crate::core::events::LogEvent;
use crate::equipment::components::{ActionBar, ActionSlotWidget, Hand, SlotHighlight};
use crate::interaction::Eye;
use crate::inventory::components::InventoryOpen;
use crate::inventory::store::Inventory;
use crate::item::components::{HeldProxy, WorldItem};
use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;

/// 初始化玩家实体：眼睛、手部挂点、快捷栏部件，以及背包 / 快捷栏 / 手
pub fn spawn_player(mut commands: Commands, config: Res<GameConfig>) {
    let slot_count = config.inventory.slot_count;

    let player = commands
        .spawn((
            Name::new("player"),
            Player,
            LocalPlayer,
            Look::default(),
            Transform::default(),
            Visibility::default(),
        ))
        .id();
    let eye = commands
        .spawn((
            Name::new("eye"),
            Eye,
            Transform::from_xyz(0.0, EYE_HEIGHT, 0.0),
            ChildOf(player),
        ))
        .id();
    let anchor = commands
        .spawn((
            Name::new("hand"),
            HandAnchor,
            Transform::from_translation(HAND_OFFSET),
            ChildOf(eye),
        ))
        .id();

    let widgets: Vec<Entity> = (0..config.inventory.action_slot_count)
        .map(|index| {
            commands
                .spawn((
                    Name::new(format!("action slot {}", index + 1)),
                    ActionSlotWidget { index },
                    SlotHighlight(false),
                ))
                .id()
        })
        .collect();

    commands.entity(player).insert((
        Inventory::with_slots(slot_count),
        ActionBar::trailing(slot_count, &widgets),
        Hand::new(anchor),
    ));
    info!("玩家就位：{slot_count} 格背包，{} 个快捷栏", widgets.len());
}

/// 水平面上的单位移动方向（已按 yaw 旋转）；没有输入时为零
pub fn planar_direction(yaw: f32, forward: f32, right: f32) -> Vec3 {
    let local = Vec3::new(right, 0.0, -forward).normalize_or_zero();
    Quat::from_rotation_y(yaw) * local
}

/// WASD 移动，左 Shift 冲刺；背包打开时不动
pub fn move_player(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<GameConfig>,
    open: Res<InventoryOpen>,
    mut players: Query<(&mut Transform, &Look), With<LocalPlayer>>,
) {
    if open.0 {
        return;
    }
    let Ok((mut transform, look)) = players.single_mut() else {
        return;
    };

    let axis = |pos: KeyCode, neg: KeyCode| keys.pressed(pos) as i8 as f32 - keys.pressed(neg) as i8 as f32;
    let direction = planar_direction(
        look.yaw,
        axis(KeyCode::KeyW, KeyCode::KeyS),
        axis(KeyCode::KeyD, KeyCode::KeyA),
    );
    let speed = if keys.pressed(KeyCode::ShiftLeft) {
        config.movement.sprint_speed
    } else {
        config.movement.move_speed
    };
    transform.translation += direction * speed * time.delta_secs();
}

/// 鼠标视角：yaw 转身体，pitch 转眼睛并限幅
pub fn look_player(
    motion: Res<AccumulatedMouseMotion>,
    config: Res<GameConfig>,
    open: Res<InventoryOpen>,
    mut players: Query<(&mut Transform, &mut Look), (With<LocalPlayer>, Without<Eye>)>,
    mut eyes: Query<&mut Transform, (With<Eye>, Without<LocalPlayer>)>,
) {
    if open.0 || motion.delta == Vec2::ZERO {
        return;
    }
    let Ok((mut body, mut look)) = players.single_mut() else {
        return;
    };

    let sensitivity = config.movement.look_sensitivity;
    let limit = config.movement.max_look_angle.to_radians();
    look.yaw -= motion.delta.x * sensitivity;
    look.pitch = (look.pitch - motion.delta.y * sensitivity).clamp(-limit, limit);

    body.rotation = look.body_rotation();
    if let Ok(mut eye) = eyes.single_mut() {
        eye.rotation = look.eye_rotation();
    }
}

/// 从 `from` 看向 `to` 需要的 (yaw, pitch)
pub fn face_angles(from: Vec3, to: Vec3) -> (f32, f32) {
    let d = to - from;
    let horizontal = Vec2::new(d.x, d.z).length();
    (f32::atan2(-d.x, -d.z), f32::atan2(d.y, horizontal))
}

pub fn face_item(
    mut ev_face: EventReader<FaceItem>,
    config: Res<GameConfig>,
    items: Query<(&WorldItem, &GlobalTransform), Without<HeldProxy>>,
    mut players: Query<(&mut Transform, &mut Look), (With<LocalPlayer>, Without<Eye>)>,
    mut eyes: Query<(&mut Transform, &GlobalTransform), (With<Eye>, Without<LocalPlayer>)>,
    mut log: EventWriter<LogEvent>,
) {
    for ev in ev_face.read() {
        let (Ok((mut body, mut look)), Ok((mut eye, eye_global))) =
            (players.single_mut(), eyes.single_mut())
        else {
            continue;
        };
        let origin = eye_global.translation();

        let nearest = items
            .iter()
            .filter(|(item, _)| item.name.eq_ignore_ascii_case(&ev.name))
            .map(|(_, transform)| transform.translation())
            .min_by(|a, b| a.distance_squared(origin).total_cmp(&b.distance_squared(origin)));
        let Some(target) = nearest else {
            log.write(LogEvent(format!("附近没有 {}", ev.name)));
            continue;
        };

        let limit = config.movement.max_look_angle.to_radians();
        let (yaw, pitch) = face_angles(origin, target);
        look.yaw = yaw;
        look.pitch = pitch.clamp(-limit, limit);
        body.rotation = look.body_rotation();
        eye.rotation = look.eye_rotation();
        log.write(LogEvent(format!(
            "看向 {} ({:.1} m)",
            ev.name,
            origin.distance(target)
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn face_angles_point_the_view_at_target() {
        let (yaw, pitch) = face_angles(Vec3::ZERO, Vec3::new(0.0, 0.0, -2.0));
        assert!(close(yaw, 0.0) && close(pitch, 0.0));

        let (yaw, _) = face_angles(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));
        assert!(close(yaw, -FRAC_PI_2));

        let (_, pitch) = face_angles(Vec3::ZERO, Vec3::new(0.0, 1.0, -1.0));
        assert!(close(pitch, FRAC_PI_2 / 2.0));

        // 算出的朝向确实指向目标
        let target = Vec3::new(1.0, -0.5, 3.0);
        let (yaw, pitch) = face_angles(Vec3::ZERO, target);
        let look = Look { yaw, pitch };
        let forward = look.body_rotation() * look.eye_rotation() * Vec3::NEG_Z;
        assert!(forward.dot(target.normalize()) > 0.9999);
    }

    #[test]
    fn planar_direction_follows_yaw() {
        let forward = planar_direction(0.0, 1.0, 0.0);
        assert!(forward.abs_diff_eq(Vec3::NEG_Z, 1e-5));

        let turned = planar_direction(FRAC_PI_2, 1.0, 0.0);
        assert!(turned.abs_diff_eq(Vec3::NEG_X, 1e-5));

        let diagonal = planar_direction(0.0, 1.0, 1.0);
        assert!(close(diagonal.length(), 1.0));
        assert_eq!(planar_direction(0.3, 0.0, 0.0), Vec3::ZERO);
    }

    #[test]
    fn spawned_player_carries_stores() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(GameConfig::default())
            .add_systems(Startup, spawn_player);
        app.update();

        let world = app.world_mut();
        let (inventory, bar, hand) = world
            .query_filtered::<(&Inventory, &ActionBar, &Hand), With<LocalPlayer>>()
            .iter(world)
            .next()
            .unwrap();
        assert_eq!(inventory.len(), 20);
        assert_eq!(bar.len(), 5);
        assert_eq!(bar.backing_slot(0), Some(15));
        assert!(hand.held().is_none());
        assert!(world.get::<HandAnchor>(hand.anchor()).is_some());
    }
}
