use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::events::*;
use super::facet::{InteractableRegistry, InteractionRequest, Interactive};
use super::resolver::{cast_ray, try_interact, HoverState, Targetable};
use crate::core::config::{GameConfig, KeyBindings};
use crate::core::events::LogEvent;

/// 视点（射线起点，朝向 = 视线方向）
#[derive(Component, Debug, Default)]
pub struct Eye;

/// 准星旁的提示文本
#[derive(Resource, Debug, Default)]
pub struct HoverPrompt(pub Option<String>);

/// 能力请求的去处
#[derive(SystemParam)]
pub struct RequestSink<'w> {
    prompt: ResMut<'w, HoverPrompt>,
    log: EventWriter<'w, LogEvent>,
    pickups: EventWriter<'w, PickupRequested>,
}

impl RequestSink<'_> {
    fn dispatch(&mut self, requests: Vec<InteractionRequest>) {
        for request in requests {
            match request {
                InteractionRequest::Pickup(item) => {
                    self.pickups.write(PickupRequested { item });
                }
                InteractionRequest::Prompt(text) => self.prompt.0 = text,
                InteractionRequest::Message(text) => {
                    self.log.write(LogEvent(text));
                }
            }
        }
    }
}

/// 当前视线命中的实体（可能不是可交互的）
fn look_target(
    eye: &Query<&GlobalTransform, With<Eye>>,
    targets: &Query<(Entity, &GlobalTransform, &Targetable)>,
    config: &GameConfig,
) -> Option<Entity> {
    let eye = eye.single().ok()?;
    cast_ray(
        eye.translation(),
        eye.forward().as_vec3(),
        config.interaction.ray_length,
        config.interaction.layers,
        targets
            .iter()
            .map(|(entity, transform, target)| (entity, transform.translation(), target)),
    )
}

/// 采样交互键：按下的那一帧才算
pub fn sample_interact_input(
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    bindings: Res<KeyBindings>,
    mut trigger: EventWriter<InteractTrigger>,
) {
    if mouse.just_pressed(MouseButton::Left) || keys.just_pressed(bindings.interact) {
        trigger.write(InteractTrigger);
    }
}

/// 已销毁的实体从注册表移除
pub fn prune_registry(
    mut removed: RemovedComponents<Interactive>,
    mut registry: ResMut<InteractableRegistry>,
) {
    for entity in removed.read() {
        registry.unregister(entity);
    }
}

pub fn update_hover(
    eye: Query<&GlobalTransform, With<Eye>>,
    targets: Query<(Entity, &GlobalTransform, &Targetable)>,
    config: Res<GameConfig>,
    mut hover: ResMut<HoverState>,
    mut registry: ResMut<InteractableRegistry>,
    mut sink: RequestSink,
) {
    let hit = look_target(&eye, &targets, &config);
    let mut requests = Vec::new();
    let fired = hover.try_hover(hit, &mut registry, &mut requests);
    for d in &fired {
        debug!("{:?} -> {:?}#{}", d.signal, d.entity, d.facet);
    }
    sink.dispatch(requests);
    if hover.current().is_none() {
        sink.prompt.0 = None;
    }
}

/// 交互：与悬停独立再打一次射线
pub fn handle_interact(
    mut triggers: EventReader<InteractTrigger>,
    eye: Query<&GlobalTransform, With<Eye>>,
    targets: Query<(Entity, &GlobalTransform, &Targetable)>,
    config: Res<GameConfig>,
    mut registry: ResMut<InteractableRegistry>,
    mut sink: RequestSink,
) {
    if triggers.is_empty() {
        return;
    }
    triggers.clear();

    let hit = look_target(&eye, &targets, &config);
    let mut requests = Vec::new();
    let fired = try_interact(hit, &mut registry, &mut requests);
    if fired.is_empty() {
        debug!("交互落空");
    }
    sink.dispatch(requests);
}
