pub mod components;
pub mod events;
mod systems;

use bevy::prelude::*;

use crate::core::states::{AppState, TickSet};
use events::SpawnWorldItem;
use systems::*;

pub use systems::kinematic_for;

/// 世界物品：摆放、拾取、所有权 → kinematic
pub struct ItemPlugin;
impl Plugin for ItemPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SpawnWorldItem>()
            .add_systems(OnEnter(AppState::InGame), setup_world_items)
            .add_systems(
                Update,
                (
                    handle_spawn_requests.in_set(TickSet::Input),
                    request_pickup.in_set(TickSet::Request),
                    (finish_pickup, on_ownership_changed)
                        .chain()
                        .in_set(TickSet::Resolve),
                )
                    .run_if(in_state(AppState::InGame)),
            );
    }
}
