pub mod components;
pub mod events;
mod systems;

use bevy::prelude::*;

use crate::core::states::{AppState, TickSet};
use components::LocalPeer;
use events::*;

pub use systems::arbitrate_authority;

/// 网络权限层的替身：只负责所有权仲裁
pub struct NetworkPlugin;
impl Plugin for NetworkPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LocalPeer>()
            .add_event::<AuthorityRequest>()
            .add_event::<AuthorityResolved>()
            .add_event::<OwnershipChanged>()
            .add_systems(
                Update,
                arbitrate_authority
                    .in_set(TickSet::Authority)
                    .run_if(in_state(AppState::InGame)),
            );
    }
}
