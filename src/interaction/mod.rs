pub mod events;
pub mod facet;
pub mod resolver;
mod systems;

use bevy::prelude::*;

use crate::core::states::{AppState, TickSet};
use events::*;
use facet::InteractableRegistry;
use resolver::HoverState;
use systems::*;

pub use systems::{Eye, HoverPrompt};

pub struct InteractionPlugin;
impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InteractableRegistry>()
            .init_resource::<HoverState>()
            .init_resource::<HoverPrompt>()
            .add_event::<InteractTrigger>()
            .add_event::<PickupRequested>()
            .add_systems(
                Update,
                (
                    sample_interact_input.in_set(TickSet::Input),
                    (prune_registry, update_hover).chain().in_set(TickSet::Hover),
                    handle_interact.in_set(TickSet::Interact),
                )
                    .run_if(in_state(AppState::InGame)),
            );
    }
}
