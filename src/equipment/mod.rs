pub mod components;
pub mod events;
pub(crate) mod systems;

use crate::core::states::{AppState, TickSet};
use bevy::prelude::*;
use events::*;
use systems::*;

pub struct EquipmentPlugin;
impl Plugin for EquipmentPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SetActionSlotActive>()
            .add_event::<UseHeldItem>()
            .add_event::<ConsumeHeldItem>()
            .add_systems(
                Update,
                (
                    sample_action_keys.in_set(TickSet::Input),
                    (
                        resync_after_rearrange,
                        apply_action_slot,
                        use_held_item,
                        consume_held_item,
                    )
                        .chain()
                        .in_set(TickSet::Equip),
                )
                    .run_if(in_state(AppState::InGame)),
            );
    }
}
