pub mod components;
pub mod error;
pub mod events;
pub mod host;
pub mod store;
mod systems;

use bevy::prelude::*;
use crate::core::states::{AppState, TickSet};
use components::*;
use events::*;
use systems::*;

pub struct InventoryPlugin;
impl Plugin for InventoryPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InventoryOpen>()
            .add_event::<GiveItemEvent>()
            .add_event::<ListInventoryEvent>()
            .add_event::<DumpInventoryEvent>()
            .add_event::<DropRequested>()
            .add_event::<ItemMoveRequested>()
            .add_event::<ItemsRearranged>()
            .add_systems(
                Update,
                (
                    toggle_inventory.in_set(TickSet::Input),
                    begin_drop.in_set(TickSet::Request),
                    finish_drop.in_set(TickSet::Resolve),
                    (give_item, handle_item_moved)
                        .chain()
                        .in_set(TickSet::Inventory),
                    (print_inventory, dump_inventory_json).after(TickSet::Equip),
                )
                    .run_if(in_state(AppState::InGame)),
            );
    }
}
