pub mod components;
pub mod events;
pub mod systems;

use crate::core::states::{AppState, TickSet};
use bevy::prelude::*;
use events::*;
use systems::*;

pub struct CharacterPlugin;

impl Plugin for CharacterPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<FaceItem>()
            // 在游戏开始时生成玩家
            .add_systems(OnEnter(AppState::InGame), spawn_player)
            .add_systems(
                Update,
                (move_player, look_player, face_item)
                    .chain()
                    .in_set(TickSet::Input)
                    .run_if(in_state(AppState::InGame)),
            );
    }
}
