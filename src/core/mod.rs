use bevy::prelude::*;

pub mod config;
pub mod events;
pub mod states;

use config::{GameConfig, KeyBindings};

/// 配置文件位置（相对工作目录）
pub const CONFIG_PATH: &str = "assets/config/game.toml";

/// 核心插件：注册全局资源 / 事件 / 状态 / 帧内阶段
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        use states::{AppState, TickSet};

        let config = GameConfig::load_or_default(CONFIG_PATH);
        let bindings = KeyBindings::resolve(&config).unwrap_or_else(|err| {
            error!("按键配置无效，改用默认按键: {err}");
            KeyBindings::default()
        });

        app.init_state::<AppState>()
            .add_event::<events::LogEvent>()
            .insert_resource(config)
            .insert_resource(bindings)
            .configure_sets(
                Update,
                (
                    TickSet::Input,
                    TickSet::Hover,
                    TickSet::Interact,
                    TickSet::Request,
                    TickSet::Authority,
                    TickSet::Resolve,
                    TickSet::Inventory,
                    TickSet::Equip,
                )
                    .chain(),
            );
    }
}
