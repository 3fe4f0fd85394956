//! 游戏配置：assets/config/game.toml → GameConfig / KeyBindings

use std::path::Path;

use anyhow::Context;
use bevy::prelude::*;
use serde::Deserialize;
use serde::de::IntoDeserializer;
use serde::de::value::{Error as ValueError, StrDeserializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Unknown key name `{0}`")]
    UnknownKey(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 全局配置（Resource），所有字段都有默认值
#[derive(Resource, Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub interaction: InteractionConfig,
    pub inventory: InventoryConfig,
    pub controls: ControlsConfig,
    pub movement: MovementConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// 瞄准射线长度
    pub ray_length: f32,
    /// 射线检测的碰撞层掩码
    pub layers: u32,
    pub interact_key: String,
    pub inventory_key: String,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            ray_length: 4.0,
            layers: 0b1,
            interact_key: "KeyE".into(),
            inventory_key: "KeyI".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub slot_count: usize,
    /// 动作栏映射到背包末尾的这几格
    pub action_slot_count: usize,
    /// 丢弃时生成在玩家前方多远
    pub drop_forward: f32,
    /// 丢弃时向上抬高，避免穿地
    pub drop_lift: f32,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            slot_count: 20,
            action_slot_count: 5,
            drop_forward: 1.0,
            drop_lift: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub action_keys: Vec<String>,
    pub use_key: String,
    pub consume_key: String,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            action_keys: (1..=5).map(|n| format!("Digit{n}")).collect(),
            use_key: "KeyF".into(),
            consume_key: "KeyQ".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub move_speed: f32,
    pub sprint_speed: f32,
    pub look_sensitivity: f32,
    /// 俯仰角上限（度）
    pub max_look_angle: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            sprint_speed: 4.5,
            look_sensitivity: 0.003,
            max_look_angle: 80.0,
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// 文件不存在 → 默认值 + 警告；文件损坏 → 默认值 + 错误日志
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            warn!("配置文件 {} 不存在，使用默认配置", path.display());
            return Self::default();
        }

        match Self::load(path).with_context(|| format!("加载配置 {} 失败", path.display())) {
            Ok(config) => {
                info!("✔ Config loaded: {}", path.display());
                config
            }
            Err(err) => {
                error!("{err:#}");
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let inv = &self.inventory;
        if inv.slot_count == 0 {
            return Err(ConfigError::Invalid("slot_count must be at least 1".into()));
        }
        if inv.action_slot_count > inv.slot_count {
            return Err(ConfigError::Invalid(format!(
                "action_slot_count {} exceeds slot_count {}",
                inv.action_slot_count, inv.slot_count
            )));
        }
        if self.controls.action_keys.len() < inv.action_slot_count {
            return Err(ConfigError::Invalid(format!(
                "{} action slots but only {} action keys",
                inv.action_slot_count,
                self.controls.action_keys.len()
            )));
        }
        if self.interaction.ray_length <= 0.0 {
            return Err(ConfigError::Invalid("ray_length must be positive".into()));
        }
        Ok(())
    }
}

/// 解析后的按键表
#[derive(Resource, Debug, Clone)]
pub struct KeyBindings {
    pub interact: KeyCode,
    pub inventory: KeyCode,
    pub use_item: KeyCode,
    pub consume: KeyCode,
    pub action_slots: Vec<KeyCode>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            interact: KeyCode::KeyE,
            inventory: KeyCode::KeyI,
            use_item: KeyCode::KeyF,
            consume: KeyCode::KeyQ,
            action_slots: vec![
                KeyCode::Digit1,
                KeyCode::Digit2,
                KeyCode::Digit3,
                KeyCode::Digit4,
                KeyCode::Digit5,
            ],
        }
    }
}

impl KeyBindings {
    pub fn resolve(config: &GameConfig) -> Result<Self, ConfigError> {
        let key = |name: &str| parse_key(name).ok_or_else(|| ConfigError::UnknownKey(name.into()));
        Ok(Self {
            interact: key(&config.interaction.interact_key)?,
            inventory: key(&config.interaction.inventory_key)?,
            use_item: key(&config.controls.use_key)?,
            consume: key(&config.controls.consume_key)?,
            action_slots: config
                .controls
                .action_keys
                .iter()
                .take(config.inventory.action_slot_count)
                .map(|name| key(name))
                .collect::<Result<_, _>>()?,
        })
    }
}

/// 按 KeyCode 的变体名解析（"KeyE" / "Digit1" / "ArrowUp" / "F5" ...），
/// 直接走 KeyCode 自带的 Deserialize，所以任何单元变体名都认
pub fn parse_key(name: &str) -> Option<KeyCode> {
    let de: StrDeserializer<'_, ValueError> = name.into_deserializer();
    KeyCode::deserialize(de).ok()
}
