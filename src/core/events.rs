use bevy::prelude::*;

/// 面向玩家的游戏消息（main 里统一打印）
#[derive(Event, Debug, Clone)]
pub struct LogEvent(pub String);
