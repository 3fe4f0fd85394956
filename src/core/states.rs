use bevy::prelude::*;

/// 游戏运行的大状态
#[derive(States, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    #[default]
    Startup,
    Loading,
    InGame,
    Shutdown,
}

/// 每帧的执行阶段，严格按顺序串联
///
/// 悬停变化（先 stop-hover 再 hover）必须在同一帧的交互触发之前结算完。
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    /// 采样按键 / 鼠标
    Input,
    /// 射线检测 + 悬停事件
    Hover,
    /// 交互触发
    Interact,
    /// 把拾取 / 丢弃意图变成权限申请
    Request,
    /// 权限仲裁（网络层替身）
    Authority,
    /// 权限结果回来后的拾取 / 丢弃提交
    Resolve,
    /// 背包操作
    Inventory,
    /// 动作栏 / 手持
    Equip,
}
