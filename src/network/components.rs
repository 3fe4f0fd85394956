use bevy::prelude::*;

/// 网络参与者 id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(pub u64);

/// 本机参与者
#[derive(Resource, Debug, Clone, Copy)]
pub struct LocalPeer(pub PeerId);

impl Default for LocalPeer {
    fn default() -> Self {
        Self(PeerId(1))
    }
}

/// 当前网络所有者（None = 无主）
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkOwner(pub Option<PeerId>);

/// 刚体：kinematic = 本地不做物理模拟
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Body {
    pub kinematic: bool,
}
