use bevy::prelude::*;

use super::components::PeerId;

/// 申请权限的用途，结果原样带回
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorityPurpose {
    Pickup { player: Entity },
    Drop { player: Entity },
}

#[derive(Event, Debug, Clone)]
pub struct AuthorityRequest {
    pub entity: Entity,
    pub requester: PeerId,
    pub purpose: AuthorityPurpose,
}

#[derive(Event, Debug, Clone)]
pub struct AuthorityResolved {
    pub entity: Entity,
    pub purpose: AuthorityPurpose,
    pub granted: bool,
}

/// 所有权变化通知
#[derive(Event, Debug, Clone)]
pub struct OwnershipChanged {
    pub entity: Entity,
    pub old: Option<PeerId>,
    pub new: Option<PeerId>,
}
