use bevy::prelude::*;
use std::collections::HashSet;

use super::{components::*, events::*};

/// 回环仲裁：代替真实网络层做串行化
///
/// 同意条件：实体还在、无主或已归申请者、本帧没被更早的请求占走。
pub fn arbitrate_authority(
    mut requests: EventReader<AuthorityRequest>,
    mut resolved: EventWriter<AuthorityResolved>,
    mut changed: EventWriter<OwnershipChanged>,
    mut owners: Query<&mut NetworkOwner>,
) {
    let mut claimed: HashSet<Entity> = HashSet::new();

    for req in requests.read() {
        let granted = match owners.get_mut(req.entity) {
            Ok(mut owner) => {
                let free = owner.0.is_none() || owner.0 == Some(req.requester);
                if free && claimed.insert(req.entity) {
                    let old = owner.0;
                    if old != Some(req.requester) {
                        owner.0 = Some(req.requester);
                        changed.write(OwnershipChanged {
                            entity: req.entity,
                            old,
                            new: Some(req.requester),
                        });
                    }
                    true
                } else {
                    false
                }
            }
            Err(_) => false,
        };

        if !granted {
            debug!("权限被拒绝: {:?} ({:?})", req.entity, req.purpose);
        }
        resolved.write(AuthorityResolved {
            entity: req.entity,
            purpose: req.purpose,
            granted,
        });
    }
}
