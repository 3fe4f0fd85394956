//! 悬停 / 交互目标的结算

use bevy::prelude::*;

use super::facet::{InteractableRegistry, InteractionRequest};

/// 射线可以命中的体积（球体近似）
#[derive(Component, Debug, Clone, Copy)]
pub struct Targetable {
    pub radius: f32,
    /// 所在碰撞层（位掩码）
    pub layers: u32,
}

impl Default for Targetable {
    fn default() -> Self {
        Self {
            radius: 0.4,
            layers: 0b1,
        }
    }
}

/// 沿射线找最近的命中体。被挡住的非交互物体也算命中，由调用方判定“无目标”。
pub fn cast_ray<'a>(
    origin: Vec3,
    direction: Vec3,
    length: f32,
    mask: u32,
    candidates: impl IntoIterator<Item = (Entity, Vec3, &'a Targetable)>,
) -> Option<Entity> {
    let direction = direction.normalize_or_zero();
    if direction == Vec3::ZERO {
        return None;
    }

    let mut closest: Option<(Entity, f32)> = None;
    for (entity, center, target) in candidates {
        if target.layers & mask == 0 {
            continue;
        }

        let along = (center - origin).dot(direction);
        if along < 0.0 || along > length {
            continue;
        }

        let off_axis = (center - (origin + direction * along)).length();
        if off_axis >= target.radius {
            continue;
        }

        if closest.is_none_or(|(_, best)| along < best) {
            closest = Some((entity, along));
        }
    }
    closest.map(|(entity, _)| entity)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetSignal {
    Hover,
    StopHover,
    Interact,
}

/// 实际被调用的一次能力回调
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatched {
    pub entity: Entity,
    pub facet: usize,
    pub signal: FacetSignal,
}

/// 当前悬停的目标
#[derive(Resource, Debug, Default)]
pub struct HoverState {
    current: Option<Entity>,
}

impl HoverState {
    pub fn current(&self) -> Option<Entity> {
        self.current
    }

    /// 每帧调用一次。同一目标不重复发 hover；换目标时先 stop-hover 旧的再 hover 新的。
    pub fn try_hover(
        &mut self,
        hit: Option<Entity>,
        registry: &mut InteractableRegistry,
        out: &mut Vec<InteractionRequest>,
    ) -> Vec<Dispatched> {
        let hit = hit.filter(|entity| registry.contains(*entity));

        if let Some(previous) = self.current {
            if !registry.contains(previous) {
                // 上一帧的目标已被销毁：静默清掉
                debug!("悬停目标 {previous:?} 已消失");
                self.current = None;
            } else if hit == Some(previous) {
                return Vec::new();
            }
        }

        let mut fired = self.clear_hover(registry, out);

        if let Some(target) = hit {
            self.current = Some(target);
            if let Some(facets) = registry.facets_mut(target) {
                for (idx, facet) in facets.iter_mut().enumerate() {
                    if facet.can_interact() {
                        facet.on_hover(target, out);
                        fired.push(Dispatched {
                            entity: target,
                            facet: idx,
                            signal: FacetSignal::Hover,
                        });
                    }
                }
            }
        }
        fired
    }

    /// 对旧目标的每个能力发 stop-hover 并清空
    pub fn clear_hover(
        &mut self,
        registry: &mut InteractableRegistry,
        out: &mut Vec<InteractionRequest>,
    ) -> Vec<Dispatched> {
        let mut fired = Vec::new();
        let Some(previous) = self.current.take() else {
            return fired;
        };

        if let Some(facets) = registry.facets_mut(previous) {
            for (idx, facet) in facets.iter_mut().enumerate() {
                facet.on_stop_hover(previous, out);
                fired.push(Dispatched {
                    entity: previous,
                    facet: idx,
                    signal: FacetSignal::StopHover,
                });
            }
        }
        fired
    }
}

/// 交互触发：目标上所有当前可交互的能力都执行一次
pub fn try_interact(
    target: Option<Entity>,
    registry: &mut InteractableRegistry,
    out: &mut Vec<InteractionRequest>,
) -> Vec<Dispatched> {
    let mut fired = Vec::new();
    let Some(target) = target else {
        return fired;
    };
    let Some(facets) = registry.facets_mut(target) else {
        return fired;
    };

    for (idx, facet) in facets.iter_mut().enumerate() {
        if facet.can_interact() {
            facet.interact(target, out);
            fired.push(Dispatched {
                entity: target,
                facet: idx,
                signal: FacetSignal::Interact,
            });
        }
    }
    fired
}
