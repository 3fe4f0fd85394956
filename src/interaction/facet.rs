//! 可交互能力（facet）与实体 → 能力列表的注册表
//!
//! 一个物理实体可以挂多个能力（例如既是物品又是门开关）。命中时只拿到实体 id，
//! 再从注册表取出它的能力列表逐个调用；列表在实体构造时填好，不做运行时按类型查找。

use bevy::prelude::*;
use std::collections::HashMap;

/// 能力被调用后向外提出的请求，由系统统一派发
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionRequest {
    /// 拾取这个世界物品
    Pickup(Entity),
    /// 准星提示（None = 清空）
    Prompt(Option<String>),
    /// 给玩家的一条消息
    Message(String),
}

pub trait Interactable: Send + Sync + 'static {
    fn label(&self) -> &'static str;

    fn can_interact(&self) -> bool {
        true
    }

    fn interact(&mut self, target: Entity, out: &mut Vec<InteractionRequest>);

    fn on_hover(&mut self, _target: Entity, _out: &mut Vec<InteractionRequest>) {}

    fn on_stop_hover(&mut self, _target: Entity, _out: &mut Vec<InteractionRequest>) {}
}

/// 标记：该实体在注册表里有能力；被销毁时用来清理注册表
#[derive(Component, Debug, Default)]
pub struct Interactive;

#[derive(Resource, Default)]
pub struct InteractableRegistry {
    entries: HashMap<Entity, Vec<Box<dyn Interactable>>>,
}

impl InteractableRegistry {
    /// 追加一个能力，调用顺序 = 注册顺序
    pub fn register(&mut self, entity: Entity, facet: impl Interactable) {
        self.entries.entry(entity).or_default().push(Box::new(facet));
    }

    pub fn unregister(&mut self, entity: Entity) -> bool {
        self.entries.remove(&entity).is_some()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entries.contains_key(&entity)
    }

    pub fn labels(&self, entity: Entity) -> Vec<&'static str> {
        self.entries
            .get(&entity)
            .map(|facets| facets.iter().map(|f| f.label()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn facets_mut(&mut self, entity: Entity) -> Option<&mut Vec<Box<dyn Interactable>>> {
        self.entries.get_mut(&entity)
    }
}

/// 物品的拾取能力
pub struct PickupFacet {
    pub item_name: String,
}

impl PickupFacet {
    pub fn new(item_name: impl Into<String>) -> Self {
        Self {
            item_name: item_name.into(),
        }
    }
}

impl Interactable for PickupFacet {
    fn label(&self) -> &'static str {
        "pickup"
    }

    fn interact(&mut self, target: Entity, out: &mut Vec<InteractionRequest>) {
        out.push(InteractionRequest::Pickup(target));
    }

    fn on_hover(&mut self, _target: Entity, out: &mut Vec<InteractionRequest>) {
        out.push(InteractionRequest::Prompt(Some(format!("拾取 {}", self.item_name))));
    }

    fn on_stop_hover(&mut self, _target: Entity, out: &mut Vec<InteractionRequest>) {
        out.push(InteractionRequest::Prompt(None));
    }
}

/// 开关（门开关之类），每次交互翻转一次
#[derive(Default)]
pub struct SwitchFacet {
    pub on: bool,
}

impl Interactable for SwitchFacet {
    fn label(&self) -> &'static str {
        "switch"
    }

    fn interact(&mut self, _target: Entity, out: &mut Vec<InteractionRequest>) {
        self.on = !self.on;
        let state = if self.on { "打开" } else { "关闭" };
        out.push(InteractionRequest::Message(format!("开关已{state}")));
    }
}
