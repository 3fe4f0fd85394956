//! 手持代理与快捷栏
//!
//! 快捷栏只是背包尾部几个槽位的二级索引；手里拿的永远是按定义新生成的代理。

use bevy::prelude::*;

use crate::data::{schema::ItemDefinition, ItemCatalog};
use crate::inventory::error::InventoryError;
use crate::inventory::host::{ActionSlotView, ItemSpawner};
use crate::inventory::store::Inventory;

/// 快捷栏格子的高亮状态（UI 读取）
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotHighlight(pub bool);

/// 快捷栏格子部件
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSlotWidget {
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeldItem {
    pub entity: Entity,
    pub name: String,
}

/// 手部挂点和当前手持的代理
#[derive(Component, Debug)]
pub struct Hand {
    anchor: Entity,
    held: Option<HeldItem>,
}

impl Hand {
    pub fn new(anchor: Entity) -> Self {
        Self { anchor, held: None }
    }

    #[cfg(test)]
    pub fn holding(anchor: Entity, entity: Entity, name: &str) -> Self {
        Self {
            anchor,
            held: Some(HeldItem {
                entity,
                name: name.into(),
            }),
        }
    }

    pub fn anchor(&self) -> Entity {
        self.anchor
    }

    pub fn held(&self) -> Option<&HeldItem> {
        self.held.as_ref()
    }

    pub fn held_name(&self) -> Option<&str> {
        self.held.as_ref().map(|held| held.name.as_str())
    }

    /// 在挂点生成新的手持实例。空定义或手里已有东西时什么也不做。
    pub fn equip_item(
        &mut self,
        definition: Option<&ItemDefinition>,
        host: &mut impl ItemSpawner,
    ) -> Option<Entity> {
        let definition = definition?;
        if let Some(held) = &self.held {
            debug!("手里已有 {}，忽略装备 {}", held.name, definition.name);
            return None;
        }

        let entity = host.spawn_held(definition, self.anchor);
        self.held = Some(HeldItem {
            entity,
            name: definition.name.clone(),
        });
        Some(entity)
    }

    /// 名字对得上才卸下
    pub fn unequip_item(
        &mut self,
        definition: Option<&ItemDefinition>,
        host: &mut impl ItemSpawner,
    ) -> bool {
        let Some(definition) = definition else {
            return false;
        };
        match &self.held {
            Some(held) if held.name == definition.name => {}
            Some(held) => {
                debug!("手持 {} 与卸下请求 {} 不符", held.name, definition.name);
                return false;
            }
            None => return false,
        }
        self.release(host).is_some()
    }

    /// 无条件销毁手里的代理
    pub fn release(&mut self, host: &mut impl ItemSpawner) -> Option<HeldItem> {
        let held = self.held.take()?;
        host.despawn_item(held.entity);
        Some(held)
    }

    pub fn is_holding_item(&self, entity: Entity) -> bool {
        self.held.as_ref().is_some_and(|held| held.entity == entity)
    }
}

/// 快捷栏格子 → 背包槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSlotBinding {
    pub backing: usize,
    pub widget: Entity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivateOutcome {
    AlreadyActive,
    Switched {
        previous: Option<usize>,
        equipped: Option<Entity>,
    },
}

#[derive(Component, Debug, Clone)]
pub struct ActionBar {
    slots: Vec<ActionSlotBinding>,
    active: Option<usize>,
}

impl ActionBar {
    pub fn new(slots: Vec<ActionSlotBinding>) -> Self {
        Self {
            slots,
            active: None,
        }
    }

    /// 按顺序绑定到背包最后 `widgets.len()` 个槽位
    pub fn trailing(slot_count: usize, widgets: &[Entity]) -> Self {
        let first = slot_count.saturating_sub(widgets.len());
        Self::new(
            widgets
                .iter()
                .enumerate()
                .map(|(i, &widget)| ActionSlotBinding {
                    backing: first + i,
                    widget,
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn bindings(&self) -> &[ActionSlotBinding] {
        &self.slots
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn backing_slot(&self, action: usize) -> Option<usize> {
        self.slots.get(action).map(|binding| binding.backing)
    }

    pub fn active_backing(&self) -> Option<usize> {
        self.active.and_then(|action| self.backing_slot(action))
    }

    /// 切换激活格：先全部解析，失败就不做任何修改；然后先卸旧的再装新的
    pub fn set_action_slot_active<H: ItemSpawner + ActionSlotView>(
        &mut self,
        action: usize,
        inventory: &Inventory,
        catalog: &ItemCatalog,
        hand: &mut Hand,
        host: &mut H,
    ) -> Result<ActivateOutcome, InventoryError> {
        let next = *self
            .slots
            .get(action)
            .ok_or(InventoryError::UnboundActionSlot(action))?;
        if self.active == Some(action) {
            return Ok(ActivateOutcome::AlreadyActive);
        }

        let previous = match self.active {
            Some(prev) => {
                let binding = *self
                    .slots
                    .get(prev)
                    .ok_or(InventoryError::UnboundActionSlot(prev))?;
                Some((prev, binding, occupant_definition(inventory, catalog, binding.backing)?))
            }
            None => None,
        };
        let next_definition = occupant_definition(inventory, catalog, next.backing)?;

        if let Some((_, binding, definition)) = &previous {
            hand.unequip_item(definition.as_ref(), host);
            host.set_highlight(binding.widget, false);
        }
        self.active = Some(action);
        host.set_highlight(next.widget, true);
        let equipped = hand.equip_item(next_definition.as_ref(), host);

        Ok(ActivateOutcome::Switched {
            previous: previous.map(|(prev, ..)| prev),
            equipped,
        })
    }

    /// 取消激活（激活格的物品没了）
    pub fn clear_active(&mut self, host: &mut impl ActionSlotView) -> Option<usize> {
        let action = self.active.take()?;
        if let Some(binding) = self.slots.get(action) {
            host.set_highlight(binding.widget, false);
        }
        Some(action)
    }

    /// 某个槽位少了一个之后调用：激活格被清空就取消激活，再让手持和槽位对齐
    pub fn after_removal<H: ItemSpawner + ActionSlotView>(
        &mut self,
        slot: usize,
        remaining: u32,
        inventory: &Inventory,
        catalog: &ItemCatalog,
        hand: &mut Hand,
        host: &mut H,
    ) -> Result<bool, InventoryError> {
        if remaining == 0 && self.active_backing() == Some(slot) {
            self.clear_active(host);
        }
        self.resync(inventory, catalog, hand, host)
    }

    /// 手持应当等于激活格的占用者；不一致就重建。返回是否动过手。
    pub fn resync(
        &self,
        inventory: &Inventory,
        catalog: &ItemCatalog,
        hand: &mut Hand,
        host: &mut impl ItemSpawner,
    ) -> Result<bool, InventoryError> {
        let wanted = match self.active_backing() {
            Some(backing) => occupant_definition(inventory, catalog, backing)?,
            None => None,
        };
        let wanted_name = wanted.as_ref().map(|definition| definition.name.as_str());
        if hand.held_name() == wanted_name {
            return Ok(false);
        }

        hand.release(host);
        hand.equip_item(wanted.as_ref(), host);
        Ok(true)
    }
}

/// 槽位占用者的定义；空槽是 None，目录里找不到是错误
fn occupant_definition(
    inventory: &Inventory,
    catalog: &ItemCatalog,
    slot: usize,
) -> Result<Option<ItemDefinition>, InventoryError> {
    let record = inventory
        .slot(slot)
        .ok_or(InventoryError::SlotOutOfRange(slot))?;
    if record.is_empty() {
        return Ok(None);
    }
    catalog
        .get(&record.item_name)
        .cloned()
        .map(Some)
        .ok_or_else(|| InventoryError::UnknownItem(record.item_name.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::host::testing::{definition, HostCall, RecordingHost};

    struct Rig {
        host: RecordingHost,
        inventory: Inventory,
        catalog: ItemCatalog,
        bar: ActionBar,
        hand: Hand,
        widgets: Vec<Entity>,
    }

    /// 5 格背包，后 2 格是快捷栏：动作 0 → 槽 3 (Torch)，动作 1 → 槽 4 (Rock)
    fn rig() -> Rig {
        let mut host = RecordingHost::new();
        let widgets = vec![host.entity(), host.entity()];
        let anchor = host.entity();
        let mut inventory = Inventory::with_slots(5);
        for name in ["Apple", "Lantern", "Lever", "Torch", "Rock"] {
            inventory.add_item(&definition(name), &mut host).unwrap();
        }
        host.take();

        Rig {
            host,
            inventory,
            catalog: ItemCatalog::new(
                ["Apple", "Lantern", "Lever", "Torch", "Rock"]
                    .into_iter()
                    .map(definition)
                    .collect(),
            ),
            bar: ActionBar::trailing(5, &widgets),
            hand: Hand::new(anchor),
            widgets,
        }
    }

    impl Rig {
        fn activate(&mut self, action: usize) -> Result<ActivateOutcome, InventoryError> {
            self.bar.set_action_slot_active(
                action,
                &self.inventory,
                &self.catalog,
                &mut self.hand,
                &mut self.host,
            )
        }
    }

    #[test]
    fn trailing_binding_maps_onto_last_slots() {
        let bar = ActionBar::trailing(20, &[Entity::PLACEHOLDER; 5]);
        let backing: Vec<_> = bar.bindings().iter().map(|b| b.backing).collect();
        assert_eq!(backing, vec![15, 16, 17, 18, 19]);
    }

    #[test]
    fn activating_same_slot_twice_is_idempotent() {
        let mut rig = rig();
        rig.activate(0).unwrap();
        rig.host.take();

        assert_eq!(rig.activate(0), Ok(ActivateOutcome::AlreadyActive));
        assert!(rig.host.calls.is_empty());
        assert_eq!(rig.hand.held_name(), Some("Torch"));
    }

    #[test]
    fn switching_unequips_torch_before_equipping_rock() {
        let mut rig = rig();
        rig.activate(0).unwrap();
        let torch = rig.hand.held().unwrap().entity;
        rig.host.take();

        rig.activate(1).unwrap();

        assert_eq!(
            rig.host.take(),
            vec![
                HostCall::DespawnItem(torch),
                HostCall::Highlight(rig.widgets[0], false),
                HostCall::Highlight(rig.widgets[1], true),
                HostCall::SpawnHeld("Rock".into()),
            ]
        );
        assert_eq!(rig.hand.held_name(), Some("Rock"));
        assert_eq!(rig.bar.active(), Some(1));
    }

    #[test]
    fn empty_action_slot_activates_without_equipping() {
        let mut rig = rig();
        rig.inventory.deduct(4, &mut rig.host).unwrap();
        rig.host.take();

        let outcome = rig.activate(1).unwrap();

        assert_eq!(
            outcome,
            ActivateOutcome::Switched {
                previous: None,
                equipped: None
            }
        );
        assert_eq!(rig.host.take(), vec![HostCall::Highlight(rig.widgets[1], true)]);
        assert!(rig.hand.held().is_none());
    }

    #[test]
    fn unknown_occupant_aborts_without_mutation() {
        let mut rig = rig();
        rig.catalog = ItemCatalog::new(vec![definition("Torch")]);
        rig.activate(0).unwrap();
        rig.host.take();

        assert_eq!(rig.activate(1), Err(InventoryError::UnknownItem("Rock".into())));
        assert_eq!(rig.activate(7), Err(InventoryError::UnboundActionSlot(7)));
        assert!(rig.host.calls.is_empty());
        assert_eq!(rig.bar.active(), Some(0));
        assert_eq!(rig.hand.held_name(), Some("Torch"));
    }

    #[test]
    fn unequip_requires_matching_name() {
        let mut host = RecordingHost::new();
        let anchor = host.entity();
        let mut hand = Hand::new(anchor);

        assert_eq!(hand.equip_item(None, &mut host), None);
        let torch = hand.equip_item(Some(&definition("Torch")), &mut host).unwrap();
        assert_eq!(hand.equip_item(Some(&definition("Rock")), &mut host), None);
        assert!(hand.is_holding_item(torch));

        assert!(!hand.unequip_item(Some(&definition("Rock")), &mut host));
        assert!(!hand.unequip_item(None, &mut host));
        assert!(hand.unequip_item(Some(&definition("Torch")), &mut host));
        assert!(!hand.is_holding_item(torch));
        assert_eq!(
            host.take(),
            vec![HostCall::SpawnHeld("Torch".into()), HostCall::DespawnItem(torch)]
        );
    }

    #[test]
    fn removing_last_unit_clears_active_slot() {
        let mut rig = rig();
        rig.activate(0).unwrap();
        let torch = rig.hand.held().unwrap().entity;
        rig.host.take();

        let remaining = rig.inventory.deduct(3, &mut rig.host).unwrap();
        rig.bar
            .after_removal(3, remaining, &rig.inventory, &rig.catalog, &mut rig.hand, &mut rig.host)
            .unwrap();

        assert_eq!(rig.bar.active(), None);
        assert!(rig.hand.held().is_none());
        let calls = rig.host.take();
        assert!(calls.contains(&HostCall::Highlight(rig.widgets[0], false)));
        assert!(calls.contains(&HostCall::DespawnItem(torch)));
    }

    #[test]
    fn resync_follows_items_moved_into_active_slot() {
        let mut rig = rig();
        rig.activate(0).unwrap();
        let torch = rig.inventory.slot(3).unwrap().proxy.unwrap();
        rig.inventory.item_moved(torch, Some(0), &mut rig.host).unwrap();
        rig.host.take();

        // 槽 3 现在是 Apple
        let changed = rig
            .bar
            .resync(&rig.inventory, &rig.catalog, &mut rig.hand, &mut rig.host)
            .unwrap();

        assert!(changed);
        assert_eq!(rig.hand.held_name(), Some("Apple"));
        assert!(!rig
            .bar
            .resync(&rig.inventory, &rig.catalog, &mut rig.hand, &mut rig.host)
            .unwrap());
    }
}
