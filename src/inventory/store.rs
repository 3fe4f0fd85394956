//! 背包存储：槽位 → 占用记录
//!
//! 记录是值类型数组，每次修改都是“读出 → 生成新值 → 写回”，不持有记录的引用去原地改。

use bevy::prelude::*;
use serde::Serialize;

use super::error::InventoryError;
use super::host::{ProxyHost, ProxyView};
use crate::data::{schema::ItemDefinition, ItemCatalog};

/// 一个槽位的占用记录；名字为空 = 空槽
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlotRecord {
    pub item_name: String,
    pub icon: String,
    pub amount: u32,
    /// 绑定的 UI 代理
    #[serde(skip)]
    pub proxy: Option<Entity>,
}

impl SlotRecord {
    pub fn is_empty(&self) -> bool {
        self.item_name.is_empty()
    }

    fn view(&self) -> ProxyView {
        ProxyView {
            name: self.item_name.clone(),
            icon: self.icon.clone(),
            amount: self.amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOutcome {
    pub slot: usize,
    pub amount: u32,
    /// true = 叠到了已有的格子上
    pub stacked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// 目标无法解析或就是原格子，UI 自己弹回
    Unchanged,
    Moved { from: usize, to: usize },
    Swapped { from: usize, to: usize },
    Merged { from: usize, to: usize, amount: u32 },
}

/// 丢弃第一阶段的凭据：已校验，尚未修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTicket {
    pub slot: usize,
    pub proxy: Entity,
    pub definition: ItemDefinition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropCommit {
    pub slot: usize,
    pub remaining: u32,
}

/// 玩家背包（挂在玩家实体上）
#[derive(Component, Debug, Clone)]
pub struct Inventory {
    records: Vec<SlotRecord>,
}

impl Inventory {
    /// 固定容量，每个槽位恰好一条记录
    pub fn with_slots(count: usize) -> Self {
        Self {
            records: vec![SlotRecord::default(); count],
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn slots(&self) -> &[SlotRecord] {
        &self.records
    }

    pub fn slot(&self, slot: usize) -> Option<&SlotRecord> {
        self.records.get(slot)
    }

    /// 非空槽位的记录
    pub fn occupant(&self, slot: usize) -> Option<&SlotRecord> {
        self.slot(slot).filter(|record| !record.is_empty())
    }

    pub fn total_amount(&self) -> u32 {
        self.records.iter().map(|record| record.amount).sum()
    }

    pub fn find_proxy(&self, proxy: Entity) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.proxy == Some(proxy))
    }

    /// 先按槽位顺序找同名堆叠，找不到再占第一个空槽；都没有就返回 Full，调用方不得销毁来源实例。
    pub fn add_item(
        &mut self,
        definition: &ItemDefinition,
        host: &mut impl ProxyHost,
    ) -> Result<AddOutcome, InventoryError> {
        if definition.name.is_empty() {
            return Err(InventoryError::UnknownItem(String::new()));
        }

        if let Some(slot) = self
            .records
            .iter()
            .position(|record| !record.is_empty() && record.item_name == definition.name)
        {
            let mut record = self.records[slot].clone();
            record.amount += 1;
            if let Some(proxy) = record.proxy {
                host.refresh_proxy(proxy, slot, &record.view());
            }
            let amount = record.amount;
            self.records[slot] = record;
            return Ok(AddOutcome {
                slot,
                amount,
                stacked: true,
            });
        }

        let Some(slot) = self.records.iter().position(SlotRecord::is_empty) else {
            return Err(InventoryError::Full(definition.name.clone()));
        };

        let mut record = SlotRecord {
            item_name: definition.name.clone(),
            icon: definition.icon.clone(),
            amount: 1,
            proxy: None,
        };
        record.proxy = Some(host.spawn_proxy(slot, &record.view()));
        self.records[slot] = record;

        Ok(AddOutcome {
            slot,
            amount: 1,
            stacked: false,
        })
    }

    /// 拖拽落下：空槽直接搬，同名合并，异名交换
    pub fn item_moved(
        &mut self,
        proxy: Entity,
        destination: Option<usize>,
        host: &mut impl ProxyHost,
    ) -> Result<MoveOutcome, InventoryError> {
        let from = self
            .find_proxy(proxy)
            .ok_or(InventoryError::ProxyNotFound(proxy))?;
        let Some(to) = destination else {
            return Ok(MoveOutcome::Unchanged);
        };
        if to >= self.records.len() {
            return Err(InventoryError::SlotOutOfRange(to));
        }
        if to == from {
            return Ok(MoveOutcome::Unchanged);
        }

        let moving = self.records[from].clone();
        let resident = self.records[to].clone();

        if resident.is_empty() {
            if let Some(p) = moving.proxy {
                host.refresh_proxy(p, to, &moving.view());
            }
            self.records[to] = moving;
            self.records[from] = SlotRecord::default();
            return Ok(MoveOutcome::Moved { from, to });
        }

        if resident.item_name == moving.item_name {
            let mut merged = resident;
            merged.amount += moving.amount;
            if let Some(p) = moving.proxy {
                host.despawn_proxy(p);
            }
            if let Some(p) = merged.proxy {
                host.refresh_proxy(p, to, &merged.view());
            }
            let amount = merged.amount;
            self.records[to] = merged;
            self.records[from] = SlotRecord::default();
            return Ok(MoveOutcome::Merged { from, to, amount });
        }

        if let Some(p) = moving.proxy {
            host.refresh_proxy(p, to, &moving.view());
        }
        if let Some(p) = resident.proxy {
            host.refresh_proxy(p, from, &resident.view());
        }
        self.records[to] = moving;
        self.records[from] = resident;
        Ok(MoveOutcome::Swapped { from, to })
    }

    /// 丢弃第一阶段：找到记录并解析物品定义，不做任何修改
    pub fn prepare_drop(
        &self,
        proxy: Entity,
        catalog: &ItemCatalog,
    ) -> Result<DropTicket, InventoryError> {
        let slot = self
            .find_proxy(proxy)
            .ok_or(InventoryError::ProxyNotFound(proxy))?;
        let name = &self.records[slot].item_name;
        let definition = catalog
            .get(name)
            .cloned()
            .ok_or_else(|| InventoryError::UnknownItem(name.clone()))?;

        Ok(DropTicket {
            slot,
            proxy,
            definition,
        })
    }

    /// 丢弃第二阶段：权限到手后扣一个。期间代理可能被挪过，所以按代理重新定位。
    pub fn commit_drop(
        &mut self,
        ticket: &DropTicket,
        host: &mut impl ProxyHost,
    ) -> Result<DropCommit, InventoryError> {
        let slot = self
            .find_proxy(ticket.proxy)
            .filter(|&slot| self.records[slot].item_name == ticket.definition.name)
            .ok_or(InventoryError::ProxyNotFound(ticket.proxy))?;
        let remaining = self.deduct(slot, host)?;
        Ok(DropCommit { slot, remaining })
    }

    /// 扣一个：归零时清空记录并销毁代理，返回剩余数量
    pub fn deduct(&mut self, slot: usize, host: &mut impl ProxyHost) -> Result<u32, InventoryError> {
        let mut record = self
            .records
            .get(slot)
            .cloned()
            .ok_or(InventoryError::SlotOutOfRange(slot))?;
        if record.is_empty() {
            return Ok(0);
        }

        record.amount = record.amount.saturating_sub(1);
        if record.amount == 0 {
            if let Some(proxy) = record.proxy {
                host.despawn_proxy(proxy);
            }
            self.records[slot] = SlotRecord::default();
            return Ok(0);
        }

        if let Some(proxy) = record.proxy {
            host.refresh_proxy(proxy, slot, &record.view());
        }
        let amount = record.amount;
        self.records[slot] = record;
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::host::testing::{definition, HostCall, RecordingHost};

    fn catalog() -> ItemCatalog {
        ItemCatalog::new(vec![definition("Torch"), definition("Rock")])
    }

    fn names(inv: &Inventory) -> Vec<(&str, u32)> {
        inv.slots()
            .iter()
            .map(|r| (r.item_name.as_str(), r.amount))
            .collect()
    }

    #[test]
    fn same_name_always_stacks_onto_first_slot() {
        let mut host = RecordingHost::new();
        let mut inv = Inventory::with_slots(3);
        let torch = definition("Torch");

        for _ in 0..4 {
            inv.add_item(&torch, &mut host).unwrap();
        }

        assert_eq!(names(&inv), vec![("Torch", 4), ("", 0), ("", 0)]);
        assert_eq!(
            host.take(),
            vec![
                HostCall::SpawnProxy { slot: 0, amount: 1 },
                HostCall::RefreshProxy { slot: 0, amount: 2 },
                HostCall::RefreshProxy { slot: 0, amount: 3 },
                HostCall::RefreshProxy { slot: 0, amount: 4 },
            ]
        );
    }

    #[test]
    fn full_inventory_rejects_without_mutation() {
        let mut host = RecordingHost::new();
        let mut inv = Inventory::with_slots(1);
        inv.add_item(&definition("Torch"), &mut host).unwrap();
        host.take();

        let err = inv.add_item(&definition("Rock"), &mut host).unwrap_err();

        assert_eq!(err, InventoryError::Full("Rock".into()));
        assert_eq!(names(&inv), vec![("Torch", 1)]);
        assert!(host.calls.is_empty());

        // 同名仍可继续堆叠
        assert!(inv.add_item(&definition("Torch"), &mut host).unwrap().stacked);
    }

    #[test]
    fn deducting_to_zero_frees_slot_for_other_items() {
        let mut host = RecordingHost::new();
        let mut inv = Inventory::with_slots(2);
        inv.add_item(&definition("Torch"), &mut host).unwrap();
        inv.add_item(&definition("Torch"), &mut host).unwrap();
        let proxy = inv.slot(0).unwrap().proxy.unwrap();
        host.take();

        assert_eq!(inv.deduct(0, &mut host), Ok(1));
        assert_eq!(inv.deduct(0, &mut host), Ok(0));
        assert!(inv.slot(0).unwrap().is_empty());
        assert_eq!(inv.slot(0).unwrap().proxy, None);
        assert_eq!(
            host.take(),
            vec![
                HostCall::RefreshProxy { slot: 0, amount: 1 },
                HostCall::DespawnProxy(proxy),
            ]
        );

        let outcome = inv.add_item(&definition("Rock"), &mut host).unwrap();
        assert_eq!(outcome.slot, 0);
        assert!(!outcome.stacked);
    }

    #[test]
    fn moves_preserve_total_count() {
        let mut host = RecordingHost::new();
        let mut inv = Inventory::with_slots(4);
        inv.add_item(&definition("Torch"), &mut host).unwrap();
        inv.add_item(&definition("Torch"), &mut host).unwrap();
        inv.add_item(&definition("Rock"), &mut host).unwrap();
        let torch = inv.slot(0).unwrap().proxy.unwrap();
        let rock = inv.slot(1).unwrap().proxy.unwrap();
        let total = inv.total_amount();

        let moved = inv.item_moved(torch, Some(3), &mut host).unwrap();
        assert_eq!(moved, MoveOutcome::Moved { from: 0, to: 3 });
        assert!(inv.slot(0).unwrap().is_empty());
        assert_eq!(inv.total_amount(), total);

        let swapped = inv.item_moved(rock, Some(3), &mut host).unwrap();
        assert_eq!(swapped, MoveOutcome::Swapped { from: 1, to: 3 });
        assert_eq!(names(&inv), vec![("", 0), ("Torch", 2), ("", 0), ("Rock", 1)]);
        assert_eq!(inv.find_proxy(torch), Some(1));
        assert_eq!(inv.total_amount(), total);
    }

    #[test]
    fn moving_onto_same_item_merges_stacks() {
        let mut host = RecordingHost::new();
        let a = host.entity();
        let b = host.entity();
        let mut inv = Inventory::with_slots(3);
        inv.records[0] = SlotRecord {
            item_name: "Torch".into(),
            icon: "icons/torch.png".into(),
            amount: 3,
            proxy: Some(a),
        };
        inv.records[2] = SlotRecord {
            item_name: "Torch".into(),
            icon: "icons/torch.png".into(),
            amount: 2,
            proxy: Some(b),
        };

        let merged = inv.item_moved(a, Some(2), &mut host).unwrap();

        assert_eq!(merged, MoveOutcome::Merged { from: 0, to: 2, amount: 5 });
        assert!(inv.slot(0).unwrap().is_empty());
        assert_eq!(inv.find_proxy(a), None);
        assert_eq!(inv.find_proxy(b), Some(2));
        assert_eq!(
            host.take(),
            vec![
                HostCall::DespawnProxy(a),
                HostCall::RefreshProxy { slot: 2, amount: 5 },
            ]
        );
    }

    #[test]
    fn unresolvable_move_target_changes_nothing() {
        let mut host = RecordingHost::new();
        let mut inv = Inventory::with_slots(2);
        inv.add_item(&definition("Torch"), &mut host).unwrap();
        let torch = inv.slot(0).unwrap().proxy.unwrap();
        let before = inv.slots().to_vec();

        assert_eq!(inv.item_moved(torch, None, &mut host), Ok(MoveOutcome::Unchanged));
        assert_eq!(inv.item_moved(torch, Some(0), &mut host), Ok(MoveOutcome::Unchanged));
        assert_eq!(
            inv.item_moved(torch, Some(9), &mut host),
            Err(InventoryError::SlotOutOfRange(9))
        );
        let stranger = host.entity();
        assert_eq!(
            inv.item_moved(stranger, Some(1), &mut host),
            Err(InventoryError::ProxyNotFound(stranger))
        );

        assert_eq!(inv.slots(), before.as_slice());
    }

    #[test]
    fn torch_and_rock_scenario() {
        let mut host = RecordingHost::new();
        let catalog = catalog();
        let mut inv = Inventory::with_slots(5);

        inv.add_item(&definition("Torch"), &mut host).unwrap();
        assert_eq!(names(&inv)[0], ("Torch", 1));
        inv.add_item(&definition("Torch"), &mut host).unwrap();
        assert_eq!(names(&inv)[..2], [("Torch", 2), ("", 0)]);
        inv.add_item(&definition("Rock"), &mut host).unwrap();
        assert_eq!(names(&inv)[1], ("Rock", 1));

        let proxy = inv.slot(0).unwrap().proxy.unwrap();
        let ticket = inv.prepare_drop(proxy, &catalog).unwrap();
        assert_eq!(ticket.definition.name, "Torch");
        assert_eq!(inv.total_amount(), 3);

        let commit = inv.commit_drop(&ticket, &mut host).unwrap();
        assert_eq!(commit, DropCommit { slot: 0, remaining: 1 });

        let ticket = inv.prepare_drop(proxy, &catalog).unwrap();
        let commit = inv.commit_drop(&ticket, &mut host).unwrap();
        assert_eq!(commit.remaining, 0);
        assert!(inv.slot(0).unwrap().is_empty());
        assert_eq!(host.calls.last(), Some(&HostCall::DespawnProxy(proxy)));
    }

    #[test]
    fn drop_of_unknown_item_fails_before_mutation() {
        let mut host = RecordingHost::new();
        let mut inv = Inventory::with_slots(2);
        inv.add_item(&definition("Mystery"), &mut host).unwrap();
        let proxy = inv.slot(0).unwrap().proxy.unwrap();

        let err = inv.prepare_drop(proxy, &catalog()).unwrap_err();

        assert_eq!(err, InventoryError::UnknownItem("Mystery".into()));
        assert_eq!(inv.slot(0).unwrap().amount, 1);
    }

    #[test]
    fn stale_drop_ticket_is_rejected() {
        let mut host = RecordingHost::new();
        let catalog = catalog();
        let mut inv = Inventory::with_slots(2);
        inv.add_item(&definition("Torch"), &mut host).unwrap();
        let proxy = inv.slot(0).unwrap().proxy.unwrap();

        // 同一帧两次丢最后一个：第二张票作废
        let first = inv.prepare_drop(proxy, &catalog).unwrap();
        let second = inv.prepare_drop(proxy, &catalog).unwrap();
        assert_eq!(inv.commit_drop(&first, &mut host).unwrap().remaining, 0);
        assert_eq!(
            inv.commit_drop(&second, &mut host),
            Err(InventoryError::ProxyNotFound(proxy))
        );
        assert_eq!(inv.total_amount(), 0);
    }

    #[test]
    fn drop_follows_proxy_after_move() {
        let mut host = RecordingHost::new();
        let catalog = catalog();
        let mut inv = Inventory::with_slots(3);
        inv.add_item(&definition("Torch"), &mut host).unwrap();
        inv.add_item(&definition("Torch"), &mut host).unwrap();
        let proxy = inv.slot(0).unwrap().proxy.unwrap();

        let ticket = inv.prepare_drop(proxy, &catalog).unwrap();
        inv.item_moved(proxy, Some(2), &mut host).unwrap();
        let commit = inv.commit_drop(&ticket, &mut host).unwrap();

        assert_eq!(commit, DropCommit { slot: 2, remaining: 1 });
    }
}
