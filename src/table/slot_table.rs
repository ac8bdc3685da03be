// src/table/slot_table.rs
//! 槽位子表 - 带有效位的槽数组, 单一哈希函数, 有界结果队列

use crate::{
    hash::{calculate_index, HasherFunction},
    table::{ProbeResult, SlotWrite, Table, TableCommand},
    types::{DataWord, KeyWord},
};
use std::{collections::VecDeque, fmt, sync::Arc};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Slot {
    key: KeyWord,
    data: DataWord,
    valid: bool,
}

pub struct SlotTable {
    slots: Vec<Slot>,
    hasher: Arc<dyn HasherFunction>,
    results: VecDeque<ProbeResult>,
    result_depth: usize,
}

impl fmt::Debug for SlotTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotTable")
            .field("slots", &self.slots.len())
            .field("occupied", &self.occupied())
            .field("pending_results", &self.results.len())
            .finish()
    }
}

impl SlotTable {
    /// 创建新子表, `result_depth` 为结果队列容量
    pub fn new(slot_count: usize, hasher: Arc<dyn HasherFunction>, result_depth: usize) -> Self {
        Self {
            slots: vec![Slot::default(); slot_count],
            hasher,
            results: VecDeque::with_capacity(result_depth),
            result_depth: result_depth.max(1),
        }
    }

    /// 键对应的槽位
    pub fn index_of(&self, key: KeyWord) -> usize {
        calculate_index(self.hasher.hash_key(key), self.slots.len())
    }

    /// 有效条目数
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.valid).count()
    }

    /// 尚未被消费的结果数
    pub fn pending_results(&self) -> usize {
        self.results.len()
    }

    fn probe(&self, key: KeyWord) -> ProbeResult {
        let index = self.index_of(key);
        let slot = self.slots[index];
        ProbeResult {
            key,
            index,
            found: slot.valid && slot.key == key,
            occupied: slot.valid,
            slot_key: slot.key,
            slot_data: slot.data,
        }
    }

    fn write(&mut self, write: SlotWrite) {
        if let Some(slot) = self.slots.get_mut(write.index) {
            *slot = Slot {
                key: write.key,
                data: write.data,
                valid: write.item_valid,
            };
        } else {
            log_error!("slot write out of range: index={} slots={}", write.index, self.slots.len());
        }
    }
}

impl Table for SlotTable {
    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn probe_ready(&self) -> bool {
        self.results.len() < self.result_depth
    }

    fn write_ready(&self) -> bool {
        true
    }

    fn peek_result(&self) -> Option<&ProbeResult> {
        self.results.front()
    }

    fn commit(&mut self, cmd: TableCommand) {
        if cmd.consume_result {
            self.results.pop_front();
        }
        if let Some(write) = cmd.write {
            self.write(write);
        }
        if let Some(key) = cmd.probe {
            debug_assert!(self.results.len() < self.result_depth);
            let result = self.probe(key);
            self.results.push_back(result);
        }
    }

    fn slot(&self, index: usize) -> Option<(KeyWord, DataWord)> {
        self.slots
            .get(index)
            .filter(|slot| slot.valid)
            .map(|slot| (slot.key, slot.data))
    }
}
