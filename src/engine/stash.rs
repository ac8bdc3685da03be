//! 暂存寄存器与命令准入
//!
//! 优先级从高到低: clean, delete, insert, lookup。低优先级请求只有在所有更高优先级
//! 请求线都无效、且控制状态机空闲时才会被接收。

use crate::types::{DataWord, KeyWord, OperationType, OriginKind, PortInputs};

/// 暂存寄存器, 保存正在处理的独占操作或尚未发往子表的查询
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stash {
    pub key: KeyWord,
    pub data: DataWord,
    pub item_valid: bool,
    pub origin: OriginKind,
}

/// 本周期胜出的请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Clean,
    Delete(KeyWord),
    Insert(KeyWord, DataWord),
    Lookup(KeyWord),
}

impl Admission {
    pub fn operation_type(&self) -> OperationType {
        match self {
            Admission::Clean => OperationType::Clean,
            Admission::Delete(_) => OperationType::Delete,
            Admission::Insert(..) => OperationType::Insert,
            Admission::Lookup(_) => OperationType::Lookup,
        }
    }
}

/// 准入门的组合输入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionGate {
    /// 控制状态机处于空闲
    pub is_idle: bool,
    /// 没有未完成的纯查询且暂存器中不是查询
    pub lookup_not_in_progress: bool,
    /// 查询计数器还有余量
    pub lookup_headroom: bool,
    /// 暂存器中的查询本周期被子表接收
    pub stash_consumed: bool,
    /// 暂存器当前保存的是查询
    pub stash_is_lookup: bool,
}

/// 各请求线的 ready 信号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Grants {
    pub clean: bool,
    pub delete: bool,
    pub insert: bool,
    pub lookup: bool,
}

impl Grants {
    /// 按优先级计算 ready
    pub fn arbitrate(inputs: &PortInputs, gate: &AdmissionGate) -> Self {
        let exclusive_ok = gate.is_idle && gate.lookup_not_in_progress;
        let clean = exclusive_ok;
        let delete = exclusive_ok && !inputs.clean;
        let insert = delete && inputs.delete.is_none();
        let lookup = gate.is_idle
            && !inputs.has_exclusive_request()
            && (!gate.stash_is_lookup || gate.stash_consumed)
            && gate.lookup_headroom;
        Self {
            clean,
            delete,
            insert,
            lookup,
        }
    }

    /// valid 与 ready 同时成立的请求, 至多一个
    pub fn winner(&self, inputs: &PortInputs) -> Option<Admission> {
        if self.clean && inputs.clean {
            return Some(Admission::Clean);
        }
        if self.delete {
            if let Some(key) = inputs.delete {
                return Some(Admission::Delete(key));
            }
        }
        if self.insert {
            if let Some((key, data)) = inputs.insert {
                return Some(Admission::Insert(key, data));
            }
        }
        if self.lookup {
            if let Some(key) = inputs.lookup {
                return Some(Admission::Lookup(key));
            }
        }
        None
    }
}

impl Stash {
    /// 空闲状态下的装载; 没有请求胜出但暂存的查询已被子表接收时复位为中性的删除来源
    pub fn load(&mut self, admission: Option<Admission>, stash_consumed: bool, key_mask: u64, data_mask: u64) {
        match admission {
            Some(Admission::Clean) => {
                self.item_valid = false;
            }
            Some(Admission::Delete(key)) => {
                self.key = key & key_mask;
                self.origin = OriginKind::Delete;
                self.item_valid = false;
            }
            Some(Admission::Insert(key, data)) => {
                self.key = key & key_mask;
                self.data = data & data_mask;
                self.origin = OriginKind::Insert;
                self.item_valid = true;
            }
            Some(Admission::Lookup(key)) => {
                self.key = key & key_mask;
                self.origin = OriginKind::Lookup;
            }
            None if stash_consumed => {
                self.origin = OriginKind::Delete;
                self.key = 0;
            }
            None => {}
        }
    }

    /// 踢出: 被换出的条目成为下一轮要插入的内容
    pub fn rearm(&mut self, key: KeyWord, data: DataWord) {
        debug_assert_eq!(self.origin, OriginKind::Insert);
        self.key = key;
        self.data = data;
        self.item_valid = true;
    }
}
