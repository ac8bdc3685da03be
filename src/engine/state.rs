//! 控制状态机 - 负责 insert/delete 的探测-评估-写入循环以及清空过程
//!
//! 纯查询不经过该状态机, 只在 `Idle` 状态下直接与子表流水执行。

use crate::types::OriginKind;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ControlState {
    #[default]
    Idle,
    Cleaning,
    Lookup,
    LookupResWaitRd,
    LookupResAck,
}

impl ControlState {
    pub fn is_idle(&self) -> bool {
        matches!(self, ControlState::Idle)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlState::Idle => "idle",
            ControlState::Cleaning => "cleaning",
            ControlState::Lookup => "lookup",
            ControlState::LookupResWaitRd => "lookupResWaitRd",
            ControlState::LookupResAck => "lookupResAck",
        }
    }
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 状态转移所需的组合信号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionInputs {
    pub lookup_not_in_progress: bool,
    pub clean_req: bool,
    pub insert_req: bool,
    pub delete_req: bool,
    /// 清空写入被所有子表接收
    pub clean_ack: bool,
    pub clean_last: bool,
    /// 探测被所有子表接收
    pub probe_ack: bool,
    /// 所有子表的结果都有效
    pub results_valid: bool,
    pub origin: OriginKind,
    /// 本轮写入已完成 (不需要写入时也为真)
    pub write_done: bool,
    pub insert_final: bool,
}

impl ControlState {
    /// 计算下一个状态
    pub fn next(self, i: &TransitionInputs) -> ControlState {
        match self {
            ControlState::Idle => {
                if i.lookup_not_in_progress && i.clean_req {
                    ControlState::Cleaning
                } else if i.lookup_not_in_progress && (i.insert_req || i.delete_req) {
                    // 每次插入或删除之前都先在所有子表中查找该键
                    ControlState::Lookup
                } else {
                    ControlState::Idle
                }
            }
            ControlState::Cleaning => {
                if i.clean_ack && i.clean_last {
                    ControlState::Idle
                } else {
                    ControlState::Cleaning
                }
            }
            ControlState::Lookup => {
                if i.probe_ack {
                    ControlState::LookupResWaitRd
                } else {
                    ControlState::Lookup
                }
            }
            ControlState::LookupResWaitRd => {
                if i.results_valid {
                    ControlState::LookupResAck
                } else {
                    ControlState::LookupResWaitRd
                }
            }
            ControlState::LookupResAck => match (i.origin, i.write_done) {
                (_, false) => ControlState::LookupResAck,
                (OriginKind::Delete, true) => ControlState::Idle,
                (OriginKind::Insert, true) if i.insert_final => ControlState::Idle,
                (OriginKind::Insert, true) => ControlState::Lookup,
                (OriginKind::Lookup, true) => {
                    debug_assert!(false, "lookup origin never enters the insert loop");
                    ControlState::Idle
                }
            },
        }
    }
}
