//! 子表接口 - 引擎与单个子表之间的固定契约
//!
//! 每个周期引擎先读取各子表的就绪信号和结果队列头部, 计算完成后通过
//! [`Table::commit`] 一次性提交本周期的探测、结果消费和写入。

pub mod slot_table;

pub use slot_table::SlotTable;

use crate::types::{DataWord, KeyWord};

/// 一次探测的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// 被探测的键
    pub key: KeyWord,
    /// 该键在本子表中对应的槽位
    pub index: usize,
    /// 槽位中存放的正是该键
    pub found: bool,
    /// 槽位中存放着某个有效条目 (不一定是该键)
    pub occupied: bool,
    /// 槽位当前内容, 踢出时会被换入暂存寄存器
    pub slot_key: KeyWord,
    pub slot_data: DataWord,
}

impl ProbeResult {
    /// 槽位为空
    pub fn is_empty(&self) -> bool {
        !self.occupied
    }
}

/// 对单个槽位的写入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotWrite {
    pub index: usize,
    pub key: KeyWord,
    pub data: DataWord,
    /// 为 false 时使槽位失效
    pub item_valid: bool,
}

impl SlotWrite {
    /// 使槽位失效
    pub fn invalidate(index: usize) -> Self {
        Self {
            index,
            key: 0,
            data: 0,
            item_valid: false,
        }
    }
}

/// 一个周期内提交给子表的动作
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableCommand {
    /// 被接收的探测键
    pub probe: Option<KeyWord>,
    /// 弹出结果队列头部
    pub consume_result: bool,
    pub write: Option<SlotWrite>,
}

/// 子表契约
///
/// 写入总是在同一次提交的探测之前生效; 探测结果在下一个周期可见。
pub trait Table: Send {
    /// 槽位数量
    fn slot_count(&self) -> usize;

    /// 本周期能否接收探测
    fn probe_ready(&self) -> bool;

    /// 本周期能否接收写入
    fn write_ready(&self) -> bool;

    /// 结果队列头部 (valid)
    fn peek_result(&self) -> Option<&ProbeResult>;

    /// 周期末寄存器更新
    fn commit(&mut self, cmd: TableCommand);

    /// 读取槽位当前内容, 仅用于观测和测试
    fn slot(&self, index: usize) -> Option<(KeyWord, DataWord)>;
}
