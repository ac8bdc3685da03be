//! 目标子表选择 - 决定下一次写入落在哪个子表
//!
//! 1. 某个子表命中该键: 原地覆盖 (插入) 或使其失效 (删除)
//! 2. 否则某个子表的槽位为空: 取下标最小的空槽
//! 3. 否则所有候选槽位都被其他键占用: 相对上一次目标循环右移一位选出被踢者,
//!    上一次目标为空时取最后一个子表

use crate::{error::CuckooError, handshake::OneHot, table::ProbeResult};

/// 一轮探测的选择结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub target: OneHot,
    /// 命中或找到空槽, 插入在本轮结束
    pub insert_final: bool,
    /// 某个子表命中
    pub found: bool,
}

/// 目标选择器, 保存跨越"评估"和"写入"两个步骤的寄存器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSelector {
    target: OneHot,
    insert_final: bool,
    found: bool,
}

impl TargetSelector {
    pub fn new(table_cnt: usize) -> Self {
        Self {
            target: OneHot::zero(table_cnt),
            insert_final: false,
            found: false,
        }
    }

    pub fn target(&self) -> OneHot {
        self.target
    }

    pub fn insert_final(&self) -> bool {
        self.insert_final
    }

    pub fn found(&self) -> bool {
        self.found
    }

    /// 根据所有子表的探测结果计算选择, 不修改寄存器
    pub fn evaluate(&self, results: &[ProbeResult]) -> Result<Selection, CuckooError> {
        let width = self.target.width();
        debug_assert_eq!(results.len(), width);

        let found = OneHot::from_bools(results.iter().map(|r| r.found), width);
        if found.count() > 1 {
            return Err(CuckooError::DuplicateKey {
                key: results[0].key,
                tables: found.set_indices(),
            });
        }

        if !found.is_zero() {
            return Ok(Selection {
                target: found,
                insert_final: true,
                found: true,
            });
        }

        if let Some(empty) = OneHot::first_set(results.iter().map(ProbeResult::is_empty), width) {
            return Ok(Selection {
                target: empty,
                insert_final: true,
                found: false,
            });
        }

        let victim = if self.target.is_zero() {
            OneHot::from_index(width - 1, width)
        } else {
            self.target.rotate_right()
        };
        Ok(Selection {
            target: victim,
            insert_final: false,
            found: false,
        })
    }

    /// 锁存选择结果
    pub fn capture(&mut self, selection: Selection) {
        debug_assert!(selection.target.is_at_most_one());
        self.target = selection.target;
        self.insert_final = selection.insert_final;
        self.found = selection.found;
    }
}
