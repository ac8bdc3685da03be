//! 查询计数器 - 统计未完成的纯查询, 作为独占操作的准入门

/// 未完成纯查询计数, 取值范围 `[0, max_overlap)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupCounter {
    in_flight: usize,
    max_overlap: usize,
}

impl LookupCounter {
    pub fn new(max_overlap: usize) -> Self {
        debug_assert!(max_overlap >= 2);
        Self {
            in_flight: 0,
            max_overlap,
        }
    }

    /// 当前未完成的查询数
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// 没有未完成的查询
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }

    /// 还能再接收一个查询
    pub fn can_admit(&self) -> bool {
        self.in_flight < self.max_overlap - 1
    }

    /// 周期末更新: 同周期内接收与完成相互抵消
    pub fn update(&mut self, accepted: bool, consumed: bool) {
        match (accepted, consumed) {
            (true, false) => {
                debug_assert!(self.can_admit());
                self.in_flight += 1;
            }
            (false, true) => {
                debug_assert!(self.in_flight > 0);
                self.in_flight = self.in_flight.saturating_sub(1);
            }
            _ => {}
        }
    }
}
