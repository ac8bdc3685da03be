//! 清空地址迭代器 - 清空过程中依次遍历子表的每个槽位

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanAddrIterator {
    addr: usize,
    last: usize,
}

impl CleanAddrIterator {
    /// `items_per_table` 个槽位, 地址范围 `[0, items_per_table - 1]`
    pub fn new(items_per_table: usize) -> Self {
        debug_assert!(items_per_table > 0);
        Self {
            addr: 0,
            last: items_per_table.saturating_sub(1),
        }
    }

    pub fn address(&self) -> usize {
        self.addr
    }

    pub fn is_last(&self) -> bool {
        self.addr == self.last
    }

    /// 返回本周期的地址和是否为最后一个地址; 使能时前进一步, 到末尾回绕到0
    pub fn advance(&mut self, enable: bool) -> (usize, bool) {
        let current = (self.addr, self.is_last());
        if enable {
            self.addr = if current.1 { 0 } else { self.addr + 1 };
        }
        current
    }
}
