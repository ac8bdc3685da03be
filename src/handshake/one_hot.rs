//! 独热编码 - 表示"哪一个子表"

use std::fmt;

/// 宽度为 `width` 的位向量, 正常情况下至多一位为1
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct OneHot {
    bits: u64,
    width: usize,
}

impl OneHot {
    /// 最大宽度
    pub const MAX_WIDTH: usize = 64;

    /// 全零向量
    pub fn zero(width: usize) -> Self {
        debug_assert!(width > 0 && width <= Self::MAX_WIDTH);
        Self { bits: 0, width }
    }

    /// 仅第 `index` 位为1
    pub fn from_index(index: usize, width: usize) -> Self {
        debug_assert!(index < width);
        Self {
            bits: 1u64 << index,
            width,
        }
    }

    /// 按位组装, 第 i 个元素对应第 i 位
    pub fn from_bools<I>(flags: I, width: usize) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let bits = flags
            .into_iter()
            .take(width)
            .enumerate()
            .fold(0u64, |acc, (i, flag)| acc | ((flag as u64) << i));
        Self { bits, width }
    }

    /// 取第一个为真的位置编码为独热向量, 全部为假时返回 `None`
    pub fn first_set<I>(flags: I, width: usize) -> Option<Self>
    where
        I: IntoIterator<Item = bool>,
    {
        flags
            .into_iter()
            .take(width)
            .position(|flag| flag)
            .map(|i| Self::from_index(i, width))
    }

    /// 循环右移一位: 第 i 位移到第 i-1 位, 第0位移到最高位
    pub fn rotate_right(self) -> Self {
        let low = self.bits & 1;
        let bits = (self.bits >> 1) | (low << (self.width - 1));
        Self {
            bits: bits & self.mask(),
            width: self.width,
        }
    }

    fn mask(&self) -> u64 {
        crate::types::width_mask(self.width as u32)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    pub fn is_zero(&self) -> bool {
        self.bits == 0
    }

    pub fn is_set(&self, index: usize) -> bool {
        index < self.width && self.bits & (1u64 << index) != 0
    }

    pub fn count(&self) -> u32 {
        self.bits.count_ones()
    }

    /// 至多一位为1
    pub fn is_at_most_one(&self) -> bool {
        self.count() <= 1
    }

    /// 唯一置位的下标; 全零或多位置位时返回 `None`
    pub fn index(&self) -> Option<usize> {
        if self.count() == 1 {
            Some(self.bits.trailing_zeros() as usize)
        } else {
            None
        }
    }

    /// 所有置位的下标
    pub fn set_indices(&self) -> Vec<usize> {
        (0..self.width).filter(|&i| self.is_set(i)).collect()
    }
}

impl fmt::Debug for OneHot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OneHot(0b{:0width$b})", self.bits, width = self.width)
    }
}
