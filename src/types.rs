//! 核心类型定义 - 共享类型和端口接口

use std::fmt;

/// 键字 (截断到 `key_width` 位)
pub type KeyWord = u64;

/// 数据字 (截断到 `data_width` 位)
pub type DataWord = u64;

/// 生成低 `bits` 位全为1的掩码
pub const fn width_mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// 暂存寄存器中操作的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OriginKind {
    /// 插入 (包括踢出链中被换出的条目)
    Insert,
    /// 纯查询
    Lookup,
    /// 删除; 复位值, 不会触发任何重新插入
    #[default]
    Delete,
}

impl OriginKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OriginKind::Insert => "insert",
            OriginKind::Lookup => "lookup",
            OriginKind::Delete => "delete",
        }
    }
}

impl fmt::Display for OriginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    /// 查询操作
    Lookup,
    /// 插入操作
    Insert,
    /// 删除操作
    Delete,
    /// 清空操作
    Clean,
}

impl OperationType {
    /// 判断是否为独占操作 (需要等待所有查询完成)
    pub fn is_exclusive(&self) -> bool {
        matches!(
            self,
            OperationType::Insert | OperationType::Delete | OperationType::Clean
        )
    }

    /// 转换为字符串表示
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Lookup => "lookup",
            OperationType::Insert => "insert",
            OperationType::Delete => "delete",
            OperationType::Clean => "clean",
        }
    }
}

/// 一个周期内外部请求线的状态
///
/// `Some`/`true` 表示请求有效 (vld)，请求在被接收之前应保持有效。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortInputs {
    pub clean: bool,
    pub delete: Option<KeyWord>,
    pub insert: Option<(KeyWord, DataWord)>,
    pub lookup: Option<KeyWord>,
    /// 调用方是否准备好接收查询结果 (lookupRes.rd)
    pub lookup_res_ready: bool,
}

impl PortInputs {
    /// 仅接收结果, 不发起请求
    pub fn idle() -> Self {
        Self {
            lookup_res_ready: true,
            ..Self::default()
        }
    }

    /// 是否有独占请求 (clean/delete/insert) 有效
    pub fn has_exclusive_request(&self) -> bool {
        self.clean || self.delete.is_some() || self.insert.is_some()
    }
}

/// 一个周期内完成的握手
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortOutputs {
    pub clean_accepted: bool,
    pub delete_accepted: bool,
    pub insert_accepted: bool,
    pub lookup_accepted: bool,
    /// 本周期完成传输的查询结果
    pub lookup_res: Option<LookupResponse>,
}

impl PortOutputs {
    /// 本周期是否接收了任何请求
    pub fn any_accepted(&self) -> bool {
        self.clean_accepted || self.delete_accepted || self.insert_accepted || self.lookup_accepted
    }
}

/// 纯查询结果, 按接收顺序输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResponse {
    pub key: KeyWord,
    pub found: bool,
    /// 命中时的数据
    pub data: Option<DataWord>,
    /// 命中的子表
    pub table: Option<usize>,
    /// 命中子表 (未命中时为子表0) 中被探测的槽位
    pub index: usize,
}
