//! 统一错误处理 - 构造期配置错误、协议违例与驱动超时

/// Cuckoo哈希引擎可能发生的错误
///
/// 稳态运行时引擎不会返回错误；插入的踢出链可能无限循环，这属于调用方需要控制的负载问题，
/// 只能通过 [`crate::CuckooEngine::eviction_rounds`] 等观测接口看到。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CuckooError {
    #[error("无效配置: {reason}")]
    InvalidConfig {
        reason: String,
    },

    #[error("子表数量或容量与配置不符 (期望: {expected}, 实际: {actual})")]
    TableMismatch {
        expected: usize,
        actual: usize,
    },

    #[error("键 {key:#x} 同时存在于多个子表: {tables:?}")]
    DuplicateKey {
        key: u64,
        tables: Vec<usize>,
    },

    #[error("操作超时: {operation} (已运行 {ticks} 个周期)")]
    Timeout {
        operation: String,
        ticks: usize,
    },
}

impl CuckooError {
    /// 构造配置错误
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// 获取错误恢复建议
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidConfig { .. } => Some("检查配置参数, TABLE_SIZE 必须能被 TABLE_CNT 整除"),
            Self::TableMismatch { .. } => Some("按配置提供 TABLE_CNT 个容量为 TABLE_SIZE/TABLE_CNT 的子表"),
            Self::DuplicateKey { .. } => Some("出错的操作已被丢弃, 提交清空以恢复子表一致性"),
            Self::Timeout { .. } => Some("降低负载因子或增加周期上限"),
        }
    }

    /// 判断错误是否可恢复
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// 是否为构造期错误
    pub fn is_construction_error(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. } | Self::TableMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = CuckooError::invalid_config("bad");
        assert!(err.is_construction_error());
        assert!(!err.is_recoverable());
        assert!(err.recovery_suggestion().is_some());

        let timeout = CuckooError::Timeout {
            operation: "insert".into(),
            ticks: 10,
        };
        assert!(timeout.is_recoverable());
        assert!(!timeout.is_construction_error());
    }

    #[test]
    fn test_duplicate_key_message() {
        let err = CuckooError::DuplicateKey {
            key: 0x2a,
            tables: vec![0, 1],
        };
        let msg = err.to_string();
        assert!(msg.contains("0x2a"));
        assert!(msg.contains("[0, 1]"));
    }
}
