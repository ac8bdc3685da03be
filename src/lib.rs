//! 周期驱动的Cuckoo哈希表引擎
//!
//! 固定容量, 由 `TABLE_CNT` 个独立子表组成, 每个子表使用独立的哈希函数。
//! 支持查询、插入 (带踢出链)、删除和整表清空, 所有组件在同一个时钟节拍下同步推进。
//!
//! ## 主要特性
//! - 纯查询直接与子表流水执行, 最多 `MAX_LOOKUP_OVERLAP - 1` 个同时在途
//! - 插入/删除/清空为独占操作, 只有在没有在途查询时才会被接收
//! - 请求优先级: clean > delete > insert > lookup
//! - 插入的踢出链没有轮数上限, 通过统计和 [`CuckooEngine::eviction_rounds`] 观测
//!
//! ## 快速开始
//!
//! ```rust
//! use cuckoo_engine::*;
//!
//! fn main() -> Result<(), CuckooError> {
//!     let engine = CuckooEngine::new(EngineConfig::new(32, 2))?;
//!     let mut driver = EngineDriver::new(engine);
//!
//!     driver.insert(0x12, 0xABCD, DEFAULT_MAX_TICKS)?;
//!     let res = driver.lookup(0x12, DEFAULT_MAX_TICKS)?;
//!     assert_eq!(res.data, Some(0xABCD));
//!
//!     driver.delete(0x12, DEFAULT_MAX_TICKS)?;
//!     assert!(!driver.lookup(0x12, DEFAULT_MAX_TICKS)?.found);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        log::info!($($arg)*)
    };
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}

#[cfg(feature = "logging")]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        log::error!($($arg)*)
    };
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "logging"))]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {};
}
// 核心模块导出
pub mod driver;
pub mod engine;
pub mod error;
pub mod handshake;
pub mod hash;
pub mod stats;
pub mod table;
pub mod types;

// 公共接口导出
pub use crate::{
    driver::{EngineDriver, SharedDriver, Submitter, DEFAULT_MAX_TICKS},
    engine::{
        CleanAddrIterator,
        ControlState,
        CuckooEngine,
        EngineConfig,
        LookupCounter,
        Stash,
        TargetSelector,
        DEFAULT_CONFIG,
    },
    error::CuckooError,
    handshake::{OneHot, StreamJoin},
    hash::{HashAlgorithm, HasherFunction},
    stats::{AtomicEngineStats, DisabledStatsRecorder, EngineStatsSnapshot, StatsRecorder},
    table::{ProbeResult, SlotTable, SlotWrite, Table, TableCommand},
    types::{DataWord, KeyWord, LookupResponse, OperationType, OriginKind, PortInputs, PortOutputs},
};

/// 使用默认配置创建引擎
pub fn default_engine() -> CuckooEngine {
    match CuckooEngine::new(DEFAULT_CONFIG.clone()) {
        Ok(engine) => engine,
        Err(err) => unreachable!("default config rejected: {err}"),
    }
}
