//! 统计模块 - 引擎运行指标

pub mod operation;
pub mod recorder;

pub use operation::{AtomicEngineStats, EngineStatsSnapshot};
pub use recorder::{default_recorder, DisabledStatsRecorder, StatsRecorder};
