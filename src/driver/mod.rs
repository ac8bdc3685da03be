//! 驱动模块 - 请求排队与时钟推进

pub mod engine_driver;
pub mod queues;

pub use engine_driver::{EngineDriver, SharedDriver, DEFAULT_MAX_TICKS};
pub use queues::{PortQueues, Submitter};
