//! 引擎模块 - 控制状态机、暂存寄存器、准入与目标选择

pub mod clean;
pub mod config;
pub mod cuckoo_engine;
pub mod counter;
pub mod selector;
pub mod stash;
pub mod state;

pub use cuckoo_engine::CuckooEngine;
pub use clean::CleanAddrIterator;
pub use config::EngineConfig;
pub use counter::LookupCounter;
pub use selector::{Selection, TargetSelector};
pub use stash::{Admission, AdmissionGate, Grants, Stash};
pub use state::{ControlState, TransitionInputs};

use once_cell::sync::Lazy;

/// 全局默认配置
pub static DEFAULT_CONFIG: Lazy<EngineConfig> = Lazy::new(EngineConfig::default);
