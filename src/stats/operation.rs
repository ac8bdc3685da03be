// src/stats/operation.rs
//! 操作统计 - 跟踪引擎请求、踢出和准入等待

use crate::{stats::recorder::StatsRecorder, types::OperationType};
use std::sync::atomic::{AtomicU64, Ordering};

/// 操作统计快照
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EngineStatsSnapshot {
    pub ticks: u64,
    pub lookup_count: u64,
    pub lookup_found: u64,
    pub lookup_answered: u64,
    pub insert_count: u64,
    pub delete_count: u64,
    pub delete_hit: u64,
    pub clean_count: u64,
    pub eviction_count: u64,
    /// 单次插入最长的踢出链
    pub max_eviction_chain: u64,
    pub stall_ticks: u64,
    pub fault_count: u64,
}

impl EngineStatsSnapshot {
    /// 查询命中率
    pub fn lookup_hit_rate(&self) -> f64 {
        if self.lookup_answered == 0 {
            0.0
        } else {
            self.lookup_found as f64 / self.lookup_answered as f64
        }
    }
}

/// 原子操作统计
#[derive(Debug, Default)]
pub struct AtomicEngineStats {
    ticks: AtomicU64,
    lookup_count: AtomicU64,
    lookup_found: AtomicU64,
    lookup_answered: AtomicU64,
    insert_count: AtomicU64,
    delete_count: AtomicU64,
    delete_hit: AtomicU64,
    clean_count: AtomicU64,
    eviction_count: AtomicU64,
    max_eviction_chain: AtomicU64,
    stall_ticks: AtomicU64,
    fault_count: AtomicU64,
}

impl AtomicEngineStats {
    /// 创建新统计
    pub fn new() -> Self {
        Self::default()
    }

    fn counters(&self) -> [(&'static str, &AtomicU64); 12] {
        [
            ("ticks", &self.ticks),
            ("lookup_count", &self.lookup_count),
            ("lookup_found", &self.lookup_found),
            ("lookup_answered", &self.lookup_answered),
            ("insert_count", &self.insert_count),
            ("delete_count", &self.delete_count),
            ("delete_hit", &self.delete_hit),
            ("clean_count", &self.clean_count),
            ("eviction_count", &self.eviction_count),
            ("max_eviction_chain", &self.max_eviction_chain),
            ("stall_ticks", &self.stall_ticks),
            ("fault_count", &self.fault_count),
        ]
    }
}

impl StatsRecorder for AtomicEngineStats {
    fn record_operation(&self, op_type: OperationType) {
        let counter = match op_type {
            OperationType::Lookup => &self.lookup_count,
            OperationType::Insert => &self.insert_count,
            OperationType::Delete => &self.delete_count,
            OperationType::Clean => &self.clean_count,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn record_lookup_result(&self, found: bool) {
        self.lookup_answered.fetch_add(1, Ordering::Relaxed);
        if found {
            self.lookup_found.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_delete_result(&self, hit: bool) {
        if hit {
            self.delete_hit.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_eviction(&self, chain_len: u64) {
        self.eviction_count.fetch_add(1, Ordering::Relaxed);
        self.max_eviction_chain.fetch_max(chain_len, Ordering::Relaxed);
    }

    fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    fn record_stall(&self) {
        self.stall_ticks.fetch_add(1, Ordering::Relaxed);
    }

    fn record_fault(&self) {
        self.fault_count.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> EngineStatsSnapshot {
        EngineStatsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            lookup_count: self.lookup_count.load(Ordering::Relaxed),
            lookup_found: self.lookup_found.load(Ordering::Relaxed),
            lookup_answered: self.lookup_answered.load(Ordering::Relaxed),
            insert_count: self.insert_count.load(Ordering::Relaxed),
            delete_count: self.delete_count.load(Ordering::Relaxed),
            delete_hit: self.delete_hit.load(Ordering::Relaxed),
            clean_count: self.clean_count.load(Ordering::Relaxed),
            eviction_count: self.eviction_count.load(Ordering::Relaxed),
            max_eviction_chain: self.max_eviction_chain.load(Ordering::Relaxed),
            stall_ticks: self.stall_ticks.load(Ordering::Relaxed),
            fault_count: self.fault_count.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        for (_, counter) in self.counters() {
            counter.store(0, Ordering::Relaxed);
        }
    }

    fn export_prometheus(&self) -> String {
        let mut output = String::new();
        for (name, counter) in self.counters() {
            let kind = if name == "max_eviction_chain" { "gauge" } else { "counter" };
            output.push_str(&format!(
                "# TYPE cuckoo_engine_{name} {kind}\ncuckoo_engine_{name} {}\n",
                counter.load(Ordering::Relaxed)
            ));
        }
        output
    }
}
