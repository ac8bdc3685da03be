// src/stats/recorder.rs
//! 统计记录器接口 - 定义统一统计API

use std::sync::Arc;

use crate::{stats::operation::{AtomicEngineStats, EngineStatsSnapshot}, types::OperationType};

/// 统计记录器特征
pub trait StatsRecorder: Send + Sync {
    /// 记录被接收的请求
    fn record_operation(&self, op_type: OperationType);

    /// 记录送出的查询结果
    fn record_lookup_result(&self, found: bool);

    /// 记录删除结果
    fn record_delete_result(&self, hit: bool);

    /// 记录一次踢出, `chain_len` 为本次插入到目前为止的踢出轮数
    fn record_eviction(&self, chain_len: u64);

    /// 记录一个时钟周期
    fn record_tick(&self);

    /// 记录独占请求因查询未完成而等待的周期
    fn record_stall(&self);

    /// 记录协议违例
    fn record_fault(&self);

    /// 获取统计快照
    fn snapshot(&self) -> EngineStatsSnapshot;

    /// 重置所有统计
    fn reset(&self);

    /// 导出Prometheus格式指标
    fn export_prometheus(&self) -> String;
}

/// 禁用的统计记录器
#[derive(Debug, Default)]
pub struct DisabledStatsRecorder;

impl StatsRecorder for DisabledStatsRecorder {
    fn record_operation(&self, _op_type: OperationType) {}
    fn record_lookup_result(&self, _found: bool) {}
    fn record_delete_result(&self, _hit: bool) {}
    fn record_eviction(&self, _chain_len: u64) {}
    fn record_tick(&self) {}
    fn record_stall(&self) {}
    fn record_fault(&self) {}

    fn snapshot(&self) -> EngineStatsSnapshot {
        EngineStatsSnapshot::default()
    }

    fn reset(&self) {}

    fn export_prometheus(&self) -> String {
        String::new()
    }
}

/// 默认统计记录器
pub fn default_recorder() -> Arc<dyn StatsRecorder> {
    Arc::new(AtomicEngineStats::new())
}
