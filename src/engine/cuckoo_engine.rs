//! Cuckoo哈希引擎核心实现
//!
//! 每次调用 [`CuckooEngine::tick`] 代表一个时钟周期: 先根据当前寄存器和请求线
//! 组合计算所有握手与下一状态, 再一次性更新寄存器并向各子表提交动作。

use crate::{
    engine::{
        clean::CleanAddrIterator,
        config::EngineConfig,
        counter::LookupCounter,
        selector::{Selection, TargetSelector},
        stash::{Admission, AdmissionGate, Grants, Stash},
        state::{ControlState, TransitionInputs},
    },
    error::CuckooError,
    handshake::{OneHot, StreamJoin},
    hash::{build_hasher_function, table_seed},
    stats::{default_recorder, EngineStatsSnapshot, StatsRecorder},
    table::{ProbeResult, SlotTable, SlotWrite, Table, TableCommand},
    types::{DataWord, KeyWord, LookupResponse, OriginKind, PortInputs, PortOutputs},
};
use std::{fmt, sync::Arc};

/// 长踢出链告警间隔
const EVICTION_WARN_INTERVAL: u64 = 64;

/// Cuckoo哈希引擎
///
/// 插入可能因为踢出链不收敛而永远不结束, 引擎不会把这种情况当作错误,
/// 调用方应控制负载因子, 并可通过 [`CuckooEngine::eviction_rounds`] 观测。
pub struct CuckooEngine {
    config: EngineConfig,
    tables: Vec<Box<dyn Table>>,
    state: ControlState,
    stash: Stash,
    counter: LookupCounter,
    clean_addr: CleanAddrIterator,
    selector: TargetSelector,
    // 当前插入已经历的踢出轮数
    eviction_rounds: u64,
    stats: Arc<dyn StatsRecorder>,
}

impl fmt::Debug for CuckooEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CuckooEngine")
            .field("state", &self.state)
            .field("stash", &self.stash)
            .field("lookups_in_flight", &self.counter.in_flight())
            .field("target", &self.selector.target())
            .field("eviction_rounds", &self.eviction_rounds)
            .finish()
    }
}

/// 本周期组合计算得到的写入
struct WritePlan {
    writes: Vec<Option<SlotWrite>>,
    /// 至少一个子表需要写入
    enabled: bool,
}

impl WritePlan {
    fn none(table_cnt: usize) -> Self {
        Self {
            writes: vec![None; table_cnt],
            enabled: false,
        }
    }
}

impl CuckooEngine {
    /// 按配置创建引擎, 子表使用 [`SlotTable`]
    pub fn new(config: EngineConfig) -> Result<Self, CuckooError> {
        config.validate()?;
        let tables = (0..config.table_cnt)
            .map(|i| {
                let hasher = build_hasher_function(config.hash_algorithm, table_seed(i));
                Box::new(SlotTable::new(
                    config.items_per_table(),
                    hasher,
                    config.result_queue_depth,
                )) as Box<dyn Table>
            })
            .collect();
        Self::with_tables(config, tables)
    }

    /// 使用外部提供的子表创建引擎
    pub fn with_tables(config: EngineConfig, tables: Vec<Box<dyn Table>>) -> Result<Self, CuckooError> {
        config.validate()?;
        if tables.len() != config.table_cnt {
            return Err(CuckooError::TableMismatch {
                expected: config.table_cnt,
                actual: tables.len(),
            });
        }
        if let Some(bad) = tables.iter().find(|t| t.slot_count() != config.items_per_table()) {
            return Err(CuckooError::TableMismatch {
                expected: config.items_per_table(),
                actual: bad.slot_count(),
            });
        }

        log_info!(
            "cuckoo engine: {} tables x {} slots, max lookup overlap {}",
            config.table_cnt,
            config.items_per_table(),
            config.max_lookup_overlap
        );

        Ok(Self {
            counter: LookupCounter::new(config.max_lookup_overlap),
            clean_addr: CleanAddrIterator::new(config.items_per_table()),
            selector: TargetSelector::new(config.table_cnt),
            state: ControlState::Idle,
            stash: Stash::default(),
            eviction_rounds: 0,
            stats: default_recorder(),
            tables,
            config,
        })
    }

    /// 替换统计记录器
    pub fn with_stats_recorder(mut self, stats: Arc<dyn StatsRecorder>) -> Self {
        self.stats = stats;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn stash(&self) -> &Stash {
        &self.stash
    }

    /// 未完成的纯查询数
    pub fn lookups_in_flight(&self) -> usize {
        self.counter.in_flight()
    }

    /// 最近一次选出的目标子表
    pub fn target(&self) -> OneHot {
        self.selector.target()
    }

    /// 最近一轮探测是否可以结束插入
    pub fn insert_final(&self) -> bool {
        self.selector.insert_final()
    }

    /// 当前 (或最近一次) 插入的踢出轮数
    pub fn eviction_rounds(&self) -> u64 {
        self.eviction_rounds
    }

    pub fn tables(&self) -> &[Box<dyn Table>] {
        &self.tables
    }

    pub fn stats(&self) -> EngineStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn stats_recorder(&self) -> &Arc<dyn StatsRecorder> {
        &self.stats
    }

    /// 空闲且没有任何进行中的查询
    pub fn is_quiescent(&self) -> bool {
        self.state.is_idle() && self.counter.is_idle() && self.stash.origin != OriginKind::Lookup
    }

    /// 直接读取所有子表, 不经过握手, 仅用于观测和测试
    pub fn entries(&self) -> Vec<(usize, usize, KeyWord, DataWord)> {
        self.tables
            .iter()
            .enumerate()
            .flat_map(|(t, table)| {
                (0..table.slot_count())
                    .filter_map(move |i| table.slot(i).map(|(k, d)| (t, i, k, d)))
            })
            .collect()
    }

    /// 推进一个时钟周期
    ///
    /// 唯一可能的错误是多个子表同时命中同一个键。出错的周期不接收任何请求,
    /// 只丢弃出错的这组结果: 纯查询不返回结果, 插入/删除中止并回到空闲,
    /// 之后引擎可以继续推进, 例如接收清空。
    pub fn tick(&mut self, inputs: &PortInputs) -> Result<PortOutputs, CuckooError> {
        let state = self.state;
        let is_idle = state.is_idle();
        let origin = self.stash.origin;
        let stash_is_lookup = origin == OriginKind::Lookup;
        let lookup_not_in_progress = self.counter.is_idle() && !stash_is_lookup;

        // 探测: insert/delete 在 lookup 状态, 纯查询在空闲状态
        let probe_en = state == ControlState::Lookup || (is_idle && stash_is_lookup);
        let probe_ack = StreamJoin::fan_out(probe_en, self.tables.iter().map(|t| t.probe_ready()));

        // 汇聚所有子表的结果
        let results: Option<Vec<ProbeResult>> = if StreamJoin::all_valid(
            self.tables.iter().map(|t| t.peek_result().is_some()),
        ) {
            Some(self.tables.iter().filter_map(|t| t.peek_result().cloned()).collect())
        } else {
            None
        };
        let results_valid = results.is_some();

        // 纯查询结果
        let lookup_res = match (&results, is_idle) {
            (Some(results), true) => match self.merge_lookup_result(results) {
                Ok(res) => Some(res),
                Err(err) => return Err(self.discard_faulted_results(state, err)),
            },
            _ => None,
        };
        let lookup_res_fire = lookup_res.is_some() && inputs.lookup_res_ready;

        // 评估本轮探测
        let selection: Option<Selection> = match (&results, state) {
            (Some(results), ControlState::LookupResWaitRd) => match self.selector.evaluate(results) {
                Ok(selection) => Some(selection),
                Err(err) => return Err(self.discard_faulted_results(state, err)),
            },
            _ => None,
        };

        // 写入
        let (write_plan, write_needed) = self.plan_writes(state, results.as_deref());
        let write_ack = StreamJoin::fan_out(
            write_plan.enabled,
            self.tables
                .iter()
                .zip(&write_plan.writes)
                .filter(|(_, w)| w.is_some())
                .map(|(t, _)| t.write_ready()),
        );
        let write_done = !write_needed || write_ack;
        let clean_ack = state == ControlState::Cleaning && write_ack;
        let clean_last = self.clean_addr.is_last();

        // 准入
        let gate = AdmissionGate {
            is_idle,
            lookup_not_in_progress,
            lookup_headroom: self.counter.can_admit(),
            stash_consumed: probe_ack && stash_is_lookup,
            stash_is_lookup,
        };
        let grants = Grants::arbitrate(inputs, &gate);
        let admission = grants.winner(inputs);

        let next = state.next(&TransitionInputs {
            lookup_not_in_progress,
            clean_req: inputs.clean,
            insert_req: inputs.insert.is_some(),
            delete_req: inputs.delete.is_some(),
            clean_ack,
            clean_last,
            probe_ack,
            results_valid,
            origin,
            write_done,
            insert_final: self.selector.insert_final(),
        });

        let ack_round_done = state == ControlState::LookupResAck && write_done;
        let consume_result = results_valid && (ack_round_done || lookup_res_fire);

        // 被踢出的条目
        let evicted = if ack_round_done && origin == OriginKind::Insert && !self.selector.insert_final() {
            self.evicted_entry(results.as_deref())
        } else {
            None
        };

        // ---- 寄存器更新 ----
        let probe_key = self.stash.key;
        for (table, write) in self.tables.iter_mut().zip(write_plan.writes) {
            table.commit(TableCommand {
                probe: probe_ack.then_some(probe_key),
                consume_result,
                write: if write_ack { write } else { None },
            });
        }

        let lookup_fire = matches!(admission, Some(Admission::Lookup(_)));
        self.counter.update(lookup_fire, lookup_res_fire);
        self.clean_addr.advance(clean_ack);
        if let Some(selection) = selection {
            log_debug!(
                "key {:#x}: target={:?} found={} final={}",
                probe_key,
                selection.target,
                selection.found,
                selection.insert_final
            );
            self.selector.capture(selection);
        }

        if is_idle {
            self.stash.load(
                admission,
                gate.stash_consumed,
                self.config.key_mask(),
                self.config.data_mask(),
            );
        }
        if let Some((key, data)) = evicted {
            self.eviction_rounds += 1;
            self.stats.record_eviction(self.eviction_rounds);
            log_debug!(
                "evict {:#x} -> {:#x} (round {})",
                probe_key,
                key,
                self.eviction_rounds
            );
            if self.eviction_rounds % EVICTION_WARN_INTERVAL == 0 {
                log_warn!(
                    "insert eviction chain reached {} rounds, table may be saturated",
                    self.eviction_rounds
                );
            }
            self.stash.rearm(key, data);
        }

        if ack_round_done && origin == OriginKind::Delete {
            self.stats.record_delete_result(self.selector.found());
        }
        self.record_admission(admission, inputs, is_idle);
        if lookup_res_fire {
            if let Some(res) = &lookup_res {
                self.stats.record_lookup_result(res.found);
            }
        }
        self.stats.record_tick();

        if next != state {
            log_debug!("state {} -> {}", state, next);
        }
        self.state = next;

        Ok(PortOutputs {
            clean_accepted: admission == Some(Admission::Clean),
            delete_accepted: matches!(admission, Some(Admission::Delete(_))),
            insert_accepted: matches!(admission, Some(Admission::Insert(..))),
            lookup_accepted: lookup_fire,
            lookup_res: if lookup_res_fire { lookup_res } else { None },
        })
    }

    /// 合并所有子表的结果: 命中的子表优先, 否则取子表0
    fn merge_lookup_result(&self, results: &[ProbeResult]) -> Result<LookupResponse, CuckooError> {
        let found = OneHot::from_bools(results.iter().map(|r| r.found), self.config.table_cnt);
        if found.count() > 1 {
            return Err(CuckooError::DuplicateKey {
                key: results[0].key,
                tables: found.set_indices(),
            });
        }
        let response = match found.index() {
            Some(t) => LookupResponse {
                key: results[t].key,
                found: true,
                data: Some(results[t].slot_data),
                table: Some(t),
                index: results[t].index,
            },
            None => LookupResponse {
                key: results[0].key,
                found: false,
                data: None,
                table: None,
                index: results[0].index,
            },
        };
        Ok(response)
    }

    /// 协议违例: 弹出所有子表的结果头部, 让引擎越过出错的这一轮
    fn discard_faulted_results(&mut self, state: ControlState, err: CuckooError) -> CuckooError {
        self.stats.record_fault();
        log_error!("{} (state {}), result discarded", err, state);

        for table in self.tables.iter_mut() {
            table.commit(TableCommand {
                consume_result: true,
                ..TableCommand::default()
            });
        }
        if state.is_idle() {
            self.counter.update(false, true);
        } else {
            self.state = ControlState::Idle;
            self.stash = Stash::default();
        }
        self.stats.record_tick();
        err
    }

    /// 计算本周期的写入, 返回 (写入计划, 本状态是否需要完成写入)
    fn plan_writes(&self, state: ControlState, results: Option<&[ProbeResult]>) -> (WritePlan, bool) {
        let table_cnt = self.config.table_cnt;
        match state {
            ControlState::Cleaning => {
                let write = SlotWrite::invalidate(self.clean_addr.address());
                (
                    WritePlan {
                        writes: vec![Some(write); table_cnt],
                        enabled: true,
                    },
                    true,
                )
            }
            ControlState::LookupResAck => {
                let needed = match self.stash.origin {
                    OriginKind::Insert => true,
                    // 删除只在命中时写入, 未命中时不触碰任何子表
                    OriginKind::Delete => self.selector.found(),
                    OriginKind::Lookup => false,
                };
                let results = match (needed, results) {
                    (false, _) => return (WritePlan::none(table_cnt), false),
                    // 结果暂不可见时保持在本状态, 等待结果重新有效
                    (true, None) => return (WritePlan::none(table_cnt), true),
                    (true, Some(results)) => results,
                };
                let target = self.selector.target();
                let writes: Vec<Option<SlotWrite>> = results
                    .iter()
                    .enumerate()
                    .map(|(i, res)| {
                        target.is_set(i).then(|| SlotWrite {
                            index: res.index,
                            key: self.stash.key,
                            data: self.stash.data,
                            item_valid: self.stash.item_valid,
                        })
                    })
                    .collect();
                let enabled = writes.iter().any(Option::is_some);
                (WritePlan { writes, enabled }, true)
            }
            _ => (WritePlan::none(table_cnt), false),
        }
    }

    /// 目标槽位当前的内容
    fn evicted_entry(&self, results: Option<&[ProbeResult]>) -> Option<(KeyWord, DataWord)> {
        let target = self.selector.target().index()?;
        results
            .and_then(|results| results.get(target))
            .map(|res| (res.slot_key, res.slot_data))
    }

    fn record_admission(&mut self, admission: Option<Admission>, inputs: &PortInputs, is_idle: bool) {
        let Some(admission) = admission else {
            if is_idle && inputs.has_exclusive_request() {
                self.stats.record_stall();
            }
            return;
        };
        let op_type = admission.operation_type();
        if op_type.is_exclusive() {
            log_debug!("admit {}", op_type.as_str());
            self.eviction_rounds = 0;
        }
        self.stats.record_operation(op_type);
    }
}
