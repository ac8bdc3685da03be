//! 引擎驱动 - 把排队的请求保持在请求线上直到被接收, 并收集查询结果

use crate::{
    driver::queues::{PortQueues, Submitter},
    engine::CuckooEngine,
    error::CuckooError,
    types::{DataWord, KeyWord, LookupResponse, PortInputs, PortOutputs},
};
use parking_lot::Mutex;
use std::{collections::VecDeque, sync::Arc};

/// 便捷方法默认的周期上限
pub const DEFAULT_MAX_TICKS: usize = 10_000;

pub struct EngineDriver {
    engine: CuckooEngine,
    ports: Arc<PortQueues>,
    // 当前保持有效的请求线
    lines: PortInputs,
    responses: VecDeque<LookupResponse>,
    ticks: usize,
}

impl EngineDriver {
    pub fn new(engine: CuckooEngine) -> Self {
        Self {
            engine,
            ports: Arc::new(PortQueues::default()),
            lines: PortInputs::idle(),
            responses: VecDeque::new(),
            ticks: 0,
        }
    }

    pub fn submitter(&self) -> Submitter {
        Submitter::new(self.ports.clone())
    }

    pub fn engine(&self) -> &CuckooEngine {
        &self.engine
    }

    pub fn into_engine(self) -> CuckooEngine {
        self.engine
    }

    /// 已推进的周期数
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// 是否接收查询结果; 关闭后结果在子表中积压, 形成反压
    pub fn set_lookup_res_ready(&mut self, ready: bool) {
        self.lines.lookup_res_ready = ready;
    }

    fn refill_lines(&mut self) {
        if !self.lines.clean && self.ports.clean.pop().is_some() {
            self.lines.clean = true;
        }
        if self.lines.delete.is_none() {
            self.lines.delete = self.ports.delete.pop();
        }
        if self.lines.insert.is_none() {
            self.lines.insert = self.ports.insert.pop();
        }
        if self.lines.lookup.is_none() {
            self.lines.lookup = self.ports.lookup.pop();
        }
    }

    /// 推进一个周期
    pub fn step(&mut self) -> Result<PortOutputs, CuckooError> {
        self.refill_lines();
        let out = self.engine.tick(&self.lines)?;
        self.ticks += 1;

        if out.clean_accepted {
            self.lines.clean = false;
        }
        if out.delete_accepted {
            self.lines.delete = None;
        }
        if out.insert_accepted {
            self.lines.insert = None;
        }
        if out.lookup_accepted {
            self.lines.lookup = None;
        }
        if let Some(res) = &out.lookup_res {
            self.responses.push_back(res.clone());
        }
        Ok(out)
    }

    /// 所有请求都已提交且引擎空闲
    pub fn is_quiescent(&self) -> bool {
        !self.lines.has_exclusive_request()
            && self.lines.lookup.is_none()
            && self.ports.is_empty()
            && self.engine.is_quiescent()
    }

    /// 推进直到静止, 返回本次推进的周期数
    pub fn run_until_quiescent(&mut self, max_ticks: usize) -> Result<usize, CuckooError> {
        let mut ticks = 0;
        while !self.is_quiescent() {
            if ticks >= max_ticks {
                log_warn!(
                    "driver timeout after {} ticks, engine state {}",
                    ticks,
                    self.engine.state()
                );
                return Err(CuckooError::Timeout {
                    operation: "run_until_quiescent".into(),
                    ticks,
                });
            }
            self.step()?;
            ticks += 1;
        }
        Ok(ticks)
    }

    /// 取出所有已送达的查询结果, 按接收顺序
    pub fn take_responses(&mut self) -> Vec<LookupResponse> {
        self.responses.drain(..).collect()
    }

    pub fn insert(&mut self, key: KeyWord, data: DataWord, max_ticks: usize) -> Result<(), CuckooError> {
        self.ports.insert.push((key, data));
        self.run_until_quiescent(max_ticks).map(|_| ()).map_err(|err| rename_timeout(err, "insert"))
    }

    pub fn delete(&mut self, key: KeyWord, max_ticks: usize) -> Result<(), CuckooError> {
        self.ports.delete.push(key);
        self.run_until_quiescent(max_ticks).map(|_| ()).map_err(|err| rename_timeout(err, "delete"))
    }

    pub fn clean(&mut self, max_ticks: usize) -> Result<(), CuckooError> {
        self.ports.clean.push(());
        self.run_until_quiescent(max_ticks).map(|_| ()).map_err(|err| rename_timeout(err, "clean"))
    }

    /// 提交一次查询并返回其结果
    pub fn lookup(&mut self, key: KeyWord, max_ticks: usize) -> Result<LookupResponse, CuckooError> {
        let before = self.responses.len();
        self.ports.lookup.push(key);
        self.run_until_quiescent(max_ticks)
            .map_err(|err| rename_timeout(err, "lookup"))?;
        let masked = key & self.engine.config().key_mask();
        let position = self
            .responses
            .iter()
            .skip(before)
            .rposition(|res| res.key == masked)
            .map(|offset| before + offset);
        match position.and_then(|pos| self.responses.remove(pos)) {
            Some(res) => Ok(res),
            None => Err(CuckooError::Timeout {
                operation: "lookup".into(),
                ticks: max_ticks,
            }),
        }
    }
}

fn rename_timeout(err: CuckooError, operation: &str) -> CuckooError {
    match err {
        CuckooError::Timeout { ticks, .. } => CuckooError::Timeout {
            operation: operation.into(),
            ticks,
        },
        other => other,
    }
}

/// 多线程共享的驱动, 一个线程推进时钟, 其他线程提交请求或观测
#[derive(Clone)]
pub struct SharedDriver {
    inner: Arc<Mutex<EngineDriver>>,
    submitter: Submitter,
}

impl SharedDriver {
    pub fn new(driver: EngineDriver) -> Self {
        let submitter = driver.submitter();
        Self {
            inner: Arc::new(Mutex::new(driver)),
            submitter,
        }
    }

    /// 提交请求不需要持有锁
    pub fn submitter(&self) -> Submitter {
        self.submitter.clone()
    }

    pub fn step(&self) -> Result<PortOutputs, CuckooError> {
        self.inner.lock().step()
    }

    pub fn run_until_quiescent(&self, max_ticks: usize) -> Result<usize, CuckooError> {
        self.inner.lock().run_until_quiescent(max_ticks)
    }

    pub fn is_quiescent(&self) -> bool {
        self.inner.lock().is_quiescent()
    }

    pub fn take_responses(&self) -> Vec<LookupResponse> {
        self.inner.lock().take_responses()
    }

    pub fn with_engine<R>(&self, f: impl FnOnce(&CuckooEngine) -> R) -> R {
        f(self.inner.lock().engine())
    }
}
