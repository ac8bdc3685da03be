//! 请求队列 - 每个请求端口一个无锁队列, 任意线程都可以提交

use crate::types::{DataWord, KeyWord};
use crossbeam::queue::SegQueue;
use std::sync::Arc;

/// 各端口待提交的请求
#[derive(Debug, Default)]
pub struct PortQueues {
    pub(crate) clean: SegQueue<()>,
    pub(crate) delete: SegQueue<KeyWord>,
    pub(crate) insert: SegQueue<(KeyWord, DataWord)>,
    pub(crate) lookup: SegQueue<KeyWord>,
}

impl PortQueues {
    /// 所有队列中尚未提交的请求数
    pub fn pending(&self) -> usize {
        self.clean.len() + self.delete.len() + self.insert.len() + self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clean.is_empty() && self.delete.is_empty() && self.insert.is_empty() && self.lookup.is_empty()
    }
}

/// 请求提交句柄
#[derive(Debug, Clone)]
pub struct Submitter {
    ports: Arc<PortQueues>,
}

impl Submitter {
    pub(crate) fn new(ports: Arc<PortQueues>) -> Self {
        Self { ports }
    }

    pub fn push_clean(&self) {
        self.ports.clean.push(());
    }

    pub fn push_delete(&self, key: KeyWord) {
        self.ports.delete.push(key);
    }

    pub fn push_insert(&self, key: KeyWord, data: DataWord) {
        self.ports.insert.push((key, data));
    }

    pub fn push_lookup(&self, key: KeyWord) {
        self.ports.lookup.push(key);
    }

    pub fn pending(&self) -> usize {
        self.ports.pending()
    }
}
