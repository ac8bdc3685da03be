//! 哈希函数构造 - 按种子生成互相独立的哈希函数

use crate::types::KeyWord;
use ahash::RandomState;
use std::{
    hash::{BuildHasher, Hash, Hasher},
    sync::Arc,
};

/// 哈希算法选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    #[default]
    AHash,
    XxHash,
    Default,
}

/// 哈希函数特征
pub trait HasherFunction: Send + Sync {
    fn hash_key(&self, key: KeyWord) -> u64;
}

impl<T> HasherFunction for T
where
    T: Fn(KeyWord) -> u64 + Send + Sync,
{
    fn hash_key(&self, key: KeyWord) -> u64 {
        self(key)
    }
}

/// 第 `table` 个子表的种子
pub fn table_seed(table: usize) -> u64 {
    // 黄金分割常数, 让相邻子表的种子差异足够大
    (table as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// 构建哈希函数
pub fn build_hasher_function(algorithm: HashAlgorithm, seed: u64) -> Arc<dyn HasherFunction> {
    match algorithm {
        HashAlgorithm::AHash => {
            let state = RandomState::with_seed(seed as usize);
            Arc::new(move |key: KeyWord| {
                let mut hasher = state.build_hasher();
                key.hash(&mut hasher);
                hasher.finish()
            })
        }
        HashAlgorithm::XxHash => Arc::new(move |key: KeyWord| {
            let mut hasher = twox_hash::XxHash64::with_seed(seed);
            key.hash(&mut hasher);
            hasher.finish()
        }),
        HashAlgorithm::Default => Arc::new(move |key: KeyWord| {
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            seed.hash(&mut hasher);
            key.hash(&mut hasher);
            hasher.finish()
        }),
    }
}
