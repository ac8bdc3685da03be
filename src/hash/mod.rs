//! 哈希模块 - 为每个子表提供独立的哈希函数

pub mod strategy;

pub use strategy::{build_hasher_function, table_seed, HashAlgorithm, HasherFunction};

/// 哈希值映射到槽位下标
pub fn calculate_index(hash: u64, slots: usize) -> usize {
    (hash % slots as u64) as usize
}
