//! 引擎配置 - 构造时确定, 运行期不可修改

use crate::{
    error::CuckooError,
    handshake::OneHot,
    hash::HashAlgorithm,
    types::width_mask,
};

/// 引擎配置
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// 总槽位数 (TABLE_SIZE)
    pub table_size: usize,
    /// 子表数量 (TABLE_CNT), 必须整除 `table_size`
    pub table_cnt: usize,
    /// 键位宽
    pub key_width: u32,
    /// 数据位宽, 0 表示只存键
    pub data_width: u32,
    /// 纯查询最大重叠数, 同时未完成的查询最多为 `max_lookup_overlap - 1`
    pub max_lookup_overlap: usize,
    pub hash_algorithm: HashAlgorithm,
    /// 每个子表结果队列的深度
    pub result_queue_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            table_size: 32,
            table_cnt: 2,
            key_width: 8,
            data_width: 32,
            max_lookup_overlap: 16,
            hash_algorithm: HashAlgorithm::AHash,
            result_queue_depth: 16,
        }
    }
}

impl EngineConfig {
    /// 以总容量和子表数创建, 其余参数取默认值
    pub fn new(table_size: usize, table_cnt: usize) -> Self {
        Self {
            table_size,
            table_cnt,
            ..Self::default()
        }
    }

    pub fn with_widths(mut self, key_width: u32, data_width: u32) -> Self {
        self.key_width = key_width;
        self.data_width = data_width;
        self
    }

    pub fn with_max_lookup_overlap(mut self, overlap: usize) -> Self {
        self.max_lookup_overlap = overlap;
        self
    }

    pub fn with_hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = algorithm;
        self
    }

    pub fn with_result_queue_depth(mut self, depth: usize) -> Self {
        self.result_queue_depth = depth;
        self
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), CuckooError> {
        if self.table_cnt == 0 {
            return Err(CuckooError::invalid_config("TABLE_CNT 必须大于0"));
        }
        if self.table_cnt > OneHot::MAX_WIDTH {
            return Err(CuckooError::invalid_config(format!(
                "TABLE_CNT 最大为 {}, 实际 {}",
                OneHot::MAX_WIDTH,
                self.table_cnt
            )));
        }
        if self.table_size == 0 {
            return Err(CuckooError::invalid_config("TABLE_SIZE 必须大于0"));
        }
        if self.table_size % self.table_cnt != 0 {
            return Err(CuckooError::invalid_config(format!(
                "TABLE_SIZE ({}) 不能被 TABLE_CNT ({}) 整除",
                self.table_size, self.table_cnt
            )));
        }
        if self.key_width == 0 || self.key_width > 64 {
            return Err(CuckooError::invalid_config(format!(
                "KEY_WIDTH 必须在 1..=64 之间, 实际 {}",
                self.key_width
            )));
        }
        if self.data_width > 64 {
            return Err(CuckooError::invalid_config(format!(
                "DATA_WIDTH 不能超过 64, 实际 {}",
                self.data_width
            )));
        }
        if self.max_lookup_overlap < 2 {
            return Err(CuckooError::invalid_config(
                "MAX_LOOKUP_OVERLAP 至少为 2, 否则任何查询都无法被接收",
            ));
        }
        if self.result_queue_depth == 0 {
            return Err(CuckooError::invalid_config("结果队列深度必须大于0"));
        }
        Ok(())
    }

    /// 每个子表的槽位数
    pub fn items_per_table(&self) -> usize {
        self.table_size / self.table_cnt
    }

    /// 槽位下标位宽
    pub fn hash_width(&self) -> u32 {
        let items = self.items_per_table();
        if items <= 1 {
            0
        } else {
            usize::BITS - (items - 1).leading_zeros()
        }
    }

    pub fn key_mask(&self) -> u64 {
        width_mask(self.key_width)
    }

    pub fn data_mask(&self) -> u64 {
        width_mask(self.data_width)
    }
}
