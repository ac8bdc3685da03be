//! 多通道 valid/ready 汇合
//!
//! 同一个操作需要同时作用于全部子表时, 只有在同一周期内所有参与通道都满足握手条件,
//! 该操作才算完成。任何一个通道未就绪, 所有通道都不传输。

/// 多通道汇合点
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamJoin;

impl StreamJoin {
    /// 一个生产者扇出到多个消费者: 生产者有效且所有消费者就绪时传输
    pub fn fan_out<I>(valid: bool, readies: I) -> bool
    where
        I: IntoIterator<Item = bool>,
    {
        valid && readies.into_iter().all(|ready| ready)
    }

    /// 多个生产者汇聚到一个消费者: 所有生产者有效且消费者就绪时传输
    pub fn fan_in<I>(valids: I, ready: bool) -> bool
    where
        I: IntoIterator<Item = bool>,
    {
        ready && Self::all_valid(valids)
    }

    /// 所有生产者同时有效
    ///
    /// 空集合视为无效, 没有参与者的汇合永远不会触发。
    pub fn all_valid<I>(valids: I) -> bool
    where
        I: IntoIterator<Item = bool>,
    {
        let mut any = false;
        for valid in valids {
            if !valid {
                return false;
            }
            any = true;
        }
        any
    }
}
