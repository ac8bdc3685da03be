//! 握手模块 - 多通道同步与独热编码工具

pub mod join;
pub mod one_hot;

pub use join::StreamJoin;
pub use one_hot::OneHot;
