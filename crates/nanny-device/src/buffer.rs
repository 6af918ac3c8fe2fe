use std::collections::VecDeque;
use std::num::NonZeroUsize;

/// 缓冲区初始化时的填充值
pub const INITIAL_SAMPLE: f64 = 1.0;

/// 设备故障时写入的哨兵值，表示"没有有效读数"
pub const FAULT_SAMPLE: f64 = -0.5;

/// 单个通道的定长滚动历史
///
/// 创建时用 [`INITIAL_SAMPLE`] 填满，之后每次写入追加一个新值并淘汰最旧的值，
/// 长度始终等于容量。
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelBuffer {
    capacity: NonZeroUsize,
    values: VecDeque<f64>,
}

impl ChannelBuffer {
    pub fn new(capacity: NonZeroUsize) -> Self {
        let values = std::iter::repeat(INITIAL_SAMPLE)
            .take(capacity.get())
            .collect();
        Self { capacity, values }
    }

    /// 追加到尾部并淘汰头部
    pub fn push(&mut self, value: f64) {
        self.values.pop_front();
        self.values.push_back(value);
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 最新的值
    pub fn latest(&self) -> f64 {
        self.values.back().copied().unwrap_or(INITIAL_SAMPLE)
    }

    /// 从旧到新迭代
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }
}
