use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 传输层送达的一条消息：任意消息 ID -> 快照
///
/// 按键排序迭代，同一条消息在一次运行内的处理顺序是确定的。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct InboundMessage {
    pub snapshots: BTreeMap<String, Snapshot>,
}

impl InboundMessage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解码原始字节；任何一个快照不合法都会让整条消息失败
    pub fn decode(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }

    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn with_snapshot(mut self, key: impl Into<String>, snapshot: Snapshot) -> Self {
        self.snapshots.insert(key.into(), snapshot);
        self
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn into_snapshots(self) -> impl Iterator<Item = Snapshot> {
        self.snapshots.into_values()
    }
}
