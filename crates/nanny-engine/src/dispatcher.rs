use crate::engine::{ApplyReport, UpdateEngine};
use crate::error::{EngineError, Result};
use crate::metrics;
use nanny_types::InboundMessage;
use tracing::{debug, warn};

/// 单条消息的处理汇总
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchSummary {
    pub reports: Vec<ApplyReport>,
    pub unknown_devices: Vec<String>,
}

impl DispatchSummary {
    pub fn applied(&self) -> usize {
        self.reports.len()
    }

    pub fn skipped(&self) -> usize {
        self.unknown_devices.len()
    }
}

/// 消息分发器：解码传输层消息，把其中每个快照交给更新引擎
pub struct MessageDispatcher {
    engine: UpdateEngine,
}

impl MessageDispatcher {
    pub fn new(engine: UpdateEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &UpdateEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut UpdateEngine {
        &mut self.engine
    }

    /// 处理一条原始消息
    ///
    /// 解码失败时整条消息丢弃，不做部分处理；未知设备的快照跳过，其余照常应用。
    pub async fn on_message(&mut self, raw: &[u8]) -> Result<DispatchSummary> {
        metrics::record_message_received();

        let message = match InboundMessage::decode(raw) {
            Ok(message) => message,
            Err(e) => {
                metrics::record_message_malformed();
                warn!(error = %e, bytes = raw.len(), "Malformed message dropped");
                return Err(EngineError::MalformedMessage(e));
            }
        };

        debug!(snapshots = message.len(), "Dispatching message");

        let mut summary = DispatchSummary::default();
        for snapshot in message.into_snapshots() {
            match self.engine.apply(&snapshot).await {
                Ok(report) => summary.reports.push(report),
                Err(EngineError::UnknownDevice(device_id)) => {
                    summary.unknown_devices.push(device_id)
                }
                Err(e) => {
                    warn!(device_id = %snapshot.user, error = %e, "Snapshot not applied");
                }
            }
        }

        Ok(summary)
    }
}
