use nanny_types::DashboardEvent;
use std::sync::Arc;
use tokio::sync::broadcast;

/// 展示事件总线
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DashboardEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.sender.subscribe()
    }

    pub fn publish(
        &self,
        event: DashboardEvent,
    ) -> Result<usize, broadcast::error::SendError<DashboardEvent>> {
        self.sender.send(event)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

pub type SharedEventBus = Arc<EventBus>;
