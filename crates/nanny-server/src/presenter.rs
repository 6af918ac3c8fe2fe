//! 展示适配器：订阅事件总线，把渲染类事件输出为日志

use nanny_types::DashboardEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

/// 事件的单行文本描述
pub fn render(event: &DashboardEvent) -> String {
    match event {
        DashboardEvent::BufferUpdated {
            device,
            channel,
            values,
            latest,
            representation,
        } => format!(
            "{device}/{channel} = {latest:.2} ({} samples, {representation:?})",
            values.len()
        ),
        DashboardEvent::ConditionFlag {
            device,
            channel,
            in_error,
        } => {
            let state = if *in_error { "in error" } else { "ok" };
            format!("{device}/{channel} {state}")
        }
        DashboardEvent::DisconnectedFlag {
            device,
            channel,
            disconnected,
        } => {
            let state = if *disconnected { "disconnected" } else { "live" };
            format!("{device}/{channel} {state}")
        }
        DashboardEvent::ConnectivityChanged { device, connected } => {
            let state = if *connected { "connected" } else { "faulted" };
            format!("{device} {state}")
        }
        DashboardEvent::ControlChanged {
            device,
            control,
            value,
        } => format!("{device} pin {control} -> {value}"),
    }
}

/// 消费事件直到总线关闭
pub async fn run_presenter(mut events: broadcast::Receiver<DashboardEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => present(&event),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped = skipped, "Presenter lagged behind event bus");
            }
            Err(RecvError::Closed) => break,
        }
    }

    debug!("Presenter stopped");
}

fn present(event: &DashboardEvent) {
    let line = render(event);
    match event {
        DashboardEvent::ConditionFlag { in_error: true, .. } => {
            warn!(device_id = %event.device(), "{}", line)
        }
        DashboardEvent::ConnectivityChanged { .. } | DashboardEvent::ControlChanged { .. } => {
            info!(device_id = %event.device(), "{}", line)
        }
        _ => debug!(device_id = %event.device(), "{}", line),
    }
}
