//! 引擎 actor
//!
//! 一个 tokio 任务独占 `MessageDispatcher`（以及其中的设备注册表），按到达顺序逐个处理请求。
//! 其他任务只能通过 `EngineHandle` 与它交互。

use nanny_device::DeviceState;
use nanny_engine::{DispatchSummary, EngineError, MessageDispatcher};
use nanny_types::Pin;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const REQUEST_QUEUE_CAPACITY: usize = 1024;

#[derive(Debug, Error)]
pub enum HandleError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Engine task stopped")]
    Stopped,
}

type Reply<T> = oneshot::Sender<Result<T, EngineError>>;

/// 发给引擎 actor 的请求
pub enum EngineRequest {
    Telemetry {
        raw: Vec<u8>,
        reply: Reply<DispatchSummary>,
    },
    Manual {
        device: String,
        pin: Pin,
        value: f64,
        reply: Reply<()>,
    },
    Toggle {
        device: String,
        pin: Pin,
        reply: Reply<f64>,
    },
    Inspect {
        reply: oneshot::Sender<Vec<DeviceState>>,
    },
}

/// 引擎 actor 的句柄
#[derive(Clone)]
pub struct EngineHandle {
    sender: mpsc::Sender<EngineRequest>,
}

impl EngineHandle {
    /// 提交一条遥测消息并等待处理结果
    pub async fn telemetry(&self, raw: Vec<u8>) -> Result<DispatchSummary, HandleError> {
        self.request(|reply| EngineRequest::Telemetry { raw, reply })
            .await?
            .map_err(HandleError::from)
    }

    pub async fn manual(&self, device: &str, pin: Pin, value: f64) -> Result<(), HandleError> {
        self.request(|reply| EngineRequest::Manual {
            device: device.to_string(),
            pin,
            value,
            reply,
        })
        .await?
        .map_err(HandleError::from)
    }

    pub async fn toggle(&self, device: &str, pin: Pin) -> Result<f64, HandleError> {
        self.request(|reply| EngineRequest::Toggle {
            device: device.to_string(),
            pin,
            reply,
        })
        .await?
        .map_err(HandleError::from)
    }

    /// 所有设备的当前状态
    pub async fn inspect(&self) -> Result<Vec<DeviceState>, HandleError> {
        self.request(|reply| EngineRequest::Inspect { reply }).await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> EngineRequest,
    ) -> Result<T, HandleError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(build(reply))
            .await
            .map_err(|_| HandleError::Stopped)?;
        response.await.map_err(|_| HandleError::Stopped)
    }
}

/// 启动引擎 actor；所有句柄释放后任务退出
pub fn spawn_engine(dispatcher: MessageDispatcher) -> (EngineHandle, JoinHandle<()>) {
    let (sender, receiver) = mpsc::channel(REQUEST_QUEUE_CAPACITY);
    let task = tokio::spawn(run_engine(dispatcher, receiver));
    (EngineHandle { sender }, task)
}

async fn run_engine(
    mut dispatcher: MessageDispatcher,
    mut receiver: mpsc::Receiver<EngineRequest>,
) {
    info!(
        devices = dispatcher.engine().registry().len(),
        "Engine task started"
    );

    while let Some(request) = receiver.recv().await {
        match request {
            EngineRequest::Telemetry { raw, reply } => {
                let result = dispatcher.on_message(&raw).await;
                if let Ok(summary) = &result {
                    debug!(
                        applied = summary.applied(),
                        skipped = summary.skipped(),
                        "Telemetry processed"
                    );
                }
                let _ = reply.send(result);
            }
            EngineRequest::Manual {
                device,
                pin,
                value,
                reply,
            } => {
                let result = dispatcher.engine_mut().apply_manual(&device, pin, value).await;
                if let Err(e) = &result {
                    warn!(device_id = %device, pin = pin, error = %e, "Manual command rejected");
                }
                let _ = reply.send(result);
            }
            EngineRequest::Toggle { device, pin, reply } => {
                let result = dispatcher.engine_mut().toggle(&device, pin).await;
                if let Err(e) = &result {
                    warn!(device_id = %device, pin = pin, error = %e, "Toggle rejected");
                }
                let _ = reply.send(result);
            }
            EngineRequest::Inspect { reply } => {
                let _ = reply.send(dispatcher.engine().states());
            }
        }
    }

    info!("Engine task stopped");
}
