use std::future::Future;
use tracing::{error, info};

/// 等待关闭信号；信号监听失败时永不返回
pub async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down");
}
