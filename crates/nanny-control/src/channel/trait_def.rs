use async_trait::async_trait;
use nanny_types::ActuationCommand;

/// 指令通道 trait
///
/// 发送即返回，不等待设备确认，也不做重试。
#[async_trait]
pub trait CommandChannel: Send + Sync {
    /// 发送指令到传输层
    async fn send_command(&self, command: &ActuationCommand) -> anyhow::Result<()>;
}
