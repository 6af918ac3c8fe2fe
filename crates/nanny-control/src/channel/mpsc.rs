use super::trait_def::CommandChannel;
use async_trait::async_trait;
use nanny_types::ActuationCommand;
use tokio::sync::mpsc;
use tracing::debug;

/// 基于无界 mpsc 的指令通道，接收端由传输任务消费
#[derive(Clone)]
pub struct MpscCommandChannel {
    sender: mpsc::UnboundedSender<ActuationCommand>,
}

impl MpscCommandChannel {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ActuationCommand>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl CommandChannel for MpscCommandChannel {
    async fn send_command(&self, command: &ActuationCommand) -> anyhow::Result<()> {
        self.sender
            .send(command.clone())
            .map_err(|_| anyhow::anyhow!("Command transport closed"))?;

        debug!(
            device_id = %command.device,
            control = command.control,
            value = command.value,
            "Command queued for transport"
        );
        Ok(())
    }
}
