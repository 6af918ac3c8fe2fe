use super::trait_def::CommandChannel;
use async_trait::async_trait;
use nanny_types::ActuationCommand;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// 内存指令通道：记录所有已发送的指令，可模拟传输故障
#[derive(Default)]
pub struct MemoryCommandChannel {
    sent: Mutex<Vec<ActuationCommand>>,
    failing: AtomicBool,
}

impl MemoryCommandChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// 打开后所有发送都会失败
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// 已成功发送的指令
    pub fn sent(&self) -> Vec<ActuationCommand> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// 取出并清空已发送的指令
    pub fn take(&self) -> Vec<ActuationCommand> {
        std::mem::take(
            &mut *self
                .sent
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

#[async_trait]
impl CommandChannel for MemoryCommandChannel {
    async fn send_command(&self, command: &ActuationCommand) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Transport unreachable"));
        }

        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(command.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_commands() {
        let channel = MemoryCommandChannel::new();
        channel
            .send_command(&ActuationCommand::new("lab1", 2, 0.0))
            .await
            .unwrap();

        assert_eq!(channel.sent(), vec![ActuationCommand::new("lab1", 2, 0.0)]);
        assert_eq!(channel.take().len(), 1);
        assert!(channel.sent().is_empty());
    }

    #[tokio::test]
    async fn test_failing_transport() {
        let channel = MemoryCommandChannel::new();
        channel.set_failing(true);

        let result = channel
            .send_command(&ActuationCommand::new("lab1", 2, 0.0))
            .await;
        assert!(result.is_err());
        assert!(channel.sent().is_empty());
    }
}
