//! 标准输入输出传输：按行读取遥测消息，按行写出驱动指令

use crate::config::CommandFormat;
use crate::runtime::{EngineHandle, HandleError};
use anyhow::Result;
use nanny_control::encode_command;
use nanny_types::ActuationCommand;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// 把指令编码成一行输出
pub fn encode_line(command: &ActuationCommand, format: CommandFormat) -> Result<Vec<u8>> {
    let mut line = match format {
        CommandFormat::Json => serde_json::to_vec(command)?,
        CommandFormat::Text => command.to_string().into_bytes(),
        CommandFormat::Pin => vec![encode_command(command)?],
    };
    line.push(b'\n');
    Ok(line)
}

/// 从指令通道取出指令写到输出，通道关闭后退出
pub async fn run_command_writer<W>(
    mut commands: mpsc::UnboundedReceiver<ActuationCommand>,
    mut writer: W,
    format: CommandFormat,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(command) = commands.recv().await {
        let line = match encode_line(&command, format) {
            Ok(line) => line,
            Err(e) => {
                warn!(command = %command, error = %e, "Command cannot be encoded, dropped");
                continue;
            }
        };

        writer.write_all(&line).await?;
        writer.flush().await?;
        debug!(command = %command, "Command written");
    }

    info!("Command channel closed");
    Ok(())
}

/// 逐行读取遥测消息交给引擎，输入结束后退出
pub async fn run_telemetry_reader<R>(reader: R, engine: EngineHandle) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match engine.telemetry(line.as_bytes().to_vec()).await {
            Ok(summary) => debug!(
                applied = summary.applied(),
                skipped = summary.skipped(),
                "Telemetry line processed"
            ),
            // 引擎已经记录了原因
            Err(HandleError::Engine(_)) => {}
            Err(HandleError::Stopped) => break,
        }
    }

    info!("Telemetry input closed");
    Ok(())
}
