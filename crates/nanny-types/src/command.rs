use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 可驱动输出的编号（数字引脚）
pub type Pin = u16;

/// 发往传输层的驱动指令 `(设备, 引脚, 值)`
///
/// JSON 编码为三元数组 `["lab1", 13, 0]`，文本形式为 `lab1,13,0`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, Pin, f64)", into = "(String, Pin, f64)")]
pub struct ActuationCommand {
    /// 目标设备 ID
    pub device: String,

    /// 目标引脚
    pub control: Pin,

    /// 指令值（0 为关，非 0 为开或档位）
    pub value: f64,
}

impl ActuationCommand {
    pub fn new(device: impl Into<String>, control: Pin, value: f64) -> Self {
        Self {
            device: device.into(),
            control,
            value,
        }
    }

    /// 是否为"开"指令
    pub fn is_on(&self) -> bool {
        self.value != 0.0
    }
}

impl From<(String, Pin, f64)> for ActuationCommand {
    fn from((device, control, value): (String, Pin, f64)) -> Self {
        Self {
            device,
            control,
            value,
        }
    }
}

impl From<ActuationCommand> for (String, Pin, f64) {
    fn from(command: ActuationCommand) -> Self {
        (command.device, command.control, command.value)
    }
}

impl fmt::Display for ActuationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.device, self.control, self.value)
    }
}

/// 文本指令解析错误
#[derive(Debug, Error, PartialEq)]
pub enum CommandParseError {
    #[error("Expected 3 comma separated fields, found {0}")]
    FieldCount(usize),

    #[error("Empty device reference")]
    EmptyDevice,

    #[error("Invalid pin: {0}")]
    InvalidPin(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

impl FromStr for ActuationCommand {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim().split(',').map(str::trim).collect();
        if fields.len() != 3 {
            return Err(CommandParseError::FieldCount(fields.len()));
        }

        if fields[0].is_empty() {
            return Err(CommandParseError::EmptyDevice);
        }

        let control = fields[1]
            .parse::<Pin>()
            .map_err(|_| CommandParseError::InvalidPin(fields[1].to_string()))?;
        let value = fields[2]
            .parse::<f64>()
            .map_err(|_| CommandParseError::InvalidValue(fields[2].to_string()))?;

        Ok(Self::new(fields[0], control, value))
    }
}
