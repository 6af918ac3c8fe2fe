use nanny_device::DeviceError;
use nanny_types::Pin;
use thiserror::Error;

/// 引擎统一错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    #[error("Malformed message: {0}")]
    MalformedMessage(#[from] serde_json::Error),

    #[error("Device {device} has no control {control}")]
    UnknownControl { device: String, control: Pin },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Registry error: {0}")]
    Registry(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, EngineError>;

impl From<DeviceError> for EngineError {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::NotFound(id) => EngineError::UnknownDevice(id),
            DeviceError::UnknownControl { device, control } => {
                EngineError::UnknownControl { device, control }
            }
            other => EngineError::Registry(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for EngineError {
    fn from(err: anyhow::Error) -> Self {
        EngineError::Transport(err.to_string())
    }
}
