use nanny_types::Pin;
use thiserror::Error;

/// 设备注册表错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    /// 设备未找到
    #[error("Device not found: {0}")]
    NotFound(String),

    /// 设备已存在
    #[error("Device already exists: {0}")]
    AlreadyExists(String),

    /// 设备没有该控制引脚
    #[error("Device {device} has no control {control}")]
    UnknownControl { device: String, control: Pin },
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, DeviceError>;
