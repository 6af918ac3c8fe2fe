use nanny_types::DisconnectedFlagPolicy;
use serde::{Deserialize, Serialize};

/// 全局配置
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// 系统配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SystemConfig {
    pub name: String,
    pub version: String,
}

/// 仪表盘配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    /// 每个通道保留的采样数
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    #[serde(default)]
    pub disconnected_flag: DisconnectedFlagPolicy,
}

fn default_buffer_capacity() -> usize {
    100
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            name: "Lab Nanny".to_string(),
            version: "1.0.0".to_string(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: default_buffer_capacity(),
            disconnected_flag: DisconnectedFlagPolicy::default(),
        }
    }
}
