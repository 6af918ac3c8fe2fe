use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub eventbus: EventBusConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub emulator: EmulatorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 输出 JSON 格式日志
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_addr")]
    pub addr: SocketAddr,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EventBusConfig {
    #[serde(default = "default_eventbus_capacity")]
    pub capacity: usize,
}

/// 指令输出格式
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandFormat {
    /// `["lab1",13,0.0]`
    #[default]
    Json,
    /// `lab1,13,0`
    Text,
    /// 串口节点的单字节引脚指令
    Pin,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TransportConfig {
    /// 从标准输入读取遥测消息
    #[serde(default = "default_true")]
    pub stdin: bool,
    #[serde(default)]
    pub command_format: CommandFormat,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmulatorConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_emulator_period_ms")]
    pub period_ms: u64,

    /// 要模拟的实验室，为空时模拟全部
    #[serde(default)]
    pub labs: Vec<String>,

    /// 要模拟的通道，为空时使用实验室自己的通道
    #[serde(default)]
    pub channels: Vec<String>,
}

// 默认值函数
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

fn default_eventbus_capacity() -> usize {
    1024
}

fn default_true() -> bool {
    true
}

fn default_emulator_period_ms() -> u64 {
    500
}

// Default trait 实现
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: default_metrics_addr(),
        }
    }
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            capacity: default_eventbus_capacity(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            stdin: true,
            command_format: CommandFormat::default(),
        }
    }
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            period_ms: default_emulator_period_ms(),
            labs: Vec::new(),
            channels: Vec::new(),
        }
    }
}

impl AppConfig {
    /// 加载服务配置：文件可选，`NANNY__SECTION__KEY` 环境变量覆盖文件
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("NANNY").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.server.host, self.server.port).parse()?)
    }
}
