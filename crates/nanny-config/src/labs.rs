use nanny_device::Device;
use nanny_rule::Condition;
use nanny_types::{Pin, Representation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::num::NonZeroUsize;

/// `labs.toml` 的内容
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LabsConfig {
    #[serde(default)]
    pub labs: Vec<LabConfig>,
}

/// 单个实验室（设备）的静态配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LabConfig {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    /// 可驱动的引脚
    #[serde(default)]
    pub controls: Vec<Pin>,

    /// 上报的通道，按声明顺序绘制
    #[serde(default)]
    pub channels: Vec<String>,

    /// 通道绘制方式，未列出的通道按折线绘制
    #[serde(default)]
    pub representation: BTreeMap<String, Representation>,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl LabConfig {
    /// 构建设备，所有控制量初始为 0，设备初始为未连接
    pub fn to_device(&self, capacity: NonZeroUsize) -> Device {
        let mut device = Device::new(self.id.clone(), capacity)
            .with_name(self.name.clone().unwrap_or_else(|| self.id.clone()));

        for pin in &self.controls {
            device = device.with_control(*pin);
        }
        for channel in &self.channels {
            device = device.with_channel(channel.clone());
        }
        for (channel, representation) in &self.representation {
            device = device.with_representation(channel.clone(), *representation);
        }
        for condition in &self.conditions {
            device = device.with_condition(condition.clone());
        }

        device
    }
}
