use crate::buffer::ChannelBuffer;
use nanny_rule::Condition;
use nanny_types::{Pin, Representation};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroUsize;

/// 设备连接状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    /// 最近一帧正常
    Connected,

    /// 最近一帧报告故障，或尚未收到任何快照
    Faulted,
}

impl DeviceStatus {
    pub fn from_fault(faulted: bool) -> Self {
        if faulted {
            DeviceStatus::Faulted
        } else {
            DeviceStatus::Connected
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DeviceStatus::Connected => "connected",
            DeviceStatus::Faulted => "faulted",
        }
    }
}

/// 实验室设备
///
/// 启动时由静态配置创建，会话期间不会被销毁。
#[derive(Debug, Clone)]
pub struct Device {
    /// 设备 ID（全局唯一）
    pub id: String,

    /// 显示名称
    pub name: String,

    /// 缓冲区容量
    capacity: NonZeroUsize,

    /// 控制引脚 -> 最近一次发出的指令值
    controls: BTreeMap<Pin, f64>,

    /// 上报的通道（声明顺序）
    channels: Vec<String>,

    /// 每个通道的滚动历史
    buffers: HashMap<String, ChannelBuffer>,

    /// 通道绘制方式
    representations: HashMap<String, Representation>,

    /// 每帧按声明顺序评估的安全条件
    conditions: Vec<Condition>,

    status: DeviceStatus,
}

impl Device {
    pub fn new(id: impl Into<String>, capacity: NonZeroUsize) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            capacity,
            controls: BTreeMap::new(),
            channels: Vec::new(),
            buffers: HashMap::new(),
            representations: HashMap::new(),
            conditions: Vec::new(),
            status: DeviceStatus::Faulted,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 添加控制引脚，初始指令值为 0（关）
    pub fn with_control(mut self, pin: Pin) -> Self {
        self.controls.entry(pin).or_insert(0.0);
        self
    }

    /// 添加通道并创建其缓冲区
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        let channel = channel.into();
        if !self.buffers.contains_key(&channel) {
            self.buffers
                .insert(channel.clone(), ChannelBuffer::new(self.capacity));
            self.channels.push(channel);
        }
        self
    }

    pub fn with_representation(
        mut self,
        channel: impl Into<String>,
        representation: Representation,
    ) -> Self {
        self.representations.insert(channel.into(), representation);
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn has_control(&self, pin: Pin) -> bool {
        self.controls.contains_key(&pin)
    }

    pub fn controls(&self) -> impl Iterator<Item = Pin> + '_ {
        self.controls.keys().copied()
    }

    pub fn commanded_value(&self, pin: Pin) -> Option<f64> {
        self.controls.get(&pin).copied()
    }

    pub fn commanded_values(&self) -> &BTreeMap<Pin, f64> {
        &self.controls
    }

    /// 写入指令值；设备没有该引脚时返回 false
    pub fn set_commanded_value(&mut self, pin: Pin, value: f64) -> bool {
        match self.controls.get_mut(&pin) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn buffer(&self, channel: &str) -> Option<&ChannelBuffer> {
        self.buffers.get(channel)
    }

    /// 向通道缓冲区写入一个采样；未知通道返回 None
    pub fn push_sample(&mut self, channel: &str, value: f64) -> Option<&ChannelBuffer> {
        let buffer = self.buffers.get_mut(channel)?;
        buffer.push(value);
        Some(buffer)
    }

    pub fn representation(&self, channel: &str) -> Representation {
        self.representations
            .get(channel)
            .copied()
            .unwrap_or_default()
    }

    pub fn status(&self) -> DeviceStatus {
        self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status == DeviceStatus::Connected
    }

    /// 设置状态，返回状态是否发生变化
    pub fn set_status(&mut self, status: DeviceStatus) -> bool {
        let changed = self.status != status;
        self.status = status;
        changed
    }

    /// 当前状态的只读视图
    pub fn state(&self) -> DeviceState {
        DeviceState {
            id: self.id.clone(),
            name: self.name.clone(),
            status: self.status,
            connected: self.is_connected(),
            commanded: self.controls.clone(),
            buffers: self
                .channels
                .iter()
                .filter_map(|channel| {
                    self.buffers
                        .get(channel)
                        .map(|buffer| (channel.clone(), buffer.to_vec()))
                })
                .collect(),
        }
    }
}

/// 设备状态视图（对外展示用）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceState {
    pub id: String,
    pub name: String,
    pub status: DeviceStatus,
    pub connected: bool,
    pub commanded: BTreeMap<Pin, f64>,
    pub buffers: BTreeMap<String, Vec<f64>>,
}
