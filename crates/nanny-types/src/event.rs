use crate::command::Pin;
use serde::{Deserialize, Serialize};

/// 通道曲线的绘制方式
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
    #[default]
    Line,
    Area,
    Step,
}

/// 通道"断线"标记的处理策略
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DisconnectedFlagPolicy {
    /// 每次写入缓冲区都清除标记（与旧版前端一致）
    #[default]
    AlwaysClear,

    /// 故障帧设置标记，正常帧清除标记
    SetOnFault,
}

impl DisconnectedFlagPolicy {
    /// 根据本帧是否故障得到标记值
    pub fn flag_for(self, faulted: bool) -> bool {
        match self {
            DisconnectedFlagPolicy::AlwaysClear => false,
            DisconnectedFlagPolicy::SetOnFault => faulted,
        }
    }
}

/// 交给展示层的事件，引擎本身从不绘制任何东西
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    /// 通道缓冲区已更新
    BufferUpdated {
        device: String,
        channel: String,
        values: Vec<f64>,
        latest: f64,
        representation: Representation,
    },

    /// 条件评估结果对应的通道错误标记
    ConditionFlag {
        device: String,
        channel: String,
        in_error: bool,
    },

    /// 通道断线标记
    DisconnectedFlag {
        device: String,
        channel: String,
        disconnected: bool,
    },

    /// 设备连接状态
    ConnectivityChanged { device: String, connected: bool },

    /// 控制量（按钮）状态
    ControlChanged {
        device: String,
        control: Pin,
        value: f64,
    },
}

impl DashboardEvent {
    pub fn device(&self) -> &str {
        match self {
            DashboardEvent::BufferUpdated { device, .. }
            | DashboardEvent::ConditionFlag { device, .. }
            | DashboardEvent::DisconnectedFlag { device, .. }
            | DashboardEvent::ConnectivityChanged { device, .. }
            | DashboardEvent::ControlChanged { device, .. } => device,
        }
    }
}
