use nanny_types::{ActuationCommand, Pin};
use serde::{Deserialize, Serialize};

/// 安全条件定义
///
/// 对本设备某一通道的当前读数做开区间检查 `(min_value, max_value)`，
/// 不满足时向 `control_user` 设备的 `target_channel` 引脚发送 `target_value`。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Condition {
    /// 被检查的通道名
    pub control: String,

    /// 下界（不含），缺省表示不限
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,

    /// 上界（不含），缺省表示不限
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,

    /// 纠正动作的目标设备，可以不是本设备
    pub control_user: String,

    /// 纠正动作的目标引脚
    pub target_channel: Pin,

    /// 纠正动作写入的值
    pub target_value: f64,
}

impl Condition {
    pub fn new(
        control: impl Into<String>,
        control_user: impl Into<String>,
        target_channel: Pin,
        target_value: f64,
    ) -> Self {
        Self {
            control: control.into(),
            min_value: None,
            max_value: None,
            control_user: control_user.into(),
            target_channel,
            target_value,
        }
    }

    pub fn with_min(mut self, min_value: f64) -> Self {
        self.min_value = Some(min_value);
        self
    }

    pub fn with_max(mut self, max_value: f64) -> Self {
        self.max_value = Some(max_value);
        self
    }

    /// 条件被违反时要发出的纠正指令
    pub fn corrective_command(&self) -> ActuationCommand {
        ActuationCommand::new(
            self.control_user.clone(),
            self.target_channel,
            self.target_value,
        )
    }

    /// 两个边界都存在且区间为空时，条件永远无法满足
    pub fn is_unsatisfiable(&self) -> bool {
        matches!((self.min_value, self.max_value), (Some(min), Some(max)) if min >= max)
    }
}
