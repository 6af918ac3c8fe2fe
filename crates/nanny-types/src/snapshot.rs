use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 快照自身占用的字段名，不能用作通道名
pub const RESERVED_FIELDS: [&str; 3] = ["user", "error", "x"];

/// 单个实验室（设备）上报的一帧遥测数据
///
/// JSON 形如 `{"user": "lab1", "error": false, "x": 1700000000.5, "ch0": 1.2, "ch1": 0.4}`，
/// 除 `user` / `error` / `x` 以外的字段都视为通道读数。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    /// 设备 ID
    pub user: String,

    /// 设备是否报告故障或断线
    #[serde(default)]
    pub error: bool,

    /// 采样时间（秒）
    #[serde(default, rename = "x", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,

    /// 通道读数（通道名 -> 原始 JSON 值）
    #[serde(flatten)]
    pub readings: HashMap<String, serde_json::Value>,
}

impl Snapshot {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            error: false,
            timestamp: None,
            readings: HashMap::new(),
        }
    }

    /// 添加一个通道读数
    pub fn with_reading(mut self, channel: impl Into<String>, value: f64) -> Self {
        self.readings.insert(channel.into(), serde_json::Value::from(value));
        self
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// 标记为故障帧
    pub fn faulted(mut self) -> Self {
        self.error = true;
        self
    }

    /// 读取通道的数值；缺失或非数值字段返回 None
    pub fn reading(&self, channel: &str) -> Option<f64> {
        self.readings.get(channel).and_then(serde_json::Value::as_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_node_payload() {
        let raw = r#"{"user": "lab1", "error": false, "x": 12.5, "ch0": 1.25, "ch1": 3}"#;
        let snapshot: Snapshot = serde_json::from_str(raw).unwrap();

        assert_eq!(snapshot.user, "lab1");
        assert!(!snapshot.error);
        assert_eq!(snapshot.timestamp, Some(12.5));
        assert_eq!(snapshot.reading("ch0"), Some(1.25));
        assert_eq!(snapshot.reading("ch1"), Some(3.0));
        assert!(!snapshot.readings.contains_key("x"));
    }

    #[test]
    fn test_missing_error_defaults_to_healthy() {
        let snapshot: Snapshot = serde_json::from_str(r#"{"user": "lab1", "ch0": 1.0}"#).unwrap();
        assert!(!snapshot.error);
    }

    #[test]
    fn test_non_numeric_reading_is_missing() {
        let snapshot: Snapshot =
            serde_json::from_str(r#"{"user": "lab1", "ch0": "n/a", "ch1": null}"#).unwrap();

        assert_eq!(snapshot.reading("ch0"), None);
        assert_eq!(snapshot.reading("ch1"), None);
        assert_eq!(snapshot.reading("ch2"), None);
    }

    #[test]
    fn test_reserved_fields_are_not_readings() {
        let snapshot: Snapshot =
            serde_json::from_str(r#"{"user": "lab1", "x": 5.0, "error": false, "ch0": 1.0}"#)
                .unwrap();

        for field in RESERVED_FIELDS {
            assert_eq!(snapshot.reading(field), None);
        }
        assert_eq!(snapshot.reading("ch0"), Some(1.0));
    }

    #[test]
    fn test_missing_user_is_rejected() {
        let result: Result<Snapshot, _> = serde_json::from_str(r#"{"error": true}"#);
        assert!(result.is_err());
    }
}
