use crate::model::Condition;
use nanny_types::{DashboardEvent, Snapshot};
use tracing::trace;

/// 单次评估的结论
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    Satisfied,

    /// 读数小于或等于下界
    BelowMin { value: f64, min: f64 },

    /// 读数大于或等于上界
    AboveMax { value: f64, max: f64 },

    /// 快照里没有该通道的数值读数，按违反处理
    MissingReading,
}

impl Verdict {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Verdict::Satisfied)
    }
}

/// 评估结果：结论 + 交给展示层的错误标记事件
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub verdict: Verdict,
    pub flag: DashboardEvent,
}

impl Evaluation {
    pub fn is_satisfied(&self) -> bool {
        self.verdict.is_satisfied()
    }
}

/// 评估一条条件，返回 true 表示满足
pub fn evaluate(snapshot: &Snapshot, condition: &Condition) -> bool {
    verdict(snapshot, condition).is_satisfied()
}

/// 评估一条条件，并给出被检查通道的错误标记
///
/// 标记属于快照所属设备的 `condition.control` 通道，只取决于本次评估结果。
pub fn assess(snapshot: &Snapshot, condition: &Condition) -> Evaluation {
    let verdict = verdict(snapshot, condition);

    trace!(
        device_id = %snapshot.user,
        channel = %condition.control,
        verdict = ?verdict,
        "Condition evaluated"
    );

    Evaluation {
        verdict,
        flag: DashboardEvent::ConditionFlag {
            device: snapshot.user.clone(),
            channel: condition.control.clone(),
            in_error: !verdict.is_satisfied(),
        },
    }
}

fn verdict(snapshot: &Snapshot, condition: &Condition) -> Verdict {
    let Some(value) = snapshot.reading(&condition.control) else {
        return Verdict::MissingReading;
    };

    // 开区间：等于边界即为违反
    if let Some(min) = condition.min_value {
        if !(value > min) {
            return Verdict::BelowMin { value, min };
        }
    }

    if let Some(max) = condition.max_value {
        if !(value < max) {
            return Verdict::AboveMax { value, max };
        }
    }

    Verdict::Satisfied
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_guard() -> Condition {
        Condition::new("temp", "D2", 4, 0.0)
    }

    fn reading(value: f64) -> Snapshot {
        Snapshot::new("D1").with_reading("temp", value)
    }

    #[test]
    fn test_inside_range() {
        let condition = temp_guard().with_min(10.0).with_max(80.0);
        assert!(evaluate(&reading(10.5), &condition));
        assert!(evaluate(&reading(79.9), &condition));
    }

    #[test]
    fn test_bounds_are_exclusive() {
        let condition = temp_guard().with_min(10.0).with_max(80.0);

        assert_eq!(
            assess(&reading(10.0), &condition).verdict,
            Verdict::BelowMin { value: 10.0, min: 10.0 }
        );
        assert_eq!(
            assess(&reading(80.0), &condition).verdict,
            Verdict::AboveMax { value: 80.0, max: 80.0 }
        );
        assert!(!evaluate(&reading(9.0), &condition));
        assert!(!evaluate(&reading(85.0), &condition));
    }

    #[test]
    fn test_min_only_is_unbounded_above() {
        let condition = temp_guard().with_min(0.5);
        assert!(evaluate(&reading(0.500001), &condition));
        assert!(evaluate(&reading(1.0e12), &condition));
        assert!(evaluate(&reading(f64::MAX), &condition));
        assert!(!evaluate(&reading(0.5), &condition));
    }

    #[test]
    fn test_max_only_is_unbounded_below() {
        let condition = temp_guard().with_max(80.0);
        assert!(evaluate(&reading(-1.0e12), &condition));
        assert!(!evaluate(&reading(80.0), &condition));
    }

    #[test]
    fn test_no_bounds_always_satisfied() {
        assert!(evaluate(&reading(-0.5), &temp_guard()));
    }

    #[test]
    fn test_missing_reading_is_violation() {
        let condition = temp_guard().with_max(80.0);
        let snapshot = Snapshot::new("D1").with_reading("pressure", 1.0);

        let evaluation = assess(&snapshot, &condition);
        assert_eq!(evaluation.verdict, Verdict::MissingReading);
        assert!(!evaluation.is_satisfied());
    }

    #[test]
    fn test_flag_follows_latest_evaluation() {
        let condition = temp_guard().with_max(80.0);

        let violated = assess(&reading(85.0), &condition);
        assert_eq!(
            violated.flag,
            DashboardEvent::ConditionFlag {
                device: "D1".to_string(),
                channel: "temp".to_string(),
                in_error: true,
            }
        );

        let cleared = assess(&reading(20.0), &condition);
        assert_eq!(
            cleared.flag,
            DashboardEvent::ConditionFlag {
                device: "D1".to_string(),
                channel: "temp".to_string(),
                in_error: false,
            }
        );
    }
}
