use crate::global::GlobalConfig;
use crate::labs::LabConfig;
use nanny_types::{Pin, RESERVED_FIELDS};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// 配置校验错误
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("dashboard.buffer_capacity must be greater than 0")]
    ZeroCapacity,

    #[error("Lab #{index} has an empty id")]
    EmptyId { index: usize },

    #[error("Duplicate lab id: {0}")]
    DuplicateLab(String),

    #[error("Lab {lab} declares channel {channel} more than once")]
    DuplicateChannel { lab: String, channel: String },

    #[error("Lab {lab} uses reserved snapshot field {channel} as a channel name")]
    ReservedChannel { lab: String, channel: String },

    #[error("Lab {lab} declares control {control} more than once")]
    DuplicateControl { lab: String, control: Pin },

    #[error("Lab {lab} sets a representation for unknown channel {channel}")]
    UnknownRepresentationChannel { lab: String, channel: String },

    #[error("Lab {lab} condition #{index} tests unknown channel {channel}")]
    UnknownConditionChannel {
        lab: String,
        index: usize,
        channel: String,
    },

    #[error("Lab {lab} condition #{index} targets unknown lab {target}")]
    UnknownTargetLab {
        lab: String,
        index: usize,
        target: String,
    },

    #[error("Lab {lab} condition #{index} targets pin {pin} which {target} does not expose")]
    UnknownTargetPin {
        lab: String,
        index: usize,
        target: String,
        pin: Pin,
    },

    #[error("Lab {lab} condition #{index} has neither min_value nor max_value")]
    MissingBounds { lab: String, index: usize },

    #[error("Lab {lab} condition #{index} can never be satisfied (min {min} >= max {max})")]
    EmptyRange {
        lab: String,
        index: usize,
        min: f64,
        max: f64,
    },
}

/// 校验仪表盘配置，返回发现的全部问题
pub fn validate(global: &GlobalConfig, labs: &[LabConfig]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if global.dashboard.buffer_capacity == 0 {
        errors.push(ValidationError::ZeroCapacity);
    }

    let mut controls_by_lab: HashMap<&str, HashSet<Pin>> = HashMap::new();
    for (index, lab) in labs.iter().enumerate() {
        if lab.id.trim().is_empty() {
            errors.push(ValidationError::EmptyId { index });
            continue;
        }
        if controls_by_lab
            .insert(lab.id.as_str(), lab.controls.iter().copied().collect())
            .is_some()
        {
            errors.push(ValidationError::DuplicateLab(lab.id.clone()));
        }
    }

    for lab in labs.iter().filter(|lab| !lab.id.trim().is_empty()) {
        validate_lab(lab, &controls_by_lab, &mut errors);
    }

    errors
}

fn validate_lab(
    lab: &LabConfig,
    controls_by_lab: &HashMap<&str, HashSet<Pin>>,
    errors: &mut Vec<ValidationError>,
) {
    let mut channels = HashSet::new();
    for channel in &lab.channels {
        if RESERVED_FIELDS.contains(&channel.as_str()) {
            errors.push(ValidationError::ReservedChannel {
                lab: lab.id.clone(),
                channel: channel.clone(),
            });
        }
        if !channels.insert(channel.as_str()) {
            errors.push(ValidationError::DuplicateChannel {
                lab: lab.id.clone(),
                channel: channel.clone(),
            });
        }
    }

    let mut controls = HashSet::new();
    for control in &lab.controls {
        if !controls.insert(*control) {
            errors.push(ValidationError::DuplicateControl {
                lab: lab.id.clone(),
                control: *control,
            });
        }
    }

    for channel in lab.representation.keys() {
        if !channels.contains(channel.as_str()) {
            errors.push(ValidationError::UnknownRepresentationChannel {
                lab: lab.id.clone(),
                channel: channel.clone(),
            });
        }
    }

    for (index, condition) in lab.conditions.iter().enumerate() {
        if !channels.contains(condition.control.as_str()) {
            errors.push(ValidationError::UnknownConditionChannel {
                lab: lab.id.clone(),
                index,
                channel: condition.control.clone(),
            });
        }

        match controls_by_lab.get(condition.control_user.as_str()) {
            None => errors.push(ValidationError::UnknownTargetLab {
                lab: lab.id.clone(),
                index,
                target: condition.control_user.clone(),
            }),
            Some(pins) if !pins.contains(&condition.target_channel) => {
                errors.push(ValidationError::UnknownTargetPin {
                    lab: lab.id.clone(),
                    index,
                    target: condition.control_user.clone(),
                    pin: condition.target_channel,
                })
            }
            Some(_) => {}
        }

        match (condition.min_value, condition.max_value) {
            (None, None) => errors.push(ValidationError::MissingBounds {
                lab: lab.id.clone(),
                index,
            }),
            (Some(min), Some(max)) if condition.is_unsatisfiable() => {
                errors.push(ValidationError::EmptyRange {
                    lab: lab.id.clone(),
                    index,
                    min,
                    max,
                })
            }
            _ => {}
        }
    }
}
