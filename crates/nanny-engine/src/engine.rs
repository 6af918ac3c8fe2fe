use crate::bus::SharedEventBus;
use crate::error::{EngineError, Result};
use crate::metrics;
use nanny_control::CommandChannel;
use nanny_device::{DeviceRegistry, DeviceState, DeviceStatus, FAULT_SAMPLE};
use nanny_rule::{assess, Condition};
use nanny_types::{ActuationCommand, DashboardEvent, DisconnectedFlagPolicy, Pin, Snapshot};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 单次 apply 的结果
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyReport {
    pub device: String,
    pub violations: usize,
    pub commands_sent: usize,
    pub commands_failed: usize,
    pub connected: bool,
}

/// 更新引擎
///
/// 对每个快照做一次归约：评估条件、发出纠正指令、写入通道缓冲区、更新连接状态。
/// 引擎独占设备注册表，调用方需要保证同一时刻只有一个 apply 在执行。
pub struct UpdateEngine {
    registry: DeviceRegistry,
    channel: Arc<dyn CommandChannel>,
    bus: SharedEventBus,
    disconnected_flag: DisconnectedFlagPolicy,
}

impl UpdateEngine {
    pub fn new(
        registry: DeviceRegistry,
        channel: Arc<dyn CommandChannel>,
        bus: SharedEventBus,
    ) -> Self {
        Self {
            registry,
            channel,
            bus,
            disconnected_flag: DisconnectedFlagPolicy::default(),
        }
    }

    pub fn with_disconnected_flag(mut self, policy: DisconnectedFlagPolicy) -> Self {
        self.disconnected_flag = policy;
        self
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn bus(&self) -> &SharedEventBus {
        &self.bus
    }

    pub fn disconnected_flag(&self) -> DisconnectedFlagPolicy {
        self.disconnected_flag
    }

    /// 所有设备的当前状态
    pub fn states(&self) -> Vec<DeviceState> {
        self.registry.states()
    }

    /// 应用一个快照
    pub async fn apply(&mut self, snapshot: &Snapshot) -> Result<ApplyReport> {
        let conditions: Vec<Condition> = match self.registry.get(&snapshot.user) {
            Some(device) => device.conditions().to_vec(),
            None => {
                metrics::record_unknown_device();
                warn!(device_id = %snapshot.user, "Snapshot for unknown device dropped");
                return Err(EngineError::UnknownDevice(snapshot.user.clone()));
            }
        };

        let mut report = ApplyReport {
            device: snapshot.user.clone(),
            violations: 0,
            commands_sent: 0,
            commands_failed: 0,
            connected: false,
        };

        for condition in &conditions {
            let evaluation = assess(snapshot, condition);
            self.publish(evaluation.flag);

            if evaluation.verdict.is_satisfied() {
                continue;
            }

            report.violations += 1;
            metrics::record_condition_violated(&snapshot.user);
            warn!(
                device_id = %snapshot.user,
                channel = %condition.control,
                verdict = ?evaluation.verdict,
                target_device = %condition.control_user,
                target_pin = condition.target_channel,
                "Condition violated, issuing corrective command"
            );

            let command = condition.corrective_command();
            match self.send(&command).await {
                Ok(()) => {
                    report.commands_sent += 1;
                    self.record_commanded(&command);
                }
                Err(e) => {
                    report.commands_failed += 1;
                    warn!(
                        device_id = %command.device,
                        pin = command.control,
                        error = %e,
                        "Corrective command failed"
                    );
                }
            }
        }

        let faulted = snapshot.error;
        let flag = self.disconnected_flag.flag_for(faulted);
        let mut events = Vec::new();

        let device = self.registry.require_mut(&snapshot.user)?;
        let channels = device.channels().to_vec();
        for channel in &channels {
            let sample = if faulted {
                FAULT_SAMPLE
            } else {
                snapshot.reading(channel).unwrap_or_else(|| {
                    warn!(
                        device_id = %snapshot.user,
                        channel = %channel,
                        "Missing reading, recording fault sample"
                    );
                    FAULT_SAMPLE
                })
            };

            let representation = device.representation(channel);
            if let Some(buffer) = device.push_sample(channel, sample) {
                events.push(DashboardEvent::BufferUpdated {
                    device: snapshot.user.clone(),
                    channel: channel.clone(),
                    values: buffer.to_vec(),
                    latest: buffer.latest(),
                    representation,
                });
                events.push(DashboardEvent::DisconnectedFlag {
                    device: snapshot.user.clone(),
                    channel: channel.clone(),
                    disconnected: flag,
                });
            }
        }

        let status = DeviceStatus::from_fault(faulted);
        if device.set_status(status) {
            info!(device_id = %snapshot.user, status = status.as_str(), "Device status changed");
        }
        report.connected = device.is_connected();
        events.push(DashboardEvent::ConnectivityChanged {
            device: snapshot.user.clone(),
            connected: report.connected,
        });

        for event in events {
            self.publish(event);
        }

        metrics::record_snapshot_applied();
        debug!(
            device_id = %snapshot.user,
            violations = report.violations,
            connected = report.connected,
            "Snapshot applied"
        );

        Ok(report)
    }

    /// 操作员手动设置控制量
    pub async fn apply_manual(&mut self, device_id: &str, pin: Pin, value: f64) -> Result<()> {
        let device = self.registry.require(device_id)?;
        if !device.has_control(pin) {
            return Err(EngineError::UnknownControl {
                device: device_id.to_string(),
                control: pin,
            });
        }

        let command = ActuationCommand::new(device_id, pin, value);
        self.send(&command).await?;
        self.record_commanded(&command);

        info!(device_id = %device_id, pin = pin, value = value, "Manual command sent");
        Ok(())
    }

    /// 翻转控制量（0 -> 1，非 0 -> 0），返回新的值
    pub async fn toggle(&mut self, device_id: &str, pin: Pin) -> Result<f64> {
        let current = self
            .registry
            .require(device_id)?
            .commanded_value(pin)
            .ok_or_else(|| EngineError::UnknownControl {
                device: device_id.to_string(),
                control: pin,
            })?;

        let value = if current == 0.0 { 1.0 } else { 0.0 };
        self.apply_manual(device_id, pin, value).await?;
        Ok(value)
    }

    async fn send(&self, command: &ActuationCommand) -> Result<()> {
        match self.channel.send_command(command).await {
            Ok(()) => {
                metrics::record_command_sent();
                debug!(command = %command, "Command sent");
                Ok(())
            }
            Err(e) => {
                metrics::record_command_failed();
                Err(e.into())
            }
        }
    }

    /// 按引脚写入目标设备的指令值，目标不存在时只记录日志
    fn record_commanded(&mut self, command: &ActuationCommand) {
        match self
            .registry
            .set_commanded_value(&command.device, command.control, command.value)
        {
            Ok(()) => self.publish(DashboardEvent::ControlChanged {
                device: command.device.clone(),
                control: command.control,
                value: command.value,
            }),
            Err(e) => warn!(error = %e, "Commanded value not recorded"),
        }
    }

    fn publish(&self, event: DashboardEvent) {
        if self.bus.publish(event).is_err() {
            debug!("No presentation subscribers");
        }
    }
}
