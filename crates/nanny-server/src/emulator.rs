//! 实验台模拟器：没有硬件时按正弦波生成遥测数据

use crate::runtime::{EngineHandle, HandleError};
use nanny_types::{InboundMessage, Snapshot};
use std::f64::consts::PI;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// ADC 满量程电压
const ADC_REFERENCE_VOLTS: f64 = 3.3;

/// 12 位 ADC 最大读数
const ADC_MAX_COUNTS: f64 = 4095.0;

/// 被模拟的实验室
#[derive(Debug, Clone, PartialEq)]
pub struct EmulatedLab {
    pub id: String,
    pub channels: Vec<String>,
}

pub struct Emulator {
    labs: Vec<EmulatedLab>,
    period: Duration,
    init_time: f64,
}

impl Emulator {
    pub fn new(labs: Vec<EmulatedLab>, period: Duration) -> Self {
        Self::with_init_time(labs, period, now_secs())
    }

    pub fn with_init_time(labs: Vec<EmulatedLab>, period: Duration, init_time: f64) -> Self {
        Self {
            labs,
            period,
            init_time,
        }
    }

    pub fn labs(&self) -> &[EmulatedLab] {
        &self.labs
    }

    /// 第 `offset` 个通道在 `time` 时刻的 ADC 读数，周期 10 秒
    pub fn adc_counts(&self, time: f64, offset: usize) -> u32 {
        let phase = (time - self.init_time + offset as f64) * PI / 5.0;
        ((phase.sin() + 1.0) * 2048.0) as u32
    }

    /// 生成 `time` 时刻的一条消息，每个实验室一个快照
    pub fn message_at(&self, time: f64) -> InboundMessage {
        self.labs
            .iter()
            .fold(InboundMessage::new(), |message, lab| {
                let snapshot = lab.channels.iter().enumerate().fold(
                    Snapshot::new(lab.id.clone()).with_timestamp(time),
                    |snapshot, (offset, channel)| {
                        snapshot.with_reading(channel.clone(), to_volts(self.adc_counts(time, offset)))
                    },
                );
                message.with_snapshot(Uuid::new_v4().to_string(), snapshot)
            })
    }

    /// 按周期把模拟数据交给引擎，引擎停止后退出
    pub async fn run(self, engine: EngineHandle) {
        info!(
            labs = self.labs.len(),
            period_ms = self.period.as_millis() as u64,
            "Lab emulator started"
        );

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let raw = match self.message_at(now_secs()).encode() {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(error = %e, "Failed to encode emulated message");
                    continue;
                }
            };

            match engine.telemetry(raw).await {
                Ok(summary) => debug!(applied = summary.applied(), "Emulated telemetry applied"),
                Err(HandleError::Engine(e)) => warn!(error = %e, "Emulated telemetry rejected"),
                Err(HandleError::Stopped) => break,
            }
        }

        info!("Lab emulator stopped");
    }
}

/// ADC 读数换算成电压
pub fn to_volts(counts: u32) -> f64 {
    f64::from(counts) * ADC_REFERENCE_VOLTS / ADC_MAX_COUNTS
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |elapsed| elapsed.as_secs_f64())
}
