use nanny_control::{CommandChannel, MemoryCommandChannel};
use nanny_device::{Device, DeviceRegistry, FAULT_SAMPLE, INITIAL_SAMPLE};
use nanny_engine::{EngineError, EventBus, MessageDispatcher, UpdateEngine};
use nanny_rule::Condition;
use nanny_types::{
    ActuationCommand, DashboardEvent, DisconnectedFlagPolicy, InboundMessage, Representation,
    Snapshot,
};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::broadcast;

const HEATER: u16 = 7;
const PUMP: u16 = 3;

/// 两台设备：rig 的温度超过 80 时关闭 chiller 上的加热器
fn create_test_registry() -> DeviceRegistry {
    let capacity = NonZeroUsize::new(4).unwrap();
    let mut registry = DeviceRegistry::new();

    registry
        .register(
            Device::new("rig", capacity)
                .with_name("主实验台")
                .with_control(PUMP)
                .with_channel("temp")
                .with_channel("pressure")
                .with_representation("pressure", Representation::Step)
                .with_condition(Condition::new("temp", "chiller", HEATER, 0.0).with_max(80.0)),
        )
        .unwrap();
    registry
        .register(
            Device::new("chiller", capacity)
                .with_control(HEATER)
                .with_channel("flow"),
        )
        .unwrap();

    registry
}

struct Fixture {
    engine: UpdateEngine,
    transport: Arc<MemoryCommandChannel>,
    events: broadcast::Receiver<DashboardEvent>,
}

fn create_fixture(policy: DisconnectedFlagPolicy) -> Fixture {
    let transport = Arc::new(MemoryCommandChannel::new());
    let channel: Arc<dyn CommandChannel> = transport.clone();
    let bus = Arc::new(EventBus::new(256));
    let events = bus.subscribe();
    let engine =
        UpdateEngine::new(create_test_registry(), channel, bus).with_disconnected_flag(policy);

    Fixture {
        engine,
        transport,
        events,
    }
}

fn drain(events: &mut broadcast::Receiver<DashboardEvent>) -> Vec<DashboardEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

fn healthy(temp: f64) -> Snapshot {
    Snapshot::new("rig")
        .with_reading("temp", temp)
        .with_reading("pressure", 1.5)
}

/// 测试纠正指令：恰好一条指令，并按引脚写回目标设备
#[tokio::test]
async fn test_corrective_dispatch() {
    let mut fx = create_fixture(DisconnectedFlagPolicy::AlwaysClear);

    // 1. 先把加热器打开
    let value = fx.engine.toggle("chiller", HEATER).await.unwrap();
    assert_eq!(value, 1.0);
    fx.transport.take();

    // 2. 温度越界
    let report = fx.engine.apply(&healthy(85.0)).await.unwrap();
    assert_eq!(report.violations, 1);
    assert_eq!(report.commands_sent, 1);

    // 3. 验证指令与指令值
    assert_eq!(
        fx.transport.sent(),
        vec![ActuationCommand::new("chiller", HEATER, 0.0)]
    );
    let chiller = fx.engine.registry().get("chiller").unwrap();
    assert_eq!(chiller.commanded_value(HEATER), Some(0.0));

    // 4. rig 自己的控制量不受影响
    let rig = fx.engine.registry().get("rig").unwrap();
    assert_eq!(rig.commanded_value(PUMP), Some(0.0));
}

/// 测试边界开区间：等于上界即违反
#[tokio::test]
async fn test_boundary_is_violation() {
    let mut fx = create_fixture(DisconnectedFlagPolicy::AlwaysClear);

    let report = fx.engine.apply(&healthy(80.0)).await.unwrap();
    assert_eq!(report.violations, 1);
    assert_eq!(fx.transport.take().len(), 1);

    let report = fx.engine.apply(&healthy(79.99)).await.unwrap();
    assert_eq!(report.violations, 0);
    assert!(fx.transport.take().is_empty());
}

/// 测试故障帧：所有通道写入故障哨兵值，设备断开
#[tokio::test]
async fn test_fault_sentinel_propagation() {
    let mut fx = create_fixture(DisconnectedFlagPolicy::AlwaysClear);

    fx.engine.apply(&healthy(20.0)).await.unwrap();
    assert!(fx.engine.registry().get("rig").unwrap().is_connected());

    let faulted = healthy(20.0).faulted();
    let report = fx.engine.apply(&faulted).await.unwrap();
    assert!(!report.connected);

    let rig = fx.engine.registry().get("rig").unwrap();
    assert_eq!(rig.buffer("temp").unwrap().latest(), FAULT_SAMPLE);
    assert_eq!(rig.buffer("pressure").unwrap().latest(), FAULT_SAMPLE);
    assert!(!rig.is_connected());
}

/// 测试重复快照：每次 apply 追加一个采样，不去重
#[tokio::test]
async fn test_repeated_snapshot_appends() {
    let mut fx = create_fixture(DisconnectedFlagPolicy::AlwaysClear);

    fx.engine.apply(&healthy(21.0)).await.unwrap();
    fx.engine.apply(&healthy(21.0)).await.unwrap();

    let rig = fx.engine.registry().get("rig").unwrap();
    assert_eq!(
        rig.buffer("temp").unwrap().to_vec(),
        vec![INITIAL_SAMPLE, INITIAL_SAMPLE, 21.0, 21.0]
    );
    assert_eq!(rig.buffer("temp").unwrap().len(), 4);
}

/// 测试未知设备：返回错误，其他设备状态不变
#[tokio::test]
async fn test_unknown_device() {
    let mut fx = create_fixture(DisconnectedFlagPolicy::AlwaysClear);
    let before = fx.engine.states();

    let result = fx
        .engine
        .apply(&Snapshot::new("ghost").with_reading("temp", 99.0))
        .await;

    assert!(matches!(result, Err(EngineError::UnknownDevice(id)) if id == "ghost"));
    assert_eq!(fx.engine.states(), before);
    assert!(fx.transport.sent().is_empty());
}

/// 测试缺失读数：按违反处理，缓冲区写入故障哨兵值
#[tokio::test]
async fn test_missing_reading() {
    let mut fx = create_fixture(DisconnectedFlagPolicy::AlwaysClear);

    let snapshot = Snapshot::new("rig").with_reading("pressure", 1.0);
    let report = fx.engine.apply(&snapshot).await.unwrap();

    assert_eq!(report.violations, 1);
    assert!(report.connected);
    let rig = fx.engine.registry().get("rig").unwrap();
    assert_eq!(rig.buffer("temp").unwrap().latest(), FAULT_SAMPLE);
    assert_eq!(rig.buffer("pressure").unwrap().latest(), 1.0);
}

/// 测试传输故障：指令值保持不变，下一帧重新发送
#[tokio::test]
async fn test_transport_failure_retries_next_snapshot() {
    let mut fx = create_fixture(DisconnectedFlagPolicy::AlwaysClear);
    fx.engine.toggle("chiller", HEATER).await.unwrap();
    fx.transport.take();

    // 1. 传输断开
    fx.transport.set_failing(true);
    let report = fx.engine.apply(&healthy(90.0)).await.unwrap();
    assert_eq!(report.commands_failed, 1);
    let chiller = fx.engine.registry().get("chiller").unwrap();
    assert_eq!(chiller.commanded_value(HEATER), Some(1.0));

    // 2. 传输恢复，下一帧再次发出
    fx.transport.set_failing(false);
    let report = fx.engine.apply(&healthy(90.0)).await.unwrap();
    assert_eq!(report.commands_sent, 1);
    let chiller = fx.engine.registry().get("chiller").unwrap();
    assert_eq!(chiller.commanded_value(HEATER), Some(0.0));
}

/// 测试事件顺序：条件标记 -> 控制量 -> 缓冲区 -> 连接状态
#[tokio::test]
async fn test_event_sequence() {
    let mut fx = create_fixture(DisconnectedFlagPolicy::AlwaysClear);

    fx.engine.apply(&healthy(85.0)).await.unwrap();
    let events = drain(&mut fx.events);

    assert_eq!(
        events[0],
        DashboardEvent::ConditionFlag {
            device: "rig".to_string(),
            channel: "temp".to_string(),
            in_error: true,
        }
    );
    assert_eq!(
        events[1],
        DashboardEvent::ControlChanged {
            device: "chiller".to_string(),
            control: HEATER,
            value: 0.0,
        }
    );
    assert_eq!(
        events[2],
        DashboardEvent::BufferUpdated {
            device: "rig".to_string(),
            channel: "temp".to_string(),
            values: vec![INITIAL_SAMPLE, INITIAL_SAMPLE, INITIAL_SAMPLE, 85.0],
            latest: 85.0,
            representation: Representation::Line,
        }
    );
    assert!(matches!(
        &events[5],
        DashboardEvent::DisconnectedFlag { channel, .. } if channel == "pressure"
    ));
    assert!(matches!(
        &events[4],
        DashboardEvent::BufferUpdated { representation: Representation::Step, .. }
    ));
    assert_eq!(
        events.last(),
        Some(&DashboardEvent::ConnectivityChanged {
            device: "rig".to_string(),
            connected: true,
        })
    );

    // 条件恢复后标记清除
    fx.engine.apply(&healthy(20.0)).await.unwrap();
    let events = drain(&mut fx.events);
    assert!(matches!(
        &events[0],
        DashboardEvent::ConditionFlag { in_error: false, .. }
    ));
}

/// 测试断线标记策略
#[tokio::test]
async fn test_disconnected_flag_policy() {
    let disconnected_flags = |events: Vec<DashboardEvent>| -> Vec<bool> {
        events
            .into_iter()
            .filter_map(|event| match event {
                DashboardEvent::DisconnectedFlag { disconnected, .. } => Some(disconnected),
                _ => None,
            })
            .collect()
    };

    let mut fx = create_fixture(DisconnectedFlagPolicy::AlwaysClear);
    fx.engine.apply(&healthy(20.0).faulted()).await.unwrap();
    assert_eq!(disconnected_flags(drain(&mut fx.events)), vec![false, false]);

    let mut fx = create_fixture(DisconnectedFlagPolicy::SetOnFault);
    fx.engine.apply(&healthy(20.0).faulted()).await.unwrap();
    assert_eq!(disconnected_flags(drain(&mut fx.events)), vec![true, true]);
    fx.engine.apply(&healthy(20.0)).await.unwrap();
    assert_eq!(disconnected_flags(drain(&mut fx.events)), vec![false, false]);
}

/// 测试手动控制
#[tokio::test]
async fn test_manual_control() {
    let mut fx = create_fixture(DisconnectedFlagPolicy::AlwaysClear);

    // 1. 设置数值
    fx.engine.apply_manual("rig", PUMP, 0.5).await.unwrap();
    assert_eq!(
        fx.engine.registry().get("rig").unwrap().commanded_value(PUMP),
        Some(0.5)
    );
    assert_eq!(
        fx.transport.take(),
        vec![ActuationCommand::new("rig", PUMP, 0.5)]
    );

    // 2. 非 0 翻转为 0
    assert_eq!(fx.engine.toggle("rig", PUMP).await.unwrap(), 0.0);

    // 3. 未知引脚与未知设备
    assert!(matches!(
        fx.engine.apply_manual("rig", HEATER, 1.0).await,
        Err(EngineError::UnknownControl { control: HEATER, .. })
    ));
    assert!(matches!(
        fx.engine.toggle("ghost", PUMP).await,
        Err(EngineError::UnknownDevice(_))
    ));

    // 4. 传输故障时返回错误，值不变
    fx.transport.set_failing(true);
    assert!(matches!(
        fx.engine.toggle("rig", PUMP).await,
        Err(EngineError::Transport(_))
    ));
    assert_eq!(
        fx.engine.registry().get("rig").unwrap().commanded_value(PUMP),
        Some(0.0)
    );
}

/// 测试消息分发：多个快照，未知设备跳过
#[tokio::test]
async fn test_dispatch_message() {
    let fx = create_fixture(DisconnectedFlagPolicy::AlwaysClear);
    let transport = fx.transport.clone();
    let mut dispatcher = MessageDispatcher::new(fx.engine);

    let raw = InboundMessage::new()
        .with_snapshot("b", healthy(85.0))
        .with_snapshot("a", Snapshot::new("ghost"))
        .with_snapshot("c", Snapshot::new("chiller").with_reading("flow", 2.0))
        .encode()
        .unwrap();

    let summary = dispatcher.on_message(&raw).await.unwrap();
    assert_eq!(summary.applied(), 2);
    assert_eq!(summary.skipped(), 1);
    assert_eq!(summary.unknown_devices, vec!["ghost".to_string()]);
    assert_eq!(summary.reports[0].device, "rig");
    assert_eq!(summary.reports[1].device, "chiller");
    assert_eq!(transport.sent().len(), 1);

    let chiller = dispatcher.engine().registry().get("chiller").unwrap();
    assert!(chiller.is_connected());
    assert_eq!(chiller.buffer("flow").unwrap().latest(), 2.0);
}

/// 测试畸形消息：整条丢弃，状态不变
#[tokio::test]
async fn test_dispatch_malformed() {
    let fx = create_fixture(DisconnectedFlagPolicy::AlwaysClear);
    let mut dispatcher = MessageDispatcher::new(fx.engine);
    let before = dispatcher.engine().states();

    for raw in [
        &b"not json"[..],
        &br#"{"a": {"user": "rig", "temp": 1.0}, "b": 42}"#[..],
        &b"[1, 2, 3]"[..],
    ] {
        let result = dispatcher.on_message(raw).await;
        assert!(matches!(result, Err(EngineError::MalformedMessage(_))));
    }

    assert_eq!(dispatcher.engine().states(), before);

    // 之后的消息照常处理
    let raw = br#"{"m1": {"user": "rig", "error": false, "temp": 10.0, "pressure": 1.0}}"#;
    let summary = dispatcher.on_message(raw).await.unwrap();
    assert_eq!(summary.applied(), 1);
}
