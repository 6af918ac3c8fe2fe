use metrics::{counter, describe_counter};

/// 描述所有指标
pub fn describe_metrics() {
    describe_counter!(
        "nanny_messages_received_total",
        "Total number of inbound transport messages"
    );
    describe_counter!(
        "nanny_messages_malformed_total",
        "Inbound messages dropped because they could not be decoded"
    );
    describe_counter!(
        "nanny_snapshots_applied_total",
        "Snapshots applied to a registered device"
    );
    describe_counter!(
        "nanny_snapshots_unknown_device_total",
        "Snapshots dropped because their device is not registered"
    );
    describe_counter!(
        "nanny_conditions_violated_total",
        "Safety condition violations"
    );
    describe_counter!(
        "nanny_commands_sent_total",
        "Actuation commands handed to the transport"
    );
    describe_counter!(
        "nanny_commands_failed_total",
        "Actuation commands the transport rejected"
    );
}

/// 记录收到的消息
pub fn record_message_received() {
    counter!("nanny_messages_received_total", 1);
}

/// 记录无法解码的消息
pub fn record_message_malformed() {
    counter!("nanny_messages_malformed_total", 1);
}

/// 记录已应用的快照
pub fn record_snapshot_applied() {
    counter!("nanny_snapshots_applied_total", 1);
}

/// 记录未知设备的快照
pub fn record_unknown_device() {
    counter!("nanny_snapshots_unknown_device_total", 1);
}

/// 记录条件违反
pub fn record_condition_violated(device_id: &str) {
    counter!("nanny_conditions_violated_total", 1, "device" => device_id.to_string());
}

/// 记录指令发送成功
pub fn record_command_sent() {
    counter!("nanny_commands_sent_total", 1);
}

/// 记录指令发送失败
pub fn record_command_failed() {
    counter!("nanny_commands_failed_total", 1);
}
