use crate::{Device, DeviceError, DeviceState, Result};
use nanny_types::Pin;
use std::collections::HashMap;
use tracing::{debug, info};

/// 设备注册表
///
/// 由更新引擎独占持有，所有修改都经由引擎串行完成。
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: HashMap<String, Device>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册设备
    ///
    /// # 错误
    /// * `AlreadyExists` - 设备ID已存在
    pub fn register(&mut self, device: Device) -> Result<()> {
        if self.devices.contains_key(&device.id) {
            return Err(DeviceError::AlreadyExists(device.id.clone()));
        }

        info!(
            device_id = %device.id,
            device_name = %device.name,
            channels = device.channels().len(),
            conditions = device.conditions().len(),
            "Device registered"
        );

        self.devices.insert(device.id.clone(), device);
        Ok(())
    }

    pub fn get(&self, device_id: &str) -> Option<&Device> {
        self.devices.get(device_id)
    }

    pub fn get_mut(&mut self, device_id: &str) -> Option<&mut Device> {
        self.devices.get_mut(device_id)
    }

    /// 获取设备，不存在时返回 `NotFound`
    pub fn require(&self, device_id: &str) -> Result<&Device> {
        self.devices
            .get(device_id)
            .ok_or_else(|| DeviceError::NotFound(device_id.to_string()))
    }

    pub fn require_mut(&mut self, device_id: &str) -> Result<&mut Device> {
        self.devices
            .get_mut(device_id)
            .ok_or_else(|| DeviceError::NotFound(device_id.to_string()))
    }

    pub fn contains(&self, device_id: &str) -> bool {
        self.devices.contains_key(device_id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    /// 排序后的设备 ID
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.devices.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// 写入某设备某引脚的指令值
    ///
    /// # 错误
    /// * `NotFound` - 设备不存在
    /// * `UnknownControl` - 设备没有该引脚
    pub fn set_commanded_value(&mut self, device_id: &str, pin: Pin, value: f64) -> Result<()> {
        let device = self.require_mut(device_id)?;
        if !device.set_commanded_value(pin, value) {
            return Err(DeviceError::UnknownControl {
                device: device_id.to_string(),
                control: pin,
            });
        }

        debug!(device_id = %device_id, control = pin, value, "Commanded value updated");
        Ok(())
    }

    /// 所有设备的状态视图，按 ID 排序
    pub fn states(&self) -> Vec<DeviceState> {
        let mut states: Vec<DeviceState> = self.devices.values().map(Device::state).collect();
        states.sort_by(|a, b| a.id.cmp(&b.id));
        states
    }
}
