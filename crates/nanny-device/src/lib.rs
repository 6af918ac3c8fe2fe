pub mod buffer;
pub mod error;
pub mod model;
pub mod registry;

pub use buffer::{ChannelBuffer, FAULT_SAMPLE, INITIAL_SAMPLE};
pub use error::{DeviceError, Result};
pub use model::{Device, DeviceState, DeviceStatus};
pub use registry::DeviceRegistry;
