pub mod global;
pub mod labs;
pub mod loader;
pub mod validator;

pub use global::{DashboardConfig, GlobalConfig, SystemConfig};
pub use labs::{LabConfig, LabsConfig};
pub use loader::{ConfigLoader, Dashboard};
pub use validator::{validate, ValidationError};
