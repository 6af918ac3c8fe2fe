pub mod api;
pub mod config;
pub mod emulator;
pub mod logging;
pub mod metrics;
pub mod presenter;
pub mod runtime;
pub mod shutdown;
pub mod transport;

use runtime::EngineHandle;

pub use config::AppConfig;

/// HTTP 层共享状态
pub struct AppState {
    pub engine: EngineHandle,
}
