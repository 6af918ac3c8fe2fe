pub mod bus;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod metrics;

pub use bus::{EventBus, SharedEventBus};
pub use dispatcher::{DispatchSummary, MessageDispatcher};
pub use engine::{ApplyReport, UpdateEngine};
pub use error::{EngineError, Result};
