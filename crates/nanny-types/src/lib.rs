pub mod command;
pub mod event;
pub mod message;
pub mod snapshot;

pub use command::{ActuationCommand, CommandParseError, Pin};
pub use event::{DashboardEvent, DisconnectedFlagPolicy, Representation};
pub use message::InboundMessage;
pub use snapshot::{Snapshot, RESERVED_FIELDS};
