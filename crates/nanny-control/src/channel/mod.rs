pub mod memory;
pub mod mpsc;
pub mod trait_def;

pub use memory::MemoryCommandChannel;
pub use mpsc::MpscCommandChannel;
pub use trait_def::CommandChannel;
