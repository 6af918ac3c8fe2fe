pub mod channel;
pub mod codec;

pub use channel::{CommandChannel, MemoryCommandChannel, MpscCommandChannel};
pub use codec::{decode_pin, encode_command, encode_pin, CodecError};
