//! 串口节点的单字节引脚指令
//!
//! 以 65（`'A'`）为基准：引脚 `p` 置高为 `65 + p`，置低为 `65 - p - 1`，
//! 这样引脚 0 的高低两种状态也能区分（0 低 = 64，1 高 = 66）。

use nanny_types::{ActuationCommand, Pin};
use thiserror::Error;

/// 基准字节 `'A'`
pub const PIN_BASE: u8 = 65;

#[derive(Debug, Error, PartialEq)]
pub enum CodecError {
    #[error("Pin {pin} cannot be encoded (high = {high})")]
    PinOutOfRange { pin: Pin, high: bool },
}

/// 编码一个引脚状态
pub fn encode_pin(pin: Pin, high: bool) -> Result<u8, CodecError> {
    let encoded = if high {
        u16::from(PIN_BASE).checked_add(pin)
    } else {
        pin.checked_add(1)
            .and_then(|offset| u16::from(PIN_BASE).checked_sub(offset))
    };

    encoded
        .and_then(|byte| u8::try_from(byte).ok())
        .ok_or(CodecError::PinOutOfRange { pin, high })
}

/// 解码为 `(引脚, 是否置高)`
pub fn decode_pin(byte: u8) -> (Pin, bool) {
    if byte >= PIN_BASE {
        (Pin::from(byte - PIN_BASE), true)
    } else {
        (Pin::from(PIN_BASE - 1 - byte), false)
    }
}

/// 把驱动指令编码为串口字节，非 0 值视为置高
pub fn encode_command(command: &ActuationCommand) -> Result<u8, CodecError> {
    encode_pin(command.control, command.is_on())
}
