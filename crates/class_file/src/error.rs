use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error("Unexpected end of input: {0}")]
    UnexpectedEndOfInput(#[from] std::io::Error),
    #[error("Invalid constant tag: {0}")]
    InvalidConstantTag(u8),
    #[error("Invalid element value tag: 0x{0:X}")]
    InvalidTag(u8),
    #[error("Constant pool index must be greater than 0")]
    MalformedIndex,
    #[error("Element values nested deeper than {0} levels")]
    NestingTooDeep(usize),
    #[error("Constant pool slot {0} cannot be written: only the slot after a long or double may be skipped")]
    UnencodableSlot(u16),
    #[error("Utf8 constant of {0} bytes exceeds the u16 length field")]
    Utf8TooLong(usize),
    #[error("List of {0} entries exceeds the u16 count field")]
    CountTooLarge(usize),
    #[error("All 65535 constant pool slots are occupied")]
    PoolExhausted,
}
