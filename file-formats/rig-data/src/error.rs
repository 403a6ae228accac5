use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RigDataError {
    #[error("Unexpected end of data at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("Count {count} at offset {offset} needs {needed} bytes, only {remaining} remaining")]
    CountTooLarge {
        offset: usize,
        count: u32,
        needed: usize,
        remaining: usize,
    },

    #[error("Invalid UTF-8 string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("Length {0} does not fit in a u32 prefix")]
    LengthOverflow(usize),
}

pub type Result<T> = std::result::Result<T, RigDataError>;
