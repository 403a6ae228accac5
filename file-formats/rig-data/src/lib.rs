pub mod error;
pub mod reader;
pub mod types;

pub mod prelude {
    pub use crate::error::{Result, RigDataError};
    pub use crate::reader::DataReader;
    pub use crate::types::{RigDataR, RigDataW, read_counted_vec, write_count};
    pub use bytes::{BufMut, Bytes, BytesMut};
}
