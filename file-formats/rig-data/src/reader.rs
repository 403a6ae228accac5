//! Bounds-checked cursor over an in-memory buffer.
//!
//! Every read checks the remaining length first, so a truncated buffer turns
//! into [`RigDataError::UnexpectedEof`] instead of a panic or a garbage value.

use bytes::Buf;

use crate::error::{Result, RigDataError};

#[derive(Debug, Clone)]
pub struct DataReader<'a> {
    buf: &'a [u8],
    total: usize,
}

impl<'a> DataReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            total: buf.len(),
        }
    }

    /// Offset of the next unread byte from the start of the buffer
    pub fn position(&self) -> usize {
        self.total - self.buf.len()
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn is_empty(&self) -> bool {
        !self.buf.has_remaining()
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        if self.buf.remaining() < needed {
            return Err(RigDataError::UnexpectedEof {
                offset: self.position(),
                needed,
                remaining: self.buf.remaining(),
            });
        }
        Ok(())
    }

    pub fn peek_bytes(&self, len: usize) -> Option<&'a [u8]> {
        self.buf.get(..len)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.buf.get_u32_le())
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        self.ensure(8)?;
        Ok(self.buf.get_u64_le())
    }

    pub fn read_f32_le(&mut self) -> Result<f32> {
        self.ensure(4)?;
        Ok(self.buf.get_f32_le())
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure(len)?;
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    /// Read a `u32` element count and check that `count * elem_size` bytes
    /// are still available before anything gets allocated for it.
    pub fn read_count(&mut self, elem_size: usize) -> Result<usize> {
        let offset = self.position();
        let count = self.read_u32_le()?;
        let needed = (count as usize).saturating_mul(elem_size);
        if needed > self.remaining() {
            return Err(RigDataError::CountTooLarge {
                offset,
                count,
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(count as usize)
    }

    /// Read a `u32` length-prefixed UTF-8 string
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_count(1)?;
        let offset = self.position();
        let raw = self.read_bytes(len)?;
        std::str::from_utf8(raw)
            .map(str::to_owned)
            .map_err(|_| RigDataError::InvalidUtf8 { offset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reads_little_endian() {
        let data = [0x01, 0x02, 0x00, 0x00, 0x00, 0x00, 0x80, 0x3f, 0xff];
        let mut reader = DataReader::new(&data);
        assert_eq!(reader.read_u32_le().unwrap(), 0x0201);
        assert_eq!(reader.read_f32_le().unwrap(), 1.0);
        assert_eq!(reader.read_u8().unwrap(), 0xff);
        assert!(reader.is_empty());
        assert_eq!(reader.position(), 9);
    }

    #[test]
    fn test_short_read_fails_without_consuming() {
        let data = [0x01, 0x02];
        let mut reader = DataReader::new(&data);
        let err = reader.read_u32_le().unwrap_err();
        assert_eq!(
            err,
            RigDataError::UnexpectedEof {
                offset: 0,
                needed: 4,
                remaining: 2
            }
        );
        assert_eq!(reader.remaining(), 2);
    }

    #[test]
    fn test_count_checked_against_remaining() {
        // count = 1000 floats, but only 4 bytes follow
        let mut data = 1000u32.to_le_bytes().to_vec();
        data.extend_from_slice(&[0; 4]);
        let mut reader = DataReader::new(&data);
        assert!(matches!(
            reader.read_count(4),
            Err(RigDataError::CountTooLarge { count: 1000, .. })
        ));
    }

    #[test]
    fn test_read_string() {
        let mut data = 3u32.to_le_bytes().to_vec();
        data.extend_from_slice(b"Hip");
        let mut reader = DataReader::new(&data);
        assert_eq!(reader.read_string().unwrap(), "Hip");
    }

    #[test]
    fn test_read_string_rejects_invalid_utf8() {
        let mut data = 2u32.to_le_bytes().to_vec();
        data.extend_from_slice(&[0xc3, 0x28]);
        let mut reader = DataReader::new(&data);
        assert_eq!(
            reader.read_string().unwrap_err(),
            RigDataError::InvalidUtf8 { offset: 4 }
        );
    }
}
