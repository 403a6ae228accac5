use bytes::{BufMut, BytesMut};
use glam::{Quat, Vec3};

use crate::error::{Result, RigDataError};
use crate::reader::DataReader;

pub trait RigDataR: Sized {
    fn rig_read(reader: &mut DataReader<'_>) -> Result<Self>;
}

pub trait RigDataW {
    fn rig_write(&self, out: &mut BytesMut) -> Result<()>;
    fn rig_size(&self) -> usize;
}

impl RigDataR for u8 {
    fn rig_read(reader: &mut DataReader<'_>) -> Result<Self> {
        reader.read_u8()
    }
}
impl RigDataW for u8 {
    fn rig_write(&self, out: &mut BytesMut) -> Result<()> {
        out.put_u8(*self);
        Ok(())
    }

    fn rig_size(&self) -> usize {
        1
    }
}

impl RigDataR for u32 {
    fn rig_read(reader: &mut DataReader<'_>) -> Result<Self> {
        reader.read_u32_le()
    }
}
impl RigDataW for u32 {
    fn rig_write(&self, out: &mut BytesMut) -> Result<()> {
        out.put_u32_le(*self);
        Ok(())
    }

    fn rig_size(&self) -> usize {
        4
    }
}

impl RigDataR for u64 {
    fn rig_read(reader: &mut DataReader<'_>) -> Result<Self> {
        reader.read_u64_le()
    }
}
impl RigDataW for u64 {
    fn rig_write(&self, out: &mut BytesMut) -> Result<()> {
        out.put_u64_le(*self);
        Ok(())
    }

    fn rig_size(&self) -> usize {
        8
    }
}

impl RigDataR for f32 {
    fn rig_read(reader: &mut DataReader<'_>) -> Result<Self> {
        reader.read_f32_le()
    }
}
impl RigDataW for f32 {
    fn rig_write(&self, out: &mut BytesMut) -> Result<()> {
        out.put_f32_le(*self);
        Ok(())
    }

    fn rig_size(&self) -> usize {
        4
    }
}

impl RigDataR for bool {
    fn rig_read(reader: &mut DataReader<'_>) -> Result<Self> {
        Ok(reader.read_u8()? != 0)
    }
}
impl RigDataW for bool {
    fn rig_write(&self, out: &mut BytesMut) -> Result<()> {
        out.put_u8(u8::from(*self));
        Ok(())
    }

    fn rig_size(&self) -> usize {
        1
    }
}

/// `u32` byte length followed by raw UTF-8
impl RigDataR for String {
    fn rig_read(reader: &mut DataReader<'_>) -> Result<Self> {
        reader.read_string()
    }
}
impl RigDataW for str {
    fn rig_write(&self, out: &mut BytesMut) -> Result<()> {
        write_count(out, self.len())?;
        out.put_slice(self.as_bytes());
        Ok(())
    }

    fn rig_size(&self) -> usize {
        4 + self.len()
    }
}
impl RigDataW for String {
    fn rig_write(&self, out: &mut BytesMut) -> Result<()> {
        self.as_str().rig_write(out)
    }

    fn rig_size(&self) -> usize {
        self.as_str().rig_size()
    }
}

impl RigDataR for Vec3 {
    fn rig_read(reader: &mut DataReader<'_>) -> Result<Self> {
        let x = reader.read_f32_le()?;
        let y = reader.read_f32_le()?;
        let z = reader.read_f32_le()?;
        Ok(Self::new(x, y, z))
    }
}
impl RigDataW for Vec3 {
    fn rig_write(&self, out: &mut BytesMut) -> Result<()> {
        out.put_f32_le(self.x);
        out.put_f32_le(self.y);
        out.put_f32_le(self.z);
        Ok(())
    }

    fn rig_size(&self) -> usize {
        12
    }
}

/// Stored as x, y, z, w
impl RigDataR for Quat {
    fn rig_read(reader: &mut DataReader<'_>) -> Result<Self> {
        let x = reader.read_f32_le()?;
        let y = reader.read_f32_le()?;
        let z = reader.read_f32_le()?;
        let w = reader.read_f32_le()?;
        Ok(Self::from_xyzw(x, y, z, w))
    }
}
impl RigDataW for Quat {
    fn rig_write(&self, out: &mut BytesMut) -> Result<()> {
        out.put_f32_le(self.x);
        out.put_f32_le(self.y);
        out.put_f32_le(self.z);
        out.put_f32_le(self.w);
        Ok(())
    }

    fn rig_size(&self) -> usize {
        16
    }
}

/// Write a collection length as a `u32` prefix
pub fn write_count(out: &mut BytesMut, count: usize) -> Result<()> {
    let count = u32::try_from(count).map_err(|_| RigDataError::LengthOverflow(count))?;
    out.put_u32_le(count);
    Ok(())
}

/// Read `count` fixed-size elements after checking the buffer holds them all
pub fn read_counted_vec<T: RigDataR>(
    reader: &mut DataReader<'_>,
    count: usize,
    elem_size: usize,
) -> Result<Vec<T>> {
    let needed = count.saturating_mul(elem_size);
    if needed > reader.remaining() {
        return Err(RigDataError::UnexpectedEof {
            offset: reader.position(),
            needed,
            remaining: reader.remaining(),
        });
    }

    let mut result = Vec::with_capacity(count);
    for _ in 0..count {
        result.push(T::rig_read(reader)?);
    }
    Ok(result)
}
