use crate::error::ShapeError;
use crate::math::{Quaternion, Vector3};

/// Sink for binary shape state. All values are written little-endian.
pub trait StreamOut {
    fn write_bytes(&mut self, bytes: &[u8]);

    fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    fn write_u64(&mut self, value: u64) {
        self.write_bytes(&value.to_le_bytes());
    }

    fn write_f32(&mut self, value: f32) {
        self.write_bytes(&value.to_le_bytes());
    }

    fn write_vector3(&mut self, value: Vector3) {
        self.write_f32(value.x);
        self.write_f32(value.y);
        self.write_f32(value.z);
    }

    /// Writes the components in x, y, z, w order
    fn write_quaternion(&mut self, value: Quaternion) {
        self.write_f32(value.x);
        self.write_f32(value.y);
        self.write_f32(value.z);
        self.write_f32(value.w);
    }
}

/// Source of binary shape state written by a [`StreamOut`]
pub trait StreamIn {
    /// Fills `bytes` completely or fails with [`ShapeError::Stream`]
    fn read_bytes(&mut self, bytes: &mut [u8]) -> crate::Result<()>;

    fn read_u32(&mut self) -> crate::Result<u32> {
        let mut bytes = [0u8; 4];
        self.read_bytes(&mut bytes)?;
        Ok(u32::from_le_bytes(bytes))
    }

    fn read_u64(&mut self) -> crate::Result<u64> {
        let mut bytes = [0u8; 8];
        self.read_bytes(&mut bytes)?;
        Ok(u64::from_le_bytes(bytes))
    }

    fn read_f32(&mut self) -> crate::Result<f32> {
        let mut bytes = [0u8; 4];
        self.read_bytes(&mut bytes)?;
        Ok(f32::from_le_bytes(bytes))
    }

    fn read_vector3(&mut self) -> crate::Result<Vector3> {
        Ok(Vector3::new(self.read_f32()?, self.read_f32()?, self.read_f32()?))
    }

    fn read_quaternion(&mut self) -> crate::Result<Quaternion> {
        let x = self.read_f32()?;
        let y = self.read_f32()?;
        let z = self.read_f32()?;
        let w = self.read_f32()?;
        Ok(Quaternion::new(w, x, y, z))
    }
}

/// Writes to a growable byte buffer
#[derive(Debug, Clone, Default)]
pub struct VecStreamOut {
    data: Vec<u8>,
}

impl VecStreamOut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl StreamOut for VecStreamOut {
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }
}

/// Reads from a borrowed byte slice
#[derive(Debug, Clone)]
pub struct SliceStreamIn<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> SliceStreamIn<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Number of bytes not read yet
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }
}

impl StreamIn for SliceStreamIn<'_> {
    fn read_bytes(&mut self, bytes: &mut [u8]) -> crate::Result<()> {
        let end = self.position + bytes.len();
        let Some(source) = self.data.get(self.position..end) else {
            return Err(ShapeError::Stream(format!(
                "Unexpected end of stream: need {} bytes at offset {}, {} left",
                bytes.len(),
                self.position,
                self.remaining()
            )));
        };

        bytes.copy_from_slice(source);
        self.position = end;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quaternion_is_stored_xyzw() {
        let mut out = VecStreamOut::new();
        out.write_quaternion(Quaternion::new(4.0, 1.0, 2.0, 3.0));

        let bytes = out.into_inner();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[12..16], &4.0f32.to_le_bytes());

        let mut input = SliceStreamIn::new(&bytes);
        assert_eq!(input.read_quaternion().unwrap(), Quaternion::new(4.0, 1.0, 2.0, 3.0));
        assert!(input.is_at_end());
    }

    #[test]
    fn reading_past_end_fails() {
        let bytes = [1u8, 2, 3];
        let mut input = SliceStreamIn::new(&bytes);

        assert!(matches!(input.read_u32(), Err(ShapeError::Stream(_))));
        assert_eq!(input.remaining(), 3);
    }
}
