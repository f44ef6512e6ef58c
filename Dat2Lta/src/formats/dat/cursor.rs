//! Bounds-checked little-endian reader over a DAT buffer
//!
//! Every read checks the remaining length first so that a short buffer is
//! reported as [`Error::TruncatedInput`] with the section and offset, rather
//! than a bare `UnexpectedEof`.

#![allow(clippy::cast_possible_truncation)]

use super::Section;
use crate::error::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use glam::{Quat, Vec2, Vec3};
use std::io::{Cursor, Read};

/// Reader over an in-memory DAT file.
#[derive(Debug)]
pub struct DatCursor<'a> {
    inner: Cursor<&'a [u8]>,
    section: Section,
}

impl<'a> DatCursor<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            inner: Cursor::new(data),
            section: Section::Header,
        }
    }

    /// Set the section reported by subsequent errors.
    pub fn enter(&mut self, section: Section) {
        self.section = section;
    }

    #[must_use]
    pub fn section(&self) -> Section {
        self.section
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.inner.position() as usize
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.get_ref().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.position())
    }

    /// Jump to an absolute offset taken from the file header.
    pub fn seek_to(&mut self, offset: u32) -> Result<()> {
        let offset = offset as usize;
        if offset > self.len() {
            return Err(self.layout_error("section offset", self.len() as u64, offset as u64));
        }
        self.inner.set_position(offset as u64);
        Ok(())
    }

    /// Fail with `TruncatedInput` unless `needed` bytes remain.
    fn ensure(&self, needed: usize) -> Result<()> {
        let available = self.remaining();
        if needed > available {
            return Err(Error::TruncatedInput {
                section: self.section,
                offset: self.position(),
                needed,
                available,
            });
        }
        Ok(())
    }

    /// Check that `count` records of `record_size` bytes can still follow.
    ///
    /// A declared count that cannot fit means the reader is misaligned, so
    /// this reports [`Error::UnexpectedSectionLayout`] instead of truncation.
    pub fn ensure_records(&self, what: &'static str, count: usize, record_size: usize) -> Result<()> {
        let needed = count.checked_mul(record_size).unwrap_or(usize::MAX);
        if needed > self.remaining() {
            return Err(self.layout_error(what, self.remaining() as u64, needed as u64));
        }
        Ok(())
    }

    /// Build a layout error at the current position.
    #[must_use]
    pub fn layout_error(&self, what: &'static str, expected: u64, found: u64) -> Error {
        Error::UnexpectedSectionLayout {
            section: self.section,
            offset: self.position(),
            what,
            expected,
            found,
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.inner.read_u8()?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        Ok(self.inner.read_u16::<LittleEndian>()?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.inner.read_u32::<LittleEndian>()?)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        Ok(self.inner.read_i32::<LittleEndian>()?)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.ensure(4)?;
        Ok(self.inner.read_f32::<LittleEndian>()?)
    }

    pub fn read_vec2(&mut self) -> Result<Vec2> {
        self.ensure(8)?;
        let x = self.inner.read_f32::<LittleEndian>()?;
        let y = self.inner.read_f32::<LittleEndian>()?;
        Ok(Vec2::new(x, y))
    }

    pub fn read_vec3(&mut self) -> Result<Vec3> {
        self.ensure(12)?;
        let x = self.inner.read_f32::<LittleEndian>()?;
        let y = self.inner.read_f32::<LittleEndian>()?;
        let z = self.inner.read_f32::<LittleEndian>()?;
        Ok(Vec3::new(x, y, z))
    }

    /// Three unsigned integers (light grid offsets and sizes).
    pub fn read_uvec3(&mut self) -> Result<[u32; 3]> {
        self.ensure(12)?;
        Ok([
            self.inner.read_u32::<LittleEndian>()?,
            self.inner.read_u32::<LittleEndian>()?,
            self.inner.read_u32::<LittleEndian>()?,
        ])
    }

    /// Quaternion stored as x, y, z, w. Not normalized.
    pub fn read_quat(&mut self) -> Result<Quat> {
        self.ensure(16)?;
        let x = self.inner.read_f32::<LittleEndian>()?;
        let y = self.inner.read_f32::<LittleEndian>()?;
        let z = self.inner.read_f32::<LittleEndian>()?;
        let w = self.inner.read_f32::<LittleEndian>()?;
        Ok(Quat::from_xyzw(x, y, z, w))
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        self.ensure(len)?;
        let mut buffer = vec![0u8; len];
        self.inner.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Advance without keeping the bytes.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.ensure(len)?;
        self.inner.set_position((self.position() + len) as u64);
        Ok(())
    }

    /// String with a `u16` length prefix (the common LithTech string).
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u16()? as usize;
        self.read_fixed_string(len)
    }

    /// String with a `u32` length prefix (world info string).
    pub fn read_long_string(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        self.read_fixed_string(len)
    }

    /// Exactly `len` bytes decoded lossily as UTF-8.
    pub fn read_fixed_string(&mut self, len: usize) -> Result<String> {
        if len == 0 {
            return Ok(String::new());
        }
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_reads_advance() {
        let mut data = Vec::new();
        data.extend_from_slice(&7u32.to_le_bytes());
        data.extend_from_slice(&1.5f32.to_le_bytes());
        data.extend_from_slice(&3u16.to_le_bytes());
        data.extend_from_slice(b"abc");

        let mut cursor = DatCursor::new(&data);
        assert_eq!(cursor.read_u32().unwrap(), 7);
        assert!((cursor.read_f32().unwrap() - 1.5).abs() < f32::EPSILON);
        assert_eq!(cursor.read_string().unwrap(), "abc");
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_truncated_read_reports_section_and_offset() {
        let data = [1u8, 2, 3];
        let mut cursor = DatCursor::new(&data);
        cursor.enter(Section::Objects);
        cursor.read_u16().unwrap();

        match cursor.read_u32() {
            Err(Error::TruncatedInput { section, offset, needed, available }) => {
                assert_eq!(section, Section::Objects);
                assert_eq!(offset, 2);
                assert_eq!(needed, 4);
                assert_eq!(available, 1);
            }
            other => panic!("expected TruncatedInput, got {other:?}"),
        }
        // The failed read does not move the cursor
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_ensure_records_is_a_layout_error() {
        let data = [0u8; 16];
        let cursor = DatCursor::new(&data);
        assert!(cursor.ensure_records("vertices", 2, 8).is_ok());
        assert!(matches!(
            cursor.ensure_records("vertices", 3, 8),
            Err(Error::UnexpectedSectionLayout { what: "vertices", .. })
        ));
        assert!(matches!(
            cursor.ensure_records("vertices", usize::MAX, 8),
            Err(Error::UnexpectedSectionLayout { .. })
        ));
    }

    #[test]
    fn test_seek_past_end_is_rejected() {
        let data = [0u8; 4];
        let mut cursor = DatCursor::new(&data);
        assert!(cursor.seek_to(4).is_ok());
        assert!(cursor.seek_to(5).is_err());
    }
}
