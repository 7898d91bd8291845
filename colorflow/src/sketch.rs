//! Binary sketch file I/O.
//!
//! A sketch file stores fixed-width byte summaries of color sets, one per
//! record, for the downstream clustering step. The layout is versioned
//! and little-endian:
//!
//! - magic, 8 bytes: `b"COLORSKT"`
//! - `version: u32` (current = 1)
//! - `bytes_per_sketch: u32` (non-zero)
//! - `sketch_count: u32`
//! - `sketch_count` records of exactly `bytes_per_sketch` bytes
//!
//! Earlier tooling disagreed on the header width; files written with a
//! different layout fail with an explicit error instead of being guessed
//! at.

use crate::errors::SketchError;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

const MAGIC: &[u8; 8] = b"COLORSKT";
const VERSION: u32 = 1;

/// An ordered set of fixed-width sketches, stored contiguously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SketchSet {
    bytes_per_sketch: usize,
    data: Vec<u8>,
}

impl SketchSet {
    /// Creates an empty set of `bytes_per_sketch`-wide sketches.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::ZeroWidth`] if `bytes_per_sketch` is zero.
    pub fn new(bytes_per_sketch: usize) -> Result<Self, SketchError> {
        if bytes_per_sketch == 0 {
            return Err(SketchError::ZeroWidth);
        }
        Ok(Self {
            bytes_per_sketch,
            data: Vec::new(),
        })
    }

    /// Appends one sketch, preserving insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::WidthMismatch`] if the sketch width does
    /// not match the set.
    pub fn push(&mut self, sketch: &[u8]) -> Result<(), SketchError> {
        if sketch.len() != self.bytes_per_sketch {
            return Err(SketchError::WidthMismatch {
                expected: self.bytes_per_sketch,
                got: sketch.len(),
            });
        }
        self.data.extend_from_slice(sketch);
        Ok(())
    }

    /// Width of every sketch, in bytes.
    #[must_use]
    pub fn bytes_per_sketch(&self) -> usize {
        self.bytes_per_sketch
    }

    /// Number of sketches in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() / self.bytes_per_sketch
    }

    /// Returns `true` if the set holds no sketches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The `index`-th sketch, in file order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        let start = index.checked_mul(self.bytes_per_sketch)?;
        let end = start.checked_add(self.bytes_per_sketch)?;
        self.data.get(start..end)
    }

    /// Iterates the sketches in file order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(self.bytes_per_sketch)
    }

    /// The raw payload: all sketches back to back, file order.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Reads a sketch file.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError`] for unreadable files, wrong magic,
    /// unsupported versions, a zero record width, or a payload shorter
    /// than the header promises.
    pub fn read_from_path(path: impl AsRef<Path>) -> Result<Self, SketchError> {
        Self::read_from(BufReader::new(File::open(path)?))
    }

    /// Reads a sketch file from an arbitrary reader.
    ///
    /// # Errors
    ///
    /// See [`Self::read_from_path`].
    pub fn read_from(mut reader: impl Read) -> Result<Self, SketchError> {
        let mut magic = [0u8; 8];
        reader.read_exact(&mut magic).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => SketchError::BadMagic,
            _ => SketchError::Io(e),
        })?;
        if &magic != MAGIC {
            return Err(SketchError::BadMagic);
        }

        let version = read_u32(&mut reader)?;
        if version != VERSION {
            return Err(SketchError::UnsupportedVersion(version));
        }

        let bytes_per_sketch = read_u32(&mut reader)?;
        if bytes_per_sketch == 0 {
            return Err(SketchError::ZeroWidth);
        }
        let sketch_count = read_u32(&mut reader)?;

        let expected = (sketch_count as usize)
            .checked_mul(bytes_per_sketch as usize)
            .ok_or(SketchError::PayloadTooLarge {
                count: sketch_count,
                bytes_per_sketch,
            })?;

        let mut data = vec![0u8; expected];
        let mut found = 0;
        while found < expected {
            let read = reader.read(&mut data[found..])?;
            if read == 0 {
                return Err(SketchError::Truncated { expected, found });
            }
            found += read;
        }

        Ok(Self {
            bytes_per_sketch: bytes_per_sketch as usize,
            data,
        })
    }

    /// Writes the set to a file, creating or truncating it.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::Io`] on any write failure.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), SketchError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Writes the set to an arbitrary writer.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError`] if the set is too large for the header
    /// fields, or [`SketchError::Io`] on any write failure.
    pub fn write_to(&self, writer: &mut impl Write) -> Result<(), SketchError> {
        let overflow = || SketchError::HeaderOverflow {
            count: self.len(),
            bytes_per_sketch: self.bytes_per_sketch,
        };
        let bytes_per_sketch =
            u32::try_from(self.bytes_per_sketch).map_err(|_| overflow())?;
        let sketch_count = u32::try_from(self.len()).map_err(|_| overflow())?;

        writer.write_all(MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&bytes_per_sketch.to_le_bytes())?;
        writer.write_all(&sketch_count.to_le_bytes())?;
        writer.write_all(&self.data)?;
        Ok(())
    }
}

fn read_u32(reader: &mut impl Read) -> Result<u32, SketchError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hand-assembled file: header `(bytes_per_sketch, sketch_count)`
    /// followed by the payload.
    fn raw_file(bytes_per_sketch: u32, sketch_count: u32, payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&VERSION.to_le_bytes());
        bytes.extend_from_slice(&bytes_per_sketch.to_le_bytes());
        bytes.extend_from_slice(&sketch_count.to_le_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn test_two_records_of_width_four_decode_in_file_order() {
        let file = raw_file(4, 2, &[1, 2, 3, 4, 5, 6, 7, 8]);
        let set = SketchSet::read_from(file.as_slice()).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.bytes_per_sketch(), 4);
        assert_eq!(set.get(0), Some(&[1u8, 2, 3, 4][..]));
        assert_eq!(set.get(1), Some(&[5u8, 6, 7, 8][..]));
        assert_eq!(set.get(2), None);
    }

    #[test]
    fn test_bad_magic_is_rejected() {
        let mut file = raw_file(4, 1, &[0, 0, 0, 0]);
        file[0] = b'X';
        assert!(matches!(
            SketchSet::read_from(file.as_slice()),
            Err(SketchError::BadMagic)
        ));
    }

    #[test]
    fn test_short_file_is_rejected_as_bad_magic() {
        assert!(matches!(
            SketchSet::read_from(&b"COLOR"[..]),
            Err(SketchError::BadMagic)
        ));
    }

    #[test]
    fn test_unsupported_version_is_rejected() {
        let mut file = raw_file(4, 1, &[0, 0, 0, 0]);
        file[8..12].copy_from_slice(&7u32.to_le_bytes());
        assert!(matches!(
            SketchSet::read_from(file.as_slice()),
            Err(SketchError::UnsupportedVersion(7))
        ));
    }

    #[test]
    fn test_zero_width_is_rejected() {
        let file = raw_file(0, 3, &[]);
        assert!(matches!(
            SketchSet::read_from(file.as_slice()),
            Err(SketchError::ZeroWidth)
        ));
    }

    #[test]
    fn test_truncated_payload_is_rejected() {
        let file = raw_file(4, 2, &[1, 2, 3, 4, 5]);
        match SketchSet::read_from(file.as_slice()) {
            Err(SketchError::Truncated { expected: 8, found: 5 }) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_push_rejects_wrong_width() {
        let mut set = SketchSet::new(4).unwrap();
        set.push(&[1, 2, 3, 4]).unwrap();
        assert!(matches!(
            set.push(&[1, 2, 3]),
            Err(SketchError::WidthMismatch { expected: 4, got: 3 })
        ));
    }

    #[test]
    fn test_written_file_reads_back() {
        let mut set = SketchSet::new(3).unwrap();
        set.push(&[9, 8, 7]).unwrap();
        set.push(&[1, 1, 1]).unwrap();

        let mut bytes = Vec::new();
        set.write_to(&mut bytes).unwrap();
        let reread = SketchSet::read_from(bytes.as_slice()).unwrap();
        assert_eq!(reread, set);
    }

    #[test]
    fn test_iter_yields_file_order() {
        let file = raw_file(2, 3, &[1, 2, 3, 4, 5, 6]);
        let set = SketchSet::read_from(file.as_slice()).unwrap();
        let sketches: Vec<&[u8]> = set.iter().collect();
        assert_eq!(sketches, vec![&[1u8, 2][..], &[3u8, 4][..], &[5u8, 6][..]]);
    }

    #[test]
    fn test_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refs.sketch");

        let mut set = SketchSet::new(4).unwrap();
        set.push(&[0, 0, 0, 1]).unwrap();
        set.push(&[255, 0, 255, 0]).unwrap();
        set.write_to_path(&path).unwrap();

        let reread = SketchSet::read_from_path(&path).unwrap();
        assert_eq!(reread, set);
    }
}
