//! Read-back of finished containers.
//!
//! Decoding payloads is not a first-class feature of this crate; the reader
//! exists for the validation pipeline and CLI inspection, so it is lenient:
//! header and table must parse, but out-of-range payloads simply read as
//! absent and are left for the structural checker to report.

use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::Mmap;

use crate::util::{Error, Result};

use super::format::{SectionId, CONTAINER_MAGIC, HEADER_SIZE, TABLE_ENTRY_SIZE};

/// A section table entry as found in the file, id unresolved.
#[derive(Clone, Copy, Debug)]
pub struct RawRecord {
    pub id: u32,
    pub offset: u32,
    pub length: u32,
}

impl RawRecord {
    /// Resolve the raw tag against the known registry ids.
    pub fn section_id(&self) -> Option<SectionId> {
        SectionId::from_u32(self.id)
    }
}

/// A finished container, memory-mapped read-only.
pub struct Container {
    map: Mmap,
    version: u32,
    records: Vec<RawRecord>,
}

impl Container {
    /// Map a container file and parse its header and section table.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        // Read-only mapping of a file we never mutate while mapped.
        let map = unsafe { Mmap::map(&file)? };

        if map.len() < HEADER_SIZE {
            return Err(Error::UnexpectedEof(map.len() as u64));
        }
        let mut cursor = Cursor::new(&map[..]);
        let magic = cursor.read_u32::<LittleEndian>()?;
        if magic != CONTAINER_MAGIC {
            return Err(Error::InvalidMagic { expected: CONTAINER_MAGIC, actual: magic });
        }
        let version = cursor.read_u32::<LittleEndian>()?;
        let count = cursor.read_u32::<LittleEndian>()? as usize;

        let table_end = HEADER_SIZE + count * TABLE_ENTRY_SIZE;
        if map.len() < table_end {
            return Err(Error::UnexpectedEof(map.len() as u64));
        }
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            let id = cursor.read_u32::<LittleEndian>()?;
            let offset = cursor.read_u32::<LittleEndian>()?;
            let length = cursor.read_u32::<LittleEndian>()?;
            records.push(RawRecord { id, offset, length });
        }

        Ok(Self { map, version, records })
    }

    /// Container format version from the header.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Total file size in bytes.
    pub fn file_len(&self) -> usize {
        self.map.len()
    }

    /// The whole file as bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.map
    }

    /// Section table in file order.
    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    /// Payload bytes of a record, or `None` if its range falls outside the
    /// file (a structural violation, reported elsewhere).
    pub fn payload_of(&self, record: &RawRecord) -> Option<&[u8]> {
        let start = record.offset as usize;
        let end = start.checked_add(record.length as usize)?;
        self.map.get(start..end)
    }

    /// Payload bytes of the section with the given id, if present.
    pub fn payload(&self, id: SectionId) -> Option<&[u8]> {
        let record = self.records.iter().find(|r| r.id == id as u32)?;
        self.payload_of(record)
    }

    /// The record whose span (padding included) encloses a file offset.
    /// Offsets inside the header or table resolve to `None`.
    pub fn enclosing_section(&self, file_offset: u64) -> Option<&RawRecord> {
        let mut found = None;
        for record in &self.records {
            if u64::from(record.offset) <= file_offset {
                found = Some(record);
            } else {
                break;
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::format::CONTAINER_VERSION;
    use crate::container::writer::ContainerWriter;
    use tempfile::NamedTempFile;

    #[test]
    fn test_roundtrip_table() -> Result<()> {
        let temp = NamedTempFile::new()?;
        let mut writer = ContainerWriter::create(temp.path());
        writer.write_header(CONTAINER_MAGIC, CONTAINER_VERSION);
        writer.open_section(SectionId::Mesh)?.write_u32(42);
        writer.close_section();
        let records = writer.finalize()?;

        let container = Container::open(temp.path())?;
        assert_eq!(container.version(), CONTAINER_VERSION);
        assert_eq!(container.records().len(), 1);
        assert_eq!(container.records()[0].id, SectionId::Mesh as u32);
        assert_eq!(container.records()[0].offset, records[0].offset);
        assert_eq!(container.payload(SectionId::Mesh), Some(&42u32.to_le_bytes()[..]));
        Ok(())
    }

    #[test]
    fn test_bad_magic_rejected() -> Result<()> {
        let temp = NamedTempFile::new()?;
        std::fs::write(temp.path(), [0u8; 16])?;
        match Container::open(temp.path()) {
            Err(Error::InvalidMagic { .. }) => Ok(()),
            other => panic!("expected InvalidMagic, got {:?}", other.map(|_| ())),
        }
    }
}
