//! Section container writer.
//!
//! All payload bytes are staged in memory; nothing touches the filesystem
//! until [`ContainerWriter::finalize`], which assembles header, table and
//! payloads and flushes them in one go. An export that fails mid-encode
//! therefore never leaves a partial file behind.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use crate::util::{mat4_rows, quat_wxyz, Error, Result};

use super::format::{SectionId, HEADER_SIZE, SECTION_ALIGNMENT, TABLE_ENTRY_SIZE};

/// One entry of the section table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionRecord {
    pub id: SectionId,
    pub offset: u32,
    pub length: u32,
    pub alignment: u32,
}

/// In-memory payload cursor with the typed write helpers the legacy wire
/// format is written in terms of. Infallible: it only grows a buffer.
#[derive(Debug, Default)]
pub struct SectionBuffer {
    data: Vec<u8>,
}

impl SectionBuffer {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    #[inline]
    pub fn write_u8(&mut self, v: u8) {
        self.data.push(v);
    }

    #[inline]
    pub fn write_u16(&mut self, v: u16) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    #[inline]
    pub fn write_u32(&mut self, v: u32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    #[inline]
    pub fn write_i32(&mut self, v: i32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    #[inline]
    pub fn write_f32(&mut self, v: f32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    /// NUL-terminated string.
    pub fn write_cstr(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
        self.data.push(0);
    }

    /// Fixed-length string field: truncated to `len` bytes, zero-padded.
    pub fn write_fixed_str(&mut self, s: &str, len: usize) {
        let bytes = s.as_bytes();
        let take = bytes.len().min(len);
        self.data.extend_from_slice(&bytes[..take]);
        self.data.resize(self.data.len() + (len - take), 0);
    }

    /// Length-prefixed path field (`u32 len + bytes`, no terminator).
    pub fn write_path(&mut self, s: &str) {
        self.write_u32(s.len() as u32);
        self.data.extend_from_slice(s.as_bytes());
    }

    #[inline]
    pub fn write_vec2(&mut self, v: Vec2) {
        self.write_f32(v.x);
        self.write_f32(v.y);
    }

    #[inline]
    pub fn write_vec3(&mut self, v: Vec3) {
        self.write_f32(v.x);
        self.write_f32(v.y);
        self.write_f32(v.z);
    }

    #[inline]
    pub fn write_vec4(&mut self, v: Vec4) {
        self.write_f32(v.x);
        self.write_f32(v.y);
        self.write_f32(v.z);
        self.write_f32(v.w);
    }

    /// Quaternion in wire order (w, x, y, z).
    pub fn write_quat(&mut self, q: Quat) {
        for c in quat_wxyz(q) {
            self.write_f32(c);
        }
    }

    /// 4x4 matrix, 16 floats row-major.
    pub fn write_mat4(&mut self, m: &Mat4) {
        for c in mat4_rows(m) {
            self.write_f32(c);
        }
    }
}

/// Generic section container writer: file header, section table, payload
/// blocks, alignment padding. No domain knowledge.
///
/// Sections are never nested, interleaved or reordered; the table order is
/// the order sections were attached in. Misusing the writer (writing with no
/// open section, opening while open, or any write after [`finalize`]) is a
/// programming error and panics.
///
/// [`finalize`]: ContainerWriter::finalize
pub struct ContainerWriter {
    path: PathBuf,
    magic: u32,
    version: u32,
    header_written: bool,
    sections: Vec<(SectionId, SectionBuffer)>,
    open: Option<SectionId>,
    finalized: bool,
}

impl ContainerWriter {
    /// Stage a writer for the given destination. No I/O happens here.
    pub fn create(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            magic: 0,
            version: 0,
            header_written: false,
            sections: Vec::new(),
            open: None,
            finalized: false,
        }
    }

    /// Stamp the file header fields. Must precede the first section.
    pub fn write_header(&mut self, magic: u32, version: u32) {
        self.assert_writable();
        assert!(self.sections.is_empty() && self.open.is_none(), "header must precede sections");
        self.magic = magic;
        self.version = version;
        self.header_written = true;
    }

    /// Open a section and return its write cursor. Only one section may be
    /// open at a time. A duplicate id is rejected: one record per id.
    pub fn open_section(&mut self, id: SectionId) -> Result<&mut SectionBuffer> {
        self.assert_writable();
        assert!(self.header_written, "open_section before write_header");
        assert!(self.open.is_none(), "section {:?} still open", self.open);
        if self.sections.iter().any(|(existing, _)| *existing == id) {
            return Err(Error::encoding(format!("duplicate section id {:#06x}", id as u32)));
        }
        self.open = Some(id);
        self.sections.push((id, SectionBuffer::new()));
        Ok(&mut self.sections.last_mut().expect("just pushed").1)
    }

    /// Append raw bytes to the open section.
    pub fn append(&mut self, bytes: &[u8]) {
        self.cursor().write_bytes(bytes);
    }

    /// Write cursor of the open section.
    pub fn cursor(&mut self) -> &mut SectionBuffer {
        self.assert_writable();
        assert!(self.open.is_some(), "no section open");
        &mut self.sections.last_mut().expect("open section").1
    }

    /// Close the open section. Its record is fixed at finalize time, when
    /// offsets are known.
    pub fn close_section(&mut self) {
        self.assert_writable();
        assert!(self.open.take().is_some(), "no section to close");
    }

    /// Attach a privately filled buffer as a complete section. This is the
    /// merge point for encoders that ran into private buffers.
    pub fn push_section(&mut self, id: SectionId, buffer: SectionBuffer) -> Result<()> {
        self.assert_writable();
        assert!(self.header_written, "push_section before write_header");
        assert!(self.open.is_none(), "section {:?} still open", self.open);
        if self.sections.iter().any(|(existing, _)| *existing == id) {
            return Err(Error::encoding(format!("duplicate section id {:#06x}", id as u32)));
        }
        self.sections.push((id, buffer));
        Ok(())
    }

    /// Number of attached sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Assemble header + table + payloads and flush the file in one unit.
    ///
    /// Returns the section table as written. Any later write operation on
    /// this writer panics.
    pub fn finalize(&mut self) -> Result<Vec<SectionRecord>> {
        self.assert_writable();
        assert!(self.header_written, "finalize before write_header");
        assert!(self.open.is_none(), "section {:?} still open", self.open);
        self.finalized = true;

        let table_end = HEADER_SIZE + self.sections.len() * TABLE_ENTRY_SIZE;
        let mut records = Vec::with_capacity(self.sections.len());
        let mut offset = table_end as u32;
        for (id, buffer) in &self.sections {
            if offset % SECTION_ALIGNMENT != 0 {
                return Err(Error::Alignment {
                    id: *id as u32,
                    offset,
                    alignment: SECTION_ALIGNMENT,
                });
            }
            let length = buffer.len() as u32;
            records.push(SectionRecord { id: *id, offset, length, alignment: SECTION_ALIGNMENT });
            offset += length;
            offset += padding(length, SECTION_ALIGNMENT);
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        let mut out = BufWriter::with_capacity(1024 * 1024, file);

        out.write_u32::<LittleEndian>(self.magic)?;
        out.write_u32::<LittleEndian>(self.version)?;
        out.write_u32::<LittleEndian>(records.len() as u32)?;
        for record in &records {
            out.write_u32::<LittleEndian>(record.id as u32)?;
            out.write_u32::<LittleEndian>(record.offset)?;
            out.write_u32::<LittleEndian>(record.length)?;
        }
        for (_, buffer) in &self.sections {
            out.write_all(buffer.as_slice())?;
            let pad = padding(buffer.len() as u32, SECTION_ALIGNMENT);
            for _ in 0..pad {
                out.write_u8(0)?;
            }
        }
        out.flush()?;

        Ok(records)
    }

    #[inline]
    fn assert_writable(&self) {
        assert!(!self.finalized, "write operation on finalized container");
    }
}

/// Zero bytes needed to pad `length` up to `alignment`.
#[inline]
fn padding(length: u32, alignment: u32) -> u32 {
    (alignment - length % alignment) % alignment
}
