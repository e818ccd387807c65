//! Low-level BinSect container framing.
//!
//! A container is `header | section table | payloads`, little-endian, with
//! every payload start aligned to 4 bytes. The writer knows nothing about
//! payload contents; domain encoders fill [`SectionBuffer`]s and the write
//! order is always the order sections were attached in.

mod format;
mod reader;
mod writer;

pub use format::{
    SectionId, SectionRegistry, SectionSpec, CONTAINER_MAGIC, CONTAINER_VERSION, HEADER_SIZE,
    SECTION_ALIGNMENT, TABLE_ENTRY_SIZE,
};
pub use reader::Container;
pub use writer::{ContainerWriter, SectionBuffer, SectionRecord};
