use crate::codec::Writer;

// 's', 'a', 'r', 'c'
pub(crate) const MAGIC_BYTES: &[u8; 4] = b"sarc";
pub const VERSION: u32 = 1;

/// Width of one slot in the offset table that follows the archive header.
pub const OFFSET_SLOT_SIZE: u64 = 4;

/// The fixed archive header: magic, format version and entry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveHeader {
    pub version: u32,
    pub entry_count: u32,
}

impl ArchiveHeader {
    pub const SIZE: u64 = 12;

    pub(crate) fn new(entry_count: u32) -> ArchiveHeader {
        ArchiveHeader {
            version: VERSION,
            entry_count,
        }
    }

    /// Offset of the table slot holding the header address of entry `index`.
    #[inline]
    pub fn slot_offset(index: u64) -> u64 {
        Self::SIZE + OFFSET_SLOT_SIZE * index
    }

    /// First byte after the offset table of an archive with `entry_count` entries.
    #[inline]
    pub fn table_end(entry_count: u64) -> u64 {
        Self::slot_offset(entry_count)
    }

    pub(crate) fn write(&self, writer: &mut Writer<'_>) -> std::io::Result<()> {
        writer.write_bytes(MAGIC_BYTES)?;
        writer.write_u32(self.version)?;
        writer.write_u32(self.entry_count)
    }
}

/// Per-entry header stored at the address named by the offset table.
///
/// The three fixed fields are followed by the NUL-terminated name and zero
/// padding up to the aligned body start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryHeader<N> {
    /// Distance from the start of this header to the first body byte.
    pub body_offset: u32,
    pub length: u32,
    pub alignment: u32,
    pub name: N,
}

impl<N> EntryHeader<N> {
    pub const FIXED_SIZE: u64 = 12;
}
