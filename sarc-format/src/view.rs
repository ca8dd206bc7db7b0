//! Zero-copy, read-only access to an archive that is already in memory.
//!
//! [`ArchiveView`] borrows the archive bytes (a buffer or a memory map) and
//! decodes headers on demand, handing out slices of the original data for
//! entry bodies. Nothing is allocated and nothing is validated beyond what a
//! lookup touches.

use crate::header::{ArchiveHeader, EntryHeader};
use crate::parse::{parse_cstr, parse_header, parse_u32_be, ParseError};

/// A parsed archive header over borrowed bytes.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveView<'a> {
    data: &'a [u8],
    version: u32,
    entry_count: u32,
}

/// One entry of an [`ArchiveView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryRef<'a> {
    pub index: usize,
    pub name: &'a str,
    pub alignment: u32,
    /// Absolute offset of the entry header.
    pub header_offset: u64,
    /// Absolute offset of the first body byte.
    pub body_offset: u64,
    pub data: &'a [u8],
}

impl EntryRef<'_> {
    /// Zero bytes between the end of the name and the start of the body.
    pub fn padding(&self) -> u64 {
        let name_end = self.header_offset + EntryHeader::<()>::FIXED_SIZE + self.name.len() as u64 + 1;
        self.body_offset.saturating_sub(name_end)
    }

    pub fn is_aligned(&self) -> bool {
        self.body_offset % u64::from(self.alignment) == 0
    }
}

impl<'a> ArchiveView<'a> {
    /// Checks the header and that the offset table fits in `data`.
    pub fn parse(data: &'a [u8]) -> Result<Self, ParseError> {
        let (header, _) = parse_header(data)?;

        let table_end = ArchiveHeader::table_end(u64::from(header.entry_count));
        let len = data.len() as u64;
        if len < table_end {
            return Err(ParseError::NeedMoreBytes((table_end - len) as usize));
        }

        Ok(ArchiveView {
            data,
            version: header.version,
            entry_count: header.entry_count,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entry_count as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Decodes entry `index`, or `None` when it is out of range.
    pub fn get(&self, index: usize) -> Result<Option<EntryRef<'a>>, ParseError> {
        if index >= self.len() {
            return Ok(None);
        }

        let slot = ArchiveHeader::slot_offset(index as u64) as usize;
        let (header_offset, _) = parse_u32_be(&self.data[slot..])?;
        let header_offset = u64::from(header_offset);

        let header = self
            .tail(header_offset)
            .ok_or(ParseError::InvalidData("entry header offset out of range"))?;
        let (body_rel, _) = parse_u32_be(header)?;
        let (length, _) = parse_u32_be(&header[4.min(header.len())..])?;
        let (alignment, _) = parse_u32_be(&header[8.min(header.len())..])?;
        let fixed = EntryHeader::<()>::FIXED_SIZE as usize;
        let (name, _) = parse_cstr(&header[fixed.min(header.len())..])?;

        if !alignment.is_power_of_two() {
            return Err(ParseError::InvalidData("alignment is not a power of two"));
        }

        let body_offset = header_offset + u64::from(body_rel);
        let body = self
            .tail(body_offset)
            .ok_or(ParseError::InvalidData("entry body offset out of range"))?;
        let data = body
            .get(..length as usize)
            .ok_or_else(|| ParseError::NeedMoreBytes(length as usize - body.len()))?;

        Ok(Some(EntryRef {
            index,
            name,
            alignment,
            header_offset,
            body_offset,
            data,
        }))
    }

    /// Linear search for an entry by exact name.
    pub fn find(&self, name: &str) -> Result<Option<EntryRef<'a>>, ParseError> {
        for entry in self.iter() {
            let entry = entry?;
            if entry.name == name {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    pub fn iter(&self) -> Iter<'a> {
        Iter {
            view: *self,
            index: 0,
        }
    }

    fn tail(&self, offset: u64) -> Option<&'a [u8]> {
        let offset = usize::try_from(offset).ok()?;
        self.data.get(offset..)
    }
}

impl<'a> IntoIterator for &ArchiveView<'a> {
    type Item = Result<EntryRef<'a>, ParseError>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Iter<'a> {
    view: ArchiveView<'a>,
    index: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = Result<EntryRef<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.view.get(self.index).transpose()?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.view.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}
