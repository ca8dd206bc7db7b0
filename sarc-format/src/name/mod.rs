use std::fmt;

mod error;

pub use self::error::IntoEntryNameError;

/// The name of an archive entry.
///
/// Names created through [`EntryName::new`] are non-empty and consist only of
/// printable ASCII (`0x20..=0x7e`), so they never carry the NUL that ends a
/// name on disk. Names read back from an archive are only required to be
/// ASCII.
#[derive(Debug, Clone, PartialOrd, Ord, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct EntryName(pub(crate) String);

impl EntryName {
    pub fn new<S: AsRef<str>>(name: S) -> std::result::Result<EntryName, IntoEntryNameError> {
        let name = name.as_ref();
        if name.is_empty() {
            return Err(IntoEntryNameError::Empty);
        }

        for (position, c) in name.char_indices() {
            if !c.is_ascii() {
                return Err(IntoEntryNameError::NonAscii { position });
            }
            if !(' '..='~').contains(&c) {
                return Err(IntoEntryNameError::Unprintable { position });
            }
        }

        Ok(EntryName(name.to_string()))
    }

    /// Wraps a name decoded from an archive, which has already been checked
    /// for ASCII by the codec.
    pub(crate) fn from_disk(name: String) -> EntryName {
        EntryName(name)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this name can be used as a single file name when extracting:
    /// no separators and not a `.` or `..` component.
    pub fn is_path_safe(&self) -> bool {
        !self.0.is_empty()
            && self.0 != "."
            && self.0 != ".."
            && !self.0.contains(['/', '\\'])
            && !self.0.bytes().any(|b| b.is_ascii_control())
    }
}

impl AsRef<str> for EntryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for EntryName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EntryName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl TryFrom<&str> for EntryName {
    type Error = IntoEntryNameError;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        EntryName::new(value)
    }
}

impl fmt::Display for EntryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
