//! Four-byte OpenType tags (`latn`, `liga`, `DFLT`, ...).

use std::fmt;
use std::str::FromStr;

use crate::error::SpecError;

/// An OpenType tag stored big-endian in a `u32`, as the font tables store it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u32);

impl Tag {
    /// The default script tag used when a request names none.
    pub const DFLT: Tag = Tag::from_bytes(b"DFLT");

    pub const fn from_bytes(bytes: &[u8; 4]) -> Self {
        Tag(u32::from_be_bytes(*bytes))
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Parse one to four printable ASCII characters, padding short tags with
    /// spaces (`"kern"`, `"lao"` → `"lao "`).
    pub fn parse(text: &str) -> Result<Self, SpecError> {
        let bytes = text.as_bytes();
        if bytes.is_empty()
            || bytes.len() > 4
            || !bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ')
        {
            return Err(SpecError::InvalidTag(text.to_string()));
        }
        let mut tag = [b' '; 4];
        tag[..bytes.len()].copy_from_slice(bytes);
        Ok(Tag::from_bytes(&tag))
    }
}

impl FromStr for Tag {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tag::parse(s)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.to_bytes() {
            let c = if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '?'
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}

impl From<rustybuzz::ttf_parser::Tag> for Tag {
    fn from(tag: rustybuzz::ttf_parser::Tag) -> Self {
        Tag(tag.0)
    }
}

impl From<Tag> for rustybuzz::ttf_parser::Tag {
    fn from(tag: Tag) -> Self {
        rustybuzz::ttf_parser::Tag(tag.0)
    }
}
