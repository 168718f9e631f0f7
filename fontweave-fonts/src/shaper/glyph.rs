//! Glyph records exchanged with callers of [`crate::Shaper`].

/// Glyph code of a character the face cannot map.
pub const INVALID_GLYPH: u32 = u32::MAX;

/// Placement correction attached to a glyph, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Adjustment {
    pub xoff: i32,
    pub yoff: i32,
    /// Delta to the natural advance, or the whole advance when
    /// `advance_is_absolute` is set
    pub xadv: i32,
    /// Relative index of the glyph this one attaches to (`-1` for the
    /// previous glyph), 0 for none
    pub back: i32,
    pub advance_is_absolute: bool,
}

/// One shaped glyph. Metrics are whole pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    /// Source character, 0 for glyphs synthesized by substitution
    pub c: u32,
    /// Glyph index, [`INVALID_GLYPH`] until encoded
    pub code: u32,
    /// First source character offset covered
    pub from: usize,
    /// Last source character offset covered
    pub to: usize,
    pub width: i32,
    pub lbearing: i32,
    pub rbearing: i32,
    pub ascent: i32,
    pub descent: i32,
    pub adjustment: Option<Adjustment>,
}

impl Glyph {
    /// An unencoded glyph for character `c` at offset `index`.
    pub fn from_char(c: u32, index: usize) -> Self {
        Self {
            c,
            code: INVALID_GLYPH,
            from: index,
            to: index,
            width: 0,
            lbearing: 0,
            rbearing: 0,
            ascent: 0,
            descent: 0,
            adjustment: None,
        }
    }

    pub fn is_encoded(&self) -> bool {
        self.code != INVALID_GLYPH
    }

    /// Pen advance after applying the adjustment.
    pub fn advance(&self) -> i32 {
        match self.adjustment {
            Some(adj) if adj.advance_is_absolute => adj.xadv,
            Some(adj) => self.width + adj.xadv,
            None => self.width,
        }
    }
}

/// An ordered run of glyphs, optionally bounded like a caller-allocated
/// glyph vector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GlyphString {
    glyphs: Vec<Glyph>,
    capacity: Option<usize>,
}

impl GlyphString {
    pub fn new() -> Self {
        Self::default()
    }

    /// One unencoded glyph per character, with character offsets as ranges.
    pub fn from_text(text: &str) -> Self {
        Self::from_chars(text.chars().map(u32::from))
    }

    pub fn from_chars(chars: impl IntoIterator<Item = u32>) -> Self {
        Self {
            glyphs: chars
                .into_iter()
                .enumerate()
                .map(|(i, c)| Glyph::from_char(c, i))
                .collect(),
            capacity: None,
        }
    }

    /// Declare the most glyphs shaping may produce.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn push(&mut self, glyph: Glyph) {
        self.glyphs.push(glyph);
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Total pen advance of the run.
    pub fn advance(&self) -> i32 {
        self.glyphs.iter().map(Glyph::advance).sum()
    }
}

impl FromIterator<Glyph> for GlyphString {
    fn from_iter<I: IntoIterator<Item = Glyph>>(iter: I) -> Self {
        Self {
            glyphs: iter.into_iter().collect(),
            capacity: None,
        }
    }
}

impl<'a> IntoIterator for &'a GlyphString {
    type Item = &'a Glyph;
    type IntoIter = std::slice::Iter<'a, Glyph>;

    fn into_iter(self) -> Self::IntoIter {
        self.glyphs.iter()
    }
}
