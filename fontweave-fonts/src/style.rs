//! Numeric style scales shared with fontconfig-style matching engines.
//!
//! Entity and spec slants are the engine slant plus 100, so roman is 100 and
//! anything below 100 is a "reverse" slant the resolver refuses.

/// Weight scale (`FC_WEIGHT_*`).
pub mod weight {
    pub const THIN: i32 = 0;
    pub const EXTRALIGHT: i32 = 40;
    pub const LIGHT: i32 = 50;
    pub const DEMILIGHT: i32 = 55;
    pub const BOOK: i32 = 75;
    pub const REGULAR: i32 = 80;
    pub const MEDIUM: i32 = 100;
    pub const DEMIBOLD: i32 = 180;
    pub const BOLD: i32 = 200;
    pub const EXTRABOLD: i32 = 205;
    pub const BLACK: i32 = 210;
    pub const EXTRABLACK: i32 = 215;
}

/// Slant scale as seen by specs and entities (engine slant + 100).
pub mod slant {
    pub const ROMAN: i32 = 100;
    pub const ITALIC: i32 = 200;
    pub const OBLIQUE: i32 = 210;

    /// Offset between spec/entity slants and engine slants.
    pub const ENGINE_OFFSET: i32 = 100;
}

/// Width scale (`FC_WIDTH_*`).
pub mod width {
    pub const ULTRACONDENSED: i32 = 50;
    pub const EXTRACONDENSED: i32 = 63;
    pub const CONDENSED: i32 = 75;
    pub const SEMICONDENSED: i32 = 87;
    pub const NORMAL: i32 = 100;
    pub const SEMIEXPANDED: i32 = 113;
    pub const EXPANDED: i32 = 125;
    pub const EXTRAEXPANDED: i32 = 150;
    pub const ULTRAEXPANDED: i32 = 200;
}

/// Spacing classes.
pub mod spacing {
    pub const PROPORTIONAL: i32 = 0;
    pub const DUAL: i32 = 90;
    pub const MONO: i32 = 100;
    pub const CHARCELL: i32 = 110;
}

/// Engine slants reported for fontdb styles.
pub mod engine_slant {
    pub const ROMAN: i32 = 0;
    pub const ITALIC: i32 = 100;
    pub const OBLIQUE: i32 = 110;
}

const WIDTH_NAMES: &[(&str, i32)] = &[
    ("ultra-condensed", width::ULTRACONDENSED),
    ("ultracondensed", width::ULTRACONDENSED),
    ("extra-condensed", width::EXTRACONDENSED),
    ("extracondensed", width::EXTRACONDENSED),
    ("condensed", width::CONDENSED),
    ("compressed", width::CONDENSED),
    ("narrow", width::CONDENSED),
    ("semi-condensed", width::SEMICONDENSED),
    ("semicondensed", width::SEMICONDENSED),
    ("demi-condensed", width::SEMICONDENSED),
    ("normal", width::NORMAL),
    ("medium", width::NORMAL),
    ("semi-expanded", width::SEMIEXPANDED),
    ("semiexpanded", width::SEMIEXPANDED),
    ("demi-expanded", width::SEMIEXPANDED),
    ("expanded", width::EXPANDED),
    ("extra-expanded", width::EXTRAEXPANDED),
    ("extraexpanded", width::EXTRAEXPANDED),
    ("wide", width::EXTRAEXPANDED),
    ("ultra-expanded", width::ULTRAEXPANDED),
    ("ultraexpanded", width::ULTRAEXPANDED),
];

/// Width value for a width name such as `semi-condensed`, ignoring case.
pub fn width_from_name(name: &str) -> Option<i32> {
    WIDTH_NAMES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, value)| *value)
}

// fontconfig's FcWeightFromOpenType table: (engine weight, CSS weight)
const WEIGHT_MAP: &[(i32, i32)] = &[
    (weight::THIN, 100),
    (weight::EXTRALIGHT, 200),
    (weight::LIGHT, 300),
    (weight::DEMILIGHT, 350),
    (weight::BOOK, 380),
    (weight::REGULAR, 400),
    (weight::MEDIUM, 500),
    (weight::DEMIBOLD, 600),
    (weight::BOLD, 700),
    (weight::EXTRABOLD, 800),
    (weight::BLACK, 900),
    (weight::EXTRABLACK, 1000),
];

fn interpolate(value: i32, from: (i32, i32), to: (i32, i32)) -> i32 {
    let (x0, y0) = from;
    let (x1, y1) = to;
    y0 + (value - x0) * (y1 - y0) / (x1 - x0)
}

/// Convert a CSS/OpenType weight (100..=1000) to the engine scale.
pub fn weight_from_css(css: u16) -> i32 {
    let css = i32::from(css).clamp(100, 1000);
    for pair in WEIGHT_MAP.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if css <= hi.1 {
            return interpolate(css, (lo.1, lo.0), (hi.1, hi.0));
        }
    }
    weight::EXTRABLACK
}

/// Convert an engine weight to a CSS/OpenType weight.
pub fn weight_to_css(value: i32) -> u16 {
    let value = value.clamp(weight::THIN, weight::EXTRABLACK);
    for pair in WEIGHT_MAP.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if value <= hi.0 {
            return interpolate(value, lo, hi) as u16;
        }
    }
    1000
}

pub fn width_from_stretch(stretch: fontdb::Stretch) -> i32 {
    match stretch {
        fontdb::Stretch::UltraCondensed => width::ULTRACONDENSED,
        fontdb::Stretch::ExtraCondensed => width::EXTRACONDENSED,
        fontdb::Stretch::Condensed => width::CONDENSED,
        fontdb::Stretch::SemiCondensed => width::SEMICONDENSED,
        fontdb::Stretch::Normal => width::NORMAL,
        fontdb::Stretch::SemiExpanded => width::SEMIEXPANDED,
        fontdb::Stretch::Expanded => width::EXPANDED,
        fontdb::Stretch::ExtraExpanded => width::EXTRAEXPANDED,
        fontdb::Stretch::UltraExpanded => width::ULTRAEXPANDED,
    }
}

/// Nearest fontdb stretch for a width value.
pub fn stretch_from_width(value: i32) -> fontdb::Stretch {
    match value {
        v if v < 57 => fontdb::Stretch::UltraCondensed,
        v if v < 69 => fontdb::Stretch::ExtraCondensed,
        v if v < 81 => fontdb::Stretch::Condensed,
        v if v < 94 => fontdb::Stretch::SemiCondensed,
        v if v < 107 => fontdb::Stretch::Normal,
        v if v < 119 => fontdb::Stretch::SemiExpanded,
        v if v < 138 => fontdb::Stretch::Expanded,
        v if v < 175 => fontdb::Stretch::ExtraExpanded,
        _ => fontdb::Stretch::UltraExpanded,
    }
}

pub fn engine_slant_from_style(style: fontdb::Style) -> i32 {
    match style {
        fontdb::Style::Normal => engine_slant::ROMAN,
        fontdb::Style::Italic => engine_slant::ITALIC,
        fontdb::Style::Oblique => engine_slant::OBLIQUE,
    }
}

pub fn style_from_engine_slant(value: i32) -> fontdb::Style {
    if value >= engine_slant::OBLIQUE {
        fontdb::Style::Oblique
    } else if value >= engine_slant::ITALIC {
        fontdb::Style::Italic
    } else {
        fontdb::Style::Normal
    }
}
