//! Static table of legacy registry/encoding names.
//!
//! Each entry lists a handful of code points that only that encoding's
//! repertoire is likely to contain. A face supporting those "uniquifiers" is
//! assumed to support the encoding, which avoids enumerating full charsets.

use std::sync::OnceLock;

use regex::RegexBuilder;

use crate::charset::Charset;

/// One legacy registry entry.
pub struct CharsetEntry {
    /// Registry name, e.g. `iso8859-1`
    pub name: &'static str,
    uniquifier: &'static [u32],
    /// Language hint added to queries for this registry
    pub lang: Option<&'static str>,
    charset: OnceLock<Charset>,
}

impl CharsetEntry {
    const fn new(
        name: &'static str,
        uniquifier: &'static [u32],
        lang: Option<&'static str>,
    ) -> Self {
        Self {
            name,
            uniquifier,
            lang,
            charset: OnceLock::new(),
        }
    }

    pub fn uniquifier(&self) -> &'static [u32] {
        self.uniquifier
    }

    /// The uniquifier as a charset, built on first use.
    pub fn charset(&self) -> &Charset {
        self.charset
            .get_or_init(|| self.uniquifier.iter().copied().collect())
    }
}

static CHARSET_TABLE: [CharsetEntry; 37] = [
    CharsetEntry::new("iso8859-1", &[0x00A0, 0x00A1, 0x00B4, 0x00BC, 0x00D0], None),
    CharsetEntry::new("iso8859-2", &[0x00A0, 0x010E], None),
    CharsetEntry::new("iso8859-3", &[0x00A0, 0x0108], None),
    CharsetEntry::new("iso8859-4", &[0x00A0, 0x00AF, 0x0128, 0x0156, 0x02C7], None),
    CharsetEntry::new("iso8859-5", &[0x00A0, 0x0401], None),
    CharsetEntry::new("iso8859-6", &[0x00A0, 0x060C], None),
    CharsetEntry::new("iso8859-7", &[0x00A0, 0x0384], None),
    CharsetEntry::new("iso8859-8", &[0x00A0, 0x05D0], None),
    CharsetEntry::new("iso8859-9", &[0x00A0, 0x00A1, 0x00BC, 0x011E], None),
    CharsetEntry::new("iso8859-10", &[0x00A0, 0x00D0, 0x0128, 0x2015], None),
    CharsetEntry::new("iso8859-11", &[0x00A0, 0x0E01], None),
    CharsetEntry::new("iso8859-13", &[0x00A0, 0x201C], None),
    CharsetEntry::new("iso8859-14", &[0x00A0, 0x0174], None),
    CharsetEntry::new("iso8859-15", &[0x00A0, 0x00A1, 0x00D0, 0x0152], None),
    CharsetEntry::new("iso8859-16", &[0x00A0, 0x0218], None),
    CharsetEntry::new("gb2312.1980-0", &[0x4E13], Some("zh-cn")),
    CharsetEntry::new("big5-0", &[0xF6B1], Some("zh-tw")),
    CharsetEntry::new("jisx0208.1983-0", &[0x4E55], Some("ja")),
    CharsetEntry::new("ksc5601.1985-0", &[0xAC00], Some("ko")),
    CharsetEntry::new("cns11643.1992-1", &[0xFE32], Some("zh-tw")),
    CharsetEntry::new("cns11643.1992-2", &[0x4E33, 0x7934], None),
    CharsetEntry::new("cns11643.1992-3", &[0x201A9], None),
    CharsetEntry::new("cns11643.1992-4", &[0x20057], None),
    CharsetEntry::new("cns11643.1992-5", &[0x20000], None),
    CharsetEntry::new("cns11643.1992-6", &[0x20003], None),
    CharsetEntry::new("cns11643.1992-7", &[0x20055], None),
    CharsetEntry::new("gbk-0", &[0x4E06], Some("zh-cn")),
    CharsetEntry::new("jisx0212.1990-0", &[0x4E44], None),
    CharsetEntry::new("jisx0213.2000-1", &[0xFA10], Some("ja")),
    CharsetEntry::new("jisx0213.2000-2", &[0xFA49], None),
    CharsetEntry::new("jisx0213.2004-1", &[0x20B9F], None),
    CharsetEntry::new("viscii1.1-1", &[0x1EA0, 0x1EAE, 0x1ED2], Some("vi")),
    CharsetEntry::new("tis620.2529-1", &[0x0E01], Some("th")),
    CharsetEntry::new("windows-1251", &[0x0401, 0x0490], Some("ru")),
    CharsetEntry::new("koi8-r", &[0x0401, 0x2219], Some("ru")),
    CharsetEntry::new("mulelao-1", &[0x0E81], Some("lo")),
    CharsetEntry::new("unicode-sip", &[0x20000], None),
];

/// All entries in search order.
pub fn entries() -> &'static [CharsetEntry] {
    &CHARSET_TABLE
}

/// Registries that place no constraint on a face's charset.
pub fn is_unicode_registry(registry: &str) -> bool {
    ["ascii-0", "iso10646-1", "unicode-bmp"]
        .iter()
        .any(|name| name.eq_ignore_ascii_case(registry))
}

/// Find the first entry whose name matches the glob `registry`.
///
/// `*` matches any run and `?` any single character; everything else is
/// literal. The match is case-insensitive and unanchored.
pub fn lookup_registry(registry: &str) -> Option<&'static CharsetEntry> {
    let mut pattern = String::with_capacity(registry.len() * 2);
    for ch in registry.chars() {
        match ch {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            c => pattern.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    let re = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re,
        Err(e) => {
            log::warn!("Registry pattern {:?} did not compile: {}", registry, e);
            return None;
        }
    };
    CHARSET_TABLE.iter().find(|entry| re.is_match(entry.name))
}
