//! Script names: OpenType script tag mapping and representative characters.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use fontweave_config::RepresentativeChars;

use crate::tag::Tag;

const OTF_SCRIPTS: &[(&[u8; 4], &str)] = &[
    (b"arab", "arabic"),
    (b"armn", "armenian"),
    (b"bali", "balinese"),
    (b"beng", "bengali"),
    (b"bng2", "bengali"),
    (b"bopo", "bopomofo"),
    (b"brai", "braille"),
    (b"bugi", "buginese"),
    (b"buhd", "buhid"),
    (b"cans", "canadian-aboriginal"),
    (b"cher", "cherokee"),
    (b"copt", "coptic"),
    (b"cyrl", "cyrillic"),
    (b"deva", "devanagari"),
    (b"dev2", "devanagari"),
    (b"dsrt", "deseret"),
    (b"ethi", "ethiopic"),
    (b"geor", "georgian"),
    (b"grek", "greek"),
    (b"gujr", "gujarati"),
    (b"gjr2", "gujarati"),
    (b"guru", "gurmukhi"),
    (b"gur2", "gurmukhi"),
    (b"hang", "hangul"),
    (b"hani", "han"),
    (b"hano", "hanunoo"),
    (b"hebr", "hebrew"),
    (b"ital", "old-italic"),
    (b"kana", "kana"),
    (b"khmr", "khmer"),
    (b"knda", "kannada"),
    (b"knd2", "kannada"),
    (b"lao ", "lao"),
    (b"latn", "latin"),
    (b"limb", "limbu"),
    (b"linb", "linear-b"),
    (b"mlym", "malayalam"),
    (b"mlm2", "malayalam"),
    (b"mong", "mongolian"),
    (b"mymr", "burmese"),
    (b"ogam", "ogham"),
    (b"orya", "oriya"),
    (b"ory2", "oriya"),
    (b"runr", "runic"),
    (b"sinh", "sinhala"),
    (b"syrc", "syriac"),
    (b"tagb", "tagbanwa"),
    (b"taml", "tamil"),
    (b"tml2", "tamil"),
    (b"telu", "telugu"),
    (b"tel2", "telugu"),
    (b"tglg", "tagalog"),
    (b"thaa", "thaana"),
    (b"thai", "thai"),
    (b"tibt", "tibetan"),
    (b"yi  ", "yi"),
];

/// Script name for an OpenType script tag (`latn` → `latin`).
pub fn otf_script_name(tag: Tag) -> Option<&'static str> {
    OTF_SCRIPTS
        .iter()
        .find(|(bytes, _)| Tag::from_bytes(bytes) == tag)
        .map(|(_, name)| *name)
}

enum Form {
    All,
    Any,
}

const DEFAULT_CHARS: &[(&str, Form, &[u32])] = &[
    ("latin", Form::All, &[0x41, 0x5A, 0x61, 0x7A]),
    ("phonetic", Form::All, &[0x250, 0x283]),
    ("greek", Form::All, &[0x3A9]),
    ("coptic", Form::All, &[0x3E2]),
    ("cyrillic", Form::All, &[0x42F]),
    ("armenian", Form::All, &[0x531]),
    ("hebrew", Form::All, &[0x5D0]),
    ("arabic", Form::All, &[0x628]),
    ("syriac", Form::All, &[0x710]),
    ("thaana", Form::All, &[0x78C]),
    ("devanagari", Form::All, &[0x915]),
    ("bengali", Form::All, &[0x995]),
    ("gurmukhi", Form::All, &[0xA15]),
    ("gujarati", Form::All, &[0xA95]),
    ("oriya", Form::All, &[0xB15]),
    ("tamil", Form::All, &[0xB95]),
    ("telugu", Form::All, &[0xC15]),
    ("kannada", Form::All, &[0xC95]),
    ("malayalam", Form::All, &[0xD15]),
    ("sinhala", Form::All, &[0xD95]),
    ("thai", Form::All, &[0xE17]),
    ("lao", Form::All, &[0xEA5]),
    ("tibetan", Form::All, &[0xF40]),
    ("burmese", Form::All, &[0x1000]),
    ("georgian", Form::All, &[0x10D3]),
    ("ethiopic", Form::All, &[0x1208]),
    ("cherokee", Form::All, &[0x13B6]),
    ("canadian-aboriginal", Form::All, &[0x14C0]),
    ("ogham", Form::All, &[0x168F]),
    ("runic", Form::All, &[0x16A0]),
    ("khmer", Form::All, &[0x1780]),
    ("mongolian", Form::All, &[0x1826]),
    ("symbol", Form::Any, &[0x201C, 0x2200, 0x2500]),
    ("braille", Form::All, &[0x2800]),
    ("cjk-misc", Form::All, &[0x300E]),
    ("kana", Form::All, &[0x304B]),
    ("bopomofo", Form::All, &[0x3105]),
    ("han", Form::Any, &[0x5B57, 0x6F22, 0x4E00]),
    ("yi", Form::All, &[0xA288]),
    ("hangul", Form::All, &[0xAC00]),
    ("linear-b", Form::All, &[0x10000]),
    ("old-italic", Form::All, &[0x10300]),
    ("deseret", Form::All, &[0x10400]),
];

fn builtin() -> &'static HashMap<&'static str, RepresentativeChars> {
    static BUILTIN: OnceLock<HashMap<&'static str, RepresentativeChars>> = OnceLock::new();
    BUILTIN.get_or_init(|| {
        DEFAULT_CHARS
            .iter()
            .map(|(name, form, cps)| {
                let chars = match form {
                    Form::All => RepresentativeChars::All(cps.to_vec()),
                    Form::Any => RepresentativeChars::Any(cps.to_vec()),
                };
                (*name, chars)
            })
            .collect()
    })
}

/// Representative characters per script: the built-in defaults with
/// configured overrides layered on top.
#[derive(Debug, Clone, Default)]
pub struct ScriptChars {
    overrides: HashMap<String, RepresentativeChars>,
}

impl ScriptChars {
    pub fn new(overrides: &BTreeMap<String, RepresentativeChars>) -> Self {
        Self {
            overrides: overrides
                .iter()
                .map(|(name, chars)| (name.to_ascii_lowercase(), chars.clone()))
                .collect(),
        }
    }

    /// Characters for `script`, matched case-insensitively.
    pub fn get(&self, script: &str) -> Option<&RepresentativeChars> {
        let key = script.to_ascii_lowercase();
        self.overrides
            .get(&key)
            .or_else(|| builtin().get(key.as_str()))
    }
}
