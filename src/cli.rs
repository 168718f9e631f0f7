//! Command-line interface for fontweave.
//!
//! Each subcommand builds a [`FontSpec`] from the query flags, runs it through
//! the resolver, and prints plain text lines to the given writer.

use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fontweave_config::{Config, LogLevel};
use fontweave_fonts::layout::ScriptFeatures;
use fontweave_fonts::style::{slant, spacing, weight, width_from_name};
use fontweave_fonts::{
    FaceCache, FontEntity, FontSpec, FontdbEngine, Glyph, GlyphString, OpenTypeSpec,
    OtLayoutEngine, Resolver, Shaper, SwashProvider,
};

/// fontweave - Font candidate resolution and OpenType shaping
#[derive(Parser, Debug)]
#[command(name = "fontweave")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of ~/.config/fontweave/config.yaml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", value_parser = parse_log_level)]
    pub log_level: Option<LogLevel>,

    /// Extra directory to load fonts from (repeatable)
    #[arg(long = "font-dir", global = true, value_name = "DIR")]
    pub font_dirs: Vec<PathBuf>,

    /// Do not load the system's installed fonts
    #[arg(long, global = true)]
    pub no_system_fonts: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every known font family once
    Families,
    /// List the faces matching a query, best first
    List {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Print the single best face for a query
    Match {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Shape text with the best face for a query
    Shape {
        /// Text to shape
        #[arg(long)]
        text: String,

        #[command(flatten)]
        query: QueryArgs,
    },
    /// Print the GSUB/GPOS scripts, language systems, and features of the best face
    Capability {
        #[command(flatten)]
        query: QueryArgs,
    },
}

/// Font query flags shared by the subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Family name, or a generic alias (monospace, sans-serif, sans, mono)
    #[arg(long)]
    pub family: Option<String>,

    #[arg(long)]
    pub foundry: Option<String>,

    /// Weight name (regular, bold, ...) or engine value
    #[arg(long, value_parser = parse_weight)]
    pub weight: Option<i32>,

    /// Slant name (roman, italic, oblique) or value (roman is 100)
    #[arg(long, value_parser = parse_slant)]
    pub slant: Option<i32>,

    /// Width name (condensed, expanded, ...) or engine value
    #[arg(long, value_parser = parse_width)]
    pub width: Option<i32>,

    /// Pixel size
    #[arg(long)]
    pub size: Option<u32>,

    /// Spacing name (proportional, dual, mono, charcell) or engine value
    #[arg(long, value_parser = parse_spacing)]
    pub spacing: Option<i32>,

    /// Legacy registry/encoding, e.g. iso8859-1 or jisx0208*
    #[arg(long)]
    pub registry: Option<String>,

    /// Script name, e.g. latin or han
    #[arg(long)]
    pub script: Option<String>,

    /// Language tag (repeatable)
    #[arg(long = "lang")]
    pub languages: Vec<String>,

    #[arg(long)]
    pub adstyle: Option<String>,

    /// OpenType request SCRIPT[:LANGSYS[:GSUB[:GPOS]]], e.g. latn::liga,kern:kern
    #[arg(long)]
    pub otf: Option<OpenTypeSpec>,

    #[arg(long)]
    pub dpi: Option<u32>,

    /// Require (true) or refuse (false) scalable faces
    #[arg(long)]
    pub scalable: Option<bool>,
}

impl QueryArgs {
    pub fn to_spec(&self) -> FontSpec {
        let mut builder = FontSpec::builder();
        if let Some(family) = &self.family {
            builder = builder.family(family.as_str());
        }
        if let Some(foundry) = &self.foundry {
            builder = builder.foundry(foundry.as_str());
        }
        if let Some(value) = self.weight {
            builder = builder.weight(value);
        }
        if let Some(value) = self.slant {
            builder = builder.slant(value);
        }
        if let Some(value) = self.width {
            builder = builder.width(value);
        }
        if let Some(size) = self.size {
            builder = builder.pixel_size(size);
        }
        if let Some(value) = self.spacing {
            builder = builder.spacing(value);
        }
        if let Some(registry) = &self.registry {
            builder = builder.registry(registry.as_str());
        }
        if let Some(script) = &self.script {
            builder = builder.script(script.as_str());
        }
        for lang in &self.languages {
            builder = builder.language(lang.as_str());
        }
        if let Some(adstyle) = &self.adstyle {
            builder = builder.adstyle(adstyle.as_str());
        }
        if let Some(otf) = &self.otf {
            builder = builder.otf(otf.clone());
        }
        if let Some(dpi) = self.dpi {
            builder = builder.dpi(dpi);
        }
        if let Some(scalable) = self.scalable {
            builder = builder.scalable(scalable);
        }
        builder.build()
    }
}

fn parse_log_level(s: &str) -> Result<LogLevel, String> {
    LogLevel::from_name(s).ok_or_else(|| format!("unknown log level {:?}", s))
}

fn parse_named(s: &str, names: &[(&str, i32)], what: &str) -> Result<i32, String> {
    if let Ok(value) = s.trim().parse::<i32>() {
        return Ok(value);
    }
    names
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(s.trim()))
        .map(|(_, value)| *value)
        .ok_or_else(|| format!("unknown {} {:?}", what, s))
}

fn parse_weight(s: &str) -> Result<i32, String> {
    const NAMES: &[(&str, i32)] = &[
        ("thin", weight::THIN),
        ("extralight", weight::EXTRALIGHT),
        ("light", weight::LIGHT),
        ("demilight", weight::DEMILIGHT),
        ("book", weight::BOOK),
        ("regular", weight::REGULAR),
        ("normal", weight::REGULAR),
        ("medium", weight::MEDIUM),
        ("demibold", weight::DEMIBOLD),
        ("semibold", weight::DEMIBOLD),
        ("bold", weight::BOLD),
        ("extrabold", weight::EXTRABOLD),
        ("black", weight::BLACK),
        ("extrablack", weight::EXTRABLACK),
    ];
    parse_named(s, NAMES, "weight")
}

fn parse_slant(s: &str) -> Result<i32, String> {
    const NAMES: &[(&str, i32)] = &[
        ("roman", slant::ROMAN),
        ("italic", slant::ITALIC),
        ("oblique", slant::OBLIQUE),
    ];
    parse_named(s, NAMES, "slant")
}

fn parse_width(s: &str) -> Result<i32, String> {
    match width_from_name(s.trim()) {
        Some(value) => Ok(value),
        None => parse_named(s, &[], "width"),
    }
}

fn parse_spacing(s: &str) -> Result<i32, String> {
    const NAMES: &[(&str, i32)] = &[
        ("proportional", spacing::PROPORTIONAL),
        ("dual", spacing::DUAL),
        ("mono", spacing::MONO),
        ("charcell", spacing::CHARCELL),
    ];
    parse_named(s, NAMES, "spacing")
}

/// Load the config named by `--config` (or the default path) and apply the
/// font source flags on top of it.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.font_dirs.extend(cli.font_dirs.iter().cloned());
    if cli.no_system_fonts {
        config.load_system_fonts = false;
    }
    Ok(config)
}

/// Resolver over the fontdb engine, swash faces, and ttf-parser layout tables.
pub fn build_resolver(config: &Config) -> Resolver {
    let cache = Rc::new(FaceCache::new(
        Box::new(SwashProvider::new()),
        Box::new(OtLayoutEngine::new()),
    ));
    Resolver::from_config(Box::new(FontdbEngine::from_config(config)), cache, config)
}

/// Run `command`, writing its output to `out`. Returns the process exit code.
pub fn run(command: &Commands, config: &Config, out: &mut dyn Write) -> Result<i32> {
    let resolver = build_resolver(config);
    match command {
        Commands::Families => {
            for family in resolver.list_families() {
                writeln!(out, "{}", family)?;
            }
            Ok(0)
        }
        Commands::List { query } => {
            for entity in resolver.list_candidates(&query.to_spec()) {
                writeln!(out, "{}", format_entity(&entity))?;
            }
            Ok(0)
        }
        Commands::Match { query } => match resolver.match_best(&query.to_spec()) {
            Some(entity) => {
                writeln!(out, "{}", format_entity(&entity))?;
                Ok(0)
            }
            None => {
                eprintln!("fontweave: no font matches the query");
                Ok(1)
            }
        },
        Commands::Shape { text, query } => shape(&resolver, config, text, query, out),
        Commands::Capability { query } => capability(&resolver, config, query, out),
    }
}

fn shape(
    resolver: &Resolver,
    config: &Config,
    text: &str,
    query: &QueryArgs,
    out: &mut dyn Write,
) -> Result<i32> {
    let Some(entity) = resolver.match_best(&query.to_spec()) else {
        eprintln!("fontweave: no font matches the query");
        return Ok(1);
    };
    let size = query.size.unwrap_or(config.default_pixel_size);
    let font = resolver
        .cache()
        .open_font(&entity, size)
        .with_context(|| format!("Failed to open {} at {}px", entity.key, size))?;

    let otf = query.otf.clone().unwrap_or_default();
    let shaped = Shaper::new(config)
        .shape(&font, &GlyphString::from_text(text), &otf)
        .with_context(|| format!("Failed to shape {:?}", text))?;

    writeln!(out, "# {} at {}px", format_entity(&entity), font.pixel_size())?;
    for (i, glyph) in shaped.glyphs().iter().enumerate() {
        writeln!(out, "{}\t{}", i, format_glyph(glyph))?;
    }
    writeln!(out, "# advance {}", shaped.advance())?;
    Ok(0)
}

fn capability(
    resolver: &Resolver,
    config: &Config,
    query: &QueryArgs,
    out: &mut dyn Write,
) -> Result<i32> {
    let Some(entity) = resolver.match_best(&query.to_spec()) else {
        eprintln!("fontweave: no font matches the query");
        return Ok(1);
    };
    let size = query.size.unwrap_or(config.default_pixel_size);
    let font = resolver
        .cache()
        .open_font(&entity, size)
        .with_context(|| format!("Failed to open {} at {}px", entity.key, size))?;

    writeln!(out, "# {}", format_entity(&entity))?;
    match font.otf_capability() {
        Some(capability) => {
            write_stage(out, "GSUB", capability.gsub.as_deref())?;
            write_stage(out, "GPOS", capability.gpos.as_deref())?;
        }
        None => writeln!(out, "no OpenType layout tables")?,
    }
    Ok(0)
}

/// Whether `err` comes from writing into a closed pipe, as when output is
/// piped into `head`.
pub fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<std::io::Error>())
        .any(|e| e.kind() == std::io::ErrorKind::BrokenPipe)
}

fn write_stage(out: &mut dyn Write, name: &str, scripts: Option<&[ScriptFeatures]>) -> Result<()> {
    let Some(scripts) = scripts else {
        writeln!(out, "{}: none", name)?;
        return Ok(());
    };
    writeln!(out, "{}:", name)?;
    for script in scripts {
        writeln!(out, "  {}", script.script)?;
        for langsys in &script.langsyses {
            let tag = langsys
                .langsys
                .map_or_else(|| "(default)".to_string(), |t| t.to_string());
            let features: Vec<String> = langsys.features.iter().map(ToString::to_string).collect();
            writeln!(out, "    {}: {}", tag, features.join(" "))?;
        }
    }
    Ok(())
}

fn field<T: ToString>(name: &str, value: Option<T>) -> Option<String> {
    value.map(|v| format!("{}={}", name, v.to_string()))
}

/// One entity per line: key, family, then the known style fields.
pub fn format_entity(entity: &FontEntity) -> String {
    let fields: Vec<String> = [
        field("foundry", entity.foundry.as_deref()),
        field("weight", entity.weight),
        field("slant", entity.slant),
        field("width", entity.width),
        field("spacing", entity.spacing),
        (entity.pixel_size > 0).then(|| format!("size={}", entity.pixel_size)),
        field("avgwidth", entity.average_width),
        field("adstyle", entity.adstyle.as_deref()).filter(|_| entity.adstyle.as_deref() != Some("")),
        Some(format!("format={}", entity.format)),
    ]
    .into_iter()
    .flatten()
    .collect();
    format!(
        "{}\t{}\t{}",
        entity.key,
        entity.family.as_deref().unwrap_or("?"),
        fields.join(" ")
    )
}

/// One shaped glyph per line, with its adjustment when it has one.
pub fn format_glyph(glyph: &Glyph) -> String {
    let c = match glyph.c {
        0 => "-".to_string(),
        c => format!("U+{:04X}", c),
    };
    let mut line = format!(
        "{}\tcode={}\tchars={}..={}\twidth={} lbearing={} rbearing={} ascent={} descent={}",
        c,
        glyph.code,
        glyph.from,
        glyph.to,
        glyph.width,
        glyph.lbearing,
        glyph.rbearing,
        glyph.ascent,
        glyph.descent
    );
    if let Some(adj) = glyph.adjustment {
        line.push_str(&format!(
            "\txoff={} yoff={} xadv={}{} back={}",
            adj.xoff,
            adj.yoff,
            adj.xadv,
            if adj.advance_is_absolute { "!" } else { "" },
            adj.back
        ));
    }
    line
}
