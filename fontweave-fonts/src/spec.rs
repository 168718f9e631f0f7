//! Font query descriptors.

use crate::otspec::OpenTypeSpec;

/// An immutable font query.
///
/// Style axes use the scales in [`crate::style`]. A pixel size of 0 accepts
/// any size; an average width of 0 asks for scalable faces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontSpec {
    family: Option<String>,
    foundry: Option<String>,
    weight: Option<i32>,
    slant: Option<i32>,
    width: Option<i32>,
    pixel_size: u32,
    spacing: Option<i32>,
    registry: Option<String>,
    script: Option<String>,
    languages: Vec<String>,
    otf: Option<OpenTypeSpec>,
    adstyle: Option<String>,
    dpi: Option<u32>,
    average_width: Option<i32>,
    scalable: Option<bool>,
}

impl FontSpec {
    pub fn builder() -> FontSpecBuilder {
        FontSpecBuilder::default()
    }

    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    pub fn foundry(&self) -> Option<&str> {
        self.foundry.as_deref()
    }

    pub fn weight(&self) -> Option<i32> {
        self.weight
    }

    pub fn slant(&self) -> Option<i32> {
        self.slant
    }

    pub fn width(&self) -> Option<i32> {
        self.width
    }

    pub fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    pub fn spacing(&self) -> Option<i32> {
        self.spacing
    }

    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn otf(&self) -> Option<&OpenTypeSpec> {
        self.otf.as_ref()
    }

    pub fn adstyle(&self) -> Option<&str> {
        self.adstyle.as_deref()
    }

    pub fn dpi(&self) -> Option<u32> {
        self.dpi
    }

    pub fn average_width(&self) -> Option<i32> {
        self.average_width
    }

    pub fn scalable(&self) -> Option<bool> {
        self.scalable
    }
}

/// Builder for [`FontSpec`].
///
/// ```
/// use fontweave_fonts::FontSpec;
/// use fontweave_fonts::style::{slant, weight};
///
/// let spec = FontSpec::builder()
///     .family("DejaVu Sans Mono")
///     .weight(weight::BOLD)
///     .slant(slant::ITALIC)
///     .pixel_size(14)
///     .build();
/// assert_eq!(spec.family(), Some("DejaVu Sans Mono"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FontSpecBuilder {
    spec: FontSpec,
}

impl FontSpecBuilder {
    pub fn family(mut self, family: impl Into<String>) -> Self {
        self.spec.family = Some(family.into());
        self
    }

    pub fn foundry(mut self, foundry: impl Into<String>) -> Self {
        self.spec.foundry = Some(foundry.into());
        self
    }

    pub fn weight(mut self, weight: i32) -> Self {
        self.spec.weight = Some(weight);
        self
    }

    pub fn slant(mut self, slant: i32) -> Self {
        self.spec.slant = Some(slant);
        self
    }

    pub fn width(mut self, width: i32) -> Self {
        self.spec.width = Some(width);
        self
    }

    pub fn pixel_size(mut self, pixel_size: u32) -> Self {
        self.spec.pixel_size = pixel_size;
        self
    }

    pub fn spacing(mut self, spacing: i32) -> Self {
        self.spec.spacing = Some(spacing);
        self
    }

    pub fn registry(mut self, registry: impl Into<String>) -> Self {
        self.spec.registry = Some(registry.into());
        self
    }

    pub fn script(mut self, script: impl Into<String>) -> Self {
        self.spec.script = Some(script.into());
        self
    }

    /// Add a language tag; may be called repeatedly.
    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.spec.languages.push(lang.into());
        self
    }

    pub fn otf(mut self, otf: OpenTypeSpec) -> Self {
        self.spec.otf = Some(otf);
        self
    }

    pub fn adstyle(mut self, adstyle: impl Into<String>) -> Self {
        self.spec.adstyle = Some(adstyle.into());
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.spec.dpi = Some(dpi);
        self
    }

    pub fn average_width(mut self, average_width: i32) -> Self {
        self.spec.average_width = Some(average_width);
        self
    }

    pub fn scalable(mut self, scalable: bool) -> Self {
        self.spec.scalable = Some(scalable);
        self
    }

    pub fn build(self) -> FontSpec {
        self.spec
    }
}
