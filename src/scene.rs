//! Scene documents: a list of drawable shapes with their layout properties.
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::MapError;
use crate::mapping;
use crate::options::{Bounds, DefaultValue, NotEmpty};
use crate::registry::{Fields, Mapped};

pub const DEFAULT_DOCUMENT_PATH: &str = "assets/sample_json.json";

pub const SAMPLE_DOCUMENT: &str = r##"{"elements": [
    {
        "type": "RECTANGLE",
        "props": {
            "x": 25,
            "y": 100,
            "width": 200,
            "height": 200
        },
        "fillColor": "none",
        "strokeColor": "black",
        "strokeWidth": 2,
        "gradient": {
            "colors": ["#9B0F02", "#FFFFFF"],
            "offsets": ["30%", "90%"],
            "angle": -1,
            "direction": "",
            "type": "linear"
        }
    },
    {
        "type": "TEXT",
        "props": {
            "x": 25,
            "y": 25
        },
        "value": "World is beautiful!",
        "fontSize": 25,
        "fillColor": "#ff00ff",
        "strokeColor": "none",
        "strokeWidth": 0,
        "gradient": null,
        "letterSpacing": 1,
        "fontFamily": "Lato",
        "fontWeight": "Bold"
    }
]
}
"##;

pub const RECTANGLE: &str = "RECTANGLE";
pub const TEXT: &str = "TEXT";

// ---- Model ---- //

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gradient {
    pub colors: Vec<String>,
    pub offsets: Vec<String>,
    pub angle: i32,
    pub direction: String,
    pub kind: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Properties {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    pub kind: String,
    pub props: Properties,
    pub value: Option<String>,
    pub font_size: Option<i32>,
    pub fill_color: String,
    pub stroke_color: String,
    pub stroke_width: i32,
    pub gradient: Option<Gradient>,
    pub letter_spacing: Option<i32>,
    pub font_family: Option<String>,
    pub font_weight: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Elements {
    pub elements: Vec<Shape>,
}

// ---- Registrations ---- //

impl Mapped for Gradient {
    const NAME: &'static str = "Gradient";

    fn register(fields: &mut Fields<Self>) -> Result<(), MapError> {
        fields.reg("colors", |g| &g.colors, |g| &mut g.colors)?;
        fields.reg("offsets", |g| &g.offsets, |g| &mut g.offsets)?;
        fields.reg("angle", |g| &g.angle, |g| &mut g.angle)?.attach(Bounds::new(-1, 360))?;
        fields.reg("direction", |g| &g.direction, |g| &mut g.direction)?;
        fields.reg("type", |g| &g.kind, |g| &mut g.kind)?;
        Ok(())
    }
}

impl Mapped for Properties {
    const NAME: &'static str = "Properties";

    fn register(fields: &mut Fields<Self>) -> Result<(), MapError> {
        fields.reg("x", |p| &p.x, |p| &mut p.x)?;
        fields.reg("y", |p| &p.y, |p| &mut p.y)?;
        // text shapes only carry a position
        fields.reg("width", |p| &p.width, |p| &mut p.width)?.attach(DefaultValue::new(0))?;
        fields.reg("height", |p| &p.height, |p| &mut p.height)?.attach(DefaultValue::new(0))?;
        Ok(())
    }
}

impl Mapped for Shape {
    const NAME: &'static str = "Shape";

    fn register(fields: &mut Fields<Self>) -> Result<(), MapError> {
        fields.reg("type", |s| &s.kind, |s| &mut s.kind)?.attach(NotEmpty)?;
        fields.reg("props", |s| &s.props, |s| &mut s.props)?;
        fields.reg("value", |s| &s.value, |s| &mut s.value)?;
        fields.reg("fontSize", |s| &s.font_size, |s| &mut s.font_size)?;
        fields.reg("fillColor", |s| &s.fill_color, |s| &mut s.fill_color)?;
        fields.reg("strokeColor", |s| &s.stroke_color, |s| &mut s.stroke_color)?;
        fields.reg("strokeWidth", |s| &s.stroke_width, |s| &mut s.stroke_width)?
            .attach(Bounds::new(0, 100))?;
        fields.reg("gradient", |s| &s.gradient, |s| &mut s.gradient)?;
        fields.reg("letterSpacing", |s| &s.letter_spacing, |s| &mut s.letter_spacing)?;
        fields.reg("fontFamily", |s| &s.font_family, |s| &mut s.font_family)?;
        fields.reg("fontWeight", |s| &s.font_weight, |s| &mut s.font_weight)?;
        Ok(())
    }
}

impl Mapped for Elements {
    const NAME: &'static str = "Elements";

    fn register(fields: &mut Fields<Self>) -> Result<(), MapError> {
        fields.reg("elements", |e| &e.elements, |e| &mut e.elements)?.attach(NotEmpty)?;
        Ok(())
    }
}

// ---- Loading ---- //

/// Where a loaded scene came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Embedded,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Embedded => f.write_str("<embedded sample>"),
        }
    }
}

pub fn sample() -> Result<Elements, MapError> {
    mapping::from_json_str(SAMPLE_DOCUMENT)
}

/// Read `path` when it exists, otherwise fall back to the embedded sample.
pub fn load(path: &Path) -> Result<(Elements, Source), MapError> {
    if path.is_file() {
        tracing::info!(path = %path.display(), "reading scene document");
        let reader = BufReader::new(File::open(path)?);
        let elements = mapping::from_reader(reader)?;
        return Ok((elements, Source::File(path.to_path_buf())));
    }
    tracing::info!(path = %path.display(), "document not present, using the embedded sample");
    Ok((sample()?, Source::Embedded))
}

impl Elements {
    pub fn len(&self) -> usize { self.elements.len() }

    pub fn is_empty(&self) -> bool { self.elements.is_empty() }

    /// Shape count per `type`, in first-seen order.
    pub fn count_by_type(&self) -> IndexMap<&str, usize> {
        let mut counts = IndexMap::new();
        for shape in &self.elements {
            *counts.entry(shape.kind.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

impl Shape {
    pub fn is_rectangle(&self) -> bool { self.kind == RECTANGLE }

    pub fn is_text(&self) -> bool { self.kind == TEXT }
}
