//! Visual-diagram decoders for SVG widgets embedded as `srcdoc` markup.
//!
//! Three independent sniffers — block, grid, pie — each answer both "is
//! this markup that kind of diagram?" and "what count/fraction does it
//! show?". The same fill palette is reused across diagram kinds by the
//! vendor, so each decoder guards against the others with explicit
//! exclusion checks (pie rejects rect-bearing markup; block and grid
//! reject circle-bearing markup). Those exclusions are order-sensitive and
//! load-bearing: misclassification is the dominant failure mode.
//!
//! Every numeric signature in this module is reverse-engineered from one
//! vendor's rendering output and will need recalibration when that output
//! changes. They are collected here, away from the algorithms.

pub mod block;
pub mod grid;
pub mod pie;

use std::sync::LazyLock;

use regex::Regex;

/// Fills the vendor uses for "filled" blocks/cells/sectors.
pub(crate) const FILLED_FILLS: &[&str] = &["#1cb0f6", "#49c0f8", "rgb(28, 176, 246)"];

/// The two-tone blue pair used for colored grid cells.
pub(crate) const GRID_COLORED_FILLS: &[&str] = &["#1cb0f6", "#84d8ff"];

/// Clip-path marker the vendor stamps on hundred-block shapes.
pub(crate) const HUNDRED_CLIP_MARKER: &str = "url(#hundred";

/// Height range of the large rounded-rectangle hundred-block border.
pub(crate) const HUNDRED_RECT_HEIGHT: (f64, f64) = (150.0, 230.0);

/// Corner-radius range of the hundred-block border.
pub(crate) const HUNDRED_RECT_RADIUS: (f64, f64) = (6.0, 16.0);

/// Height signature of the stacked per-block rects in the column fallback.
pub(crate) const STACKED_RECT_HEIGHT: (f64, f64) = (18.0, 24.0);

/// Stacked rects per rendered column.
pub(crate) const BLOCKS_PER_COLUMN: i64 = 8;

/// Normalized center point pie sectors draw their closing line to.
pub(crate) const PIE_CENTER: (f64, f64) = (100.0, 100.0);

static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<(rect|path|circle)\b[^>]*>").unwrap());
static ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([a-zA-Z-]+)\s*=\s*"([^"]*)""#).unwrap());
static LINE_TO_CENTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"L\s*100(?:\.0+)?[\s,]+100(?:\.0+)?").unwrap());

/// One parsed SVG element tag.
#[derive(Debug, Clone)]
pub(crate) struct SvgElement {
    pub name: String,
    pub raw: String,
}

impl SvgElement {
    pub fn attr(&self, name: &str) -> Option<String> {
        for caps in ATTR.captures_iter(&self.raw) {
            if caps[1].eq_ignore_ascii_case(name) {
                return Some(caps[2].to_string());
            }
        }
        None
    }

    pub fn attr_f64(&self, name: &str) -> Option<f64> {
        self.attr(name)?.trim().parse().ok()
    }

    pub fn fill(&self) -> Option<String> {
        self.attr("fill").map(|f| f.to_ascii_lowercase())
    }

    /// Fill is one of the vendor's "filled" colors.
    pub fn has_filled_fill(&self) -> bool {
        matches_palette(self.fill().as_deref(), FILLED_FILLS)
    }

    /// Fill is a real color (anything but `none` or empty).
    pub fn has_color_fill(&self) -> bool {
        self.fill().map_or(false, |f| !f.is_empty() && f != "none")
    }

    /// Path data closes with a line to the normalized center point.
    pub fn has_line_to_center(&self) -> bool {
        self.attr("d")
            .map_or(false, |d| LINE_TO_CENTER.is_match(&d))
    }
}

/// Parse every rect/path/circle tag out of a markup fragment.
pub(crate) fn elements(markup: &str) -> Vec<SvgElement> {
    TAGS.captures_iter(markup)
        .map(|caps| SvgElement {
            name: caps[1].to_string(),
            raw: caps[0].to_string(),
        })
        .collect()
}

pub(crate) fn matches_palette(fill: Option<&str>, palette: &[&str]) -> bool {
    let Some(fill) = fill else {
        return false;
    };
    palette.iter().any(|p| fill == *p)
}

/// Markup contains at least one sector path closing at the pie center.
pub(crate) fn has_center_line_path(markup: &str) -> bool {
    elements(markup)
        .iter()
        .any(|el| el.name == "path" && el.has_line_to_center())
}

/// Pick the `<svg>` fragment to decode. Widgets often embed a light and a
/// dark rendering of the same diagram; the dark one is preferred when both
/// exist, otherwise the first fragment, otherwise the whole markup.
pub(crate) fn select_theme_fragment(markup: &str) -> &str {
    let fragments = svg_fragments(markup);
    if fragments.is_empty() {
        return markup;
    }
    for frag in &fragments {
        let open_end = frag.find('>').unwrap_or(frag.len());
        if frag[..open_end].to_ascii_lowercase().contains("dark") {
            return frag;
        }
    }
    fragments[0]
}

fn svg_fragments(markup: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut from = 0;
    while let Some(rel) = markup[from..].find("<svg") {
        let start = from + rel;
        let Some(end_rel) = markup[start..].find("</svg>") else {
            break;
        };
        let end = start + end_rel + "</svg>".len();
        fragments.push(&markup[start..end]);
        from = end;
    }
    fragments
}
