//! Base-10 block diagram decoder.
//!
//! A block diagram renders a whole number as columns of ten and large
//! hundred-blocks. Pie charts reuse the same fill palette, so anything
//! containing a circle is rejected outright before counting.

use super::{
    elements, select_theme_fragment, SvgElement, BLOCKS_PER_COLUMN, HUNDRED_CLIP_MARKER,
    HUNDRED_RECT_HEIGHT, HUNDRED_RECT_RADIUS, STACKED_RECT_HEIGHT,
};

/// Classify markup as a block diagram: matching fill, at least one rect,
/// and no circles anywhere in the fragment.
pub fn is_block_diagram(markup: &str) -> bool {
    let fragment = select_theme_fragment(markup);
    if fragment.contains("<circle") {
        return false;
    }
    let els = elements(fragment);
    els.iter().any(|el| el.name == "rect") && els.iter().any(SvgElement::has_filled_fill)
}

/// Decode the number a block diagram shows, or `None` when the markup is
/// not a block diagram.
pub fn decode(markup: &str) -> Option<i64> {
    let fragment = select_theme_fragment(markup);
    if fragment.contains("<circle") {
        return None;
    }
    let els = elements(fragment);
    if !els.iter().any(|el| el.name == "rect") {
        return None;
    }

    let hundreds = count_hundred_blocks(&els);
    let columns = count_columns(&els);
    let mut total = hundreds * 100 + columns * 10;

    if total == 0 {
        // Some renderings draw each block of a column as its own small
        // rect; count those and convert back to columns.
        let stacked = els
            .iter()
            .filter(|el| el.name == "rect" && in_range(el.attr_f64("height"), STACKED_RECT_HEIGHT))
            .count() as i64;
        if stacked > 0 {
            total = stacked / BLOCKS_PER_COLUMN * 10;
        }
    }

    (total > 0).then_some(total)
}

/// Hundred-blocks are found two independent ways: the clip-path marker the
/// vendor stamps on them, and the large rounded-rect border signature.
/// Each match is worth 100.
fn count_hundred_blocks(els: &[SvgElement]) -> i64 {
    let clipped = els
        .iter()
        .filter(|el| el.raw.contains(HUNDRED_CLIP_MARKER))
        .count();

    let bordered = els
        .iter()
        .filter(|el| {
            el.name == "rect"
                && !el.raw.contains(HUNDRED_CLIP_MARKER)
                && in_range(el.attr_f64("height"), HUNDRED_RECT_HEIGHT)
                && in_range(el.attr_f64("rx"), HUNDRED_RECT_RADIUS)
        })
        .count();

    (clipped + bordered) as i64
}

/// Regular columns: matching-fill rects plus matching-fill simple paths
/// (paths without the hundred-block clip marker).
fn count_columns(els: &[SvgElement]) -> i64 {
    els.iter()
        .filter(|el| match el.name.as_str() {
            "rect" => {
                el.has_filled_fill()
                    && !el.raw.contains(HUNDRED_CLIP_MARKER)
                    && !in_range(el.attr_f64("height"), HUNDRED_RECT_HEIGHT)
            }
            "path" => el.has_filled_fill() && !el.raw.contains(HUNDRED_CLIP_MARKER),
            _ => false,
        })
        .count() as i64
}

fn in_range(value: Option<f64>, range: (f64, f64)) -> bool {
    value.map_or(false, |v| v >= range.0 && v <= range.1)
}
