//! Grid (cell) diagram decoder.
//!
//! A grid diagram shades some cells of a rectangular grid to show a
//! fraction. Pie charts are excluded first (their sector paths close at
//! the normalized center and their palettes overlap), then cells are
//! counted by fill.

use super::{elements, has_center_line_path, matches_palette, GRID_COLORED_FILLS};
use crate::math::fraction::Fraction;

/// Minimum cells for markup to count as a grid at all.
const MIN_CELLS: usize = 4;

/// Classify markup as a grid diagram.
pub fn is_grid_diagram(markup: &str) -> bool {
    decode(markup).is_some()
}

/// Decode the fraction of colored cells, or `None` when the markup is not
/// a grid diagram. The fraction is left unreduced: a 10-cell grid with 4
/// colored cells reads `4/10`.
pub fn decode(markup: &str) -> Option<Fraction> {
    if markup.contains("<circle") || has_center_line_path(markup) {
        return None;
    }

    let els = elements(markup);
    let cells: Vec<_> = els
        .iter()
        .filter(|el| (el.name == "rect" || el.name == "path") && el.has_color_fill())
        .collect();
    let colored = cells
        .iter()
        .filter(|el| matches_palette(el.fill().as_deref(), GRID_COLORED_FILLS))
        .count();

    if cells.len() < MIN_CELLS || colored == 0 {
        return None;
    }
    Some(Fraction {
        numerator: colored as i64,
        denominator: cells.len() as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_markup(colored: usize, total: usize) -> String {
        let mut s = String::from("<svg>");
        for i in 0..total {
            let fill = if i < colored { "#1cb0f6" } else { "#e5e5e5" };
            s.push_str(&format!(
                r##"<rect x="{}" y="0" width="20" height="20" fill="{}"/>"##,
                i * 22,
                fill
            ));
        }
        s.push_str("</svg>");
        s
    }

    #[test]
    fn test_decode_colored_cells() {
        let f = decode(&grid_markup(4, 10)).unwrap();
        assert_eq!((f.numerator, f.denominator), (4, 10));
        assert!(is_grid_diagram(&grid_markup(4, 10)));
    }

    #[test]
    fn test_two_tone_fills_both_count() {
        let markup = r##"<svg>
            <rect fill="#1cb0f6"/><rect fill="#84d8ff"/>
            <rect fill="#e5e5e5"/><rect fill="#e5e5e5"/>
        </svg>"##;
        let f = decode(markup).unwrap();
        assert_eq!((f.numerator, f.denominator), (2, 4));
    }

    #[test]
    fn test_circle_excluded() {
        let markup = format!("{}<circle r=\"5\"/>", grid_markup(4, 10));
        assert_eq!(decode(&markup), None);
    }

    #[test]
    fn test_pie_sector_path_excluded() {
        let markup = format!(
            "{}<path d=\"M100 20 A80 80 0 0 1 180 100 L100,100 Z\" fill=\"#1cb0f6\"/>",
            grid_markup(4, 10)
        );
        assert_eq!(decode(&markup), None);
    }

    #[test]
    fn test_too_few_cells_rejected() {
        assert_eq!(decode(&grid_markup(1, 3)), None);
    }

    #[test]
    fn test_no_colored_cells_rejected() {
        assert_eq!(decode(&grid_markup(0, 8)), None);
    }
}
