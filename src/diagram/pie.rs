//! Pie chart decoder.
//!
//! Pie charts shade a sector of a circle to show a fraction. Grids are
//! excluded first (anything with a rect is not a pie), then three
//! strategies are tried in order: stroked sector counting, circle-plus-
//! sector coordinate analysis, and bare center-line sector counting.

use std::sync::LazyLock;

use regex::Regex;

use super::{elements, SvgElement, PIE_CENTER};
use crate::math::fraction::Fraction;

/// Snap denominator for arbitrary-sector angles; sweep angles land on
/// twelfths in the vendor's rendering.
const ANGLE_SNAP: i64 = 12;

static ARC: LazyLock<Regex> = LazyLock::new(|| {
    // A rx ry rot large-arc sweep x y
    Regex::new(
        r"A\s*[\d.]+[\s,]+[\d.]+[\s,]+[\d.-]+[\s,]+([01])[\s,]+([01])[\s,]+([\d.-]+)[\s,]+([\d.-]+)",
    )
    .unwrap()
});
static MOVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"M\s*([\d.-]+)[\s,]+([\d.-]+)").unwrap());

/// Classify markup as a pie chart: no rects, and at least one positive
/// signal (a circle, a colored path, or a center-line sector path).
pub fn is_pie_chart(markup: &str) -> bool {
    if markup.contains("<rect") {
        return false;
    }
    let els = elements(markup);
    els.iter().any(|el| el.name == "circle")
        || els
            .iter()
            .any(|el| el.name == "path" && (el.has_filled_fill() || el.has_line_to_center()))
}

/// Decode the filled fraction of a pie chart, or `None` when the markup is
/// not a pie chart.
pub fn decode(markup: &str) -> Option<Fraction> {
    if markup.contains("<rect") {
        return None;
    }
    let els = elements(markup);
    let paths: Vec<&SvgElement> = els.iter().filter(|el| el.name == "path").collect();

    // (a) Sector paths carrying a stroke attribute: colored / total.
    let stroked: Vec<&SvgElement> = paths
        .iter()
        .copied()
        .filter(|el| el.attr("stroke").map_or(false, |s| s != "none"))
        .collect();
    if stroked.len() >= 2 {
        let colored = stroked.iter().filter(|el| el.has_filled_fill()).count();
        if colored > 0 {
            return Some(Fraction {
                numerator: colored as i64,
                denominator: stroked.len() as i64,
            });
        }
    }

    let sectors: Vec<&SvgElement> = paths
        .iter()
        .copied()
        .filter(|el| el.has_line_to_center())
        .collect();

    // (b) With a circle present, analyze sector geometry.
    if els.iter().any(|el| el.name == "circle") {
        let colored: Vec<&SvgElement> = sectors
            .iter()
            .copied()
            .filter(|el| el.has_filled_fill())
            .collect();
        match colored.len() {
            0 => return None,
            1 => return Some(sector_fraction(colored[0])),
            n => {
                return Some(Fraction {
                    numerator: n as i64,
                    denominator: sectors.len().max(n) as i64,
                })
            }
        }
    }

    // (c) No circle: count center-line sector paths directly.
    if !sectors.is_empty() {
        let colored = sectors.iter().filter(|el| el.has_filled_fill()).count();
        if colored > 0 {
            return Some(Fraction {
                numerator: colored as i64,
                denominator: sectors.len() as i64,
            });
        }
    }

    None
}

/// Infer the fraction a single sector path covers from its arc endpoints.
/// Falls back to a quarter when the path data cannot be read.
fn sector_fraction(el: &SvgElement) -> Fraction {
    let quarter = Fraction {
        numerator: 1,
        denominator: 4,
    };
    let Some(d) = el.attr("d") else {
        return quarter;
    };
    let Some((start, end, large_arc)) = arc_endpoints(&d) else {
        return quarter;
    };

    let (cx, cy) = PIE_CENTER;
    let a1 = (start.1 - cy).atan2(start.0 - cx).to_degrees();
    let a2 = (end.1 - cy).atan2(end.0 - cx).to_degrees();
    let delta = ((a2 - a1).rem_euclid(360.0)).abs();
    let minor = delta.min(360.0 - delta);
    let sweep = if large_arc { 360.0 - minor } else { minor };
    if sweep <= 0.0 || sweep >= 360.0 {
        return quarter;
    }

    let snapped = ((sweep / 360.0) * ANGLE_SNAP as f64).round() as i64;
    if snapped == 0 {
        return quarter;
    }
    crate::math::fraction::simplify_fraction(snapped, ANGLE_SNAP).unwrap_or(quarter)
}

/// The move-to point, the arc end point, and the large-arc flag.
fn arc_endpoints(d: &str) -> Option<((f64, f64), (f64, f64), bool)> {
    let m = MOVE.captures(d)?;
    let start = (m[1].parse().ok()?, m[2].parse().ok()?);
    let a = ARC.captures(d)?;
    let large_arc = &a[1] == "1";
    let end = (a[3].parse().ok()?, a[4].parse().ok()?);
    Some((start, end, large_arc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sector(colored: bool, with_stroke: bool, d: &str) -> String {
        let fill = if colored { "#1cb0f6" } else { "#e5e5e5" };
        let stroke = if with_stroke { r##" stroke="#ffffff""## } else { "" };
        format!(r##"<path d="{}" fill="{}"{}/>"##, d, fill, stroke)
    }

    #[test]
    fn test_three_of_four_stroked_sectors() {
        let mut markup = String::from("<svg>");
        for i in 0..4 {
            markup.push_str(&sector(i < 3, true, "M100 100 L100 20 A80 80 0 0 1 180 100 Z"));
        }
        markup.push_str("</svg>");
        let f = decode(&markup).unwrap();
        assert_eq!((f.numerator, f.denominator), (3, 4));
        assert!((f.value() - 0.75).abs() < 1e-9);
        assert!(is_pie_chart(&markup));
    }

    #[test]
    fn test_rect_markup_rejected() {
        let markup = r##"<svg><rect fill="#1cb0f6"/><circle r="80"/></svg>"##;
        assert!(!is_pie_chart(markup));
        assert_eq!(decode(markup), None);
    }

    #[test]
    fn test_quarter_sector_with_circle() {
        // start at top (100,20), arc to the right (180,100): a 90° sweep
        let markup = format!(
            r##"<svg><circle cx="100" cy="100" r="80" fill="#e5e5e5"/>{}</svg>"##,
            sector(true, false, "M100 20 A80 80 0 0 1 180 100 L100,100 Z")
        );
        let f = decode(&markup).unwrap();
        assert_eq!((f.numerator, f.denominator), (1, 4));
    }

    #[test]
    fn test_half_sector_with_circle() {
        // top to bottom: 180°
        let markup = format!(
            r##"<svg><circle cx="100" cy="100" r="80" fill="#e5e5e5"/>{}</svg>"##,
            sector(true, false, "M100 20 A80 80 0 0 1 100 180 L100,100 Z")
        );
        let f = decode(&markup).unwrap();
        assert_eq!((f.numerator, f.denominator), (1, 2));
    }

    #[test]
    fn test_unreadable_sector_defaults_to_quarter() {
        let markup = format!(
            r##"<svg><circle cx="100" cy="100" r="80"/>{}</svg>"##,
            sector(true, false, "L100,100")
        );
        let f = decode(&markup).unwrap();
        assert_eq!((f.numerator, f.denominator), (1, 4));
    }

    #[test]
    fn test_center_line_sectors_without_circle() {
        let mut markup = String::from("<svg>");
        markup.push_str(&sector(true, false, "M100 20 A80 80 0 0 1 180 100 L100,100 Z"));
        markup.push_str(&sector(false, false, "M180 100 A80 80 0 0 1 100 180 L100,100 Z"));
        markup.push_str("</svg>");
        let f = decode(&markup).unwrap();
        assert_eq!((f.numerator, f.denominator), (1, 2));
    }
}
