//! Ratio arithmetic and pixel sizing.
//!
//! Ratios are percentages of the primary axis. Divider thickness is taken
//! off the container before the ratios are applied, so the same ratio list
//! renders identically whether it ends up as a CSS `calc()` expression or as
//! absolute window bounds.

mod geometry;

pub use geometry::{Geometry, Placement};

/// Pixel thickness of a divider between two members.
pub const DIVIDER_THICKNESS_PX: f64 = 4.0;

/// Smallest share, in percent, a member can be dragged down to.
pub const MIN_RATIO: f64 = 5.0;

/// Largest share a grid column or row can be dragged up to.
pub const MAX_GRID_PERCENT: f64 = 95.0;

/// Allowed drift of a ratio sum away from 100.
pub const RATIO_TOLERANCE: f64 = 0.1;

// =============================================================================
// SIZING
// =============================================================================

/// Pixel size of a member along the primary axis.
///
/// `ratio_percent` is the member's share, `divider_count` the number of
/// dividers on that axis.
pub fn compute_size(
    ratio_percent: f64,
    divider_count: usize,
    divider_thickness_px: f64,
    container_size_px: f64,
) -> f64 {
    let available = (container_size_px - divider_count as f64 * divider_thickness_px).max(0.0);
    available * ratio_percent.max(0.0) / 100.0
}

/// The `calc()` expression the embedded binding writes for a member.
pub fn size_expression(ratio_percent: f64, divider_count: usize, divider_thickness_px: f64) -> String {
    let reserved = divider_count as f64 * divider_thickness_px;
    format!("calc((100% - {}px) * {})", reserved, ratio_percent / 100.0)
}

// =============================================================================
// RATIOS
// =============================================================================

/// `n` equal shares summing to 100.
pub fn equal_ratios(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![100.0 / n as f64; n]
}

pub fn ratio_sum(ratios: &[f64]) -> f64 {
    ratios.iter().sum()
}

pub fn sums_to_hundred(ratios: &[f64]) -> bool {
    (ratio_sum(ratios) - 100.0).abs() <= RATIO_TOLERANCE
}

/// Scale `ratios` so they sum to exactly 100. Degenerate input (empty,
/// non-finite, or a non-positive total) falls back to equal shares.
pub fn normalize_ratios(ratios: &[f64]) -> Vec<f64> {
    let total = ratio_sum(ratios);
    if !total.is_finite() || total <= 0.0 || ratios.iter().any(|r| !r.is_finite() || *r < 0.0) {
        return equal_ratios(ratios.len());
    }
    ratios.iter().map(|r| r * 100.0 / total).collect()
}

/// Accept externally supplied ratios for `n` members, or fall back to equal
/// shares when they are unusable: wrong length, any share at or below zero,
/// or a sum more than the tolerance away from 100.
pub fn validated_ratios(ratios: &[f64], n: usize) -> Vec<f64> {
    let usable = ratios.len() == n
        && ratios.iter().all(|r| r.is_finite() && *r > 0.0)
        && sums_to_hundred(ratios);
    if usable {
        ratios.to_vec()
    } else {
        equal_ratios(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn compute_size_subtracts_dividers() {
        // 1004px, two members, one 4px divider: 1000px to share.
        assert!(approx(compute_size(50.0, 1, 4.0, 1004.0), 500.0));
        assert!(approx(compute_size(25.0, 3, 4.0, 412.0), 100.0));
    }

    #[test]
    fn compute_size_never_negative() {
        assert_eq!(compute_size(50.0, 3, 4.0, 5.0), 0.0);
        assert_eq!(compute_size(-10.0, 1, 4.0, 500.0), 0.0);
    }

    #[test]
    fn size_expression_format() {
        assert_eq!(size_expression(50.0, 1, 4.0), "calc((100% - 4px) * 0.5)");
        assert_eq!(size_expression(25.0, 3, 4.0), "calc((100% - 12px) * 0.25)");
    }

    #[test]
    fn equal_ratios_sum_to_hundred() {
        for n in 1..=4 {
            let r = equal_ratios(n);
            assert_eq!(r.len(), n);
            assert!(sums_to_hundred(&r));
        }
        assert!(equal_ratios(0).is_empty());
    }

    #[test]
    fn normalize_scales_to_hundred() {
        let r = normalize_ratios(&[30.0, 30.0]);
        assert!(approx(r[0], 50.0));
        assert!(approx(r[1], 50.0));
    }

    #[test]
    fn normalize_degenerate_falls_back_to_equal() {
        assert_eq!(normalize_ratios(&[0.0, 0.0]), vec![50.0, 50.0]);
        assert_eq!(normalize_ratios(&[f64::NAN, 10.0]), vec![50.0, 50.0]);
    }

    #[test]
    fn validated_ratios_accepts_good_input() {
        assert_eq!(validated_ratios(&[60.0, 40.0], 2), vec![60.0, 40.0]);
        assert_eq!(validated_ratios(&[33.3, 33.3, 33.4], 3), vec![33.3, 33.3, 33.4]);
    }

    #[test]
    fn validated_ratios_rejects_length_mismatch() {
        let r = validated_ratios(&[50.0, 60.0], 3);
        assert_eq!(r.len(), 3);
        assert!(r.iter().all(|v| approx(*v, 100.0 / 3.0)));
    }

    #[test]
    fn validated_ratios_rejects_bad_sum_and_non_positive() {
        assert_eq!(validated_ratios(&[60.0, 60.0], 2), vec![50.0, 50.0]);
        assert_eq!(validated_ratios(&[100.0, 0.0], 2), vec![50.0, 50.0]);
        assert_eq!(validated_ratios(&[110.0, -10.0], 2), vec![50.0, 50.0]);
    }
}
