//! Treating a user's direct resize of one popup as authoritative.
//!
//! The resized member keeps the share it was given. Members before it
//! share the space to its left and members after it share the space to its
//! right, each group keeping its internal proportions.

use splitview_layout::size::{equal_ratios, MIN_RATIO};

/// New ratios after member `index` was placed at `start_percent` with a
/// size of `size_percent`, both measured on the shared axis. Returns `None`
/// when `index` is out of range.
pub fn redistribute(ratios: &[f64], index: usize, start_percent: f64, size_percent: f64) -> Option<Vec<f64>> {
    if index >= ratios.len() || !start_percent.is_finite() || !size_percent.is_finite() {
        return None;
    }
    let left = &ratios[..index];
    let right = &ratios[index + 1..];
    let left_floor = MIN_RATIO * left.len() as f64;
    let right_floor = MIN_RATIO * right.len() as f64;

    let left_total = if left.is_empty() {
        0.0
    } else {
        start_percent.clamp(left_floor, 100.0 - MIN_RATIO - right_floor)
    };
    let size = if right.is_empty() {
        100.0 - left_total
    } else {
        size_percent.clamp(MIN_RATIO, 100.0 - left_total - right_floor)
    };
    let right_total = 100.0 - left_total - size;

    let mut out = scale_group(left, left_total);
    out.push(size);
    out.extend(scale_group(right, right_total));
    Some(out)
}

/// Scale a group to `total`, keeping its proportions. Falls back to equal
/// shares when a member would drop below the floor.
fn scale_group(group: &[f64], total: f64) -> Vec<f64> {
    if group.is_empty() {
        return Vec::new();
    }
    let sum: f64 = group.iter().sum();
    let scaled: Vec<f64> = if sum > 0.0 {
        group.iter().map(|r| r * total / sum).collect()
    } else {
        Vec::new()
    };
    if scaled.len() == group.len() && scaled.iter().all(|r| *r >= MIN_RATIO) {
        scaled
    } else {
        equal_ratios(group.len())
            .into_iter()
            .map(|r| r * total / 100.0)
            .collect()
    }
}
