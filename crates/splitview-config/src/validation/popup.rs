//! Popup tiling validation.

use crate::schema::SplitviewConfig;

use super::helpers::validate_range;

pub(crate) fn validate_popup(errors: &mut Vec<String>, config: &SplitviewConfig) {
    validate_range(errors, "popup.inset_top", config.popup.inset_top, 0, 200);
    validate_range(errors, "popup.margin", config.popup.margin, 0, 100);
    validate_range(errors, "popup.gap", config.popup.gap, 0, 40);
    validate_range(errors, "popup.min_height", config.popup.min_height, 50, 1000);
}
