//! Reconciliation timing validation.

use crate::schema::SplitviewConfig;

use super::helpers::validate_range_u64;

pub(crate) fn validate_reconcile(errors: &mut Vec<String>, config: &SplitviewConfig) {
    validate_range_u64(
        errors,
        "reconcile.bounds_debounce_ms",
        config.reconcile.bounds_debounce_ms,
        0,
        2000,
    );
    validate_range_u64(
        errors,
        "reconcile.self_move_guard_ms",
        config.reconcile.self_move_guard_ms,
        50,
        5000,
    );
}
