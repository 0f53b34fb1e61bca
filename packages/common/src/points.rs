use std::collections::HashMap;

use crate::get_element;

/// Maximum number of points a student may spread over the lab terms of one course.
pub const POINT_BUDGET: i32 = 15;

/// Sum the proposed points over the choosable terms only.
///
/// Terms missing from `points` count as zero; entries for terms that are not in
/// `choosable` (lectures, seminars, terms of other courses) are ignored.
pub fn choosable_points_total(choosable: &[i32], points: &HashMap<i32, i32>) -> i64 {
    choosable
        .iter()
        .map(|term_id| i64::from(get_element(points, term_id).copied().unwrap_or(0)))
        .sum()
}

/// Returns true iff the points proposed for `choosable` terms fit in [`POINT_BUDGET`].
pub fn validate_points(choosable: &[i32], points: &HashMap<i32, i32>) -> bool {
    choosable_points_total(choosable, points) <= i64::from(POINT_BUDGET)
}
