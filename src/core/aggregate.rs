//! Pure grouping and summation over the post-cleaning enrollment relation.

use crate::domain::model::Enrollment;
use std::collections::BTreeMap;

/// (student_id, term)
pub type StudentTermKey = (String, String);

/// Total credit hours per student-term.
pub fn total_credits(enrollments: &[Enrollment]) -> BTreeMap<StudentTermKey, i64> {
    let mut totals = BTreeMap::new();
    for enrollment in enrollments {
        let key = (enrollment.student_id.clone(), enrollment.term.clone());
        *totals.entry(key).or_insert(0) += enrollment.credit_hours;
    }
    totals
}

/// Credit hours per student-term-department, grouped by the department code
/// recorded on the enrollment. No department reference match is required.
pub fn dept_credits(
    enrollments: &[Enrollment],
) -> BTreeMap<StudentTermKey, BTreeMap<String, i64>> {
    let mut subtotals: BTreeMap<StudentTermKey, BTreeMap<String, i64>> = BTreeMap::new();
    for enrollment in enrollments {
        let key = (enrollment.student_id.clone(), enrollment.term.clone());
        *subtotals
            .entry(key)
            .or_default()
            .entry(enrollment.department.clone())
            .or_insert(0) += enrollment.credit_hours;
    }
    subtotals
}
