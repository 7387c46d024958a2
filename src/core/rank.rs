//! Department focus ranking: within each student-term, departments are
//! ordered by credit subtotal descending, then by resolved display name
//! ascending (case-normalized), then by code. The rank-1 department is the
//! focused department. Codes are unique within a partition, so the order is a
//! strict total order and the selection is deterministic.

use crate::core::aggregate::StudentTermKey;
use crate::domain::model::Department;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusedDepartment {
    pub code: String,
    /// The department's display name when the reference matched, otherwise
    /// the raw code.
    pub name: String,
    /// Empty when the reference did not match; never a placeholder.
    pub contact: String,
}

pub fn rank_focus(
    dept_credits: &BTreeMap<StudentTermKey, BTreeMap<String, i64>>,
    departments: &[Department],
) -> BTreeMap<StudentTermKey, FocusedDepartment> {
    let reference: HashMap<&str, &Department> = departments
        .iter()
        .map(|d| (d.code.as_str(), d))
        .collect();

    let mut focus = BTreeMap::new();
    for (key, subtotals) in dept_credits {
        let mut candidates: Vec<(FocusedDepartment, i64, String)> = subtotals
            .iter()
            .map(|(code, credits)| {
                let resolved = reference.get(code.as_str());
                let name = resolved
                    .map(|d| d.name.clone())
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| code.clone());
                let contact = resolved.map(|d| d.contact.clone()).unwrap_or_default();
                let sort_name = name.to_lowercase();
                (
                    FocusedDepartment {
                        code: code.clone(),
                        name,
                        contact,
                    },
                    *credits,
                    sort_name,
                )
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| a.2.cmp(&b.2))
                .then_with(|| a.0.code.cmp(&b.0.code))
        });

        if let Some((winner, _, _)) = candidates.into_iter().next() {
            focus.insert(key.clone(), winner);
        }
    }

    focus
}
