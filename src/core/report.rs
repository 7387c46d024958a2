//! Final report assembly: joins totals, the focused department, and student
//! identity into rows ordered by (student_id, term), and renders the CSV
//! contract consumed downstream.

use crate::core::aggregate::StudentTermKey;
use crate::core::rank::FocusedDepartment;
use crate::domain::model::{Student, SummaryRow};
use std::collections::{BTreeMap, HashMap};

pub const REPORT_HEADER: &str =
    "student_id,last_name,term,total_credits,focused_department_name,focused_department_contact";

/// Outward-preserving on Student: a total-credit row is never dropped for a
/// missing name match (by construction every surviving enrollment's student
/// exists post-cleaning, so the fallback stays empty in practice).
pub fn assemble(
    totals: &BTreeMap<StudentTermKey, i64>,
    focus: &BTreeMap<StudentTermKey, FocusedDepartment>,
    students: &[Student],
) -> Vec<SummaryRow> {
    let last_names: HashMap<&str, &str> = students
        .iter()
        .map(|s| (s.student_id.as_str(), s.last_name.as_str()))
        .collect();

    totals
        .iter()
        .map(|((student_id, term), total)| {
            let focused = focus.get(&(student_id.clone(), term.clone()));
            SummaryRow {
                student_id: student_id.clone(),
                last_name: last_names
                    .get(student_id.as_str())
                    .map(|n| n.to_string())
                    .unwrap_or_default(),
                term: term.clone(),
                total_credits: *total,
                focused_department_name: focused.map(|f| f.name.clone()).unwrap_or_default(),
                focused_department_contact: focused.map(|f| f.contact.clone()).unwrap_or_default(),
            }
        })
        .collect()
}

/// Text fields are written unquoted; an absent contact is an empty field.
pub fn render_csv(rows: &[SummaryRow]) -> String {
    let mut lines = vec![REPORT_HEADER.to_string()];
    for row in rows {
        lines.push(format!(
            "{},{},{},{},{},{}",
            row.student_id,
            row.last_name,
            row.term,
            row.total_credits,
            row.focused_department_name,
            row.focused_department_contact
        ));
    }
    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: &str, last: &str) -> Student {
        Student {
            student_id: id.to_string(),
            first_name: "First".to_string(),
            last_name: last.to_string(),
            email: String::new(),
            admit_term: String::new(),
            admit_type: String::new(),
        }
    }

    fn key(id: &str, term: &str) -> StudentTermKey {
        (id.to_string(), term.to_string())
    }

    fn focused(code: &str, name: &str, contact: &str) -> FocusedDepartment {
        FocusedDepartment {
            code: code.to_string(),
            name: name.to_string(),
            contact: contact.to_string(),
        }
    }

    #[test]
    fn test_rows_ordered_by_student_then_term() {
        let mut totals = BTreeMap::new();
        totals.insert(key("S2", "2244"), 5);
        totals.insert(key("S1", "2251"), 3);
        totals.insert(key("S1", "2244"), 7);

        let mut focus = BTreeMap::new();
        focus.insert(key("S1", "2244"), focused("MATH", "Mathematics", ""));
        focus.insert(key("S1", "2251"), focused("MATH", "Mathematics", ""));
        focus.insert(key("S2", "2244"), focused("CS", "Computer Science", "Dr. A"));

        let students = vec![student("S1", "Lovelace"), student("S2", "Hopper")];

        let rows = assemble(&totals, &focus, &students);

        let order: Vec<(String, String)> = rows
            .iter()
            .map(|r| (r.student_id.clone(), r.term.clone()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("S1".to_string(), "2244".to_string()),
                ("S1".to_string(), "2251".to_string()),
                ("S2".to_string(), "2244".to_string()),
            ]
        );
        assert_eq!(rows[2].last_name, "Hopper");
        assert_eq!(rows[2].focused_department_contact, "Dr. A");
    }

    #[test]
    fn test_total_row_survives_missing_student_match() {
        let mut totals = BTreeMap::new();
        totals.insert(key("S9", "2244"), 4);
        let mut focus = BTreeMap::new();
        focus.insert(key("S9", "2244"), focused("MATH", "MATH", ""));

        let rows = assemble(&totals, &focus, &[]);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].last_name, "");
        assert_eq!(rows[0].total_credits, 4);
    }

    #[test]
    fn test_csv_rendering_unquoted_with_empty_contact() {
        let rows = vec![SummaryRow {
            student_id: "S1".to_string(),
            last_name: "Lovelace".to_string(),
            term: "2244".to_string(),
            total_credits: 6,
            focused_department_name: "MATH".to_string(),
            focused_department_contact: String::new(),
        }];

        let csv = render_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], REPORT_HEADER);
        assert_eq!(lines[1], "S1,Lovelace,2244,6,MATH,");
        assert!(csv.ends_with('\n'));
    }
}
