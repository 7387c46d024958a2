//! Deterministic, idempotent remediation of the defect classes the validator
//! flags, with every action recorded to an audit trail.
//!
//! Step order is load-bearing for the post-cleaning zero-residual contract:
//! duplicates first, then rows with missing required fields, then orphan
//! drops computed against the surviving students, then credit clamping.
//! Dropping a defective student must precede the orphan pass so that the
//! student's enrollments and programs are discarded with it. Orphan
//! department references are deliberately left alone; the ranker displays the
//! raw code for them.

use crate::core::validate::{CREDIT_HOURS_MAX, CREDIT_HOURS_MIN};
use crate::domain::model::{AuditEntry, CleanAction, DefectClass, Enrollment, Relations};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct CleanOutcome {
    pub relations: Relations,
    pub audit: Vec<AuditEntry>,
}

pub fn clean(relations: Relations) -> CleanOutcome {
    let mut audit = Vec::new();

    let students = dedup(
        relations.students,
        DefectClass::DuplicateStudent,
        |s| s.student_id.clone(),
        &mut audit,
    );
    let departments = dedup(
        relations.departments,
        DefectClass::DuplicateDepartment,
        |d| d.code.clone(),
        &mut audit,
    );
    let enrollments = dedup(
        relations.enrollments,
        DefectClass::DuplicateEnrollment,
        |e| e.key(),
        &mut audit,
    );
    let programs = dedup(
        relations.programs,
        DefectClass::DuplicateProgram,
        |p| p.key(),
        &mut audit,
    );

    let students = drop_missing(
        students,
        |s| s.student_id.is_empty() || s.first_name.is_empty() || s.last_name.is_empty(),
        |s| format!("student:{}", s.student_id),
        &mut audit,
    );
    let enrollments = drop_missing(
        enrollments,
        |e| e.student_id.is_empty() || e.term.is_empty() || e.department.is_empty(),
        |e| format!("enrollment:{}", e.key()),
        &mut audit,
    );
    let departments = drop_missing(
        departments,
        |d| d.code.is_empty(),
        |d| format!("department:{}", d.name),
        &mut audit,
    );

    let surviving: HashSet<String> = students.iter().map(|s| s.student_id.clone()).collect();

    let enrollments = drop_orphans(
        enrollments,
        DefectClass::OrphanEnrollment,
        |e| e.student_id.clone(),
        |e| e.key(),
        &surviving,
        &mut audit,
    );
    let programs = drop_orphans(
        programs,
        DefectClass::OrphanProgram,
        |p| p.student_id.clone(),
        |p| p.key(),
        &surviving,
        &mut audit,
    );

    let enrollments = clamp_credits(enrollments, &mut audit);

    log_summary(&audit);

    CleanOutcome {
        relations: Relations {
            students,
            programs,
            enrollments,
            departments,
        },
        audit,
    }
}

/// Retains the first occurrence of each key in original load order.
fn dedup<T, K>(
    rows: Vec<T>,
    class: DefectClass,
    key_fn: K,
    audit: &mut Vec<AuditEntry>,
) -> Vec<T>
where
    K: Fn(&T) -> String,
{
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(rows.len());
    for row in rows {
        let key = key_fn(&row);
        if seen.insert(key.clone()) {
            kept.push(row);
        } else {
            audit.push(AuditEntry {
                class,
                key,
                action: CleanAction::DroppedDuplicate,
            });
        }
    }
    kept
}

fn drop_missing<T, P, K>(
    rows: Vec<T>,
    is_defective: P,
    key_fn: K,
    audit: &mut Vec<AuditEntry>,
) -> Vec<T>
where
    P: Fn(&T) -> bool,
    K: Fn(&T) -> String,
{
    let mut kept = Vec::with_capacity(rows.len());
    for row in rows {
        if is_defective(&row) {
            audit.push(AuditEntry {
                class: DefectClass::MissingRequiredField,
                key: key_fn(&row),
                action: CleanAction::DroppedMissingField,
            });
        } else {
            kept.push(row);
        }
    }
    kept
}

fn drop_orphans<T, S, K>(
    rows: Vec<T>,
    class: DefectClass,
    student_fn: S,
    key_fn: K,
    surviving: &HashSet<String>,
    audit: &mut Vec<AuditEntry>,
) -> Vec<T>
where
    S: Fn(&T) -> String,
    K: Fn(&T) -> String,
{
    let mut kept = Vec::with_capacity(rows.len());
    for row in rows {
        if surviving.contains(&student_fn(&row)) {
            kept.push(row);
        } else {
            audit.push(AuditEntry {
                class,
                key: key_fn(&row),
                action: CleanAction::DroppedOrphan,
            });
        }
    }
    kept
}

/// Out-of-range credit hours are clamped to the nearest domain boundary; the
/// enrollment itself survives.
fn clamp_credits(rows: Vec<Enrollment>, audit: &mut Vec<AuditEntry>) -> Vec<Enrollment> {
    rows.into_iter()
        .map(|mut enrollment| {
            let clamped = enrollment
                .credit_hours
                .clamp(CREDIT_HOURS_MIN, CREDIT_HOURS_MAX);
            if clamped != enrollment.credit_hours {
                audit.push(AuditEntry {
                    class: DefectClass::CreditHoursOutOfRange,
                    key: enrollment.key(),
                    action: CleanAction::ClampedCredits {
                        from: enrollment.credit_hours,
                        to: clamped,
                    },
                });
                enrollment.credit_hours = clamped;
            }
            enrollment
        })
        .collect()
}

fn log_summary(audit: &[AuditEntry]) {
    if audit.is_empty() {
        return;
    }
    let mut per_class: HashMap<DefectClass, usize> = HashMap::new();
    for entry in audit {
        tracing::debug!("  {} [{}]: {}", entry.class, entry.key, entry.action);
        *per_class.entry(entry.class).or_insert(0) += 1;
    }
    for (class, count) in per_class {
        tracing::info!("🧹 Cleaned {}: {} actions", class, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validate;
    use crate::domain::model::{Department, Enrollment, Student};

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

    fn enrollment(id: &str, term: &str, course: &str, dept: &str, credits: i64) -> Enrollment {
        Enrollment {
            student_id: id.to_string(),
            term: term.to_string(),
            course_id: course.to_string(),
            section: String::new(),
            department: dept.to_string(),
            course_name: String::new(),
            credit_hours: credits,
        }
    }

    fn department(code: &str, name: &str) -> Department {
        Department {
            code: code.to_string(),
            name: name.to_string(),
            contact: String::new(),
            location: String::new(),
        }
    }

    #[test]
    fn test_duplicates_keep_first_occurrence_in_load_order() {
        let relations = Relations {
            students: vec![student("S1", "Kept"), student("S1", "Dropped")],
            ..Default::default()
        };

        let outcome = clean(relations);

        assert_eq!(outcome.relations.students.len(), 1);
        assert_eq!(outcome.relations.students[0].last_name, "Kept");
        assert_eq!(
            outcome.audit,
            vec![AuditEntry {
                class: DefectClass::DuplicateStudent,
                key: "S1".to_string(),
                action: CleanAction::DroppedDuplicate,
            }]
        );
    }

    #[test]
    fn test_orphan_rows_are_dropped_entirely() {
        let relations = Relations {
            students: vec![student("S1", "Lovelace")],
            enrollments: vec![
                enrollment("S1", "2244", "MATH101", "MATH", 3),
                enrollment("GHOST", "2244", "PHYS210", "PHYS", 3),
            ],
            ..Default::default()
        };

        let outcome = clean(relations);

        assert_eq!(outcome.relations.enrollments.len(), 1);
        assert_eq!(outcome.relations.enrollments[0].student_id, "S1");
        assert!(outcome
            .audit
            .iter()
            .any(|e| e.class == DefectClass::OrphanEnrollment
                && e.action == CleanAction::DroppedOrphan));
    }

    #[test]
    fn test_unknown_department_is_not_cleaned() {
        let relations = Relations {
            students: vec![student("S1", "Lovelace")],
            enrollments: vec![enrollment("S1", "2244", "ART101", "ARTH", 3)],
            departments: vec![department("MATH", "Mathematics")],
            ..Default::default()
        };

        let outcome = clean(relations);

        // The enrollment survives with its raw department code intact
        assert_eq!(outcome.relations.enrollments.len(), 1);
        assert_eq!(outcome.relations.enrollments[0].department, "ARTH");
        assert!(outcome.audit.is_empty());
    }

    #[test]
    fn test_credit_hours_clamped_not_dropped() {
        let relations = Relations {
            students: vec![student("S1", "Lovelace")],
            enrollments: vec![
                enrollment("S1", "2244", "MATH101", "MATH", 45),
                enrollment("S1", "2244", "PHYS210", "PHYS", -3),
            ],
            ..Default::default()
        };

        let outcome = clean(relations);

        let credits: Vec<i64> = outcome
            .relations
            .enrollments
            .iter()
            .map(|e| e.credit_hours)
            .collect();
        assert_eq!(credits, vec![30, 0]);
        assert!(outcome.audit.iter().any(|e| e.action
            == CleanAction::ClampedCredits { from: 45, to: 30 }));
    }

    #[test]
    fn test_dropping_defective_student_cascades_to_owned_rows() {
        let relations = Relations {
            students: vec![student("S1", "")],
            enrollments: vec![enrollment("S1", "2244", "MATH101", "MATH", 3)],
            ..Default::default()
        };

        let outcome = clean(relations);

        assert!(outcome.relations.students.is_empty());
        // The now-orphaned enrollment goes with its student
        assert!(outcome.relations.enrollments.is_empty());
    }

    #[test]
    fn test_revalidation_after_cleaning_shows_zero_defects() {
        let relations = Relations {
            students: vec![
                student("S1", "Lovelace"),
                student("S1", "Duplicate"),
                student("S2", ""),
            ],
            enrollments: vec![
                enrollment("S1", "2244", "MATH101", "MATH", 3),
                enrollment("S1", "2244", "MATH101", "MATH", 3),
                enrollment("S2", "2244", "PHYS210", "PHYS", 3),
                enrollment("GHOST", "2244", "CHEM101", "CHEM", 99),
            ],
            ..Default::default()
        };

        let outcome = clean(relations);
        let recheck = validate::validate(&outcome.relations);

        assert!(recheck.is_clean());
        assert_eq!(recheck.count(DefectClass::DuplicateStudent), 0);
        assert_eq!(recheck.count(DefectClass::OrphanEnrollment), 0);
        assert_eq!(recheck.count(DefectClass::MissingRequiredField), 0);
        assert_eq!(recheck.count(DefectClass::CreditHoursOutOfRange), 0);
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let relations = Relations {
            students: vec![student("S1", "Lovelace"), student("S1", "Duplicate")],
            enrollments: vec![enrollment("S1", "2244", "MATH101", "MATH", 45)],
            ..Default::default()
        };

        let first = clean(relations);
        let second = clean(first.relations.clone());

        assert!(second.audit.is_empty());
        assert_eq!(first.relations.students, second.relations.students);
        assert_eq!(first.relations.enrollments, second.relations.enrollments);
    }
}
