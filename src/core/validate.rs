//! Structural integrity checks over the normalized relations.
//!
//! The validator classifies, it never repairs: every check produces a count
//! and a bounded sample of offending keys, and the resulting report is
//! consumed by the cleaner. Orphan department references and students without
//! enrollments are warnings, not defects; the asymmetry against the
//! orphan-student case is intentional (every enrollment must belong to
//! someone, department metadata is optional enrichment).

use crate::domain::model::{DefectClass, Relations};
use crate::utils::error::{EtlError, Result};
use std::collections::{HashMap, HashSet};

const SAMPLE_LIMIT: usize = 5;

pub const CREDIT_HOURS_MIN: i64 = 0;
pub const CREDIT_HOURS_MAX: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Recoverable via the cleaner; fatal if it survives cleaning.
    Defect,
    /// Informational; never blocks the run.
    Warning,
}

#[derive(Debug, Clone)]
pub struct Finding {
    pub class: DefectClass,
    pub severity: Severity,
    pub count: usize,
    pub sample_keys: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn count(&self, class: DefectClass) -> usize {
        self.findings
            .iter()
            .find(|f| f.class == class)
            .map(|f| f.count)
            .unwrap_or(0)
    }

    pub fn defects(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Defect)
    }

    pub fn is_clean(&self) -> bool {
        self.defects().next().is_none()
    }

    /// First defect class still present; used to enforce the post-cleaning
    /// zero-residual contract.
    pub fn first_residual(&self) -> Option<&Finding> {
        self.defects().next()
    }

    pub fn log(&self) {
        if self.findings.is_empty() {
            tracing::info!("✅ All data quality checks passed");
            return;
        }
        for finding in &self.findings {
            match finding.severity {
                Severity::Defect => tracing::warn!(
                    "⚠ {}: {} flagged (samples: {})",
                    finding.class,
                    finding.count,
                    finding.sample_keys.join(", ")
                ),
                Severity::Warning => tracing::info!(
                    "{}: {} flagged, tolerated (samples: {})",
                    finding.class,
                    finding.count,
                    finding.sample_keys.join(", ")
                ),
            }
        }
    }
}

/// Fatal precondition: no summary can be produced from an empty student or
/// enrollment relation.
pub fn check_preconditions(relations: &Relations) -> Result<()> {
    let mut empty = Vec::new();
    if relations.students.is_empty() {
        empty.push("student");
    }
    if relations.enrollments.is_empty() {
        empty.push("enrollment");
    }

    if empty.is_empty() {
        Ok(())
    } else {
        Err(EtlError::PreconditionError {
            message: format!(
                "the {} relation is empty after normalization",
                empty.join(" and ")
            ),
        })
    }
}

pub fn validate(relations: &Relations) -> ValidationReport {
    let mut findings = Vec::new();

    push_duplicates(
        &mut findings,
        DefectClass::DuplicateStudent,
        relations.students.iter().map(|s| s.student_id.clone()),
    );
    push_duplicates(
        &mut findings,
        DefectClass::DuplicateDepartment,
        relations.departments.iter().map(|d| d.code.clone()),
    );
    push_duplicates(
        &mut findings,
        DefectClass::DuplicateEnrollment,
        relations.enrollments.iter().map(|e| e.key()),
    );
    push_duplicates(
        &mut findings,
        DefectClass::DuplicateProgram,
        relations.programs.iter().map(|p| p.key()),
    );

    let student_ids: HashSet<&str> = relations
        .students
        .iter()
        .map(|s| s.student_id.as_str())
        .collect();

    push_orphans(
        &mut findings,
        DefectClass::OrphanEnrollment,
        relations.enrollments.iter().map(|e| e.student_id.as_str()),
        &student_ids,
    );
    push_orphans(
        &mut findings,
        DefectClass::OrphanProgram,
        relations.programs.iter().map(|p| p.student_id.as_str()),
        &student_ids,
    );

    push_unknown_departments(&mut findings, relations);
    push_missing_required(&mut findings, relations);
    push_credit_range(&mut findings, relations);
    push_students_without_enrollments(&mut findings, relations);

    ValidationReport { findings }
}

/// Count = distinct keys occurring more than once, samples in first-seen
/// order.
fn push_duplicates<I>(findings: &mut Vec<Finding>, class: DefectClass, keys: I)
where
    I: Iterator<Item = String> + Clone,
{
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    for key in keys.clone() {
        *occurrences.entry(key).or_insert(0) += 1;
    }

    let mut sampled = HashSet::new();
    let mut sample_keys = Vec::new();
    let mut count = 0;
    for key in keys {
        if occurrences.get(&key).copied().unwrap_or(0) > 1 && sampled.insert(key.clone()) {
            count += 1;
            if sample_keys.len() < SAMPLE_LIMIT {
                sample_keys.push(key);
            }
        }
    }

    if count > 0 {
        findings.push(Finding {
            class,
            severity: Severity::Defect,
            count,
            sample_keys,
        });
    }
}

/// Count = rows whose owning student is missing, samples are the distinct
/// missing student ids.
fn push_orphans<'a, I>(
    findings: &mut Vec<Finding>,
    class: DefectClass,
    rows: I,
    student_ids: &HashSet<&str>,
) where
    I: Iterator<Item = &'a str>,
{
    let mut count = 0;
    let mut sampled = HashSet::new();
    let mut sample_keys = Vec::new();
    for student_id in rows {
        if !student_ids.contains(student_id) {
            count += 1;
            if sample_keys.len() < SAMPLE_LIMIT && sampled.insert(student_id.to_string()) {
                sample_keys.push(student_id.to_string());
            }
        }
    }

    if count > 0 {
        findings.push(Finding {
            class,
            severity: Severity::Defect,
            count,
            sample_keys,
        });
    }
}

fn push_unknown_departments(findings: &mut Vec<Finding>, relations: &Relations) {
    let dept_codes: HashSet<&str> = relations
        .departments
        .iter()
        .map(|d| d.code.as_str())
        .collect();

    let mut count = 0;
    let mut sampled = HashSet::new();
    let mut sample_keys = Vec::new();
    for enrollment in &relations.enrollments {
        if !enrollment.department.is_empty() && !dept_codes.contains(enrollment.department.as_str())
        {
            count += 1;
            if sample_keys.len() < SAMPLE_LIMIT && sampled.insert(enrollment.department.clone()) {
                sample_keys.push(enrollment.department.clone());
            }
        }
    }

    if count > 0 {
        findings.push(Finding {
            class: DefectClass::UnknownDepartment,
            severity: Severity::Warning,
            count,
            sample_keys,
        });
    }
}

/// Required fields: student id and names, enrollment id/term/department,
/// department code. Credit hours are part of the declared battery but the
/// normalizer's cast guarantees their presence, so they can never be flagged
/// here.
fn push_missing_required(findings: &mut Vec<Finding>, relations: &Relations) {
    let mut count = 0;
    let mut sample_keys = Vec::new();
    let mut sample = |label: String| {
        count += 1;
        if sample_keys.len() < SAMPLE_LIMIT {
            sample_keys.push(label);
        }
    };

    for (i, student) in relations.students.iter().enumerate() {
        if student.student_id.is_empty()
            || student.first_name.is_empty()
            || student.last_name.is_empty()
        {
            sample(if student.student_id.is_empty() {
                format!("student[{}]", i)
            } else {
                format!("student:{}", student.student_id)
            });
        }
    }

    for (i, enrollment) in relations.enrollments.iter().enumerate() {
        if enrollment.student_id.is_empty()
            || enrollment.term.is_empty()
            || enrollment.department.is_empty()
        {
            sample(format!("enrollment[{}]:{}", i, enrollment.key()));
        }
    }

    for (i, department) in relations.departments.iter().enumerate() {
        if department.code.is_empty() {
            sample(format!("department[{}]", i));
        }
    }

    if count > 0 {
        findings.push(Finding {
            class: DefectClass::MissingRequiredField,
            severity: Severity::Defect,
            count,
            sample_keys,
        });
    }
}

fn push_credit_range(findings: &mut Vec<Finding>, relations: &Relations) {
    let mut count = 0;
    let mut sample_keys = Vec::new();
    for enrollment in &relations.enrollments {
        if enrollment.credit_hours < CREDIT_HOURS_MIN || enrollment.credit_hours > CREDIT_HOURS_MAX
        {
            count += 1;
            if sample_keys.len() < SAMPLE_LIMIT {
                sample_keys.push(format!("{}={}", enrollment.key(), enrollment.credit_hours));
            }
        }
    }

    if count > 0 {
        findings.push(Finding {
            class: DefectClass::CreditHoursOutOfRange,
            severity: Severity::Defect,
            count,
            sample_keys,
        });
    }
}

fn push_students_without_enrollments(findings: &mut Vec<Finding>, relations: &Relations) {
    let enrolled: HashSet<&str> = relations
        .enrollments
        .iter()
        .map(|e| e.student_id.as_str())
        .collect();

    let mut count = 0;
    let mut sample_keys = Vec::new();
    for student in &relations.students {
        if !enrolled.contains(student.student_id.as_str()) {
            count += 1;
            if sample_keys.len() < SAMPLE_LIMIT {
                sample_keys.push(student.student_id.clone());
            }
        }
    }

    if count > 0 {
        findings.push(Finding {
            class: DefectClass::StudentWithoutEnrollments,
            severity: Severity::Warning,
            count,
            sample_keys,
        });
    }
}
