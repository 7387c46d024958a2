use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Untyped row handed over by a source reader. Column names are whatever the
/// source exposes; only the normalizer interprets them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    pub data: HashMap<String, serde_json::Value>,
}

impl RawRecord {
    pub fn new(data: HashMap<String, serde_json::Value>) -> Self {
        Self { data }
    }

    /// Case-insensitive column lookup.
    pub fn get(&self, column: &str) -> Option<&serde_json::Value> {
        self.data
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(column))
            .map(|(_, v)| v)
    }
}

/// Raw rows from the three sources, in original load order.
#[derive(Debug, Clone, Default)]
pub struct RawSources {
    pub students: Vec<RawRecord>,
    pub programs: Vec<RawRecord>,
    pub enrollments: Vec<RawRecord>,
    pub departments: Vec<RawRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub admit_term: String,
    pub admit_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcademicProgram {
    pub program_id: String,
    pub student_id: String,
    pub program_code: String,
    pub status: String,
    /// Canonical ISO form when the source date was parseable, else the raw
    /// trimmed value.
    pub effective_date: String,
}

impl AcademicProgram {
    pub fn effective_date_parsed(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.effective_date, "%Y-%m-%d").ok()
    }

    /// Natural composite key: one program row per (student, program, date).
    pub fn key(&self) -> String {
        format!(
            "{}/{}/{}",
            self.student_id, self.program_code, self.effective_date
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub student_id: String,
    pub term: String,
    pub course_id: String,
    /// Empty when the source carries no section column.
    pub section: String,
    pub department: String,
    pub course_name: String,
    pub credit_hours: i64,
}

impl Enrollment {
    /// Natural composite key: (student, term, course, section).
    pub fn key(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.student_id, self.term, self.course_id, self.section
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub code: String,
    pub name: String,
    pub contact: String,
    pub location: String,
}

/// The four normalized relations, handed forward from stage to stage. Each
/// stage consumes its input and produces a new value; upstream relations are
/// never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct Relations {
    pub students: Vec<Student>,
    pub programs: Vec<AcademicProgram>,
    pub enrollments: Vec<Enrollment>,
    pub departments: Vec<Department>,
}

/// Defect classes recognized by the validator and remediated (or tolerated)
/// by the cleaner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefectClass {
    DuplicateStudent,
    DuplicateProgram,
    DuplicateEnrollment,
    DuplicateDepartment,
    OrphanEnrollment,
    OrphanProgram,
    UnknownDepartment,
    MissingRequiredField,
    CreditHoursOutOfRange,
    StudentWithoutEnrollments,
}

impl fmt::Display for DefectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DefectClass::DuplicateStudent => "duplicate student",
            DefectClass::DuplicateProgram => "duplicate academic program",
            DefectClass::DuplicateEnrollment => "duplicate enrollment",
            DefectClass::DuplicateDepartment => "duplicate department",
            DefectClass::OrphanEnrollment => "orphan enrollment (missing student)",
            DefectClass::OrphanProgram => "orphan academic program (missing student)",
            DefectClass::UnknownDepartment => "unknown department reference",
            DefectClass::MissingRequiredField => "missing required field",
            DefectClass::CreditHoursOutOfRange => "credit hours out of range",
            DefectClass::StudentWithoutEnrollments => "student without enrollments",
        };
        f.write_str(name)
    }
}

/// One remediation taken by the cleaner, recorded for auditability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub class: DefectClass,
    pub key: String,
    pub action: CleanAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanAction {
    DroppedDuplicate,
    DroppedOrphan,
    DroppedMissingField,
    ClampedCredits { from: i64, to: i64 },
}

impl fmt::Display for CleanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanAction::DroppedDuplicate => write!(f, "dropped duplicate row"),
            CleanAction::DroppedOrphan => write!(f, "dropped orphaned row"),
            CleanAction::DroppedMissingField => write!(f, "dropped row with missing field"),
            CleanAction::ClampedCredits { from, to } => {
                write!(f, "clamped credit hours {} -> {}", from, to)
            }
        }
    }
}

/// One row of the final term report, ordered by (student_id, term).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub student_id: String,
    pub last_name: String,
    pub term: String,
    pub total_credits: i64,
    pub focused_department_name: String,
    /// Empty when the focused department had no reference match.
    pub focused_department_contact: String,
}

/// What the transform stage hands to the load stage.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub rows: Vec<SummaryRow>,
    pub csv_output: String,
    pub audit: Vec<AuditEntry>,
}
