//! Per-source canonicalization into the four uniform relations.
//!
//! Column names are matched case-insensitively, identifier and text values
//! are trimmed, department codes are upper-cased so the enrollment to
//! department join is exact, and credit hours are cast to an integer with
//! non-numeric or missing values treated as zero. No cross-relation checks
//! happen here; that is the validator's job.

use crate::domain::model::{
    AcademicProgram, Department, Enrollment, RawRecord, RawSources, Relations, Student,
};
use chrono::NaiveDate;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y%m%d"];

pub fn normalize(raw: RawSources) -> Relations {
    let students: Vec<Student> = raw.students.iter().map(normalize_student).collect();
    let programs: Vec<AcademicProgram> = raw.programs.iter().map(normalize_program).collect();
    let enrollments: Vec<Enrollment> = raw.enrollments.iter().map(normalize_enrollment).collect();
    let departments: Vec<Department> = raw.departments.iter().map(normalize_department).collect();

    tracing::debug!(
        "Normalized relations: {} students, {} programs, {} enrollments, {} departments",
        students.len(),
        programs.len(),
        enrollments.len(),
        departments.len()
    );

    Relations {
        students,
        programs,
        enrollments,
        departments,
    }
}

fn normalize_student(record: &RawRecord) -> Student {
    Student {
        student_id: text_field(record, "EMPLID"),
        first_name: text_field(record, "FIRST_NAME"),
        last_name: text_field(record, "LAST_NAME"),
        email: text_field(record, "EMAIL"),
        admit_term: text_field(record, "ADMIT_TERM"),
        admit_type: text_field(record, "ADMIT_TYPE"),
    }
}

fn normalize_program(record: &RawRecord) -> AcademicProgram {
    AcademicProgram {
        program_id: text_field(record, "ID"),
        student_id: text_field(record, "EMPLID"),
        program_code: text_field(record, "ACAD_PROG"),
        status: text_field(record, "STATUS"),
        effective_date: canonical_date(&text_field(record, "EFFDT")),
    }
}

fn normalize_enrollment(record: &RawRecord) -> Enrollment {
    Enrollment {
        student_id: text_field(record, "EMPLID"),
        term: text_field(record, "STRM"),
        course_id: text_field(record, "COURSE_ID"),
        section: text_field(record, "CLASS_NBR"),
        department: text_field(record, "DEPARTMENT").to_uppercase(),
        course_name: text_field(record, "COURSE_NAME"),
        credit_hours: credit_field(record, "CREDIT_HOURS"),
    }
}

fn normalize_department(record: &RawRecord) -> Department {
    Department {
        code: text_field(record, "DEPT_CODE").to_uppercase(),
        name: text_field(record, "DEPT_NAME"),
        contact: text_field(record, "CONTACT_PERSON"),
        location: text_field(record, "LOCATION"),
    }
}

/// Trimmed text form of a column value; missing or null columns become the
/// empty string.
fn text_field(record: &RawRecord, column: &str) -> String {
    match record.get(column) {
        Some(serde_json::Value::String(s)) => s.trim().to_string(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Integer cast for credit hours. Non-numeric and missing values become zero
/// rather than failing the cast.
fn credit_field(record: &RawRecord, column: &str) -> i64 {
    match record.get(column) {
        Some(serde_json::Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    }
}

/// Dates are canonicalized to ISO form when one of the known source formats
/// parses; otherwise the raw trimmed value is preserved.
fn canonical_date(raw: &str) -> String {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    raw.to_string()
}
