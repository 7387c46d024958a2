use crate::adapters::readers;
use crate::core::{aggregate, clean, normalize, rank, report, validate};
use crate::domain::model::{RawSources, TransformResult};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::{EtlError, Result};

pub const REPORT_FILENAME: &str = "term_report.csv";

/// Reconciles the three student-records sources into the per-term focus
/// report. The transform stage runs the staged core: normalize, validate,
/// clean, re-validate, aggregate, rank, assemble. Nothing is written until
/// every stage has succeeded.
pub struct StudentTermPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> StudentTermPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for StudentTermPipeline<S, C> {
    async fn extract(&self) -> Result<RawSources> {
        readers::check_input_files(&[
            ("student snapshot", self.config.student_db_path()),
            ("enrollment records", self.config.enrollments_path()),
            ("department reference", self.config.departments_path()),
        ])?;

        let (students, programs) = readers::read_snapshot(self.config.student_db_path()).await?;
        let enrollments = readers::read_delimited(self.config.enrollments_path()).await?;
        let departments = readers::read_departments(self.config.departments_path()).await?;

        Ok(RawSources {
            students,
            programs,
            enrollments,
            departments,
        })
    }

    async fn transform(&self, data: RawSources) -> Result<TransformResult> {
        let relations = normalize::normalize(data);
        validate::check_preconditions(&relations)?;

        let pre_report = validate::validate(&relations);
        pre_report.log();

        let outcome = clean::clean(relations);

        // Explicit post-condition: every class the cleaner handles must be
        // gone, or the run halts before any output is produced.
        let recheck = validate::validate(&outcome.relations);
        if let Some(residual) = recheck.first_residual() {
            return Err(EtlError::ResidualViolationError {
                class: residual.class.to_string(),
                count: residual.count,
            });
        }

        let totals = aggregate::total_credits(&outcome.relations.enrollments);
        let by_dept = aggregate::dept_credits(&outcome.relations.enrollments);
        let focus = rank::rank_focus(&by_dept, &outcome.relations.departments);
        let rows = report::assemble(&totals, &focus, &outcome.relations.students);

        if rows.is_empty() {
            return Err(EtlError::EmptyReportError {
                message: "no student-term rows survived cleaning".to_string(),
            });
        }

        tracing::info!("✅ Assembled {} student-term rows", rows.len());

        let csv_output = report::render_csv(&rows);
        Ok(TransformResult {
            rows,
            csv_output,
            audit: outcome.audit,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        self.storage
            .write_file(REPORT_FILENAME, result.csv_output.as_bytes())
            .await?;

        Ok(format!("{}/{}", self.config.output_path(), REPORT_FILENAME))
    }
}
