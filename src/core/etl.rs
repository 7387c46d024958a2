use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::time::Instant;

/// Per-stage durations and row counts, logged as a run summary.
#[derive(Debug, Default)]
pub struct StageMetrics {
    steps: Vec<(String, std::time::Duration, Option<usize>)>,
}

impl StageMetrics {
    pub fn record(&mut self, stage: &str, duration: std::time::Duration, rows: Option<usize>) {
        self.steps.push((stage.to_string(), duration, rows));
    }

    pub fn log_summary(&self, total: std::time::Duration) {
        tracing::info!("📊 Run summary ({:.2?} total):", total);
        for (stage, duration, rows) in &self.steps {
            match rows {
                Some(rows) => {
                    tracing::info!("  {}: {:.2?} ({} rows)", stage, duration, rows)
                }
                None => tracing::info!("  {}: {:.2?}", stage, duration),
            }
        }
    }
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        let run_start = Instant::now();
        let mut metrics = StageMetrics::default();
        tracing::info!("Starting ETL process...");

        tracing::info!("Extracting data...");
        let stage_start = Instant::now();
        let raw_data = self.pipeline.extract().await?;
        let raw_rows = raw_data.students.len()
            + raw_data.programs.len()
            + raw_data.enrollments.len()
            + raw_data.departments.len();
        metrics.record("Extract", stage_start.elapsed(), Some(raw_rows));
        self.monitor.log_stats("Extract");
        tracing::info!("Extracted {} source rows", raw_rows);

        tracing::info!("Transforming data...");
        let stage_start = Instant::now();
        let transformed = self.pipeline.transform(raw_data).await?;
        metrics.record(
            "Transform",
            stage_start.elapsed(),
            Some(transformed.rows.len()),
        );
        self.monitor.log_stats("Transform");
        tracing::info!(
            "Transformed into {} report rows ({} cleaning actions)",
            transformed.rows.len(),
            transformed.audit.len()
        );

        tracing::info!("Loading data...");
        let stage_start = Instant::now();
        let output_path = self.pipeline.load(transformed).await?;
        metrics.record("Load", stage_start.elapsed(), None);
        self.monitor.log_stats("Load");
        tracing::info!("Output saved to: {}", output_path);

        metrics.log_summary(run_start.elapsed());
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{RawSources, TransformResult};
    use crate::utils::error::EtlError;
    use async_trait::async_trait;

    struct StubPipeline {
        fail_transform: bool,
    }

    #[async_trait]
    impl Pipeline for StubPipeline {
        async fn extract(&self) -> Result<RawSources> {
            Ok(RawSources::default())
        }

        async fn transform(&self, _data: RawSources) -> Result<TransformResult> {
            if self.fail_transform {
                Err(EtlError::ProcessingError {
                    message: "boom".to_string(),
                })
            } else {
                Ok(TransformResult {
                    rows: vec![],
                    csv_output: String::new(),
                    audit: vec![],
                })
            }
        }

        async fn load(&self, _result: TransformResult) -> Result<String> {
            Ok("out/term_report.csv".to_string())
        }
    }

    #[tokio::test]
    async fn test_run_returns_load_output_path() {
        let engine = EtlEngine::new(StubPipeline {
            fail_transform: false,
        });
        let output = engine.run().await.unwrap();
        assert_eq!(output, "out/term_report.csv");
    }

    #[tokio::test]
    async fn test_run_stops_at_first_failing_stage() {
        let engine = EtlEngine::new(StubPipeline {
            fail_transform: true,
        });
        assert!(engine.run().await.is_err());
    }
}
