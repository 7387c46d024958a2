use anyhow::Context;
use clap::Parser;
use student_term_etl::domain::ports::ConfigProvider;
use student_term_etl::utils::{logger, validation::Validate};
use student_term_etl::{CliConfig, EtlEngine, LocalStorage, StudentTermPipeline, TomlConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting student-term-etl");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let result = if let Some(path) = cli.config.clone() {
        let config = TomlConfig::from_file(&path)
            .with_context(|| format!("failed to load configuration file {}", path))?;
        let monitor_enabled = cli.monitor || config.monitoring_enabled();
        run(config, monitor_enabled).await
    } else {
        let monitor_enabled = cli.monitor;
        run(cli, monitor_enabled).await
    };

    match result {
        Ok(output_path) => {
            tracing::info!("✅ ETL process completed successfully!");
            tracing::info!("📁 Output saved to: {}", output_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                student_term_etl::utils::error::ErrorSeverity::Low => 0,
                student_term_etl::utils::error::ErrorSeverity::Medium => 2,
                student_term_etl::utils::error::ErrorSeverity::High => 1,
                student_term_etl::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }
    }
}

async fn run<C>(config: C, monitor_enabled: bool) -> student_term_etl::Result<String>
where
    C: ConfigProvider + Validate + 'static,
{
    config.validate()?;

    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = StudentTermPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    engine.run().await
}
