use anyhow::Context;
use clap::Parser;
use cupping_lab::utils::{logger, validation::Validate};
use cupping_lab::{
    BatchPipeline, ConfigProvider, JobSettings, LocalStorage, PipelineEngine, ReportConfig,
    SalesPipeline,
};

#[derive(Parser)]
#[command(name = "toml-report")]
#[command(about = "Run cupping and sales reports described by a TOML file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "cupping-report.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Show what would be processed without reading or writing data
    #[arg(long)]
    dry_run: bool,
}

fn describe_job(kind: &str, job: &JobSettings) {
    let formats: Vec<String> = job.output_formats().iter().map(|f| f.to_string()).collect();
    println!("  {}:", kind);
    println!("    input:   {}", job.input_path());
    println!("    output:  {}", job.output_path());
    println!("    formats: {}", formats.join(", "));
    println!("    archive: {}", job.archive());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ReportConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    let verbose = args.verbose || config.verbose();
    if config.json_logs() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("📁 Loaded configuration '{}' from {}", config.report.name, args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    let batch_job = config.batch_job();
    let sales_job = config.sales_job();

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        println!("Report: {}", config.report.name);
        if let Some(description) = &config.report.description {
            println!("  {}", description);
        }
        if let Some(job) = &batch_job {
            describe_job("batch", job);
        }
        if let Some(job) = &sales_job {
            describe_job("sales", job);
        }
        return Ok(());
    }

    if let Some(job) = batch_job {
        let storage = LocalStorage::new(job.output_path.clone());
        let engine = PipelineEngine::named(BatchPipeline::new(storage, job), "cupping batch");
        let output_path = engine.run().await.context("cupping batch failed")?;
        println!("📁 Cupping report saved to: {}", output_path);
    }

    if let Some(job) = sales_job {
        let storage = LocalStorage::new(job.output_path.clone());
        let engine = PipelineEngine::named(SalesPipeline::new(storage, job), "sales summary");
        let output_path = engine.run().await.context("sales summary failed")?;
        println!("📁 Sales summary saved to: {}", output_path);
    }

    Ok(())
}
