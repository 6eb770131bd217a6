use clap::Parser;
use cupping_lab::config::{Command, JobArgs, ScoreArgs};
use cupping_lab::core::report::{render_details, render_ranking, render_results};
use cupping_lab::core::Pipeline;
use cupping_lab::utils::{logger, validation::Validate};
use cupping_lab::{
    BatchPipeline, CliConfig, CuppingError, InteractiveSession, LocalStorage, PipelineEngine,
    SalesPipeline,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);
    tracing::debug!("CLI config: {:?}", config);

    let outcome = match config.command.unwrap_or(Command::Interactive { decimals: 2 }) {
        Command::Interactive { decimals } => run_interactive(decimals),
        Command::Score(args) => run_score(&args),
        Command::Batch(job) => run_batch(job).await,
        Command::Sales(job) => run_sales(job).await,
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    Ok(())
}

fn run_interactive(decimals: u32) -> Result<(), CuppingError> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    InteractiveSession::new(stdin.lock(), stdout.lock())
        .with_decimals(decimals)
        .run()?;
    Ok(())
}

fn run_score(args: &ScoreArgs) -> Result<(), CuppingError> {
    let result = args.evaluate()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_results(&result, args.decimals));
        print!("{}", render_details(&result, args.decimals));
    }
    Ok(())
}

async fn run_batch(job: JobArgs) -> Result<(), CuppingError> {
    job.validate()?;
    let decimals = job.output.decimals;

    // Phases run one by one so the ranking can be shown before the report is written.
    let storage = LocalStorage::new(job.output.output_path.clone());
    let pipeline = BatchPipeline::new(storage, job);
    let samples = pipeline.extract().await?;
    let report = pipeline.transform(samples).await?;
    print!("{}", render_ranking(&report, decimals));

    let output_path = pipeline.load(report).await?;
    tracing::info!("✅ Cupping report completed");
    println!("\n📁 Report saved to: {}", output_path);
    Ok(())
}

async fn run_sales(job: JobArgs) -> Result<(), CuppingError> {
    job.validate()?;

    let storage = LocalStorage::new(job.output.output_path.clone());
    let engine = PipelineEngine::named(SalesPipeline::new(storage, job), "sales summary");
    let output_path = engine.run().await?;

    tracing::info!("✅ Sales summary completed");
    println!("📁 Output saved to: {}", output_path);
    Ok(())
}
