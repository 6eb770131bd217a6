use crate::core::evaluator::{CuppingScoreEvaluator, MAX_DECIMALS};
use crate::core::{ConfigProvider, OutputFormat};
use crate::domain::model::{CuppingResult, Section};
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_extensions, validate_path, validate_range, Validate};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "cupping-lab")]
#[command(about = "Specialty coffee cupping scores and coffee shop sales summaries")]
#[command(version)]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Prompt for each section score and print the breakdown (default)
    Interactive {
        #[arg(long, default_value_t = 2)]
        decimals: u32,
    },
    /// Score a single cup from command-line flags
    Score(ScoreArgs),
    /// Score and rank every sample of a cupping sheet CSV
    Batch(JobArgs),
    /// Clean a sales transaction CSV and summarise it
    Sales(JobArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ScoreArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub fragrance: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub aroma: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub flavor: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub aftertaste: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub acidity: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub body: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub balance: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub overall: f64,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub non_uniform: i64,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub defective: i64,

    #[arg(long, default_value_t = 2)]
    pub decimals: u32,

    #[arg(long, help = "Print the result as JSON")]
    pub json: bool,
}

impl ScoreArgs {
    pub fn section_pairs(&self) -> [(Section, f64); 8] {
        [
            (Section::Fragrance, self.fragrance),
            (Section::Aroma, self.aroma),
            (Section::Flavor, self.flavor),
            (Section::Aftertaste, self.aftertaste),
            (Section::Acidity, self.acidity),
            (Section::Body, self.body),
            (Section::Balance, self.balance),
            (Section::Overall, self.overall),
        ]
    }

    /// Validates the flags and scores the cup they describe.
    pub fn evaluate(&self) -> Result<CuppingResult> {
        self.validate()?;
        CuppingScoreEvaluator::evaluate(
            self.section_pairs()
                .iter()
                .map(|(section, score)| (section.as_str(), *score)),
            self.non_uniform,
            self.defective,
        )
    }
}

impl Validate for ScoreArgs {
    fn validate(&self) -> Result<()> {
        validate_range("decimals", self.decimals, 0, MAX_DECIMALS)
    }
}

#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_values_t = [OutputFormat::Csv, OutputFormat::Json])]
    pub formats: Vec<OutputFormat>,

    #[arg(long, help = "Bundle the report files into a single zip archive")]
    pub archive: bool,

    #[arg(long, default_value_t = 2)]
    pub decimals: u32,
}

#[derive(Debug, Clone, Args)]
pub struct JobArgs {
    #[arg(short, long)]
    pub input: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl ConfigProvider for JobArgs {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output.output_path
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.output.formats
    }

    fn archive(&self) -> bool {
        self.output.archive
    }

    fn decimals(&self) -> u32 {
        self.output.decimals
    }
}

impl Validate for JobArgs {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        validate_file_extensions("input", std::slice::from_ref(&self.input), &["csv"])?;
        validate_path("output_path", &self.output.output_path)?;
        validate_range("decimals", self.output.decimals, 0, MAX_DECIMALS)
    }
}
