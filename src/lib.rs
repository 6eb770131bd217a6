pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{JobSettings, LocalStorage, ReportConfig};

pub use core::{
    batch_pipeline::BatchPipeline,
    engine::PipelineEngine,
    evaluator::{round_half_even, CuppingCalculator, CuppingScoreEvaluator},
    interactive::InteractiveSession,
    sales_pipeline::SalesPipeline,
};
pub use domain::model::{
    BatchReport, CupQualityCounts, CuppingResult, Grade, RankedSample, Section, SectionScores,
};
pub use domain::ports::{ConfigProvider, OutputFormat};
pub use utils::error::{CuppingError, Result};
