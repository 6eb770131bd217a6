pub mod batch_pipeline;
pub mod engine;
pub mod evaluator;
pub mod interactive;
pub mod output;
pub mod report;
pub mod sales_pipeline;
pub mod stats;

pub use crate::domain::model::{BatchReport, CuppingResult};
pub use crate::domain::ports::{ConfigProvider, OutputFormat, Pipeline, RecordCount, Storage};
pub use crate::utils::error::Result;
