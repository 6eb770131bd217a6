use crate::core::{Pipeline, RecordCount};
use crate::utils::error::Result;

/// Drives a pipeline through extract, transform and load.
pub struct PipelineEngine<P: Pipeline> {
    pipeline: P,
    name: String,
}

impl<P: Pipeline> PipelineEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::named(pipeline, "pipeline")
    }

    pub fn named(pipeline: P, name: impl Into<String>) -> Self {
        Self {
            pipeline,
            name: name.into(),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting {} run", self.name);

        tracing::info!("Extracting data...");
        let raw_data = self.pipeline.extract().await?;
        tracing::info!("Extracted {} records", raw_data.record_count());

        tracing::info!("Transforming data...");
        let transformed = self.pipeline.transform(raw_data).await?;
        tracing::info!("Transformed {} records", transformed.record_count());

        tracing::info!("Loading data...");
        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}
