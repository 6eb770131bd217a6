use crate::core::evaluator::{round_half_even, CuppingScoreEvaluator};
use crate::core::output::{bundle_zip, csv_bytes, output_location, OutputFile};
use crate::core::{ConfigProvider, OutputFormat, Pipeline, RecordCount, Storage};
use crate::domain::model::{
    BatchReport, CupQualityCounts, CuppingResult, CuppingSample, RankedSample, Section,
    SectionScores,
};
use crate::utils::error::{CuppingError, Result};

pub const REPORT_CSV: &str = "cupping_report.csv";
pub const REPORT_JSON: &str = "cupping_report.json";
pub const REPORT_ZIP: &str = "cupping_report.zip";

/// Scores every sample of a cupping sheet and ranks them.
pub struct BatchPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> BatchPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

impl RecordCount for BatchReport {
    fn record_count(&self) -> usize {
        self.samples.len()
    }
}

enum SheetColumn {
    Section(Section),
    Name,
    Origin,
    NonUniform,
    Defective,
    Ignored,
}

fn normalize_header(header: &str) -> String {
    header.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

fn classify_header(header: &str) -> SheetColumn {
    let normalized = normalize_header(header);
    if let Ok(section) = normalized.parse::<Section>() {
        return SheetColumn::Section(section);
    }
    match normalized.as_str() {
        "name" | "sample" => SheetColumn::Name,
        "origin" => SheetColumn::Origin,
        "non_uniform" | "non_uniform_cups" => SheetColumn::NonUniform,
        "defective" | "defective_cups" => SheetColumn::Defective,
        "grade" => SheetColumn::Ignored,
        _ => {
            tracing::warn!("Ignoring unrecognised sheet column '{}'", header);
            SheetColumn::Ignored
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Reads a cupping sheet: a header row naming the eight sections, plus
/// optional `name`, `origin`, `non_uniform` and `defective` columns.
pub fn parse_sheet(data: &[u8]) -> Result<Vec<CuppingSample>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    let columns: Vec<SheetColumn> = reader.headers()?.iter().map(classify_header).collect();

    for section in Section::ALL {
        let present = columns
            .iter()
            .any(|c| matches!(c, SheetColumn::Section(s) if *s == section));
        if !present {
            return Err(CuppingError::MissingSection {
                section: section.to_string(),
            });
        }
    }

    let mut samples = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let row = index + 1;

        let mut sample = CuppingSample {
            row,
            name: format!("Sample {}", row),
            origin: None,
            scores: Vec::with_capacity(Section::ALL.len()),
            non_uniform: None,
            defective: None,
        };

        for (column, value) in columns.iter().zip(record.iter()) {
            match column {
                SheetColumn::Section(section) => sample.scores.push((*section, value.to_string())),
                SheetColumn::Name => {
                    if let Some(name) = non_empty(value) {
                        sample.name = name;
                    }
                }
                SheetColumn::Origin => sample.origin = non_empty(value),
                SheetColumn::NonUniform => sample.non_uniform = non_empty(value),
                SheetColumn::Defective => sample.defective = non_empty(value),
                SheetColumn::Ignored => {}
            }
        }

        samples.push(sample);
    }

    Ok(samples)
}

fn parse_score(section: Section, raw: &str) -> Result<f64> {
    raw.parse::<f64>().map_err(|_| CuppingError::InvalidInput {
        field: section.to_string(),
        value: raw.to_string(),
        reason: "not a number".to_string(),
    })
}

fn parse_count(field: &str, raw: Option<&str>) -> Result<i64> {
    match raw {
        None => Ok(0),
        Some(raw) => raw.parse::<i64>().map_err(|_| CuppingError::InvalidInput {
            field: field.to_string(),
            value: raw.to_string(),
            reason: "not a whole number".to_string(),
        }),
    }
}

pub fn evaluate_sample(sample: &CuppingSample) -> Result<CuppingResult> {
    let pairs = sample
        .scores
        .iter()
        .map(|(section, raw)| parse_score(*section, raw).map(|score| (section.as_str(), score)))
        .collect::<Result<Vec<_>>>()?;

    let scores = SectionScores::from_pairs(pairs)?;
    let counts = CupQualityCounts::new(
        parse_count("non_uniform", sample.non_uniform.as_deref())?,
        parse_count("defective", sample.defective.as_deref())?,
    )?;

    Ok(CuppingScoreEvaluator::compute(&scores, counts))
}

/// Highest final score first; equal scores keep sheet order.
pub fn rank_samples(samples: Vec<(CuppingSample, CuppingResult)>) -> Result<BatchReport> {
    let mut scored = samples;
    scored.sort_by(|a, b| b.1.final_score.total_cmp(&a.1.final_score));

    let ranked: Vec<RankedSample> = scored
        .into_iter()
        .enumerate()
        .map(|(i, (sample, result))| RankedSample {
            rank: i + 1,
            name: sample.name,
            origin: sample.origin,
            grade: result.grade(),
            result,
        })
        .collect();

    let (highest_score, lowest_score) = match (ranked.first(), ranked.last()) {
        (Some(first), Some(last)) => (first.result.final_score, last.result.final_score),
        _ => return Err(CuppingError::processing("cupping sheet has no samples")),
    };

    Ok(BatchReport {
        samples: ranked,
        highest_score,
        lowest_score,
        score_range: highest_score - lowest_score,
    })
}

fn report_csv(report: &BatchReport, decimals: u32) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["rank".to_string(), "name".to_string(), "origin".to_string()];
    header.extend(Section::ALL.iter().map(|s| s.as_str().to_string()));
    header.extend(
        [
            "non_uniform",
            "defective",
            "sum_of_sections",
            "base_contribution",
            "non_uniform_penalty",
            "defect_penalty",
            "final_score",
            "rounded_score",
            "grade",
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    writer.write_record(&header)?;

    for sample in &report.samples {
        let result = &sample.result;
        let mut row = vec![
            sample.rank.to_string(),
            sample.name.clone(),
            sample.origin.clone().unwrap_or_default(),
        ];
        row.extend(result.scores.iter().map(|(_, score)| score.to_string()));
        row.extend([
            result.counts.non_uniform.to_string(),
            result.counts.defective.to_string(),
            result.sum_of_sections.to_string(),
            result.base_contribution.to_string(),
            result.non_uniform_penalty.to_string(),
            result.defect_penalty.to_string(),
            result.final_score.to_string(),
            format!(
                "{:.*}",
                decimals as usize,
                round_half_even(result.final_score, decimals)
            ),
            sample.grade.label().to_string(),
        ]);
        writer.write_record(&row)?;
    }

    csv_bytes(writer)
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for BatchPipeline<S, C> {
    type Extracted = Vec<CuppingSample>;
    type Transformed = BatchReport;

    async fn extract(&self) -> Result<Vec<CuppingSample>> {
        tracing::debug!("Reading cupping sheet from: {}", self.config.input_path());
        let data = self.storage.read_file(self.config.input_path()).await?;
        parse_sheet(&data)
    }

    async fn transform(&self, data: Vec<CuppingSample>) -> Result<BatchReport> {
        let mut scored = Vec::with_capacity(data.len());
        for sample in data {
            let result = evaluate_sample(&sample).map_err(|e| CuppingError::in_row(sample.row, e))?;
            tracing::debug!(
                row = sample.row,
                name = %sample.name,
                final_score = result.final_score,
                "sample scored"
            );
            scored.push((sample, result));
        }

        let report = rank_samples(scored)?;
        tracing::info!(
            "Highest {:.2}, lowest {:.2}, range {:.2}",
            report.highest_score,
            report.lowest_score,
            report.score_range
        );
        Ok(report)
    }

    async fn load(&self, report: BatchReport) -> Result<String> {
        let decimals = self.config.decimals();
        let mut files = Vec::new();

        for format in self.config.output_formats() {
            match format {
                OutputFormat::Csv => {
                    files.push(OutputFile::new(REPORT_CSV, report_csv(&report, decimals)?))
                }
                OutputFormat::Json => files.push(OutputFile::new(
                    REPORT_JSON,
                    serde_json::to_vec_pretty(&report)?,
                )),
            }
        }

        if files.is_empty() {
            return Err(CuppingError::MissingConfigError {
                field: "output_formats".to_string(),
            });
        }

        if self.config.archive() {
            let zip_data = bundle_zip(&files)?;
            tracing::debug!("Writing report archive ({} bytes)", zip_data.len());
            self.storage.write_file(REPORT_ZIP, &zip_data).await?;
            return Ok(output_location(&self.config, REPORT_ZIP));
        }

        for file in &files {
            tracing::debug!("Writing {} ({} bytes)", file.name, file.data.len());
            self.storage.write_file(&file.name, &file.data).await?;
        }

        Ok(output_location(&self.config, &files[0].name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn put(&self, path: &str, data: &str) {
            self.files
                .lock()
                .await
                .insert(path.to_string(), data.as_bytes().to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.get_file(path).await.ok_or_else(|| {
                CuppingError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    path.to_string(),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files
                .lock()
                .await
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        formats: Vec<OutputFormat>,
        archive: bool,
    }

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            "sheet.csv"
        }
        fn output_path(&self) -> &str {
            "out"
        }
        fn output_formats(&self) -> &[OutputFormat] {
            &self.formats
        }
        fn archive(&self) -> bool {
            self.archive
        }
        fn decimals(&self) -> u32 {
            2
        }
    }

    const SHEET: &str = "\
Name,Origin,Fragrance,Aroma,Flavor,Aftertaste,Acidity,Body,Balance,Overall,Non-uniform,Defective
Brazilian Santos,Brazil,7.5,7.75,8.0,7.5,7.75,8.25,7.75,8.0,0,1
Ethiopian Yirgacheffe,Ethiopia,9.0,9.25,9.5,9.0,9.25,8.5,9.0,9.25,0,0
Colombian Supremo,Colombia,8.0,8.25,8.5,8.0,8.25,8.5,8.25,8.5,1,0
";

    #[test]
    fn test_parse_sheet_maps_columns() {
        let samples = parse_sheet(SHEET.as_bytes()).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].name, "Brazilian Santos");
        assert_eq!(samples[0].origin.as_deref(), Some("Brazil"));
        assert_eq!(samples[0].scores.len(), 8);
        assert_eq!(samples[0].defective.as_deref(), Some("1"));
        assert_eq!(samples[2].row, 3);
    }

    #[test]
    fn test_parse_sheet_requires_all_sections() {
        let sheet = "name,fragrance,aroma,flavor,aftertaste,acidity,body,balance\nA,1,1,1,1,1,1,1\n";
        match parse_sheet(sheet.as_bytes()) {
            Err(CuppingError::MissingSection { section }) => assert_eq!(section, "overall"),
            other => panic!("expected missing section, got {:?}", other),
        }
    }

    #[test]
    fn test_unnamed_rows_and_blank_counts_default() {
        let sheet = "fragrance,aroma,flavor,aftertaste,acidity,body,balance,overall,defective\n\
                     8,8,8,8,8,8,8,8,\n";
        let samples = parse_sheet(sheet.as_bytes()).unwrap();
        assert_eq!(samples[0].name, "Sample 1");
        let result = evaluate_sample(&samples[0]).unwrap();
        assert_eq!(result.final_score, 94.75);
    }

    #[test]
    fn test_rank_is_descending_and_stable() {
        let sheet = "name,fragrance,aroma,flavor,aftertaste,acidity,body,balance,overall\n\
                     first,7,7,7,7,7,7,7,7\n\
                     best,9,9,9,9,9,9,9,9\n\
                     second,7,7,7,7,7,7,7,7\n";
        let samples = parse_sheet(sheet.as_bytes()).unwrap();
        let scored = samples
            .into_iter()
            .map(|s| {
                let r = evaluate_sample(&s).unwrap();
                (s, r)
            })
            .collect();
        let report = rank_samples(scored).unwrap();

        let names: Vec<&str> = report.samples.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["best", "first", "second"]);
        assert_eq!(report.samples[2].rank, 3);
        assert_eq!(report.score_range, 0.65625 * 16.0);
    }

    #[test]
    fn test_rank_rejects_empty_sheet() {
        assert!(rank_samples(Vec::new()).is_err());
    }

    #[tokio::test]
    async fn test_bad_row_reports_row_number() {
        let storage = MockStorage::default();
        storage
            .put(
                "sheet.csv",
                "name,fragrance,aroma,flavor,aftertaste,acidity,body,balance,overall\n\
                 ok,8,8,8,8,8,8,8,8\n\
                 bad,8,8,8,8,8,8,8,10.5\n",
            )
            .await;
        let pipeline = BatchPipeline::new(
            storage,
            MockConfig {
                formats: vec![OutputFormat::Csv],
                archive: false,
            },
        );

        let samples = pipeline.extract().await.unwrap();
        match pipeline.transform(samples).await {
            Err(CuppingError::InvalidRow { row, source }) => {
                assert_eq!(row, 2);
                assert!(matches!(*source, CuppingError::OutOfRange { .. }));
            }
            other => panic!("expected row error, got {:?}", other.map(|r| r.samples.len())),
        }
    }

    #[tokio::test]
    async fn test_load_writes_each_format() {
        let storage = MockStorage::default();
        storage.put("sheet.csv", SHEET).await;
        let pipeline = BatchPipeline::new(
            storage.clone(),
            MockConfig {
                formats: vec![OutputFormat::Csv, OutputFormat::Json],
                archive: false,
            },
        );

        let samples = pipeline.extract().await.unwrap();
        let report = pipeline.transform(samples).await.unwrap();
        assert_eq!(report.samples[0].name, "Ethiopian Yirgacheffe");

        let path = pipeline.load(report).await.unwrap();
        assert!(path.ends_with(REPORT_CSV));

        let csv = String::from_utf8(storage.get_file(REPORT_CSV).await.unwrap()).unwrap();
        let first_row = csv.lines().nth(1).unwrap();
        assert!(first_row.starts_with("1,Ethiopian Yirgacheffe,Ethiopia,"));

        let json: serde_json::Value =
            serde_json::from_slice(&storage.get_file(REPORT_JSON).await.unwrap()).unwrap();
        assert_eq!(json["samples"][0]["grade"], "outstanding");
        assert_eq!(json["samples"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_load_archives_when_requested() {
        let storage = MockStorage::default();
        storage.put("sheet.csv", SHEET).await;
        let pipeline = BatchPipeline::new(
            storage.clone(),
            MockConfig {
                formats: vec![OutputFormat::Csv, OutputFormat::Json],
                archive: true,
            },
        );

        let samples = pipeline.extract().await.unwrap();
        let report = pipeline.transform(samples).await.unwrap();
        let path = pipeline.load(report).await.unwrap();

        assert!(path.ends_with(REPORT_ZIP));
        assert!(storage.get_file(REPORT_CSV).await.is_none());

        let zip_data = storage.get_file(REPORT_ZIP).await.unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        assert_eq!(archive.len(), 2);
    }
}
