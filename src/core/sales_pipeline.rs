use crate::core::output::{bundle_zip, csv_bytes, output_location, OutputFile};
use crate::core::stats;
use crate::core::{ConfigProvider, OutputFormat, Pipeline, RecordCount, Storage};
use crate::domain::sales::{
    CleaningReport, RawSalesRow, SalesAnalysis, SalesRecord, SalesSummary,
};
use crate::utils::error::{CuppingError, Result};
use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};

pub const CLEANED_CSV: &str = "sales_cleaned.csv";
pub const SUMMARY_JSON: &str = "sales_summary.json";
pub const SALES_ZIP: &str = "sales_report.zip";

const HISTOGRAM_BINS: usize = 10;
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
];
const CLEANED_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Cleans a sales transaction export and describes it.
pub struct SalesPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> SalesPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

impl RecordCount for SalesAnalysis {
    fn record_count(&self) -> usize {
        self.records.len()
    }
}

pub fn parse_sales(data: &[u8]) -> Result<Vec<RawSalesRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();
    let position = |name: &str| headers.iter().position(|h| h == name);

    let required = |name: &str| {
        position(name).ok_or_else(|| {
            CuppingError::processing(format!("sales file is missing required column '{}'", name))
        })
    };
    let datetime_idx = required("datetime")?;
    let money_idx = required("money")?;
    let coffee_idx = required("coffee_name")?;
    let cash_idx = position("cash_type");

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let field = |i: usize| record.get(i).unwrap_or_default().to_string();
        rows.push(RawSalesRow {
            row: index + 1,
            datetime: field(datetime_idx),
            money: field(money_idx),
            coffee_name: field(coffee_idx),
            cash_type: cash_idx.map(field),
        });
    }
    Ok(rows)
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn parse_money(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().trim_start_matches('$').replace(',', "");
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|m| m.is_finite() && *m >= 0.0)
}

/// Drops rows that cannot be used and normalises text fields of the rest.
pub fn clean_rows(rows: Vec<RawSalesRow>) -> (Vec<SalesRecord>, CleaningReport) {
    let mut report = CleaningReport {
        input_rows: rows.len(),
        ..CleaningReport::default()
    };
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(money) = parse_money(&row.money) else {
            tracing::debug!(row = row.row, value = %row.money, "dropping row with invalid money");
            report.dropped_invalid_money += 1;
            continue;
        };

        let coffee_name = collapse_whitespace(&row.coffee_name);
        if coffee_name.is_empty() {
            report.dropped_missing_coffee_name += 1;
            continue;
        }

        let Some(datetime) = parse_datetime(&row.datetime) else {
            tracing::debug!(row = row.row, value = %row.datetime, "dropping row with invalid datetime");
            report.dropped_invalid_datetime += 1;
            continue;
        };

        let cash_type = row
            .cash_type
            .as_deref()
            .map(collapse_whitespace)
            .filter(|c| !c.is_empty());

        records.push(SalesRecord {
            datetime,
            money,
            coffee_name,
            cash_type,
        });
    }

    report.kept_rows = records.len();
    (records, report)
}

pub fn summarize(records: &[SalesRecord], cleaning: CleaningReport) -> Result<SalesSummary> {
    let amounts: Vec<f64> = records.iter().map(|r| r.money).collect();
    let money = stats::describe(&amounts)
        .ok_or_else(|| CuppingError::processing("no valid transactions after cleaning"))?;

    let mut by_hour = vec![0usize; 24];
    let mut by_weekday = vec![0usize; 7];
    for record in records {
        by_hour[record.datetime.hour() as usize] += 1;
        by_weekday[record.datetime.weekday().num_days_from_monday() as usize] += 1;
    }

    let first_transaction = records
        .iter()
        .map(|r| r.datetime)
        .min()
        .ok_or_else(|| CuppingError::processing("no valid transactions after cleaning"))?;
    let last_transaction = records
        .iter()
        .map(|r| r.datetime)
        .max()
        .unwrap_or(first_transaction);

    Ok(SalesSummary {
        cleaning,
        total_revenue: amounts.iter().sum(),
        skew: stats::skew_of(&money),
        high_variability: stats::is_high_variability(&money),
        outlier_count: stats::iqr_outlier_count(&amounts, &money),
        money_histogram: stats::histogram(&amounts, HISTOGRAM_BINS),
        by_coffee: stats::category_stats(
            records.iter().map(|r| (r.coffee_name.as_str(), r.money)),
        ),
        by_cash_type: stats::category_stats(
            records
                .iter()
                .filter_map(|r| r.cash_type.as_deref().map(|c| (c, r.money))),
        ),
        by_hour,
        by_weekday,
        first_transaction,
        last_transaction,
        money,
    })
}

fn cleaned_csv(records: &[SalesRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["datetime", "money", "coffee_name", "cash_type"])?;
    for record in records {
        writer.write_record([
            record.datetime.format(CLEANED_DATETIME_FORMAT).to_string(),
            record.money.to_string(),
            record.coffee_name.clone(),
            record.cash_type.clone().unwrap_or_default(),
        ])?;
    }
    csv_bytes(writer)
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for SalesPipeline<S, C> {
    type Extracted = Vec<RawSalesRow>;
    type Transformed = SalesAnalysis;

    async fn extract(&self) -> Result<Vec<RawSalesRow>> {
        tracing::debug!("Reading sales data from: {}", self.config.input_path());
        let data = self.storage.read_file(self.config.input_path()).await?;
        parse_sales(&data)
    }

    async fn transform(&self, data: Vec<RawSalesRow>) -> Result<SalesAnalysis> {
        let (records, cleaning) = clean_rows(data);
        if cleaning.kept_rows < cleaning.input_rows {
            tracing::warn!(
                "Dropped {} of {} rows (money: {}, coffee_name: {}, datetime: {})",
                cleaning.input_rows - cleaning.kept_rows,
                cleaning.input_rows,
                cleaning.dropped_invalid_money,
                cleaning.dropped_missing_coffee_name,
                cleaning.dropped_invalid_datetime
            );
        }

        let summary = summarize(&records, cleaning)?;
        tracing::info!(
            "Revenue {:.2} over {} transactions, median ticket {:.2}",
            summary.total_revenue,
            summary.money.count,
            summary.money.median
        );
        Ok(SalesAnalysis { records, summary })
    }

    async fn load(&self, analysis: SalesAnalysis) -> Result<String> {
        let mut files = Vec::new();
        for format in self.config.output_formats() {
            match format {
                OutputFormat::Csv => {
                    files.push(OutputFile::new(CLEANED_CSV, cleaned_csv(&analysis.records)?))
                }
                OutputFormat::Json => files.push(OutputFile::new(
                    SUMMARY_JSON,
                    serde_json::to_vec_pretty(&analysis.summary)?,
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
            self.storage.write_file(SALES_ZIP, &zip_data).await?;
            return Ok(output_location(&self.config, SALES_ZIP));
        }

        for file in &files {
            tracing::debug!("Writing {} ({} bytes)", file.name, file.data.len());
            self.storage.write_file(&file.name, &file.data).await?;
        }

        Ok(output_location(&self.config, &files[0].name))
    }
}
