use chrono::NaiveDateTime;
use serde::Serialize;

/// A sales CSV row as read, with only whitespace trimmed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawSalesRow {
    pub row: usize,
    pub datetime: String,
    pub money: String,
    pub coffee_name: String,
    pub cash_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    pub datetime: NaiveDateTime,
    pub money: f64,
    pub coffee_name: String,
    pub cash_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub input_rows: usize,
    pub kept_rows: usize,
    pub dropped_invalid_money: usize,
    pub dropped_missing_coffee_name: usize,
    pub dropped_invalid_datetime: usize,
}

/// Descriptive statistics over one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; absent for a single value.
    pub std: Option<f64>,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Skew {
    Right,
    Left,
    Symmetric,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStat {
    pub name: String,
    pub count: usize,
    pub share_percent: f64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesSummary {
    pub cleaning: CleaningReport,
    pub total_revenue: f64,
    pub money: NumericSummary,
    pub skew: Skew,
    pub high_variability: bool,
    pub outlier_count: usize,
    pub money_histogram: Vec<HistogramBin>,
    pub by_coffee: Vec<CategoryStat>,
    pub by_cash_type: Vec<CategoryStat>,
    /// Transactions per hour of day, index 0 is midnight.
    pub by_hour: Vec<usize>,
    /// Transactions per weekday, Monday first.
    pub by_weekday: Vec<usize>,
    pub first_transaction: NaiveDateTime,
    pub last_transaction: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct SalesAnalysis {
    pub records: Vec<SalesRecord>,
    pub summary: SalesSummary,
}
