use cupping_lab::{
    BatchPipeline, JobSettings, LocalStorage, OutputFormat, PipelineEngine, ReportConfig,
    SalesPipeline,
};
use std::io::Read;
use tempfile::TempDir;

const SHEET: &str = "\
name,origin,grade,fragrance,aroma,flavor,aftertaste,acidity,body,balance,overall,non_uniform,defective
Ethiopian Yirgacheffe,Ethiopia,Specialty Grade,9.0,9.25,9.5,9.0,9.25,8.5,9.0,9.25,0,0
Colombian Supremo,Colombia,Premium Grade,8.0,8.25,8.5,8.0,8.25,8.5,8.25,8.5,1,0
Brazilian Santos,Brazil,Good Grade,7.5,7.75,8.0,7.5,7.75,8.25,7.75,8.0,0,1
";

const SALES: &str = "\
date,datetime,cash_type,card,money,coffee_name
2024-03-01,2024-03-01 10:15:50.520,card,ANON-0000-0000-0001,38.7,Latte
2024-03-01,2024-03-01 12:19:22.539,card,ANON-0000-0000-0002,38.7,Hot Chocolate
2024-03-01,2024-03-01 12:20:18.089,card,ANON-0000-0000-0002,38.7,Hot Chocolate
2024-03-01,2024-03-01 13:46:33.006,card,ANON-0000-0000-0003,28.9,Americano
2024-03-01,2024-03-01 13:48:14.626,card,ANON-0000-0000-0004,38.7,Latte
2024-03-02,2024-03-02 10:30:35.668,cash,,40,Latte
2024-03-02,broken,card,ANON-0000-0000-0005,33.8,Americano with Milk
";

fn job(temp_dir: &TempDir, input_name: &str, content: &str, archive: bool) -> JobSettings {
    let input_path = temp_dir.path().join(input_name);
    std::fs::write(&input_path, content).unwrap();
    JobSettings {
        input_path: input_path.to_str().unwrap().to_string(),
        output_path: temp_dir.path().join("out").to_str().unwrap().to_string(),
        output_formats: vec![OutputFormat::Csv, OutputFormat::Json],
        archive,
        decimals: 2,
    }
}

#[tokio::test]
async fn test_end_to_end_batch_ranking() {
    let temp_dir = TempDir::new().unwrap();
    let settings = job(&temp_dir, "sheet.csv", SHEET, false);

    let storage = LocalStorage::new(settings.output_path.clone());
    let engine = PipelineEngine::new(BatchPipeline::new(storage, settings));
    let output_path = engine.run().await.unwrap();
    assert!(output_path.ends_with("cupping_report.csv"));

    let out_dir = temp_dir.path().join("out");
    let csv = std::fs::read_to_string(out_dir.join("cupping_report.csv")).unwrap();
    let mut reader = csv::Reader::from_reader(csv.as_bytes());
    let headers = reader.headers().unwrap().clone();
    let name_idx = headers.iter().position(|h| h == "name").unwrap();
    let rounded_idx = headers.iter().position(|h| h == "rounded_score").unwrap();

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[0][name_idx], "Ethiopian Yirgacheffe");
    assert_eq!(&rows[2][name_idx], "Brazilian Santos");
    // 0.65625 × 72.75 + 52.75 = 100.4921875
    assert_eq!(&rows[0][rounded_idx], "100.49");

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out_dir.join("cupping_report.json")).unwrap())
            .unwrap();
    assert_eq!(json["highest_score"], 100.4921875);
    assert_eq!(json["samples"][1]["result"]["non_uniform_penalty"], 2.0);
    assert_eq!(json["samples"][2]["result"]["defect_penalty"], 4.0);
}

#[tokio::test]
async fn test_batch_with_missing_input_fails() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = job(&temp_dir, "sheet.csv", SHEET, false);
    settings.input_path = temp_dir
        .path()
        .join("absent.csv")
        .to_str()
        .unwrap()
        .to_string();

    let storage = LocalStorage::new(settings.output_path.clone());
    let engine = PipelineEngine::new(BatchPipeline::new(storage, settings));
    let err = engine.run().await.unwrap_err();
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_end_to_end_sales_archive() {
    let temp_dir = TempDir::new().unwrap();
    let settings = job(&temp_dir, "sales.csv", SALES, true);

    let storage = LocalStorage::new(settings.output_path.clone());
    let engine = PipelineEngine::new(SalesPipeline::new(storage, settings));
    let output_path = engine.run().await.unwrap();
    assert!(output_path.ends_with("sales_report.zip"));

    let zip_data = std::fs::read(temp_dir.path().join("out").join("sales_report.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    assert_eq!(archive.len(), 2);

    let mut summary = String::new();
    archive
        .by_name("sales_summary.json")
        .unwrap()
        .read_to_string(&mut summary)
        .unwrap();
    let summary: serde_json::Value = serde_json::from_str(&summary).unwrap();
    assert_eq!(summary["cleaning"]["input_rows"], 7);
    assert_eq!(summary["cleaning"]["dropped_invalid_datetime"], 1);
    assert_eq!(summary["money"]["count"], 6);
    assert_eq!(summary["money"]["median"], 38.7);
    assert_eq!(summary["by_coffee"][0]["name"], "Latte");
    assert_eq!(summary["by_coffee"][0]["count"], 3);
    assert_eq!(summary["by_hour"][12], 2);
    assert_eq!(summary["by_hour"][13], 2);

    let mut cleaned = String::new();
    archive
        .by_name("sales_cleaned.csv")
        .unwrap()
        .read_to_string(&mut cleaned)
        .unwrap();
    assert_eq!(cleaned.lines().count(), 7);
    assert!(cleaned.starts_with("datetime,money,coffee_name,cash_type"));
}

#[tokio::test]
async fn test_toml_config_drives_both_jobs() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("sheet.csv"), SHEET).unwrap();
    std::fs::write(temp_dir.path().join("sales.csv"), SALES).unwrap();

    let root = temp_dir.path().to_str().unwrap().replace('\\', "/");
    let toml_content = format!(
        r#"
[report]
name = "weekly"

[output]
output_path = "{root}/reports"
formats = ["json"]

[batch]
input = "{root}/sheet.csv"

[sales]
input = "{root}/sales.csv"
"#
    );
    let config = ReportConfig::from_toml_str(&toml_content).unwrap();
    config.validate_config().unwrap();

    let batch = config.batch_job().unwrap();
    let storage = LocalStorage::new(batch.output_path.clone());
    PipelineEngine::new(BatchPipeline::new(storage, batch))
        .run()
        .await
        .unwrap();

    let sales = config.sales_job().unwrap();
    let storage = LocalStorage::new(sales.output_path.clone());
    PipelineEngine::new(SalesPipeline::new(storage, sales))
        .run()
        .await
        .unwrap();

    let reports = temp_dir.path().join("reports");
    assert!(reports.join("cupping_report.json").exists());
    assert!(reports.join("sales_summary.json").exists());
    assert!(!reports.join("cupping_report.csv").exists());
    assert!(!reports.join("sales_cleaned.csv").exists());
}
