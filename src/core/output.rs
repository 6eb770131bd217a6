use crate::core::ConfigProvider;
use crate::utils::error::{CuppingError, Result};
use std::io::Write;
use std::path::Path;
use zip::write::{SimpleFileOptions, ZipWriter};

/// A named report file held in memory until the load phase writes it.
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl OutputFile {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

pub fn output_location<C: ConfigProvider>(config: &C, file_name: &str) -> String {
    Path::new(config.output_path())
        .join(file_name)
        .display()
        .to_string()
}

pub fn csv_bytes(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| CuppingError::processing(format!("failed to flush CSV output: {}", e)))
}

pub fn bundle_zip(files: &[OutputFile]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for file in files {
        zip.start_file(file.name.as_str(), SimpleFileOptions::default())?;
        zip.write_all(&file.data)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
