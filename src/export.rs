//! CSV出力

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::TrendsError;
use crate::types::DenseTable;

/// 出力先の指定
///
/// 優先順位: `full_path` > `directory` + `file_name`
/// (`file_name` 未指定なら `GTdata_{geo_id}.csv`)
#[derive(Debug, Clone, Default)]
pub struct ExportTarget {
    pub full_path: Option<PathBuf>,
    pub directory: Option<PathBuf>,
    pub file_name: Option<String>,
}

impl ExportTarget {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self {
            full_path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            directory: Some(dir.into()),
            ..Default::default()
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// 書き込み先のパスを決定する
    pub fn resolve(&self, geo_id: Option<&str>) -> Result<PathBuf, TrendsError> {
        if let Some(path) = &self.full_path {
            return Ok(path.clone());
        }

        let dir = self.directory.as_ref().ok_or_else(|| {
            TrendsError::Config(
                "Either full_path or directory must be specified to save file.".into(),
            )
        })?;

        let name = match (&self.file_name, geo_id) {
            (Some(name), _) => name.clone(),
            (None, Some(geo_id)) => default_file_name(geo_id),
            (None, None) => {
                return Err(TrendsError::Config(
                    "no file name given and no request has been made".into(),
                ))
            }
        };

        Ok(dir.join(name))
    }
}

pub fn default_file_name(geo_id: &str) -> String {
    format!("GTdata_{}.csv", geo_id)
}

/// 表をCSVファイルに書き出す
pub fn write_csv_file(path: &Path, table: &DenseTable) -> Result<(), TrendsError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_csv(&mut writer, table)?;
    writer.flush()?;
    Ok(())
}

/// ヘッダ行を含めて1行ずつ書き出す
pub fn write_csv<W: Write>(writer: &mut W, table: &DenseTable) -> std::io::Result<()> {
    for record in table.records() {
        let line = record
            .iter()
            .map(|field| escape_field(field))
            .collect::<Vec<_>>()
            .join(",");
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\r\n")?;
    }
    Ok(())
}

/// カンマ・引用符・改行を含むフィールドは引用符で囲む
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
