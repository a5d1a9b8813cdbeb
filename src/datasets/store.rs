//! Dataset Store - uploaded CSV files on disk
//!
//! Every dataset is a `.csv` file directly inside the uploads directory.
//! The file name is the dataset identifier. Row and column counts are read
//! from the file on demand; unreadable files report zero for both.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::datasets::error::{DatasetError, DatasetResult};
use crate::datasets::table::Table;
use crate::model::Dataset;

/// Upload directory backed dataset store
#[derive(Debug, Clone)]
pub struct DatasetStore {
    dir: PathBuf,
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._ -]*$").expect("dataset name pattern is valid")
    })
}

/// Check that `name` is a plain `.csv` file name
pub fn validate_name(name: &str) -> DatasetResult<()> {
    if !name_pattern().is_match(name) || name.contains("..") {
        return Err(DatasetError::InvalidName(format!(
            "'{}' must be a plain file name (letters, digits, '.', '_', '-', spaces)",
            name
        )));
    }

    if !name.to_lowercase().ends_with(".csv") {
        return Err(DatasetError::InvalidName(format!(
            "'{}' must have a .csv extension",
            name
        )));
    }

    Ok(())
}

impl DatasetStore {
    /// Open (and create if needed) the uploads directory
    pub fn open(dir: impl Into<PathBuf>) -> DatasetResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> DatasetResult<PathBuf> {
        validate_name(name)?;
        Ok(self.dir.join(name))
    }

    /// List all datasets, sorted by name
    pub async fn list(&self) -> DatasetResult<Vec<Dataset>> {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || scan(&dir)).await?
    }

    /// Store an upload, replacing any dataset with the same name
    pub async fn save(&self, name: &str, contents: Vec<u8>) -> DatasetResult<Dataset> {
        let path = self.path_for(name)?;
        tokio::fs::write(&path, &contents).await?;

        tracing::info!(dataset = %name, bytes = contents.len(), "Stored dataset upload");

        tokio::task::spawn_blocking(move || describe(&path)).await?
    }

    /// Delete a dataset
    pub async fn delete(&self, name: &str) -> DatasetResult<()> {
        let path = self.path_for(name)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(dataset = %name, "Deleted dataset");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DatasetError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Whether a dataset with this name exists
    pub async fn exists(&self, name: &str) -> bool {
        match self.path_for(name) {
            Ok(path) => tokio::fs::metadata(&path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Describe a single dataset
    pub async fn get(&self, name: &str) -> DatasetResult<Dataset> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(DatasetError::NotFound(name.to_string()));
        }
        tokio::task::spawn_blocking(move || describe(&path)).await?
    }

    /// Load a dataset's contents for validation
    pub async fn load(&self, name: &str) -> DatasetResult<Table> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(DatasetError::NotFound(name.to_string()));
        }

        let name = name.to_string();
        tokio::task::spawn_blocking(move || {
            Table::from_path(&path).map_err(|e| DatasetError::Csv {
                name,
                message: e.to_string(),
            })
        })
        .await?
    }
}

/// Describe every `.csv` file in `dir`
fn scan(dir: &Path) -> DatasetResult<Vec<Dataset>> {
    let mut datasets = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        if path.is_file() && is_csv {
            datasets.push(describe(&path)?);
        }
    }

    datasets.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(datasets)
}

/// Build the `Dataset` description of a file
fn describe(path: &Path) -> DatasetResult<Dataset> {
    let metadata = std::fs::metadata(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let date = metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
        .date_naive();

    let (rows, columns) = match Table::from_path(path) {
        Ok(table) => (table.row_count(), table.column_count()),
        Err(e) => {
            tracing::warn!(dataset = %name, error = %e, "Dataset is not readable as CSV");
            (0, 0)
        }
    };

    Ok(Dataset::new(name, metadata.len(), rows, columns, date))
}
