//! Data loading utilities

use crate::error::{DriftError, Result};
use ndarray::Array2;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Numeric matrix loaded from a file, one instance per row
#[derive(Debug, Clone)]
pub struct LoadedMatrix {
    pub data: Array2<f64>,
    pub columns: Vec<String>,
}

/// CSV loader producing `f64` matrices
#[derive(Debug, Clone)]
pub struct DataLoader {
    delimiter: u8,
    has_header: bool,
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            infer_schema_length: 100,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Load a CSV (or TSV, by extension) file into a DataFrame
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
            _ => self.delimiter,
        };

        let file = File::open(path)
            .map_err(|e| DriftError::Data(format!("{}: {}", path.display(), e)))?;

        let parse_opts = CsvParseOptions::default().with_separator(delimiter);

        let reader = CsvReadOptions::default()
            .with_has_header(self.has_header)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file);

        reader
            .finish()
            .map_err(|e| DriftError::Data(e.to_string()))
    }

    /// Load a CSV file as a numeric matrix.
    ///
    /// Uses every column when `columns` is `None`. Missing values are
    /// rejected since they cannot be placed in an empirical distribution.
    pub fn load_matrix(
        &self,
        path: impl AsRef<Path>,
        columns: Option<&[String]>,
    ) -> Result<LoadedMatrix> {
        let df = self.load_csv(path)?;
        let columns: Vec<String> = match columns {
            Some(cols) => cols.to_vec(),
            None => df
                .get_column_names()
                .into_iter()
                .map(|name| name.to_string())
                .collect(),
        };
        let data = columns_to_array2(&df, &columns)?;
        Ok(LoadedMatrix { data, columns })
    }
}

/// Extract named columns from a DataFrame into a row-major `Array2<f64>`.
pub fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let column = df
                .column(col_name)
                .map_err(|_| DriftError::Data(format!("column not found: {}", col_name)))?;
            let series = column
                .as_materialized_series()
                .cast(&DataType::Float64)
                .map_err(|e| DriftError::Data(e.to_string()))?;
            series
                .f64()
                .map_err(|e| DriftError::Data(e.to_string()))?
                .into_iter()
                .map(|v| {
                    v.ok_or_else(|| {
                        DriftError::Data(format!("column '{}' has missing values", col_name))
                    })
                })
                .collect::<Result<Vec<f64>>>()
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| col_refs[c][r]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_matrix_all_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "data.csv", "a,b\n1,2.5\n3,4.5\n5,6.5\n");

        let loaded = DataLoader::new().load_matrix(&path, None).unwrap();
        assert_eq!(loaded.columns, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(loaded.data.dim(), (3, 2));
        assert_eq!(loaded.data[[1, 0]], 3.0);
        assert_eq!(loaded.data[[2, 1]], 6.5);
    }

    #[test]
    fn test_load_matrix_selected_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "data.csv", "a,b,c\n1,2,3\n4,5,6\n");

        let cols = vec!["c".to_string(), "a".to_string()];
        let loaded = DataLoader::new().load_matrix(&path, Some(cols.as_slice())).unwrap();
        assert_eq!(loaded.data.row(0).to_vec(), vec![3.0, 1.0]);
    }

    #[test]
    fn test_missing_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "data.csv", "a,b\n1,\n3,4\n");
        assert!(DataLoader::new().load_matrix(&path, None).is_err());
    }

    #[test]
    fn test_unknown_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "data.csv", "a\n1\n");
        let cols = vec!["z".to_string()];
        assert!(DataLoader::new().load_matrix(&path, Some(cols.as_slice())).is_err());
    }

    #[test]
    fn test_custom_delimiter_without_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "data.txt", "1;2.5\n3;4.5\n");

        let loaded = DataLoader::new()
            .with_delimiter(b';')
            .with_header(false)
            .load_matrix(&path, None)
            .unwrap();
        assert_eq!(loaded.columns.len(), 2);
        assert_eq!(loaded.data.dim(), (2, 2));
        assert_eq!(loaded.data.row(1).to_vec(), vec![3.0, 4.5]);
    }

    #[test]
    fn test_missing_file() {
        let err = DataLoader::new().load_csv("/nonexistent/file.csv").unwrap_err();
        assert!(matches!(err, DriftError::Data(_)));
    }
}
