//! Common routines for handling input data.
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use std::fmt::Display;
use std::fs;
use std::hash::Hash;
use std::path::Path;

mod district;
pub use district::read_districts;

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let vec = read_csv_optional(file_path)?;
    ensure!(
        !vec.is_empty(),
        "CSV file {} cannot be empty",
        file_path.display()
    );

    Ok(vec)
}

/// Read a series of type `T`s from a CSV file, allowing it to have no data rows.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv_optional<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?;

    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .with_context(|| input_err_msg(file_path))
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Read a CSV file of records, keyed by `key` in file order.
///
/// Two records with the same key are an error.
pub fn read_csv_keyed<T, K, F>(file_path: &Path, key: F) -> Result<IndexMap<K, T>>
where
    T: DeserializeOwned,
    K: Eq + Hash + Display,
    F: Fn(&T) -> K,
{
    let mut map = IndexMap::new();
    for record in read_csv::<T>(file_path)? {
        let key = key(&record);
        ensure!(
            !map.contains_key(&key),
            "Duplicate entry found in {}: {key}",
            file_path.display()
        );
        map.insert(key, record);
    }

    Ok(map)
}

/// Read a finite `f64`, rejecting NaN and infinite values
pub fn deserialise_finite<'de, D>(deserialiser: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: f64 = Deserialize::deserialize(deserialiser)?;
    if !value.is_finite() {
        Err(serde::de::Error::custom("Value must be a finite number"))?;
    }

    Ok(value)
}

/// Format an error message to include the file path.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Record {
        id: String,
        #[serde(deserialize_with = "deserialise_finite")]
        value: f64,
    }

    fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let file_path = dir.join(name);
        let mut file = File::create(&file_path).unwrap();
        write!(file, "{contents}").unwrap();
        file_path
    }

    #[test]
    fn test_read_csv() {
        let dir = tempdir().unwrap();
        let file_path = write_file(dir.path(), "test.csv", "id,value\nhello, 1\nworld,2\n");
        let records: Vec<Record> = read_csv(&file_path).unwrap();
        assert_eq!(
            records,
            vec![
                Record {
                    id: "hello".into(),
                    value: 1.0
                },
                Record {
                    id: "world".into(),
                    value: 2.0
                }
            ]
        );
    }

    #[test]
    fn test_read_csv_empty() {
        let dir = tempdir().unwrap();
        let file_path = write_file(dir.path(), "test.csv", "id,value\n");
        assert!(read_csv::<Record>(&file_path).is_err());
        assert!(read_csv_optional::<Record>(&file_path).unwrap().is_empty());
    }

    #[test]
    fn test_read_csv_non_finite() {
        let dir = tempdir().unwrap();
        let file_path = write_file(dir.path(), "test.csv", "id,value\nhello,inf\n");
        assert!(read_csv::<Record>(&file_path).is_err());
    }

    #[test]
    fn test_read_csv_keyed() {
        let dir = tempdir().unwrap();
        let file_path = write_file(dir.path(), "test.csv", "id,value\nb,1\na,2\n");
        let records = read_csv_keyed(&file_path, |record: &Record| record.id.clone()).unwrap();
        assert_eq!(records.keys().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(records["a"].value, 2.0);

        let file_path = write_file(dir.path(), "dup.csv", "id,value\na,1\na,2\n");
        let err = read_csv_keyed(&file_path, |record: &Record| record.id.clone()).unwrap_err();
        assert!(err.to_string().starts_with("Duplicate entry found in"));
    }

    #[test]
    fn test_read_toml() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Value {
            value: u32,
        }

        let dir = tempdir().unwrap();
        let file_path = write_file(dir.path(), "test.toml", "value = 1");
        assert_eq!(read_toml::<Value>(&file_path).unwrap(), Value { value: 1 });

        let file_path = write_file(dir.path(), "bad.toml", "bad toml syntax");
        assert!(read_toml::<Value>(&file_path).is_err());
    }
}
