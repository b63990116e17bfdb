use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use dyelab_core::requirements::RequirementsRecord;

/// Reads a recipe from a file path, `-` (stdin) or an inline JSON object.
pub fn read_record(input: &str) -> Result<RequirementsRecord> {
    let text = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else if input.trim_start().starts_with('{') {
        input.to_string()
    } else {
        std::fs::read_to_string(Path::new(input))
            .with_context(|| format!("failed to read {}", input))?
    };
    parse_record(&text)
}

pub fn parse_record(text: &str) -> Result<RequirementsRecord> {
    serde_json::from_str(text).context("input is not a valid recipe JSON object")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_object() {
        let record = read_record(r#"{"salt_gL": 50, "pH": 10.5}"#).unwrap();
        assert_eq!(record.salt_gl, Some(50.0));
        assert_eq!(record.ph, Some(10.5));
    }

    #[test]
    fn test_file_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipe.json");
        std::fs::write(&path, r#"{"temp_C": 70, "time_min": 45}"#).unwrap();

        let record = read_record(path.to_str().unwrap()).unwrap();

        assert_eq!(record.temp_c, Some(70.0));
        assert_eq!(record.time_min, Some(45.0));
    }

    #[test]
    fn test_rejects_non_numeric_field() {
        assert!(parse_record(r#"{"salt_gL": "fifty"}"#).is_err());
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = read_record("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
