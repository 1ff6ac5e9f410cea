use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Run settings. Every field has a default so a config file may set only what it changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Column matched against the exclusion list.
    pub key_column: String,
    pub sort_columns: Vec<String>,
    /// Columns to total; when empty the exclusion workbook's list is used.
    pub sum_columns: Vec<String>,
    /// Worksheet to read from xlsx inputs; the first sheet when unset.
    pub sheet: Option<String>,

    /// Exclusion workbook column holding the excluded symbols.
    pub exclusion_symbol_column: String,
    /// Exclusion workbook column holding the names of the columns to total.
    pub exclusion_sum_column: String,

    /// Column inspected for broker disclaimer footers when combining downloads.
    pub account_column: String,
    pub disclaimer_prefixes: Vec<String>,
    pub currency_columns: Vec<String>,
    pub percentage_columns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_column: "Symbol".to_string(),
            sort_columns: vec!["Symbol".to_string()],
            sum_columns: Vec::new(),
            sheet: None,
            exclusion_symbol_column: "Symbol".to_string(),
            exclusion_sum_column: "Sum Columns".to_string(),
            account_column: "Account Number".to_string(),
            disclaimer_prefixes: strings(&[
                "The data and information",
                "Brokerage services are",
                "Date downloaded",
            ]),
            currency_columns: strings(&[
                "Last Price",
                "Last Price Change",
                "Current Value",
                "Today's Gain/Loss Dollar",
                "Total Gain/Loss Dollar",
                "Cost Basis Total",
                "Average Cost Basis",
            ]),
            percentage_columns: strings(&[
                "Today's Gain/Loss Percent",
                "Total Gain/Loss Percent",
                "Percent Of Account",
            ]),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    /// Currency and percentage columns; both are cleaned to numbers when combining.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.currency_columns
            .iter()
            .chain(&self.percentage_columns)
            .cloned()
            .collect()
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.key_column, "Symbol");
        assert_eq!(config.sort_columns, vec!["Symbol"]);
        assert!(config.sum_columns.is_empty());
        assert_eq!(config.disclaimer_prefixes.len(), 3);
        assert_eq!(config.numeric_columns().len(), 10);
    }

    #[test]
    fn test_partial_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "key_column": "Ticker", "sort_columns": ["Account Name", "Ticker"] }"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.key_column, "Ticker");
        assert_eq!(config.sort_columns, vec!["Account Name", "Ticker"]);
        assert_eq!(config.exclusion_sum_column, "Sum Columns");
    }

    #[test]
    fn test_invalid_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("invalid config file"));
    }
}
