//! cargo-bloat JSON output
//!
//! `cargo bloat --message-format json` prints one object with the file and
//! text-section sizes plus either a `crates` list (with `--crates`) or a
//! `functions` list. The list present is resolved once into a [`Breakdown`].

use crate::snapshot::Contributor;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One row of cargo-bloat output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloatEntry {
    /// Owning crate, only reported for function rows
    #[serde(rename = "crate", default, skip_serializing_if = "Option::is_none")]
    pub crate_name: Option<String>,
    /// Crate or function name
    pub name: String,
    /// Size in bytes
    pub size: u64,
}

/// Raw cargo-bloat result for one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloatOutput {
    /// Total binary size
    #[serde(rename = "file-size")]
    pub file_size: u64,
    /// Text section size (code)
    #[serde(rename = "text-section-size")]
    pub text_section_size: u64,
    /// Per-crate sizes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crates: Option<Vec<BloatEntry>>,
    /// Per-function sizes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<BloatEntry>>,
}

/// The granularity a measurement was taken at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakdown<'a> {
    /// One entry per crate
    Crates(&'a [BloatEntry]),
    /// One entry per function
    Functions(&'a [BloatEntry]),
}

impl Breakdown<'_> {
    /// Entries regardless of granularity
    pub fn entries(&self) -> &[BloatEntry] {
        match self {
            Self::Crates(entries) | Self::Functions(entries) => entries,
        }
    }

    /// Normalize into contributors, keeping the tool's order
    pub fn contributors(&self) -> Vec<Contributor> {
        self.entries()
            .iter()
            .map(|entry| Contributor {
                group_name: entry.crate_name.clone(),
                unit_name: entry.name.clone(),
                size_bytes: entry.size,
            })
            .collect()
    }
}

impl BloatOutput {
    /// The breakdown this output carries; crates win when both are present
    pub fn breakdown(&self) -> Option<Breakdown<'_>> {
        match (&self.crates, &self.functions) {
            (Some(crates), _) => Some(Breakdown::Crates(crates)),
            (None, Some(functions)) => Some(Breakdown::Functions(functions)),
            (None, None) => None,
        }
    }
}

/// Parse cargo-bloat's stdout
///
/// Only the last JSON object line is used, so stray lines before it are ignored.
pub fn parse_bloat_json(stdout: &str) -> Result<BloatOutput> {
    let line = stdout
        .lines()
        .map(str::trim)
        .rfind(|line| line.starts_with('{'))
        .context("cargo bloat produced no JSON output")?;

    serde_json::from_str(line).context("Failed to parse cargo bloat JSON output")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CRATES_JSON: &str = r#"{"file-size":1048576,"text-section-size":524288,"crates":[{"name":"std","size":200000},{"name":"[Unknown]","size":1000},{"name":"app","size":3000}]}"#;

    const FUNCTIONS_JSON: &str = r#"{"file-size":2000,"text-section-size":1000,"functions":[{"crate":"std","name":"fmt::write","size":700},{"name":"main","size":20}]}"#;

    #[test]
    fn test_parse_crates_output() {
        let output = parse_bloat_json(CRATES_JSON).expect("should parse crates output");
        assert_eq!(output.file_size, 1_048_576);
        assert_eq!(output.text_section_size, 524_288);

        let breakdown = output.breakdown().expect("crates breakdown");
        assert!(matches!(breakdown, Breakdown::Crates(_)));
        assert_eq!(breakdown.entries().len(), 3);
    }

    #[test]
    fn test_parse_functions_output_keeps_crate_names() {
        let output = parse_bloat_json(FUNCTIONS_JSON).expect("should parse functions output");
        let contributors = output.breakdown().expect("functions breakdown").contributors();

        assert_eq!(contributors[0].display_name(), "(std) fmt::write");
        assert_eq!(contributors[1].display_name(), "main");
    }

    #[test]
    fn test_parse_ignores_leading_noise() {
        let stdout = format!("    Finished release [optimized]\n{}\n", CRATES_JSON);
        let output = parse_bloat_json(&stdout).expect("should skip non-JSON lines");
        assert_eq!(output.file_size, 1_048_576);
    }

    #[test]
    fn test_parse_empty_output_fails() {
        let err = parse_bloat_json("").unwrap_err();
        assert!(err.to_string().contains("no JSON output"));
    }

    #[test]
    fn test_parse_invalid_json_fails() {
        assert!(parse_bloat_json("{not json").is_err());
    }

    #[test]
    fn test_breakdown_absent_when_no_lists() {
        let output = parse_bloat_json(r#"{"file-size":1,"text-section-size":1}"#).unwrap();
        assert!(output.breakdown().is_none());
    }

    #[test]
    fn test_crates_preferred_over_functions() {
        let output = BloatOutput {
            file_size: 1,
            text_section_size: 1,
            crates: Some(vec![]),
            functions: Some(vec![BloatEntry {
                crate_name: None,
                name: "main".to_string(),
                size: 1,
            }]),
        };
        assert!(matches!(output.breakdown(), Some(Breakdown::Crates(_))));
    }

    #[test]
    fn test_serialization_keeps_cargo_bloat_field_names() {
        let output = parse_bloat_json(FUNCTIONS_JSON).unwrap();
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["file-size"], 2000);
        assert_eq!(json["functions"][0]["crate"], "std");
        assert!(json.get("crates").is_none());
    }
}
