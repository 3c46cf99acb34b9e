//! Intake Extractor
//!
//! Turns a free-form LLM reply into one schema-conformant export row.
//!
//! # Architecture
//!
//! ```text
//! raw reply → parse_response → flatten → Standardizer (aliases + inference) → OutputRow
//! ```
//!
//! # Key Features
//!
//! - **Response parsing**: fenced-block and brace-scan candidate search with
//!   trailing-comma and missing-closer repair
//! - **Flattening**: nested objects and lists become `_`-joined keys
//! - **Inference**: rule-based English, degree, visa and mobility detectors
//!   that override whatever the model claimed
//! - **Standardization**: alias resolution onto the template's columns
//!
//! # Example Usage
//!
//! ```
//! use chrono::NaiveDate;
//! use intake_extractor::{parse_response, ExtractorConfig, Standardizer, TargetSchema};
//!
//! let reply = "Sure!\n{\"Full-name\": \"Jane Doe\", \"Nationality\": \"Spanish\", \"Languages\": \"English (C1)\",}";
//!
//! let object = parse_response(reply).into_object().unwrap();
//! let standardizer = Standardizer::new(TargetSchema::standard(), &ExtractorConfig::default()).unwrap();
//! let at = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap().and_hms_opt(8, 0, 0).unwrap();
//! let out = standardizer.standardize(&object, at);
//!
//! assert_eq!(out.record.get("Last Name"), Some("Doe"));
//! assert_eq!(out.record.get("Visa required?"), Some("No"));
//! assert_eq!(out.record.get("English proficiency"), Some("Yes"));
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod flatten;
mod normalize;
mod parser;
mod prompt;
mod schema;

pub mod inference;
pub mod standardizer;


pub use config::{ExtractorConfig, DEFAULT_MANUAL_SENTINEL};
pub use error::ExtractorError;
pub use flatten::{flatten, record_to_object};
pub use inference::MobilityPolicy;
pub use normalize::{is_affirmative, is_negative, normalize, normalize_key};
pub use parser::{parse_response, ParseDefect, ParseOutcome, Repair, DEFECT_CONTEXT_BYTES};
pub use prompt::{PromptBuilder, OUTPUT_FIELDS, UNKNOWN_VALUE};
pub use schema::{AliasCatalog, CatalogEntry, FieldRole, SchemaField, TargetSchema, STANDARD_HEADERS};
pub use standardizer::{Standardized, Standardizer};
