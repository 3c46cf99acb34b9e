//! Map an arbitrary extracted object onto the target schema

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::flatten::flatten;
use crate::inference::{self, MobilityPolicy};
use crate::normalize::normalize_key;
use crate::schema::{FieldRole, TargetSchema};
use chrono::NaiveDateTime;
use intake_domain::{ExtractionRecord, OutputRow};
use serde_json::{Map, Value};
use tracing::debug;

/// Joins multiple matches of one alias
pub const MULTI_VALUE_SEPARATOR: &str = "; ";

const DEFAULT_NAME_ALIASES: &[&str] = &["full-name", "full name", "applicant name", "name"];

/// Output of one standardization
#[derive(Debug, Clone, PartialEq)]
pub struct Standardized {
    /// Export row aligned to the schema columns
    pub row: OutputRow,
    /// Header → value, as stored with the job
    pub record: ExtractionRecord,
    /// Number of cells that fell back to the manual-review sentinel
    pub manual_fields: usize,
}

/// Fills schema columns from a flattened record
///
/// Detector-owned columns (name split, English, master, doctoral, visa, and
/// mobility under an overriding policy) are always overwritten, even when
/// an alias matched.
#[derive(Debug, Clone)]
pub struct Standardizer {
    schema: TargetSchema,
    manual_sentinel: String,
    mobility: MobilityPolicy,
}

impl Standardizer {
    /// Create a standardizer for a schema
    pub fn new(schema: TargetSchema, config: &ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        Ok(Self {
            schema,
            manual_sentinel: config.manual_sentinel.clone(),
            mobility: config.mobility,
        })
    }

    /// Target schema in use
    pub fn schema(&self) -> &TargetSchema {
        &self.schema
    }

    /// Standardize a parsed JSON object
    pub fn standardize(&self, object: &Map<String, Value>, at: NaiveDateTime) -> Standardized {
        self.standardize_record(&flatten(object), at)
    }

    /// Standardize an already-flat record
    pub fn standardize_record(&self, flat: &ExtractionRecord, at: NaiveDateTime) -> Standardized {
        let sentinel = self.manual_sentinel.as_str();

        let name_aliases: Vec<String> = self
            .schema
            .aliases_for(FieldRole::FirstName)
            .or_else(|| self.schema.aliases_for(FieldRole::LastName))
            .map(<[String]>::to_vec)
            .unwrap_or_else(|| DEFAULT_NAME_ALIASES.iter().map(|a| a.to_string()).collect());
        let (first_name, last_name) = inference::applicant_name(flat, &name_aliases);

        let mut cells = Vec::with_capacity(self.schema.len());
        let mut record = ExtractionRecord::new();
        let mut manual_fields = 0;

        for field in self.schema.fields() {
            let value = match field.role {
                FieldRole::ApplicantId => Some(inference::applicant_id(&last_name, at)),
                FieldRole::FirstName => Some(first_name.clone()),
                FieldRole::LastName => Some(last_name.clone()),
                FieldRole::English => Some(
                    inference::english_proficiency(&inference::language_text(flat)).to_legacy(sentinel),
                ),
                FieldRole::Master => Some(inference::master_degree(flat).to_legacy(sentinel)),
                FieldRole::Doctoral => Some(inference::doctoral_degree(flat).to_legacy(sentinel)),
                FieldRole::Visa => Some(inference::visa_required(flat).to_legacy(sentinel)),
                FieldRole::Mobility => match inference::mobility(flat, self.mobility) {
                    Some(determination) => Some(determination.to_legacy(sentinel)),
                    None => resolve(flat, &field.aliases),
                },
                FieldRole::Plain => resolve(flat, &field.aliases),
            };

            let cell = value.unwrap_or_else(|| {
                manual_fields += 1;
                sentinel.to_string()
            });
            if let Some(header) = &field.header {
                record.insert(header.clone(), cell.clone());
            }
            cells.push(cell);
        }

        debug!(
            columns = cells.len(),
            manual_fields, "standardized extraction record"
        );

        Standardized {
            row: OutputRow::new(cells),
            record,
            manual_fields,
        }
    }
}

/// First alias with a non-empty match wins; its matches are joined
///
/// # Examples
///
/// ```
/// use intake_domain::ExtractionRecord;
/// use intake_extractor::standardizer::resolve;
///
/// let flat: ExtractionRecord = vec![("Skills_0", "Python"), ("Skills_1", "R"), ("E-Mail", "")]
///     .into_iter()
///     .collect();
/// let aliases = vec!["Skills and competences".to_string(), "skills".to_string()];
/// assert_eq!(resolve(&flat, &aliases), Some("Python; R".to_string()));
/// assert_eq!(resolve(&flat, &["email".to_string(), "e-mail".to_string()]), None);
/// ```
pub fn resolve(flat: &ExtractionRecord, aliases: &[String]) -> Option<String> {
    let keys: Vec<(String, &str)> = flat
        .iter()
        .map(|(k, v)| (normalize_key(k), v))
        .collect();

    aliases.iter().find_map(|alias| {
        let alias = normalize_key(alias);
        if alias.is_empty() {
            return None;
        }
        let matches: Vec<&str> = keys
            .iter()
            .filter(|(key, value)| key.contains(&alias) && !value.trim().is_empty())
            .map(|(_, value)| value.trim())
            .collect();
        (!matches.is_empty()).then(|| matches.join(MULTI_VALUE_SEPARATOR))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::STANDARD_HEADERS;
    use chrono::NaiveDate;
    use serde_json::json;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn cell<'a>(standardized: &'a Standardized, header: &str) -> &'a str {
        standardized
            .record
            .get(header)
            .unwrap_or_else(|| panic!("missing column {header}"))
    }

    #[test]
    fn test_full_standardization() {
        let standardizer = Standardizer::new(TargetSchema::standard(), &ExtractorConfig::default()).unwrap();
        let object = json!({
            "Full-name": "Jane Doe",
            "Date-of-birth": "1993-04-21",
            "Gender": "Female",
            "Nationality": "Spanish",
            "E-Mail": "jane.doe@example.com",
            "Phone-number": "+34 123 456 789",
            "Holds-Master-Degree": "Yes",
            "Languages": "Spanish (native), English (C1)",
            "Skills and competences": "Python, R",
            "Research Experience": "Thesis on NLP",
            "Holds-Doctoral-Degree": "No",
            "Fits mobility rules?": "Yes"
        });

        let out = standardizer.standardize(object.as_object().unwrap(), at());

        assert_eq!(out.row.len(), STANDARD_HEADERS.len());
        assert_eq!(cell(&out, "Applicant ID"), "doe_2026-10-19_093000");
        assert_eq!(cell(&out, "First Name"), "Jane");
        assert_eq!(cell(&out, "Last Name"), "Doe");
        assert_eq!(cell(&out, "Contact details (e.g. email)"), "jane.doe@example.com");
        assert_eq!(cell(&out, "Date of birth"), "1993-04-21");
        assert_eq!(cell(&out, "Fits mobility rules?"), "Yes");
        assert_eq!(cell(&out, "Nationality"), "Spanish");
        assert_eq!(
            cell(&out, "Holds/will hold a master degree or equivalent before October 2025?"),
            "Yes"
        );
        assert_eq!(cell(&out, "Holds doctoral degree?"), "No");
        assert_eq!(cell(&out, "English proficiency"), "Yes");
        assert_eq!(cell(&out, "Visa required?"), "No");
        assert_eq!(cell(&out, "Skills and Competencies (Max 5 Points)"), "Python, R");
        assert_eq!(out.manual_fields, 0);
    }

    #[test]
    fn test_detectors_overwrite_aliases() {
        let standardizer = Standardizer::new(TargetSchema::standard(), &ExtractorConfig::default()).unwrap();
        // The model claims things the rules disagree with
        let object = json!({
            "First Name": "Carla",
            "Full-name": "Carlos Silva",
            "Last Name": "Souza",
            "Nationality": "Brazilian",
            "Holds doctoral degree": "maybe",
            "English proficiency": "Yes",
            "Master": "unsure"
        });

        let out = standardizer.standardize(object.as_object().unwrap(), at());

        assert_eq!(cell(&out, "Holds doctoral degree?"), "No");
        assert_eq!(cell(&out, "English proficiency"), "Filled manually");
        assert_eq!(
            cell(&out, "Holds/will hold a master degree or equivalent before October 2025?"),
            "Filled manually"
        );
        assert_eq!(cell(&out, "Visa required?"), "Yes");
        assert_eq!(cell(&out, "First Name"), "Carlos");
        assert_eq!(cell(&out, "Last Name"), "Silva");
        assert!(cell(&out, "Applicant ID").starts_with("silva_"));
    }

    #[test]
    fn test_nested_name_object() {
        let standardizer = Standardizer::new(TargetSchema::standard(), &ExtractorConfig::default()).unwrap();
        let object = json!({
            "Full Name": {"First Name": "John", "Last Name": "Doe"},
            "Education": {"University Name": "University of London"}
        });

        let out = standardizer.standardize(object.as_object().unwrap(), at());

        assert_eq!(cell(&out, "First Name"), "John");
        assert_eq!(cell(&out, "Last Name"), "Doe");
        assert_eq!(cell(&out, "Applicant ID"), "doe_2026-10-19_093000");
    }

    #[test]
    fn test_unresolved_fields_get_sentinel() {
        let config = ExtractorConfig {
            manual_sentinel: "Please fill this manually".to_string(),
            ..ExtractorConfig::default()
        };
        let standardizer = Standardizer::new(TargetSchema::standard(), &config).unwrap();
        let out = standardizer.standardize(&Map::new(), at());

        assert_eq!(cell(&out, "Gender"), "Please fill this manually");
        assert_eq!(cell(&out, "Phone number"), "Please fill this manually");
        assert_eq!(cell(&out, "First Name"), "");
        assert_eq!(cell(&out, "Applicant ID"), "unknown_2026-10-19_093000");
        assert!(out.manual_fields > 0);
    }

    #[test]
    fn test_list_values_joined() {
        let standardizer = Standardizer::new(TargetSchema::standard(), &ExtractorConfig::default()).unwrap();
        let object = json!({
            "Full-name": "John Doe",
            "Skills": ["Frameworks: TensorFlow", "Programming languages: Python"]
        });
        let out = standardizer.standardize(object.as_object().unwrap(), at());
        assert_eq!(
            cell(&out, "Skills and Competencies (Max 5 Points)"),
            "Frameworks: TensorFlow; Programming languages: Python"
        );
    }

    #[test]
    fn test_german_connection_policy() {
        let config = ExtractorConfig {
            mobility: MobilityPolicy::GermanConnectionOverride,
            ..ExtractorConfig::default()
        };
        let standardizer = Standardizer::new(TargetSchema::standard(), &config).unwrap();
        let object = json!({
            "Full-name": "Anna Schmidt",
            "Nationality": "German",
            "Fits mobility rules?": "Yes"
        });

        let out = standardizer.standardize(object.as_object().unwrap(), at());
        assert_eq!(cell(&out, "Fits mobility rules?"), "No");

        let default = Standardizer::new(TargetSchema::standard(), &ExtractorConfig::default()).unwrap();
        let out = default.standardize(object.as_object().unwrap(), at());
        assert_eq!(cell(&out, "Fits mobility rules?"), "Yes");
    }

    #[test]
    fn test_headerless_column_gets_sentinel_and_no_record_entry() {
        let headers = vec![Some("Gender".to_string()), None];
        let schema = TargetSchema::from_headers(&headers, &crate::schema::AliasCatalog::standard()).unwrap();
        let standardizer = Standardizer::new(schema, &ExtractorConfig::default()).unwrap();

        let object = json!({"Gender": "Male"});
        let out = standardizer.standardize(object.as_object().unwrap(), at());

        assert_eq!(out.row.cells, vec!["Male".to_string(), "Filled manually".to_string()]);
        assert_eq!(out.record.len(), 1);
    }

    #[test]
    fn test_resolve_skips_empty_alias_matches() {
        let flat: ExtractionRecord = vec![("Phone", ""), ("Phone-number", " "), ("Mobile number", "+1 555")]
            .into_iter()
            .collect();
        let aliases = vec!["phone".to_string(), "mobile number".to_string()];
        assert_eq!(resolve(&flat, &aliases), Some("+1 555".to_string()));
    }
}
