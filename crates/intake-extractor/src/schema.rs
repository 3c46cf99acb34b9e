//! Target column layout of the export
//!
//! A [`TargetSchema`] is built once from the template's header block and an
//! [`AliasCatalog`]: each header is matched against the catalog to learn
//! which source keys may fill it and whether a rule-based detector owns it.

use crate::error::ExtractorError;
use crate::normalize::normalize_key;

/// How a column gets its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    /// Alias resolution only
    Plain,
    /// Generated from the last name and the processing time
    ApplicantId,
    /// First token of the full name
    FirstName,
    /// Remaining tokens of the full name
    LastName,
    /// English proficiency detector
    English,
    /// Master degree detector
    Master,
    /// Doctoral degree detector
    Doctoral,
    /// Visa detector
    Visa,
    /// Mobility, overridden only under a policy
    Mobility,
}

/// One known column: a header pattern, its role, and source-key aliases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Matched by normalized containment against the template header
    pub pattern: String,
    /// Role of matching columns
    pub role: FieldRole,
    /// Source keys to try, in order
    pub aliases: Vec<String>,
}

impl CatalogEntry {
    fn new(pattern: &str, role: FieldRole, aliases: &[&str]) -> Self {
        Self {
            pattern: pattern.to_string(),
            role,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn matches(&self, header: &str) -> bool {
        normalize_key(header).contains(&normalize_key(&self.pattern))
    }
}

/// Ordered list of catalog entries; the first matching entry wins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasCatalog {
    entries: Vec<CatalogEntry>,
}

impl AliasCatalog {
    /// Catalog for the applicant template
    pub fn standard() -> Self {
        use FieldRole::*;
        let name_aliases = ["full-name", "full name", "applicant name", "name"];
        Self {
            entries: vec![
                CatalogEntry::new("applicant id", ApplicantId, &[]),
                CatalogEntry::new("first name", FirstName, &name_aliases),
                CatalogEntry::new("last name", LastName, &name_aliases),
                CatalogEntry::new("date of birth", Plain, &["date-of-birth", "dob", "birth"]),
                CatalogEntry::new("gender", Plain, &["gender", "sex"]),
                CatalogEntry::new(
                    "nationality",
                    Plain,
                    &["nationality", "citizenship", "country-contact", "country"],
                ),
                CatalogEntry::new("contact details", Plain, &["e-mail", "email"]),
                CatalogEntry::new("phone", Plain, &["phone-number", "phone", "mobile number"]),
                CatalogEntry::new(
                    "mobility",
                    Mobility,
                    &["fits mobility rules", "mobility rule compliance", "mobility"],
                ),
                CatalogEntry::new("doctoral", Doctoral, &["holds-doctoral-degree", "doctoral", "phd"]),
                CatalogEntry::new("master", Master, &["holds-master-degree", "master"]),
                CatalogEntry::new("english", English, &["english proficiency", "english"]),
                CatalogEntry::new("visa", Visa, &["visa required", "visa"]),
                CatalogEntry::new(
                    "skills",
                    Plain,
                    &["skills and competences", "skills", "competenc"],
                ),
                CatalogEntry::new(
                    "research experience",
                    Plain,
                    &["research experience", "internships", "projects", "publications"],
                ),
                CatalogEntry::new("languages", Plain, &["languages"]),
            ],
        }
    }

    /// Build a catalog from explicit entries
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Append an entry after the existing ones
    pub fn push(&mut self, entry: CatalogEntry) {
        self.entries.push(entry);
    }

    fn lookup(&self, header: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.matches(header))
    }
}

impl Default for AliasCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// A destination column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    /// Combined header text; `None` for a column with an empty header block
    pub header: Option<String>,
    /// How the column is filled
    pub role: FieldRole,
    /// Source-key aliases in priority order
    pub aliases: Vec<String>,
}

/// Ordered destination columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSchema {
    fields: Vec<SchemaField>,
}

/// Headers of the stock applicant template, in column order
pub const STANDARD_HEADERS: &[&str] = &[
    "Applicant ID",
    "First Name",
    "Last Name",
    "Contact details (e.g. email)",
    "Date of birth",
    "Gender",
    "Fits mobility rules?",
    "Nationality",
    "Holds/will hold a master degree or equivalent before October 2025?",
    "Holds doctoral degree?",
    "English proficiency",
    "Visa required?",
    "Phone number",
    "Skills and Competencies (Max 5 Points)",
    "Research Experience (Max 5 Points)",
];

impl TargetSchema {
    /// Build the schema for a header row
    ///
    /// Headers with no catalog entry become plain columns whose only alias
    /// is the header itself.
    pub fn from_headers(headers: &[Option<String>], catalog: &AliasCatalog) -> Result<Self, ExtractorError> {
        if !headers.iter().any(|h| h.as_deref().is_some_and(|h| !h.trim().is_empty())) {
            return Err(ExtractorError::EmptySchema);
        }

        let fields = headers
            .iter()
            .map(|header| match header.as_deref().map(str::trim).filter(|h| !h.is_empty()) {
                None => SchemaField {
                    header: None,
                    role: FieldRole::Plain,
                    aliases: Vec::new(),
                },
                Some(text) => match catalog.lookup(text) {
                    Some(entry) => SchemaField {
                        header: Some(text.to_string()),
                        role: entry.role,
                        aliases: entry.aliases.clone(),
                    },
                    None => SchemaField {
                        header: Some(text.to_string()),
                        role: FieldRole::Plain,
                        aliases: vec![text.to_string()],
                    },
                },
            })
            .collect();

        Ok(Self { fields })
    }

    /// Schema of the stock template with the standard catalog
    pub fn standard() -> Self {
        let fields = STANDARD_HEADERS
            .iter()
            .map(|h| {
                let entry = AliasCatalog::standard().lookup(h).cloned();
                SchemaField {
                    header: Some(h.to_string()),
                    role: entry.as_ref().map_or(FieldRole::Plain, |e| e.role),
                    aliases: entry.map_or_else(|| vec![h.to_string()], |e| e.aliases),
                }
            })
            .collect();
        Self { fields }
    }

    /// Columns in order
    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether there are no columns
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Aliases of the first column with the given role
    pub fn aliases_for(&self, role: FieldRole) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|f| f.role == role)
            .map(|f| f.aliases.as_slice())
    }
}
