//! Rule-based field detectors
//!
//! Every detector is a pure function over a raw string or a flattened
//! record. None of them consult the model's own verdict for the field they
//! compute, except where noted.

use crate::normalize::{is_affirmative, is_negative, normalize, normalize_key};
use chrono::NaiveDateTime;
use intake_domain::{Determination, ExtractionRecord};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// EU member states plus the EEA countries, as they appear in free text
pub const EU_EEA_COUNTRIES: &[&str] = &[
    "Austria", "Belgium", "Bulgaria", "Croatia", "Cyprus", "Czech Republic", "Czechia",
    "Denmark", "Estonia", "Finland", "France", "Germany", "Greece", "Hungary", "Ireland",
    "Italy", "Latvia", "Lithuania", "Luxembourg", "Malta", "Netherlands", "Poland",
    "Portugal", "Romania", "Slovakia", "Slovenia", "Spain", "Sweden", "Iceland",
    "Liechtenstein", "Norway",
];

/// Nationality adjectives for [`EU_EEA_COUNTRIES`]
///
/// Short nouns such as "dane" or "pole" are left out; they occur inside
/// unrelated words ("sudanese").
const EU_EEA_DEMONYMS: &[&str] = &[
    "austrian", "belgian", "bulgarian", "croatian", "cypriot", "czech", "danish", "estonian",
    "finnish", "french", "german", "greek", "hungarian", "irish", "italian", "latvian",
    "lithuanian", "luxembourgish", "luxembourger", "maltese", "dutch", "polish", "portuguese",
    "romanian", "slovak", "slovenian", "slovene", "spanish", "swedish", "icelandic",
    "liechtensteiner", "norwegian",
];

static EXAM_SCORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(ielts|toefl|pte|duolingo|cambridge|cae)\b[^0-9]*(\d+(?:\.\d+)?)")
        .expect("exam score pattern is valid")
});

/// Minimum accepted score per English exam
fn exam_threshold(exam: &str) -> Option<f64> {
    match exam {
        "ielts" => Some(6.5),
        "toefl" => Some(90.0),
        "pte" => Some(61.0),
        "duolingo" => Some(110.0),
        "cambridge" | "cae" => Some(180.0),
        _ => None,
    }
}

/// How the mobility column is filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MobilityPolicy {
    /// Take the applicant's own answer through alias resolution
    #[default]
    FromApplication,

    /// Any German connection makes the applicant ineligible
    GermanConnectionOverride,
}

/// English proficiency from free text
///
/// Never returns `Negative`: absence of evidence goes to a human.
///
/// # Examples
///
/// ```
/// use intake_domain::Determination;
/// use intake_extractor::inference::english_proficiency;
///
/// assert_eq!(english_proficiency("IELTS 7.0"), Determination::Affirmative);
/// assert_eq!(english_proficiency("IELTS 6.0"), Determination::NeedsManualReview);
/// assert_eq!(english_proficiency("English (C1)"), Determination::Affirmative);
/// ```
pub fn english_proficiency(text: &str) -> Determination {
    let text = text.to_lowercase();

    if text.contains("c1") || text.contains("c2") {
        return Determination::Affirmative;
    }

    for caps in EXAM_SCORE.captures_iter(&text) {
        let (Some(exam), Some(score)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let (Some(threshold), Ok(score)) =
            (exam_threshold(exam.as_str()), score.as_str().parse::<f64>())
        else {
            continue;
        };
        if score >= threshold {
            return Determination::Affirmative;
        }
    }

    Determination::NeedsManualReview
}

/// Text of every field whose key mentions English, language or proficiency
pub fn language_text(record: &ExtractionRecord) -> String {
    record
        .iter()
        .filter(|(k, _)| {
            let key = normalize_key(k);
            key.contains("english") || key.contains("language") || key.contains("proficiency")
        })
        .map(|(_, v)| v)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Master degree from the flattened record, first qualifying pair wins
pub fn master_degree(record: &ExtractionRecord) -> Determination {
    for (key, value) in record.iter() {
        let key = normalize_key(key);
        if key.contains("master") && is_affirmative(value) {
            return Determination::Affirmative;
        }
        if key.contains("degree") && normalize(value).contains("master") {
            return Determination::Affirmative;
        }
    }
    Determination::NeedsManualReview
}

/// Doctoral degree from the flattened record
pub fn doctoral_degree(record: &ExtractionRecord) -> Determination {
    let holds = record.iter().any(|(key, value)| {
        let key = normalize_key(key);
        let value_norm = normalize(value);
        let mentions = |s: &str| s.contains("phd") || s.contains("doctor");
        (mentions(key.as_str()) || mentions(value_norm.as_str())) && is_affirmative(value)
    });
    Determination::from_bool(holds)
}

/// Visa requirement: an explicit answer wins, otherwise nationality decides
pub fn visa_required(record: &ExtractionRecord) -> Determination {
    let explicit = record
        .iter()
        .find(|(key, _)| normalize_key(key).contains("visa"));

    match explicit {
        Some((_, value)) => {
            let answer = normalize(value);
            if is_affirmative(value) || answer == "required" {
                Determination::Affirmative
            } else if is_negative(value) || answer == "not required" {
                Determination::Negative
            } else {
                Determination::NeedsManualReview
            }
        }
        None => visa_from_nationality(first_value(record, |k| k.contains("nationality")).unwrap_or("")),
    }
}

/// EU/EEA nationals need no visa; anyone else (including "Unknown") does
///
/// # Examples
///
/// ```
/// use intake_domain::Determination;
/// use intake_extractor::inference::visa_from_nationality;
///
/// assert_eq!(visa_from_nationality("Spanish"), Determination::Negative);
/// assert_eq!(visa_from_nationality("born in Portugal"), Determination::Negative);
/// assert_eq!(visa_from_nationality("Brazil"), Determination::Affirmative);
/// assert_eq!(visa_from_nationality("Unknown"), Determination::Affirmative);
/// ```
pub fn visa_from_nationality(nationality: &str) -> Determination {
    let nationality = nationality.to_lowercase();
    let eu = EU_EEA_COUNTRIES
        .iter()
        .any(|country| nationality.contains(&country.to_lowercase()))
        || EU_EEA_DEMONYMS.iter().any(|d| nationality.contains(d));
    Determination::from_bool(!eu)
}

/// Mobility under the given policy
///
/// `None` means the column is left to alias resolution.
pub fn mobility(record: &ExtractionRecord, policy: MobilityPolicy) -> Option<Determination> {
    match policy {
        MobilityPolicy::FromApplication => None,
        MobilityPolicy::GermanConnectionOverride => {
            let nationality = first_value(record, |k| k.contains("nationality")).unwrap_or("");
            let contact_country =
                first_value(record, |k| k.contains("country") && k.contains("contact")).unwrap_or("");

            if normalize(nationality).contains("german") || normalize(contact_country).contains("germany") {
                return Some(Determination::Negative);
            }

            let answer = first_value(record, |k| k.contains("mobility"));
            Some(match answer {
                Some(v) if is_affirmative(v) => Determination::Affirmative,
                Some(v) if is_negative(v) => Determination::Negative,
                Some(v) if !v.trim().is_empty() && normalize(v) != "unknown" => {
                    Determination::NeedsManualReview
                }
                _ => Determination::NotStated,
            })
        }
    }
}

/// First whitespace token is the first name, the rest is the last name
///
/// # Examples
///
/// ```
/// use intake_extractor::inference::split_name;
///
/// assert_eq!(split_name("Jane  van der Berg"), ("Jane".to_string(), "van der Berg".to_string()));
/// assert_eq!(split_name("Madonna"), ("Madonna".to_string(), String::new()));
/// assert_eq!(split_name("  "), (String::new(), String::new()));
/// ```
pub fn split_name(full_name: &str) -> (String, String) {
    let mut parts = full_name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}

const FIRST_NAME_KEYS: &[&str] = &["first name", "given name"];
const LAST_NAME_KEYS: &[&str] = &["last name", "surname", "family name"];

/// First and last name of the applicant
///
/// A single full-name value is split with [`split_name`]. Multi-word aliases
/// match by containment and single-word ones (`"name"`) only as the whole
/// key, so "University Name" never counts. Keys that are themselves a first
/// or last name part are skipped there; when no full name exists, those
/// parts are used directly, which covers replies that nest them under
/// `"Full Name"`.
///
/// # Examples
///
/// ```
/// use intake_domain::ExtractionRecord;
/// use intake_extractor::inference::applicant_name;
///
/// let aliases = vec!["full name".to_string(), "name".to_string()];
/// let nested: ExtractionRecord = vec![("Full Name_First Name", "John"), ("Full Name_Last Name", "Doe")]
///     .into_iter()
///     .collect();
/// assert_eq!(applicant_name(&nested, &aliases), ("John".to_string(), "Doe".to_string()));
/// ```
pub fn applicant_name(record: &ExtractionRecord, full_name_aliases: &[String]) -> (String, String) {
    let keys: Vec<(String, &str)> = record
        .iter()
        .map(|(k, v)| (normalize_key(k), v.trim()))
        .filter(|(_, v)| !v.is_empty())
        .collect();
    let is_part = |key: &str| {
        FIRST_NAME_KEYS
            .iter()
            .chain(LAST_NAME_KEYS)
            .any(|part| key.contains(part))
    };

    let full_name = full_name_aliases.iter().find_map(|alias| {
        let alias = normalize_key(alias);
        if alias.is_empty() {
            return None;
        }
        let single_word = !alias.contains(' ');
        keys.iter()
            .filter(|(key, _)| !is_part(key))
            .find(|(key, _)| if single_word { *key == alias } else { key.contains(&alias) })
            .map(|(_, value)| *value)
    });
    if let Some(full_name) = full_name {
        return split_name(full_name);
    }

    let part = |names: &[&str]| {
        keys.iter()
            .find(|(key, _)| names.iter().any(|name| key.contains(name)))
            .map(|(_, value)| value.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default()
    };
    (part(FIRST_NAME_KEYS), part(LAST_NAME_KEYS))
}

/// Applicant id: lower-cased last name with `_` for spaces, then a timestamp
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use intake_extractor::inference::applicant_id;
///
/// let at = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap().and_hms_opt(14, 5, 7).unwrap();
/// assert_eq!(applicant_id("Van Der Berg", at), "van_der_berg_2026-03-09_140507");
/// assert_eq!(applicant_id("", at), "unknown_2026-03-09_140507");
/// ```
pub fn applicant_id(last_name: &str, at: NaiveDateTime) -> String {
    let base = last_name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_");
    let base = if base.is_empty() { "unknown".to_string() } else { base };
    format!("{}_{}", base, at.format("%Y-%m-%d_%H%M%S"))
}

/// Value of the first pair whose normalized key satisfies `pred`
fn first_value<'a>(record: &'a ExtractionRecord, pred: impl Fn(&str) -> bool) -> Option<&'a str> {
    record
        .iter()
        .find(|(key, _)| pred(&normalize_key(key)))
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> ExtractionRecord {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_english_thresholds() {
        use Determination::*;
        let cases = [
            ("IELTS 7.0", Affirmative),
            ("ielts: 6.5", Affirmative),
            ("IELTS 6.0", NeedsManualReview),
            ("TOEFL 85", NeedsManualReview),
            ("TOEFL iBT 100", Affirmative),
            ("PTE Academic 65", Affirmative),
            ("PTE 58", NeedsManualReview),
            ("Duolingo 115", Affirmative),
            ("Cambridge CAE 185", Affirmative),
            ("Cambridge 170", NeedsManualReview),
            ("C1 English", Affirmative),
            ("Fluent (C2)", Affirmative),
            ("native speaker", NeedsManualReview),
            ("", NeedsManualReview),
        ];
        for (text, expected) in cases {
            assert_eq!(english_proficiency(text), expected, "text: {text}");
        }
    }

    #[test]
    fn test_english_later_exam_can_qualify() {
        assert_eq!(
            english_proficiency("TOEFL 80 (2019), IELTS 7.5 (2023)"),
            Determination::Affirmative
        );
    }

    #[test]
    fn test_exam_needs_word_boundary() {
        // "computer" must not read as "pte"
        assert_eq!(english_proficiency("computer 99"), Determination::NeedsManualReview);
    }

    #[test]
    fn test_language_text_collects_relevant_keys() {
        let r = record(&[
            ("Languages_English", "Fluent"),
            ("Languages_German", "A2"),
            ("English Proficiency?", "IELTS 7"),
            ("Gender", "Female"),
        ]);
        assert_eq!(language_text(&r), "Fluent A2 IELTS 7");
    }

    #[test]
    fn test_master_degree() {
        let yes_flag = record(&[("Holds-Master-Degree", "Yes")]);
        assert_eq!(master_degree(&yes_flag), Determination::Affirmative);

        let degree_title = record(&[("Education_Degree_1", "Master of Science in AI")]);
        assert_eq!(master_degree(&degree_title), Determination::Affirmative);

        let unknown = record(&[("Holds-Master-Degree", "Unknown")]);
        assert_eq!(master_degree(&unknown), Determination::NeedsManualReview);

        let bachelor = record(&[("Degree", "Bachelor of Arts")]);
        assert_eq!(master_degree(&bachelor), Determination::NeedsManualReview);
    }

    #[test]
    fn test_doctoral_degree() {
        let yes = record(&[("Holds-Doctoral-Degree", "Yes")]);
        assert_eq!(doctoral_degree(&yes), Determination::Affirmative);

        let phd = record(&[("PhD", "true")]);
        assert_eq!(doctoral_degree(&phd), Determination::Affirmative);

        let no = record(&[("Holds-Doctoral-Degree", "No")]);
        assert_eq!(doctoral_degree(&no), Determination::Negative);

        let unrelated_yes = record(&[("Holds-Master-Degree", "Yes")]);
        assert_eq!(doctoral_degree(&unrelated_yes), Determination::Negative);

        assert_eq!(doctoral_degree(&ExtractionRecord::new()), Determination::Negative);
    }

    #[test]
    fn test_visa_from_nationality_cases() {
        assert_eq!(visa_from_nationality("GERMANY"), Determination::Negative);
        assert_eq!(visa_from_nationality("Italian"), Determination::Negative);
        assert_eq!(visa_from_nationality("Czech Republic"), Determination::Negative);
        assert_eq!(visa_from_nationality("Norwegian"), Determination::Negative);
        assert_eq!(visa_from_nationality("Brazil"), Determination::Affirmative);
        assert_eq!(visa_from_nationality("Sudanese"), Determination::Affirmative);
        assert_eq!(visa_from_nationality("Australian"), Determination::Affirmative);
        assert_eq!(visa_from_nationality(""), Determination::Affirmative);
    }

    #[test]
    fn test_visa_explicit_field_wins() {
        let r = record(&[("Nationality", "French"), ("Visa required?", "Yes")]);
        assert_eq!(visa_required(&r), Determination::Affirmative);

        let r = record(&[("Nationality", "Indian"), ("Visa_required", "Not required")]);
        assert_eq!(visa_required(&r), Determination::Negative);

        let r = record(&[("Nationality", "Indian"), ("Visa required?", "Unknown")]);
        assert_eq!(visa_required(&r), Determination::NeedsManualReview);
    }

    #[test]
    fn test_visa_falls_back_to_nationality() {
        let r = record(&[("Nationality", "Spanish")]);
        assert_eq!(visa_required(&r), Determination::Negative);

        let r = record(&[("Nationality", "Unknown")]);
        assert_eq!(visa_required(&r), Determination::Affirmative);

        assert_eq!(visa_required(&ExtractionRecord::new()), Determination::Affirmative);
    }

    #[test]
    fn test_mobility_policies() {
        let r = record(&[
            ("Nationality", "German"),
            ("Fits mobility rules?", "Yes"),
        ]);
        assert_eq!(mobility(&r, MobilityPolicy::FromApplication), None);
        assert_eq!(
            mobility(&r, MobilityPolicy::GermanConnectionOverride),
            Some(Determination::Negative)
        );

        let r = record(&[
            ("Nationality", "Brazilian"),
            ("Country-Contact", "Germany"),
            ("Fits mobility rules?", "Yes"),
        ]);
        assert_eq!(
            mobility(&r, MobilityPolicy::GermanConnectionOverride),
            Some(Determination::Negative)
        );

        let r = record(&[("Nationality", "Brazilian"), ("Fits mobility rules?", "yes")]);
        assert_eq!(
            mobility(&r, MobilityPolicy::GermanConnectionOverride),
            Some(Determination::Affirmative)
        );

        let r = record(&[("Nationality", "Brazilian"), ("Fits mobility rules?", "Unknown")]);
        assert_eq!(
            mobility(&r, MobilityPolicy::GermanConnectionOverride),
            Some(Determination::NotStated)
        );
    }

    #[test]
    fn test_mobility_policy_serde_names() {
        let policy: MobilityPolicy = serde_json::from_str("\"german_connection_override\"").unwrap();
        assert_eq!(policy, MobilityPolicy::GermanConnectionOverride);
        assert_eq!(MobilityPolicy::default(), MobilityPolicy::FromApplication);
    }

    fn name_aliases() -> Vec<String> {
        ["full-name", "full name", "applicant name", "name"]
            .iter()
            .map(|a| a.to_string())
            .collect()
    }

    #[test]
    fn test_applicant_name_nested_parts() {
        let flat = record(&[("Full Name_First Name", "John"), ("Full Name_Last Name", "Doe")]);
        assert_eq!(
            applicant_name(&flat, &name_aliases()),
            ("John".to_string(), "Doe".to_string())
        );
    }

    #[test]
    fn test_applicant_name_ignores_other_names() {
        let flat = record(&[
            ("Applicant", "Jane Doe"),
            ("Education_University Name", "University of London"),
        ]);
        assert_eq!(applicant_name(&flat, &name_aliases()), (String::new(), String::new()));

        let flat = record(&[("Education_University Name", "Trinity College"), ("Name", "Ana Lopez")]);
        assert_eq!(
            applicant_name(&flat, &name_aliases()),
            ("Ana".to_string(), "Lopez".to_string())
        );
    }

    #[test]
    fn test_applicant_name_prefers_full_name() {
        let flat = record(&[
            ("First Name", "Joanna"),
            ("Full-name", "Jane van Dijk"),
            ("Last Name", "Smith"),
        ]);
        assert_eq!(
            applicant_name(&flat, &name_aliases()),
            ("Jane".to_string(), "van Dijk".to_string())
        );
    }

    #[test]
    fn test_applicant_name_takes_one_value() {
        let flat = record(&[("Full-name", "Jane Doe"), ("Reference_Full-name", "Mark Roe")]);
        assert_eq!(
            applicant_name(&flat, &name_aliases()),
            ("Jane".to_string(), "Doe".to_string())
        );
    }
}
