//! Flatten nested JSON into an ordered, string-valued record

use intake_domain::ExtractionRecord;
use serde_json::{Map, Value};

/// Separator between key path segments
pub const KEY_SEPARATOR: &str = "_";

/// Flatten a JSON object into an [`ExtractionRecord`]
///
/// Nested keys are joined with `_`, array elements are indexed from 0,
/// scalars are rendered as strings and `null` becomes the empty string.
/// Key order follows the source object.
///
/// # Examples
///
/// ```
/// use intake_extractor::flatten;
/// use serde_json::json;
///
/// let value = json!({
///     "Full-name": "Jane Doe",
///     "Skills": ["Python", "R"],
///     "Contact": {"E-Mail": "jane@example.com", "Phone": null}
/// });
/// let record = flatten(value.as_object().unwrap());
///
/// let pairs: Vec<_> = record.iter().collect();
/// assert_eq!(pairs, vec![
///     ("Full-name", "Jane Doe"),
///     ("Skills_0", "Python"),
///     ("Skills_1", "R"),
///     ("Contact_E-Mail", "jane@example.com"),
///     ("Contact_Phone", ""),
/// ]);
/// ```
pub fn flatten(object: &Map<String, Value>) -> ExtractionRecord {
    let mut record = ExtractionRecord::new();
    for (key, value) in object {
        flatten_into(&mut record, key.clone(), value);
    }
    record
}

fn flatten_into(record: &mut ExtractionRecord, prefix: String, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(record, join(&prefix, key), nested);
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_into(record, join(&prefix, &i.to_string()), item);
            }
        }
        Value::String(s) => record.insert(prefix, s.clone()),
        Value::Null => record.insert(prefix, String::new()),
        other => record.insert(prefix, other.to_string()),
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}{}{}", prefix, KEY_SEPARATOR, key)
    }
}

/// Render a flat record back into a JSON object of strings
pub fn record_to_object(record: &ExtractionRecord) -> Map<String, Value> {
    record
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_object_unchanged() {
        let value = json!({"Gender": "Male", "Nationality": "British"});
        let record = flatten(value.as_object().unwrap());
        assert_eq!(record_to_object(&record), *value.as_object().unwrap());
    }

    #[test]
    fn test_nested_education() {
        let value = json!({
            "Education": {
                "Master's Degree": {"University Name": "University of London", "Year of Graduation": 2020}
            },
            "Eligible": true
        });
        let record = flatten(value.as_object().unwrap());
        assert_eq!(
            record.get("Education_Master's Degree_University Name"),
            Some("University of London")
        );
        assert_eq!(record.get("Education_Master's Degree_Year of Graduation"), Some("2020"));
        assert_eq!(record.get("Eligible"), Some("true"));
    }

    #[test]
    fn test_array_of_objects() {
        let value = json!({"Research Experience": {"Projects": [{"Title": "AI in Healthcare"}]}});
        let record = flatten(value.as_object().unwrap());
        assert_eq!(
            record.get("Research Experience_Projects_0_Title"),
            Some("AI in Healthcare")
        );
    }

    #[test]
    fn test_empty_containers_vanish() {
        let value = json!({"Skills": [], "Contact": {}, "Gender": "Female"});
        let record = flatten(value.as_object().unwrap());
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["Gender"]);
    }
}
