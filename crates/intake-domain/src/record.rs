//! Flat extraction records and export rows

/// Ordered, flat mapping of field name → string value
///
/// Insertion order is preserved and significant: rule-based detectors scan
/// pairs in the order the model produced them. Values are always plain
/// strings; nested structures are flattened before they get here.
///
/// # Examples
///
/// ```
/// use intake_domain::ExtractionRecord;
///
/// let mut record = ExtractionRecord::new();
/// record.insert("Full-name", "Jane Doe");
/// record.insert("Nationality", "Spanish");
/// record.insert("Full-name", "Jane Q. Doe");
///
/// assert_eq!(record.get("Full-name"), Some("Jane Q. Doe"));
/// assert_eq!(record.keys().collect::<Vec<_>>(), vec!["Full-name", "Nationality"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionRecord {
    fields: Vec<(String, String)>,
}

impl ExtractionRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing the value in place if the key already exists
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Look up a field by exact key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ExtractionRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl IntoIterator for ExtractionRecord {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// One physical row of the export, positionally aligned to the target schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputRow {
    /// Cell values in column order
    pub cells: Vec<String>,
}

impl OutputRow {
    /// Wrap cell values
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_preserves_first_position() {
        let mut record = ExtractionRecord::new();
        record.insert("a", "1");
        record.insert("b", "2");
        record.insert("a", "3");

        let pairs: Vec<_> = record.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_from_iterator() {
        let record: ExtractionRecord = vec![("Gender", "Female"), ("E-Mail", "jane@example.com")]
            .into_iter()
            .collect();
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("Gender"), Some("Female"));
        assert_eq!(record.get("gender"), None);
    }
}
