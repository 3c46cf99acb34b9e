use crate::SheetError;
use serde::{Deserialize, Serialize};

/// Where the header block and the data rows sit in the template
///
/// Row numbers are 1-based, as a spreadsheet user would count them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    /// Rows whose cells are joined into each column header
    pub header_rows: Vec<usize>,

    /// First row that receives appended data
    pub first_data_row: usize,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            header_rows: vec![4, 5, 6],
            first_data_row: 7,
        }
    }
}

impl SheetLayout {
    /// Header block on the first row only, data straight below
    pub fn single_header() -> Self {
        Self {
            header_rows: vec![1],
            first_data_row: 2,
        }
    }

    /// Validate row numbers
    pub fn validate(&self) -> Result<(), SheetError> {
        if self.header_rows.is_empty() {
            return Err(SheetError::InvalidLayout(
                "header_rows must name at least one row".to_string(),
            ));
        }
        if self.header_rows.contains(&0) {
            return Err(SheetError::InvalidLayout(
                "row numbers are 1-based".to_string(),
            ));
        }
        if self.header_rows.iter().any(|&r| r >= self.first_data_row) {
            return Err(SheetError::InvalidLayout(format!(
                "header rows {:?} must come before first_data_row {}",
                self.header_rows, self.first_data_row
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = SheetLayout::default();
        assert_eq!(layout.header_rows, vec![4, 5, 6]);
        assert_eq!(layout.first_data_row, 7);
        assert!(layout.validate().is_ok());
        assert!(SheetLayout::single_header().validate().is_ok());
    }

    #[test]
    fn test_invalid_layouts() {
        let empty = SheetLayout {
            header_rows: vec![],
            first_data_row: 2,
        };
        assert!(empty.validate().is_err());

        let zero = SheetLayout {
            header_rows: vec![0],
            first_data_row: 2,
        };
        assert!(zero.validate().is_err());

        let overlap = SheetLayout {
            header_rows: vec![4, 5, 6],
            first_data_row: 6,
        };
        assert!(matches!(overlap.validate(), Err(SheetError::InvalidLayout(_))));
    }
}
