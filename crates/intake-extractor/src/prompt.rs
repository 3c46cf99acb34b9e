//! LLM prompt for applicant field extraction

use crate::inference::EU_EEA_COUNTRIES;

/// Fields the model is asked to return, in order
pub const OUTPUT_FIELDS: &[&str] = &[
    "Full-name",
    "Date-of-birth",
    "Gender",
    "Nationality",
    "Country-Contact",
    "E-Mail",
    "Phone-number",
    "Holds-Master-Degree",
    "Year-of-graduation-Master",
    "Languages",
    "Skills and competences",
    "Research Experience",
    "Holds-Doctoral-Degree",
    "Fits mobility rules?",
    "English Proficiency?",
    "Visa required?",
];

/// Placeholder the model uses for anything it cannot find
pub const UNKNOWN_VALUE: &str = "Unknown";

/// Builds the extraction prompt from the two applicant documents
pub struct PromptBuilder<'a> {
    cv_text: &'a str,
    application_text: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(cv_text: &'a str, application_text: &'a str) -> Self {
        Self {
            cv_text,
            application_text,
        }
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(INSTRUCTIONS);
        prompt.push_str("\n\n");

        prompt.push_str(&rules());
        prompt.push_str("\n");

        prompt.push_str("The output must contain only the following fields:\n");
        for field in OUTPUT_FIELDS {
            prompt.push_str(&format!("- \"{}\"\n", field));
        }
        prompt.push_str(&format!(
            "\nAll values must be plain strings. If a value is not mentioned or unclear, use \"{}\".\n\n",
            UNKNOWN_VALUE
        ));

        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt.push_str("\n\n");

        prompt.push_str("CV Text:\n---\n");
        prompt.push_str(self.cv_text);
        prompt.push_str("\n---\n\n");

        prompt.push_str("Job Application Text:\n---\n");
        prompt.push_str(self.application_text);
        prompt.push_str("\n---\n");

        prompt
    }
}

fn rules() -> String {
    format!(
        r#"Apply the following extraction rules:

1. Mobility: take it from the application form, which states it as either Yes or No.

2. English Proficiency (English only, ignore other languages): set "English Proficiency?" to "Yes" if any of these is mentioned:
   - an IELTS score of 6.5 or above
   - a TOEFL score of 90 or above
   - a language level of C1 or C2 in English

3. Doctoral Degree: set "Holds-Doctoral-Degree" to "Yes" only if the applicant explicitly states they hold a PhD or doctorate, otherwise "No".

4. Visa Requirement: set "Visa required?" to "No" if the nationality is one of: {}. Set it to "Yes" for any other nationality.
"#,
        EU_EEA_COUNTRIES.join(", ")
    )
}

const INSTRUCTIONS: &str = r#"You extract information from academic job applications. Answer only what is asked and ignore the applicant's postal address.

You are given two raw texts from one applicant:
1. Their CV
2. Their job application

Return the requested information as strict, flat JSON: no markdown, no code blocks, no trailing commas, and no extra text."#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Each field must hold a single string value, not a list or numbered subfields (no "Skills 0", "Skills 1"). Combine related entries into one line, for example:
  "Skills and competences": "Python, R, TensorFlow"

Return ONLY the JSON object."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_both_texts() {
        let prompt = PromptBuilder::new("CV: Jane Doe, MSc AI", "I apply for the position").build();
        assert!(prompt.contains("CV: Jane Doe, MSc AI"));
        assert!(prompt.contains("I apply for the position"));
        assert!(prompt.find("CV Text:").unwrap() < prompt.find("Job Application Text:").unwrap());
    }

    #[test]
    fn test_prompt_lists_every_field() {
        let prompt = PromptBuilder::new("cv", "app").build();
        for field in OUTPUT_FIELDS {
            assert!(prompt.contains(&format!("\"{}\"", field)), "missing {field}");
        }
    }

    #[test]
    fn test_prompt_includes_rules() {
        let prompt = PromptBuilder::new("cv", "app").build();
        assert!(prompt.contains("IELTS score of 6.5"));
        assert!(prompt.contains("TOEFL score of 90"));
        assert!(prompt.contains("Czech Republic"));
        assert!(prompt.contains("use \"Unknown\""));
    }
}
