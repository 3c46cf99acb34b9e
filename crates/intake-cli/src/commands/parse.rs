//! Parse command implementation.
//!
//! Replays a saved model reply through the same parser and standardizer the
//! worker uses, without touching the job store or the export.

use crate::cli::ParseArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use intake_extractor::{parse_response, AliasCatalog, ParseOutcome, Standardizer, TargetSchema};
use std::io::Read;

/// Execute the parse command.
pub fn execute_parse(args: ParseArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let reply = match args.file {
        Some(path) if !args.stdin => std::fs::read_to_string(path)?,
        _ => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let (object, repairs) = match parse_response(&reply) {
        ParseOutcome::Parsed { object, repairs } => (object, repairs),
        ParseOutcome::Malformed(defect) => {
            eprintln!("{}", formatter.error("Reply contains malformed JSON"));
            eprintln!("  {}", defect);
            return Err(CliError::InvalidInput(format!(
                "malformed JSON at byte {}",
                defect.offset
            )));
        }
        ParseOutcome::NoJson => {
            return Err(CliError::InvalidInput(
                "no JSON object found in reply".to_string(),
            ))
        }
    };

    for repair in &repairs {
        eprintln!("{}", formatter.warning(&format!("Repaired reply: {}", repair)));
    }

    let schema = schema_for(config, formatter)?;
    let standardizer = Standardizer::new(schema, &config.extractor())?;
    let standardized = standardizer.standardize(&object, chrono::Local::now().naive_local());

    println!("{}", formatter.format_record(&standardized.record)?);
    if standardized.manual_fields > 0 {
        eprintln!(
            "{}",
            formatter.info(&format!(
                "{} field(s) need manual review",
                standardized.manual_fields
            ))
        );
    }
    Ok(())
}

/// Columns from the configured template, or the standard set when it is absent.
fn schema_for(config: &Config, formatter: &Formatter) -> Result<TargetSchema> {
    let template = &config.sheet.template_path;
    if !template.is_file() {
        eprintln!(
            "{}",
            formatter.info(&format!(
                "Template {} not found, using the standard columns",
                template.display()
            ))
        );
        return Ok(TargetSchema::standard());
    }

    let headers = intake_sheet::template_headers(template, &config.sheet.layout())?;
    Ok(TargetSchema::from_headers(&headers, &AliasCatalog::standard())?)
}
