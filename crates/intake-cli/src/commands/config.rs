//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
///
/// `init` runs before any configuration is loaded so it works on a fresh
/// machine; `show` prints the effective configuration after env overrides.
pub fn execute_config(args: ConfigArgs, path: Option<&Path>, formatter: &Formatter) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let config = Config::load(path)?;
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Init { force } => {
            let target = match path {
                Some(path) => path.to_path_buf(),
                None => Config::default_path()?,
            };
            if target.exists() && !force {
                return Err(CliError::InvalidInput(format!(
                    "{} already exists (use --force to overwrite)",
                    target.display()
                )));
            }
            Config::default().save(&target)?;
            println!(
                "{}",
                formatter.success(&format!("Wrote {}", target.display()))
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use tempfile::TempDir;

    fn formatter() -> Formatter {
        Formatter::new(OutputFormat::Quiet, false)
    }

    #[test]
    fn test_init_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("intake.toml");

        execute_config(
            ConfigArgs { action: ConfigAction::Init { force: false } },
            Some(&path),
            &formatter(),
        )
        .unwrap();

        assert_eq!(Config::from_file(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("intake.toml");
        std::fs::write(&path, "[llm]\nmodel = \"mine\"\n").unwrap();

        let result = execute_config(
            ConfigArgs { action: ConfigAction::Init { force: false } },
            Some(&path),
            &formatter(),
        );
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
        assert!(std::fs::read_to_string(&path).unwrap().contains("mine"));

        execute_config(
            ConfigArgs { action: ConfigAction::Init { force: true } },
            Some(&path),
            &formatter(),
        )
        .unwrap();
        assert!(!std::fs::read_to_string(&path).unwrap().contains("mine"));
    }
}
