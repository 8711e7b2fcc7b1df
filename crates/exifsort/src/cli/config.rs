//! The `exifsort config` command.
//!
//! `show` prints the configuration `sort` will run with, which is the
//! defaults when the file is missing or broken. `check` reads the file
//! strictly so a broken one can be found and fixed.

use clap::{Args, Subcommand};
use exifsort_core::Config;
use std::path::Path;

/// Commented starting point written by `config init`.
///
/// Keep in step with the defaults in `exifsort_core::config`.
pub const TEMPLATE: &str = r#"# exifsort configuration
#
# `exifsort sort --from <dir> --to <dir>` moves every image with an EXIF
# capture time to <to>/<year>/<year>.<month>.<day>_<hour>.<minute>.<second><ext>.
# Command-line flags override the values below.

[pipeline]
# Items buffered between scanner, classifier and relocator.
# 1 hands each item straight to the next stage.
buffer_size = 1

[classify]
# Extensions that get sorted, matched case-insensitively.
# Files with any other extension stay where they are.
extensions = ["jpg", "jpeg"]

[relocate]
# A different file already holds the target name:
#   "overwrite" replaces it (the last image moved wins)
#   "fail"      stops the run with an error
on_conflict = "overwrite"
# true keeps the extension as read (photo.JPG -> ....JPG),
# false lower-cases it.
preserve_extension_case = false

[logging]
# error, warn, info, debug or trace. RUST_LOG takes precedence.
# Stage summaries are printed at every level.
level = "info"
# "pretty" or "json"
format = "pretty"
"#;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the configuration `sort` would use
    Show,

    /// Print the config file path
    Path,

    /// Read the config file strictly and report any problem
    Check,

    /// Write a commented config file with the default settings
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command against the effective configuration.
pub async fn execute(args: ConfigArgs, config: Config) -> anyhow::Result<()> {
    let path = Config::default_path();

    match args.command {
        ConfigCommand::Show => print!("{}", config.to_toml()?),

        ConfigCommand::Path => println!("{}", path.display()),

        ConfigCommand::Check => println!("{}", check(&path)?),

        ConfigCommand::Init { force } => {
            write_template(&path, force)?;
            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

/// Describe the config file at `path`, failing if it cannot be used.
fn check(path: &Path) -> anyhow::Result<String> {
    if !path.exists() {
        return Ok(format!(
            "No config file at {}; defaults are in use.",
            path.display()
        ));
    }
    Config::load_from(path)
        .map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))?;
    Ok(format!("{} is valid.", path.display()))
}

/// Write [`TEMPLATE`] to `path`, creating parent directories.
fn write_template(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, TEMPLATE)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_matches_defaults() {
        let parsed = Config::from_toml(TEMPLATE).unwrap();
        assert_eq!(
            parsed.to_toml().unwrap(),
            Config::default().to_toml().unwrap()
        );
    }

    #[test]
    fn test_template_documents_every_section() {
        for section in ["[pipeline]", "[classify]", "[relocate]", "[logging]"] {
            assert!(TEMPLATE.contains(section), "missing {section}");
        }
        assert!(TEMPLATE.contains("\"fail\""));
    }

    #[test]
    fn test_write_template_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        write_template(&path, false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), TEMPLATE);

        std::fs::write(&path, "[relocate]\non_conflict = \"fail\"\n").unwrap();
        assert!(write_template(&path, false).is_err());
        assert!(std::fs::read_to_string(&path).unwrap().contains("fail"));

        write_template(&path, true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), TEMPLATE);
    }

    #[test]
    fn test_check_reports_missing_valid_and_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        assert!(check(&path).unwrap().contains("defaults are in use"));

        std::fs::write(&path, TEMPLATE).unwrap();
        assert!(check(&path).unwrap().contains("is valid"));

        std::fs::write(&path, "[pipeline]\nbuffer_size = 0\n").unwrap();
        assert!(check(&path).is_err());
    }

    #[tokio::test]
    async fn test_show_uses_the_given_config() {
        let mut config = Config::default();
        config.relocate.on_conflict = exifsort_core::ConflictPolicy::Fail;
        let args = ConfigArgs {
            command: ConfigCommand::Show,
        };
        assert!(execute(args, config).await.is_ok());
    }
}
