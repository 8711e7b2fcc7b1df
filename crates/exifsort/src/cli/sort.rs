//! The `exifsort sort` command.

use clap::{Args, ValueEnum};
use exifsort_core::{Config, ConflictPolicy, Layout, Pipeline, RunReport, SortError};
use std::path::PathBuf;

/// Arguments for the `sort` command.
///
/// Each stage logs one summary line when it finishes, whatever the log level.
#[derive(Args, Debug)]
pub struct SortArgs {
    /// Directory holding unsorted images
    #[arg(long, env = "EXIFSORT_FROM", default_value = "")]
    pub from: String,

    /// Directory to build the sorted tree in (created if missing)
    #[arg(long, env = "EXIFSORT_TO", default_value = "")]
    pub to: String,

    /// What to do when the destination file already exists
    #[arg(long, value_enum)]
    pub on_conflict: Option<OnConflict>,

    /// Keep the extension's case as read (photo.JPG -> ....JPG)
    #[arg(long)]
    pub preserve_extension_case: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// CLI mirror of [`ConflictPolicy`].
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OnConflict {
    /// Replace the existing file (last image moved wins)
    Overwrite,
    /// Stop the run with an error
    Fail,
}

impl From<OnConflict> for ConflictPolicy {
    fn from(value: OnConflict) -> Self {
        match value {
            OnConflict::Overwrite => ConflictPolicy::Overwrite,
            OnConflict::Fail => ConflictPolicy::Fail,
        }
    }
}

/// Execute the sort command.
///
/// Invalid paths are reported on stdout and the command returns cleanly
/// without touching anything. A fatal error during the run halts the process.
pub async fn execute(args: SortArgs, config: Config) -> anyhow::Result<()> {
    let config = apply_overrides(config, &args);
    let layout = Layout::new(expand(&args.from), expand(&args.to));

    match Pipeline::new(config, layout).run().await {
        Ok(report) => {
            if args.json {
                println!("{}", report_json(&report)?);
            }
            Ok(())
        }
        Err(SortError::Config(e)) => {
            println!("{e}");
            Ok(())
        }
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("Error: {e}");
            // Remaining stages are still running; stop them with the process.
            std::process::exit(1);
        }
    }
}

fn report_json(report: &RunReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

fn apply_overrides(mut config: Config, args: &SortArgs) -> Config {
    if let Some(policy) = args.on_conflict {
        config.relocate.on_conflict = policy.into();
    }
    if args.preserve_extension_case {
        config.relocate.preserve_extension_case = true;
    }
    config
}

/// Expand a leading `~`; empty stays empty so layout validation can report it.
fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use exifsort_core::pipeline::metadata::fixtures;
    use std::path::Path;

    fn args() -> SortArgs {
        SortArgs {
            from: "in".into(),
            to: "out".into(),
            on_conflict: None,
            preserve_extension_case: false,
            json: false,
        }
    }

    #[test]
    fn test_overrides_leave_config_alone_by_default() {
        let config = apply_overrides(Config::default(), &args());
        assert_eq!(config.relocate.on_conflict, ConflictPolicy::Overwrite);
        assert!(!config.relocate.preserve_extension_case);
    }

    #[test]
    fn test_overrides_apply_flags() {
        let mut args = args();
        args.on_conflict = Some(OnConflict::Fail);
        args.preserve_extension_case = true;

        let config = apply_overrides(Config::default(), &args);
        assert_eq!(config.relocate.on_conflict, ConflictPolicy::Fail);
        assert!(config.relocate.preserve_extension_case);
    }

    #[test]
    fn test_expand_keeps_plain_and_empty_paths() {
        assert_eq!(expand("photos/in"), PathBuf::from("photos/in"));
        assert_eq!(expand(""), PathBuf::new());
    }

    fn sort_args(from: &Path, to: &Path) -> SortArgs {
        SortArgs {
            from: from.to_string_lossy().into_owned(),
            to: to.to_string_lossy().into_owned(),
            ..args()
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_missing_source_returns_cleanly() {
        let dst = tempfile::tempdir().unwrap();
        let destination = dst.path().join("sorted");
        let args = sort_args(Path::new(""), &destination);

        assert!(execute(args, Config::default()).await.is_ok());
        assert!(!destination.exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_file_as_source_returns_cleanly_and_touches_nothing() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let photo = src.path().join("photo.jpg");
        std::fs::write(&photo, fixtures::jpeg_taken_at("2023:03:05 14:07:09")).unwrap();

        let result = execute(sort_args(&photo, dst.path()), Config::default()).await;

        assert!(result.is_ok());
        assert!(photo.is_file());
        assert_eq!(std::fs::read_dir(dst.path()).unwrap().count(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_json_run_sorts_and_reports() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::write(
            src.path().join("IMG_0001.JPG"),
            fixtures::jpeg_taken_at("2023:03:05 14:07:09"),
        )
        .unwrap();
        std::fs::write(src.path().join("notes.txt"), b"film").unwrap();

        let mut args = sort_args(src.path(), dst.path());
        args.json = true;

        assert!(execute(args, Config::default()).await.is_ok());
        assert!(dst.path().join("2023/2023.03.05_14.07.09.jpg").is_file());
        assert!(src.path().join("notes.txt").is_file());
    }

    #[test]
    fn test_report_json_fields() {
        let report = RunReport {
            files_scanned: 2,
            images_recognized: 1,
            images_moved: 1,
        };
        let json = report_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["files_scanned"], 2);
        assert_eq!(value["images_recognized"], 1);
        assert_eq!(value["images_moved"], 1);
    }
}
