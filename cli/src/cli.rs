use chrono::NaiveDate;
use clap::Parser;
use std::path::{Path, PathBuf};

use crate::config::Defaults;
use crate::prep::{PrepMode, PrepOptions};
use crate::sundays;

/// Prepare next month's Sunday presentations from a template.
#[derive(Debug, Parser)]
#[command(name = "sunday-prep", version)]
pub struct Args {
    /// Month to prepare (1-12). Defaults to the month one week from today.
    #[arg(long)]
    pub month: Option<u32>,

    /// Year to prepare. Defaults to the year one week from today.
    #[arg(long)]
    pub year: Option<i32>,

    /// Template file name inside the template directory.
    #[arg(long)]
    pub template_file: Option<String>,

    /// Directory holding the template (and the TODO shortcuts in shortcut mode).
    #[arg(long)]
    pub template_directory: Option<String>,

    /// Directory the copies are written under.
    #[arg(long)]
    pub output_directory: Option<String>,

    /// Extension for the copies, without the dot.
    #[arg(long)]
    pub ext: Option<String>,

    /// `copy` for plain TODO copies, `shortcut` for dated folders plus .lnk shortcuts.
    #[arg(long, value_enum)]
    pub mode: Option<PrepMode>,

    /// Actually write files. Without it the run only reports what it would do.
    #[arg(long)]
    pub write: bool,

    /// Only rewrite absolute OneDrive paths in the shortcuts of DIR, then exit.
    #[arg(long, value_name = "DIR")]
    pub repair: Option<String>,

    /// Config file to read instead of %APPDATA%\SundayPrep\config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Where to write the run report instead of %APPDATA%\SundayPrep\last_run.toml.
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

impl Args {
    /// Merges flags over config defaults. `today` and `cwd` supply the
    /// remaining defaults so this stays independent of the wall clock.
    pub fn resolve(&self, defaults: &Defaults, today: NaiveDate, cwd: &Path) -> PrepOptions {
        let (next_month, next_year) = sundays::next_week(today);
        let cwd = cwd.to_string_lossy().into_owned();

        PrepOptions {
            month: self.month.unwrap_or(next_month),
            year: self.year.unwrap_or(next_year),
            template_file: self
                .template_file
                .clone()
                .unwrap_or_else(|| defaults.template_file.clone()),
            template_dir: self
                .template_directory
                .clone()
                .or_else(|| defaults.template_dir.clone())
                .unwrap_or_else(|| cwd.clone()),
            output_dir: self
                .output_directory
                .clone()
                .or_else(|| defaults.output_dir.clone())
                .unwrap_or(cwd),
            extension: self
                .ext
                .clone()
                .unwrap_or_else(|| defaults.extension.clone()),
            mode: self.mode.unwrap_or(defaults.mode),
            write: self.write,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_EXTENSION, DEFAULT_TEMPLATE_FILE};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 28).unwrap()
    }

    #[test]
    fn no_flags_use_defaults_and_next_week() {
        let args = Args::try_parse_from(["sunday-prep"]).unwrap();
        let opts = args.resolve(&Defaults::default(), today(), Path::new("/slides"));

        assert_eq!((opts.month, opts.year), (2, 2024));
        assert_eq!(opts.template_file, DEFAULT_TEMPLATE_FILE);
        assert_eq!(opts.extension, DEFAULT_EXTENSION);
        assert_eq!(opts.template_dir, "/slides");
        assert_eq!(opts.output_dir, "/slides");
        assert_eq!(opts.mode, PrepMode::Shortcut);
        assert!(!opts.write);
    }

    #[test]
    fn flags_override_config_defaults() {
        let defaults = Defaults {
            template_dir: Some("from-config".to_string()),
            output_dir: Some("out-config".to_string()),
            mode: PrepMode::Copy,
            ..Defaults::default()
        };
        let args = Args::try_parse_from([
            "sunday-prep",
            "--month",
            "5",
            "--year",
            "2025",
            "--template-file",
            "Easter.pptx",
            "--template-directory",
            r"%OneDriveConsumer%\Slides",
            "--ext",
            "potx",
            "--mode",
            "shortcut",
            "--write",
        ])
        .unwrap();

        let opts = args.resolve(&defaults, today(), Path::new("/cwd"));

        assert_eq!((opts.month, opts.year), (5, 2025));
        assert_eq!(opts.template_file, "Easter.pptx");
        assert_eq!(opts.template_dir, r"%OneDriveConsumer%\Slides");
        assert_eq!(opts.output_dir, "out-config");
        assert_eq!(opts.extension, "potx");
        assert_eq!(opts.mode, PrepMode::Shortcut);
        assert!(opts.write);
    }

    #[test]
    fn non_integer_month_is_rejected_by_parser() {
        assert!(Args::try_parse_from(["sunday-prep", "--month", "May"]).is_err());
        assert!(Args::try_parse_from(["sunday-prep", "--month", "2.5"]).is_err());
    }

    #[test]
    fn unknown_mode_is_rejected_by_parser() {
        assert!(Args::try_parse_from(["sunday-prep", "--mode", "symlink"]).is_err());
    }

    #[test]
    fn repair_flag_takes_a_directory() {
        let args = Args::try_parse_from(["sunday-prep", "--repair", r"C:\Slides"]).unwrap();
        assert_eq!(args.repair.as_deref(), Some(r"C:\Slides"));
    }
}
