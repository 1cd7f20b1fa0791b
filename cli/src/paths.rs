/// Canonical file paths for SundayPrep data files.
///
/// Both files live under %APPDATA%\SundayPrep\ on Windows (the platform config
/// directory elsewhere):
///   - config.toml    Optional defaults, edited by hand.
///   - last_run.toml  Report of the most recent run, written by the tool.
use std::path::PathBuf;

const APP_DIR_NAME: &str = "SundayPrep";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const REPORT_FILE_NAME: &str = "last_run.toml";

/// Returns the SundayPrep application data directory, if one can be located.
pub fn app_data_dir() -> Option<PathBuf> {
    std::env::var_os("APPDATA")
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
        .map(|base| base.join(APP_DIR_NAME))
}

/// Returns the full path to the config file: %APPDATA%\SundayPrep\config.toml
pub fn config_file_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Returns the full path to the run report: %APPDATA%\SundayPrep\last_run.toml
pub fn report_file_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join(REPORT_FILE_NAME))
}
