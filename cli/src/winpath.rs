/// Windows path text helpers.
///
/// Paths are handled as plain strings here because the interesting forms
/// (`%VAR%` references, `C:\Users\<name>\OneDrive`) are only meaningful as
/// text, and the rewritten value ends up in shortcut metadata rather than
/// being opened directly.
use regex::{NoExpand, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

/// Environment variable Windows sets to the personal OneDrive root.
pub const ONEDRIVE_TOKEN: &str = "%OneDriveConsumer%";

static ONEDRIVE_RE: OnceLock<Regex> = OnceLock::new();
static ENV_REF_RE: OnceLock<Regex> = OnceLock::new();
static ESCAPABLE_RE: OnceLock<Regex> = OnceLock::new();

fn onedrive_re() -> &'static Regex {
    ONEDRIVE_RE.get_or_init(|| {
        // The bare token is matched too so normalising twice is a no-op.
        Regex::new(r"(?i)(?:[A-Z]:\\Users\\\w+|%USERPROFILE%)\\OneDrive|%OneDriveConsumer%")
            .expect("OneDrive pattern is valid")
    })
}

fn env_ref_re() -> &'static Regex {
    ENV_REF_RE.get_or_init(|| Regex::new(r"%([^%]+)%").expect("env reference pattern is valid"))
}

fn escapable_re() -> &'static Regex {
    ESCAPABLE_RE.get_or_init(|| {
        Regex::new(r"%([A-Za-z_][A-Za-z0-9_()]*)%").expect("variable name pattern is valid")
    })
}

/// Rewrites absolute OneDrive paths into the portable `%OneDriveConsumer%` form.
///
/// Both `X:\Users\<name>\OneDrive` and `%USERPROFILE%\OneDrive` are replaced,
/// case-insensitively and everywhere they occur. Anything else is returned as is.
pub fn normalize(path: &str) -> String {
    onedrive_re()
        .replace_all(path, NoExpand(ONEDRIVE_TOKEN))
        .into_owned()
}

/// Caret-escapes `%NAME%` references (`^%NAME^%`) so `cmd.exe` passes them
/// through literally instead of expanding them.
pub fn escape_variables(s: &str) -> Cow<'_, str> {
    escapable_re().replace_all(s, "^%${1}^%")
}

/// Expands every `%NAME%` reference from the process environment.
/// References to unset variables are left intact.
pub fn expand_env(s: &str) -> String {
    env_ref_re()
        .replace_all(s, |caps: &regex::Captures<'_>| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}
