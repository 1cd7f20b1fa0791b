use std::path::PathBuf;

/// Failure kinds surfaced by the prep run.
///
/// Only [`PrepError::TemplateNotFound`] and [`PrepError::InvalidArgument`] end
/// a run; the rest are logged per item and the run carries on.
#[derive(Debug, thiserror::Error)]
pub enum PrepError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("'{file}' not found in '{dir}'")]
    TemplateNotFound { file: String, dir: String },

    #[error("shortcut metadata: {0}")]
    ShortcutMetadata(String),

    #[error("{}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PrepError {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_not_found_message_names_file_and_dir() {
        let e = PrepError::TemplateNotFound {
            file: "Sunday Template.pptx".to_string(),
            dir: r"C:\Slides".to_string(),
        };
        assert_eq!(e.to_string(), r"'Sunday Template.pptx' not found in 'C:\Slides'");
    }

    #[test]
    fn filesystem_error_includes_path() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let msg = PrepError::filesystem("/tmp/out", io).to_string();
        assert!(msg.contains("/tmp/out"), "unexpected message: {msg}");
        assert!(msg.contains("gone"), "unexpected message: {msg}");
    }
}
