use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the application
#[derive(Debug, Error)]
pub enum Error {
    /// The marker was constructed with a mode it does not know.
    #[error("Mode {0} was not recognized")]
    InvalidMode(String),

    /// A custom config file contains keys absent from the default config.
    #[error("The given settings in the custom config: {0:?} are not valid settings in the config")]
    UnknownConfigKeys(Vec<String>),

    /// A custom template directory contains files that do not name a template.
    #[error("The given custom template files: {0:?} are not valid filenames")]
    UnknownTemplates(Vec<String>),

    #[error("{path} has an invalid format, valid formats are {valid:?}")]
    InvalidFileFormat { path: PathBuf, valid: Vec<String> },

    #[error("Path does not exist or has the wrong type: {0}")]
    NotFound(PathBuf),

    #[error("Docstring format {0} is not supported")]
    UnsupportedDocstringFormat(String),

    /// `Registry::add` was handed something that cannot be called.
    #[error("The provided object must be callable: {0}")]
    NotCallable(String),

    /// A signature parameter has no documented description.
    #[error("Parameter `{parameter}` of `{entity}` is not documented")]
    MissingParameterDoc { entity: String, parameter: String },

    #[error("Parse error in {}: {message}", file.display())]
    Parse { file: PathBuf, message: String },

    #[error("Template error: {0}")]
    Template(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Whether this error stems from invalid configuration (mode, config file or templates).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidMode(_)
                | Error::UnknownConfigKeys(_)
                | Error::UnknownTemplates(_)
                | Error::InvalidFileFormat { .. }
                | Error::NotFound(_)
                | Error::UnsupportedDocstringFormat(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_classification() {
        assert!(Error::InvalidMode("debug".to_string()).is_configuration());
        assert!(Error::UnknownConfigKeys(vec!["extra_field".to_string()]).is_configuration());
        assert!(!Error::NotCallable("LIMIT".to_string()).is_configuration());
        assert!(!Error::MissingParameterDoc {
            entity: "add".to_string(),
            parameter: "a".to_string(),
        }
        .is_configuration());
    }

    #[test]
    fn test_messages_name_offenders() {
        let err = Error::UnknownTemplates(vec!["bogus.md".to_string()]);
        assert!(err.to_string().contains("bogus.md"));

        let err = Error::MissingParameterDoc {
            entity: "store".to_string(),
            parameter: "value".to_string(),
        };
        assert_eq!(err.to_string(), "Parameter `value` of `store` is not documented");
    }
}
