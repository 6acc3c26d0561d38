//! Tabular import settings.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImportConfig {
    /// Column separator for CSV imports. Empty means auto-detect.
    #[serde(default)]
    pub delimiter: String,
}

impl ImportConfig {
    /// The configured delimiter byte, or `None` to auto-detect.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for anything but empty, `,` or `;`.
    pub fn delimiter_byte(&self) -> Result<Option<u8>, ConfigError> {
        match self.delimiter.trim() {
            "" => Ok(None),
            "," => Ok(Some(b',')),
            ";" => Ok(Some(b';')),
            other => Err(ConfigError::InvalidValue {
                field: "import.delimiter".into(),
                reason: format!("expected ',' or ';', got '{other}'"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with(delimiter: &str) -> ImportConfig {
        ImportConfig {
            delimiter: delimiter.into(),
        }
    }

    #[test]
    fn empty_means_auto_detect() {
        assert_eq!(ImportConfig::default().delimiter_byte().unwrap(), None);
    }

    #[test]
    fn accepts_comma_and_semicolon() {
        assert_eq!(with(",").delimiter_byte().unwrap(), Some(b','));
        assert_eq!(with(" ; ").delimiter_byte().unwrap(), Some(b';'));
    }

    #[test]
    fn rejects_other_separators() {
        let err = with("|").delimiter_byte().unwrap_err();
        assert!(err.to_string().contains("import.delimiter"));
    }
}
