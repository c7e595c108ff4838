//! Operator-facing messages, as colored text or JSON.

use console::Style;
use kcap_estream::{FormatError, Outcome};
use serde::Serialize;

/// Colors for text output. Passed explicitly to the renderer.
#[derive(Debug, Clone)]
pub struct Theme {
    pub success: Style,
    pub file:    Style,
    pub key:     Style,
    pub warning: Style,
    pub info:    Style,
}

impl Theme {
    pub fn colored() -> Self {
        Self {
            success: Style::new().green().bold(),
            file:    Style::new().white().bold(),
            key:     Style::new().red().bright().bold(),
            warning: Style::new().yellow().bold(),
            info:    Style::new().cyan(),
        }
    }

    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            file:    Style::new(),
            key:     Style::new(),
            warning: Style::new(),
            info:    Style::new(),
        }
    }

    /// Colored when stdout is a terminal and colors were not turned off.
    pub fn detect(no_color: bool) -> Self {
        if no_color || !console::Term::stdout().features().colors_supported() {
            Self::plain()
        } else {
            Self::colored()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Validation {
    Valid { streams: usize },
    /// The capture is not a container; nothing was checked.
    Unrecognized,
    Failed { error: String },
}

impl From<&Result<Outcome, FormatError>> for Validation {
    fn from(result: &Result<Outcome, FormatError>) -> Self {
        match result {
            Ok(Outcome::Valid(report)) => Self::Valid {
                streams: report.streams.len(),
            },
            Ok(Outcome::Unrecognized { .. }) => Self::Unrecognized,
            Err(err) => Self::Failed {
                error: err.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectMessage {
    pub status:     &'static str,
    pub target:     String,
    pub file:       String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key:        Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup:     Option<String>,
    pub validation: Validation,
}

impl InspectMessage {
    pub fn to_json(&self) -> serde_json::Result<String> { serde_json::to_string_pretty(self) }

    pub fn render(&self, theme: &Theme) -> String {
        let file = theme.file.apply_to(&self.file);
        let mut out = match &self.key {
            None => theme
                .success
                .apply_to(format!("File data successfully downloaded as {file}"))
                .to_string(),
            Some(key) => {
                let mut msg = format!(
                    "{}\n",
                    theme
                        .success
                        .apply_to(format!("Encrypted file data successfully downloaded as {file}"))
                );
                msg += &format!("Decryption key: {}\n\n", theme.key.apply_to(key));
                msg += "The decryption key will ONLY be shown here. It cannot be recovered.\n";
                msg += "The encrypted file can safely be shared without the decryption key.\n";
                msg += "Even with the decryption key, data stored with encryption cannot be accessed.";
                msg
            }
        };

        if let Some(backup) = &self.backup {
            out += &format!("\nPrevious file moved to {}", theme.file.apply_to(backup));
        }
        if let Validation::Failed { error } = &self.validation {
            out += &format!("\n{}", theme.warning.apply_to(format!("Validation failed: {error}")));
        }
        out
    }
}
