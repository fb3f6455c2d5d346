use crate::core::origin::TemplateDoesNotExist;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Improperly configured: {message}")]
    ImproperlyConfigured { message: String },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    #[error(transparent)]
    TemplateDoesNotExist(#[from] TemplateDoesNotExist),

    #[error("Could not find config for '{alias}' in settings.TEMPLATES")]
    InvalidTemplateEngine { alias: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not decode '{}' as {charset}", .path.display())]
    Decode { path: PathBuf, charset: String },

    #[error("Invalid placeholder in string: line {line}, col {col}")]
    InvalidPlaceholder { line: usize, col: usize },

    #[error("Missing value for placeholder: {key}")]
    MissingKey { key: String },

    #[error("The joined path ({}) is located outside of the base path component", .path.display())]
    SuspiciousFileOperation { path: PathBuf },

    #[error("Invalid context: {message}")]
    Context { message: String },
}

impl TemplateError {
    pub fn improperly_configured(message: impl Into<String>) -> Self {
        TemplateError::ImproperlyConfigured {
            message: message.into(),
        }
    }

    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            TemplateError::ImproperlyConfigured { message } => {
                format!("Template settings are invalid: {}", message)
            }
            TemplateError::ConfigParse { .. } => "Could not read the settings file".to_string(),
            TemplateError::TemplateDoesNotExist(e) => {
                format!("Template '{}' was not found", e.name())
            }
            TemplateError::InvalidTemplateEngine { alias } => {
                format!("No template engine named '{}'", alias)
            }
            TemplateError::Io(e) => format!("File access failed: {}", e),
            TemplateError::Decode { path, charset } => {
                format!("'{}' is not valid {}", path.display(), charset)
            }
            TemplateError::InvalidPlaceholder { line, col } => {
                format!("Template has a stray '$' at line {}, col {}", line, col)
            }
            TemplateError::MissingKey { key } => format!("No value given for '${}'", key),
            TemplateError::SuspiciousFileOperation { path } => {
                format!("Refusing to read '{}'", path.display())
            }
            TemplateError::Context { message } => format!("Context is invalid: {}", message),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            TemplateError::ImproperlyConfigured { .. } => {
                "Remove unknown keys from TEMPLATES and check BACKEND / NAME values"
            }
            TemplateError::ConfigParse { .. } => "Check that the settings file is valid TOML",
            TemplateError::TemplateDoesNotExist(_) => {
                "Check DIRS / APP_DIRS and the template name; every tried path is listed in the log"
            }
            TemplateError::InvalidTemplateEngine { .. } => {
                "Use one of the NAME values configured in TEMPLATES"
            }
            TemplateError::Io(_) => "Check file permissions",
            TemplateError::Decode { .. } => "Re-save the file or change FILE_CHARSET",
            TemplateError::InvalidPlaceholder { .. } => {
                "Write '$$' for a literal dollar sign or use ${name} placeholders"
            }
            TemplateError::MissingKey { .. } => {
                "Provide the value or render without --strict"
            }
            TemplateError::SuspiciousFileOperation { .. } => {
                "Template names must be relative and stay inside the template directories"
            }
            TemplateError::Context { .. } => "The context must be a JSON object",
        }
    }

    /// 依錯誤類型決定 CLI 結束碼
    pub fn exit_code(&self) -> i32 {
        match self {
            TemplateError::ImproperlyConfigured { .. }
            | TemplateError::ConfigParse { .. }
            | TemplateError::InvalidTemplateEngine { .. } => 3,
            TemplateError::TemplateDoesNotExist(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, TemplateError>;
