use crate::core::template_strings::TemplateStrings;
use crate::domain::ports::TemplateBackend;
use crate::utils::error::{Result, TemplateError};
use crate::utils::validation::{validate_non_empty_string, validate_one_of, validate_path, Validate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Global settings consumed by the template engines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Settings {
    #[serde(default = "default_file_charset")]
    pub file_charset: String,
    #[serde(default)]
    pub installed_apps: Vec<PathBuf>,
    #[serde(default)]
    pub templates: Vec<EngineParams>,
}

fn default_file_charset() -> String {
    "utf-8".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            file_charset: default_file_charset(),
            installed_apps: Vec::new(),
            templates: Vec::new(),
        }
    }
}

/// One entry of `TEMPLATES`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct EngineParams {
    pub backend: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub dirs: Vec<PathBuf>,
    #[serde(default)]
    pub app_dirs: bool,
    #[serde(default)]
    pub options: toml::Table,
    /// 其餘未知參數，建構引擎時拒絕
    #[serde(flatten)]
    pub extra: toml::Table,
}

impl EngineParams {
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            name: None,
            dirs: Vec::new(),
            app_dirs: false,
            options: toml::Table::new(),
            extra: toml::Table::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_app_dirs(mut self, app_dirs: bool) -> Self {
        self.app_dirs = app_dirs;
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<toml::Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// Character encodings accepted by `FILE_CHARSET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileCharset {
    #[default]
    Utf8,
    Latin1,
    Ascii,
}

impl FileCharset {
    pub fn decode(&self, bytes: Vec<u8>) -> Option<String> {
        match self {
            FileCharset::Utf8 => String::from_utf8(bytes).ok(),
            FileCharset::Latin1 => Some(bytes.into_iter().map(char::from).collect()),
            FileCharset::Ascii => {
                if bytes.is_ascii() {
                    String::from_utf8(bytes).ok()
                } else {
                    None
                }
            }
        }
    }
}

impl FromStr for FileCharset {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(FileCharset::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(FileCharset::Latin1),
            "ascii" | "us-ascii" => Ok(FileCharset::Ascii),
            other => Err(TemplateError::improperly_configured(format!(
                "FILE_CHARSET = '{}': Unsupported charset. Valid values: utf-8, latin-1, ascii",
                other
            ))),
        }
    }
}

impl fmt::Display for FileCharset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileCharset::Utf8 => "utf-8",
            FileCharset::Latin1 => "latin-1",
            FileCharset::Ascii => "ascii",
        };
        f.write_str(name)
    }
}

impl Settings {
    /// 從 TOML 檔案載入設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TemplateError::Io)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析設定
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| TemplateError::ConfigParse {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${TEMPLATE_ROOT})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::LazyLock;

        static ENV_VAR: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn charset(&self) -> Result<FileCharset> {
        self.file_charset.parse()
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        self.charset()?;

        for app in &self.installed_apps {
            validate_path("INSTALLED_APPS", app)?;
        }

        for params in &self.templates {
            validate_one_of(
                "TEMPLATES.BACKEND",
                &params.backend,
                &[TemplateStrings::BACKEND_ID],
            )?;
            if let Some(name) = &params.name {
                validate_non_empty_string("TEMPLATES.NAME", name)?;
            }
            for dir in &params.dirs {
                validate_path("TEMPLATES.DIRS", dir)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_settings() {
        let toml_content = r#"
FILE_CHARSET = "latin-1"
INSTALLED_APPS = ["apps/blog"]

[[TEMPLATES]]
BACKEND = "template_strings"
NAME = "strings"
DIRS = ["templates", "shared/templates"]
APP_DIRS = true
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();

        assert_eq!(settings.charset().unwrap(), FileCharset::Latin1);
        assert_eq!(settings.installed_apps, vec![PathBuf::from("apps/blog")]);
        assert_eq!(settings.templates.len(), 1);

        let params = &settings.templates[0];
        assert_eq!(params.backend, "template_strings");
        assert_eq!(params.name.as_deref(), Some("strings"));
        assert_eq!(params.dirs.len(), 2);
        assert!(params.app_dirs);
        assert!(params.options.is_empty());
        assert!(params.extra.is_empty());
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings.charset().unwrap(), FileCharset::Utf8);
        assert!(settings.templates.is_empty());
    }

    #[test]
    fn test_unknown_keys_are_collected() {
        let toml_content = r#"
[[TEMPLATES]]
BACKEND = "template_strings"
LOADERS = ["fs"]

[TEMPLATES.OPTIONS]
BOGUS = 1
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();
        let params = &settings.templates[0];
        assert!(params.extra.contains_key("LOADERS"));
        assert_eq!(params.options.get("BOGUS"), Some(&toml::Value::Integer(1)));
    }

    #[test]
    fn test_env_var_substitution() {
        // 僅此測試讀寫這兩個變數，平行執行的其他測試不受影響
        std::env::set_var("STRINGS_TEMPLATE_TEST_ROOT", "/srv/site");

        let toml_content = r#"
[[TEMPLATES]]
BACKEND = "template_strings"
DIRS = ["${STRINGS_TEMPLATE_TEST_ROOT}/templates", "${STRINGS_TEMPLATE_UNSET_VAR}"]
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();
        assert_eq!(
            settings.templates[0].dirs,
            vec![
                PathBuf::from("/srv/site/templates"),
                PathBuf::from("${STRINGS_TEMPLATE_UNSET_VAR}")
            ]
        );

        std::env::remove_var("STRINGS_TEMPLATE_TEST_ROOT");
    }

    #[test]
    fn test_settings_validation() {
        let settings = Settings {
            file_charset: "ebcdic".to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            templates: vec![EngineParams::new("mako")],
            ..Settings::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            templates: vec![EngineParams::new("template_strings").with_dirs([""])],
            ..Settings::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            templates: vec![EngineParams::new("template_strings").with_dirs(["templates"])],
            ..Settings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_invalid_toml() {
        let err = Settings::from_toml_str("TEMPLATES = 3").unwrap_err();
        assert!(matches!(err, TemplateError::ConfigParse { .. }));
    }

    #[test]
    fn test_settings_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[[TEMPLATES]]
BACKEND = "template_strings"
NAME = "file-test"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let settings = Settings::from_file(temp_file.path()).unwrap();
        assert_eq!(settings.templates[0].name.as_deref(), Some("file-test"));
    }

    #[test]
    fn test_charset_decode() {
        assert_eq!(
            FileCharset::Utf8.decode("héllo".as_bytes().to_vec()).as_deref(),
            Some("héllo")
        );
        assert_eq!(FileCharset::Utf8.decode(vec![0xff, 0xfe]), None);
        assert_eq!(
            FileCharset::Latin1.decode(vec![b'h', 0xe9]).as_deref(),
            Some("hé")
        );
        assert_eq!(FileCharset::Ascii.decode(vec![b'h', 0xe9]), None);
    }
}
