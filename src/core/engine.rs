use crate::config::{EngineParams, FileCharset, Settings};
use crate::utils::error::{Result, TemplateError};
use std::path::{Component, Path, PathBuf};

/// State shared by every template backend: name, directories and charset.
#[derive(Debug, Clone)]
pub struct BaseEngine {
    name: String,
    dirs: Vec<PathBuf>,
    app_dirs: bool,
    installed_apps: Vec<PathBuf>,
    charset: FileCharset,
}

impl BaseEngine {
    /// Consume the generic parameters. `OPTIONS` is left for the backend.
    pub fn new(params: &EngineParams, settings: &Settings, default_name: &str) -> Result<Self> {
        if !params.extra.is_empty() {
            let keys: Vec<&str> = params.extra.keys().map(String::as_str).collect();
            return Err(TemplateError::improperly_configured(format!(
                "Unknown parameters: {}",
                keys.join(", ")
            )));
        }

        Ok(Self {
            name: params
                .name
                .clone()
                .unwrap_or_else(|| default_name.to_string()),
            dirs: params.dirs.clone(),
            app_dirs: params.app_dirs,
            installed_apps: settings.installed_apps.clone(),
            charset: settings.charset()?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn charset(&self) -> FileCharset {
        self.charset
    }

    /// `DIRS` first, then `<app>/<app_dirname>` for every installed app when `APP_DIRS` is set.
    pub fn template_dirs(&self, app_dirname: &str) -> Vec<PathBuf> {
        let mut dirs = self.dirs.clone();
        if self.app_dirs {
            dirs.extend(self.installed_apps.iter().map(|app| app.join(app_dirname)));
        }
        dirs
    }

    /// Candidate paths for `template_name`, skipping any that would leave their directory.
    pub fn iter_template_filenames<'a>(
        &self,
        template_name: &'a str,
        app_dirname: &str,
    ) -> impl Iterator<Item = PathBuf> + 'a {
        self.template_dirs(app_dirname)
            .into_iter()
            .filter_map(move |dir| match safe_join(&dir, template_name) {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::debug!("Skipping candidate for '{}': {}", template_name, e);
                    None
                }
            })
    }
}

/// Join `name` onto `base` as an absolute path, refusing results outside `base`.
pub fn safe_join(base: &Path, name: &str) -> Result<PathBuf> {
    let base_path = normalize(&std::path::absolute(base)?);
    let final_path = normalize(&std::path::absolute(base.join(name))?);

    if !final_path.starts_with(&base_path) {
        return Err(TemplateError::SuspiciousFileOperation { path: final_path });
    }

    Ok(final_path)
}

// 字面正規化，不解析符號連結；輸入為絕對路徑時 `..` 不會越過根目錄
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
