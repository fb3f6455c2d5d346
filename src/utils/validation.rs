use crate::utils::error::{Result, TemplateError};
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: &str) -> TemplateError {
    TemplateError::improperly_configured(format!(
        "{} = '{}': {}",
        field_name, value, reason
    ))
}

pub fn validate_path(field_name: &str, path: &Path) -> Result<()> {
    let display = path.to_string_lossy();

    if path.as_os_str().is_empty() {
        return Err(invalid(field_name, &display, "Path cannot be empty"));
    }

    if display.contains('\0') {
        return Err(invalid(field_name, &display, "Path contains null bytes"));
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if !allowed.contains(&value) {
        return Err(invalid(
            field_name,
            value,
            &format!("Unsupported value. Valid values: {}", allowed.join(", ")),
        ));
    }
    Ok(())
}
