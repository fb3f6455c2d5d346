use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "strings-template")]
#[command(about = "Render $placeholder templates with HTML escaping")]
pub struct CliConfig {
    /// Path to TOML settings file
    #[arg(short, long, default_value = "templates.toml")]
    pub config: PathBuf,

    /// Template name to look up in the configured directories
    #[arg(short, long, conflicts_with = "string", required_unless_present = "string")]
    pub template: Option<String>,

    /// Render this text instead of a template file
    #[arg(short, long)]
    pub string: Option<String>,

    /// Engine alias (NAME) to use; all engines are tried when omitted
    #[arg(short, long)]
    pub engine: Option<String>,

    /// Context value, escaped on output (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub vars: Vec<(String, String)>,

    /// Context value marked safe, not escaped (repeatable)
    #[arg(long = "safe-var", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub safe_vars: Vec<(String, String)>,

    /// JSON object file merged into the context before --var values
    #[arg(long)]
    pub context_file: Option<PathBuf>,

    /// Render as if the request carried this CSRF cookie
    #[arg(long)]
    pub csrf_token: Option<String>,

    /// Fail on missing values and stray '$' instead of leaving them
    #[arg(long)]
    pub strict: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}
