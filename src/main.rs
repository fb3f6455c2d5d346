use clap::Parser;
use strings_template::core::csrf::CSRF_COOKIE_NAME;
use strings_template::utils::{logger, validation::Validate};
use strings_template::{
    CliConfig, Context, CsrfTokenSource, EngineParams, Engines, RenderTemplate, Request,
    SafeString, Settings, Template, TemplateBackend, TemplateError, TemplateStrings,
};

fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::debug!("CLI config: {:?}", config);

    match run(&config) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            tracing::error!("❌ Rendering failed: {}", e);
            if let TemplateError::TemplateDoesNotExist(missing) = &e {
                tracing::error!("{}", missing.diagnostic());
            }
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}

fn run(config: &CliConfig) -> Result<String, TemplateError> {
    let settings = load_settings(config)?;
    let context = build_context(config)?;
    let request = config
        .csrf_token
        .as_ref()
        .map(|token| Request::new().with_cookie(CSRF_COOKIE_NAME, token.clone()));
    let request_ref = request.as_ref().map(|r| r as &dyn CsrfTokenSource);

    let engines: Engines = Engines::from_settings(&settings)?;
    let template = select_template(config, &settings, &engines)?;

    tracing::debug!("Placeholders: {}", template.identifiers().join(", "));
    if !template.is_valid() {
        tracing::warn!("Template contains '$' not followed by a valid placeholder");
    }

    if config.strict {
        template.render_strict(Some(&context), request_ref)
    } else {
        Ok(template.render(Some(&context), request_ref))
    }
}

fn load_settings(config: &CliConfig) -> Result<Settings, TemplateError> {
    // 直接渲染字串時設定檔可有可無
    if config.string.is_some() && !config.config.exists() {
        tracing::debug!("No settings at {}, using defaults", config.config.display());
        return Ok(Settings::default());
    }

    tracing::info!("📁 Loading settings from: {}", config.config.display());
    let settings = Settings::from_file(&config.config)?;
    settings.validate()?;
    Ok(settings)
}

fn build_context(config: &CliConfig) -> Result<Context, TemplateError> {
    let mut context = match &config.context_file {
        Some(path) => Context::from_json_str(&std::fs::read_to_string(path)?)?,
        None => Context::new(),
    };

    for (key, value) in &config.vars {
        context.insert(key.clone(), value.clone());
    }
    for (key, value) in &config.safe_vars {
        context.insert(key.clone(), SafeString::new(value.clone()));
    }

    Ok(context)
}

fn select_template(
    config: &CliConfig,
    settings: &Settings,
    engines: &Engines,
) -> Result<Template, TemplateError> {
    if let Some(code) = &config.string {
        return match &config.engine {
            Some(alias) => engines.get(alias)?.from_string(code),
            None => default_engine(settings)?.from_string(code),
        };
    }

    let name = config.template.as_deref().unwrap_or_default();
    match &config.engine {
        Some(alias) => engines.get(alias)?.get_template(name),
        None => {
            if engines.is_empty() {
                return Err(TemplateError::improperly_configured(
                    "settings.TEMPLATES is empty",
                ));
            }
            engines.get_template(name)
        }
    }
}

fn default_engine(settings: &Settings) -> Result<TemplateStrings, TemplateError> {
    TemplateStrings::new(EngineParams::new(TemplateStrings::BACKEND_ID), settings)
}
