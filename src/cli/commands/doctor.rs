//! Doctor command - verify credentials, configuration and connectivity.

use crate::cli::Output;
use crate::config::{mask_secret, Prompts, Settings};
use crate::llm::{ChatModel, OpenRouterChat};
use crate::reader::{JinaReader, PageReader};
use crate::visit::TokenBudget;
use console::style;

/// Page fetched by the online reader probe.
const PROBE_URL: &str = "https://example.com";

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn print_section(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings, online: bool) -> anyhow::Result<()> {
    Output::header("webvisit Doctor");
    println!();
    println!("Checking credentials and configuration...\n");

    let mut checks = Vec::new();

    let api_checks = vec![
        check_key("JINA_API_KEYS", settings.reader_api_key()),
        check_key("OPENROUTER_API_KEY", settings.llm_api_key()),
    ];
    print_section("API Configuration", &api_checks);
    checks.extend(api_checks);

    let config_checks = vec![
        check_config_file(),
        CheckResult::ok("Reader endpoint", &settings.reader.endpoint),
        CheckResult::ok(
            "Summary model",
            &format!("{} via {}", settings.llm.model, settings.llm.base_url),
        ),
        check_prompt(settings),
        check_log_dir(settings),
        check_tokenizer(),
    ];
    print_section("Configuration", &config_checks);
    checks.extend(config_checks);

    if online {
        let online_checks = vec![probe_reader(settings).await, probe_model(settings).await];
        print_section("Connectivity", &online_checks);
        checks.extend(online_checks);
    }

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using webvisit.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! webvisit is ready to use.");
    }

    Ok(())
}

fn check_key(name: &str, value: Option<&str>) -> CheckResult {
    match value {
        Some(key) => CheckResult::ok(name, &format!("configured ({})", mask_secret(key))),
        None => CheckResult::error(
            name,
            "not set",
            &format!("Set with: export {}='...' (or add it to .env)", name),
        ),
    }
}

fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: webvisit config init",
        )
    }
}

fn check_prompt(settings: &Settings) -> CheckResult {
    match settings.prompts.extractor_file.as_deref() {
        None => CheckResult::ok("Extractor prompt", "built-in"),
        Some(file) => match Prompts::load(Some(file)) {
            Ok(prompts) if prompts.extractor.contains("{{webpage_content}}") => {
                CheckResult::ok("Extractor prompt", file)
            }
            Ok(_) => CheckResult::warning(
                "Extractor prompt",
                &format!("{} has no {{{{webpage_content}}}} slot", file),
                "The page text will not reach the model",
            ),
            Err(e) => CheckResult::error(
                "Extractor prompt",
                &format!("{}: {}", file, e),
                "Fix prompts.extractor_file or remove it to use the built-in prompt",
            ),
        },
    }
}

fn check_log_dir(settings: &Settings) -> CheckResult {
    let dir = settings.log_dir();
    if dir.is_dir() {
        CheckResult::ok("Log directory", &format!("{}", dir.display()))
    } else {
        CheckResult::warning(
            "Log directory",
            &format!("{} (will be created)", dir.display()),
            "Directory will be created on first run",
        )
    }
}

fn check_tokenizer() -> CheckResult {
    match TokenBudget::new() {
        Ok(budget) => CheckResult::ok(
            "Tokenizer",
            &format!("cl100k_base loaded ({} tokens in probe)", budget.count("webvisit doctor")),
        ),
        Err(e) => CheckResult::error("Tokenizer", &e.to_string(), "Reinstall webvisit"),
    }
}

async fn probe_reader(settings: &Settings) -> CheckResult {
    let reader = match JinaReader::new(&settings.reader) {
        Ok(reader) => reader,
        Err(e) => return CheckResult::error("Reader", &e.to_string(), "Set JINA_API_KEYS"),
    };

    match reader.read(PROBE_URL).await {
        Ok(response) if response.is_ok() => CheckResult::ok(
            "Reader",
            &format!("fetched {} ({} chars)", PROBE_URL, response.body.len()),
        ),
        Ok(response) => CheckResult::error(
            "Reader",
            &format!("status {}", response.status),
            "Check JINA_API_KEYS and reader.endpoint",
        ),
        Err(e) => CheckResult::error("Reader", &e.to_string(), "Check network access"),
    }
}

async fn probe_model(settings: &Settings) -> CheckResult {
    let model = match OpenRouterChat::new(&settings.llm) {
        Ok(model) => model,
        Err(e) => return CheckResult::error("Model", &e.to_string(), "Set OPENROUTER_API_KEY"),
    };

    match model.complete("Reply with the single word OK.").await {
        Ok(text) if !text.trim().is_empty() => {
            CheckResult::ok("Model", &format!("{} answered", model.model_name()))
        }
        Ok(_) => CheckResult::warning(
            "Model",
            &format!("{} returned empty content", model.model_name()),
            "Try another SUMMARY_MODEL_NAME",
        ),
        Err(e) => CheckResult::error(
            "Model",
            &e.to_string(),
            "Check OPENROUTER_API_KEY and llm.base_url",
        ),
    }
}
