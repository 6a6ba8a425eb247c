//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{ProviderKind, Settings, StorageKind, TranscriberKind};
use console::style;
use std::path::Path;
use std::process::Command;

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

    /// Downgrade an error to a warning, for tools only some inputs need.
    fn optional(mut self) -> Self {
        if self.status == CheckStatus::Error {
            self.status = CheckStatus::Warning;
        }
        self
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Lectio Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("External Tools").bold());
    let tool_checks = vec![
        check_tool("ffmpeg", &["-version"], install_hint("ffmpeg")).optional(),
        check_tool("ffprobe", &["-version"], install_hint("ffmpeg")).optional(),
        check_tool("pdftotext", &["-v"], install_hint("pdftotext")).optional(),
        check_tool("unzip", &["-v"], install_hint("unzip")).optional(),
    ];
    for check in &tool_checks {
        check.print();
    }
    checks.extend(tool_checks);

    println!();

    println!("{}", style("Providers").bold());
    let provider_checks = check_providers(settings);
    for check in &provider_checks {
        check.print();
    }
    checks.extend(provider_checks);

    println!();

    println!("{}", style("Directories").bold());
    let dir_checks = check_directories(settings);
    for check in &dir_checks {
        check.print();
    }
    checks.extend(dir_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config(settings);
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Lectio.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Lectio is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str, args: &[&str], hint: &str) -> CheckResult {
    match Command::new(name).args(args).output() {
        Ok(output) => {
            // Some tools print their version on stderr, or exit non-zero for -v
            let text = if output.stdout.is_empty() {
                String::from_utf8_lossy(&output.stderr).into_owned()
            } else {
                String::from_utf8_lossy(&output.stdout).into_owned()
            };
            let version: String = text
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .chars()
                .take(50)
                .collect();
            CheckResult::ok(name, if version.is_empty() { "installed" } else { &version })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckResult::error(name, "not found", hint),
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Check credentials of the configured provider and transcriber.
fn check_providers(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();
    let provider = &settings.provider;
    let name = format!("Content provider ({})", provider.kind);

    let configured_key = provider.api_key();
    results.push(match provider.kind {
        ProviderKind::Dummy => CheckResult::warning(&name, "offline dummy output", "Set [provider] kind = \"openai\" or \"gemini\""),
        _ if configured_key.is_some() => CheckResult::ok(
            &name,
            &format!("key from ${} ({})", provider.api_key_env, provider.resolved_model()),
        ),
        ProviderKind::OpenAI => env_key_check(&name, "OPENAI_API_KEY"),
        ProviderKind::Gemini => env_key_check(&name, "GEMINI_API_KEY"),
    });

    let transcriber = "Transcriber";
    results.push(match settings.transcription.kind {
        TranscriberKind::Whisper => env_key_check(transcriber, "OPENAI_API_KEY"),
        TranscriberKind::Dummy => CheckResult::warning(
            transcriber,
            "dummy transcripts for audio and video",
            "Set [transcription] kind = \"whisper\"",
        ),
    });

    results
}

fn env_key_check(name: &str, var: &str) -> CheckResult {
    match std::env::var(var) {
        Ok(key) if key.chars().count() > 12 => {
            let head: String = key.chars().take(4).collect();
            let tail: String = key.chars().skip(key.chars().count() - 4).collect();
            let masked = format!("{}...{}", head, tail);
            CheckResult::ok(name, &format!("{} configured ({})", var, masked))
        }
        Ok(key) if key.is_empty() => {
            CheckResult::error(name, &format!("{} is empty", var), &format!("Set with: export {}='...'", var))
        }
        Ok(_) => CheckResult::warning(name, &format!("{} looks too short", var), "Check the key value"),
        Err(_) => CheckResult::error(name, &format!("{} not set", var), &format!("Set with: export {}='...'", var)),
    }
}

/// Check working and storage directories.
fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    let mut dirs = vec![
        ("Upload directory", settings.upload_dir()),
        ("Temp directory", settings.temp_dir()),
    ];
    if settings.storage.kind == StorageKind::Local {
        dirs.push(("Result store", settings.storage_root()));
    }

    dirs.into_iter()
        .map(|(name, path)| check_dir(name, &path))
        .collect()
}

fn check_dir(name: &str, path: &Path) -> CheckResult {
    if path.exists() {
        CheckResult::ok(name, &path.display().to_string())
    } else {
        CheckResult::warning(
            name,
            &format!("{} (will be created)", path.display()),
            "Directory will be created on first use",
        )
    }
}

/// Check the config file and the values it holds.
fn check_config(settings: &Settings) -> CheckResult {
    if let Err(e) = settings.validate() {
        return CheckResult::error("Config", &e.to_string(), "Fix the value in the config file");
    }
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &config_path.display().to_string())
    } else {
        CheckResult::warning("Config file", "using defaults", "Create with: lectio config init")
    }
}

/// Platform-specific install hint.
fn install_hint(tool: &str) -> &'static str {
    match tool {
        "ffmpeg" => {
            if cfg!(target_os = "macos") {
                "Install with: brew install ffmpeg"
            } else if cfg!(target_os = "linux") {
                "Install with: sudo apt install ffmpeg (or your package manager)"
            } else {
                "Install from: https://ffmpeg.org/download.html"
            }
        }
        "pdftotext" => {
            if cfg!(target_os = "macos") {
                "Install with: brew install poppler"
            } else {
                "Install with: sudo apt install poppler-utils (or your package manager)"
            }
        }
        "unzip" => "Install unzip with your package manager",
        _ => "Check the documentation for installation instructions",
    }
}
