use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};

use signup_wizard::api::{HttpRegistrationApi, RegistrationApi};
use signup_wizard::config::Config;
use signup_wizard::error::{AppResult, WizardError};
use signup_wizard::messaging::Event;
use signup_wizard::wizard::{build_payload, RegistrationDraft, RegistrationSession, SubmissionOutcome};

const LOG_FILE_NAME: &str = "signup-wizard.log";
const PASSWORD_MASK: &str = "********";

/// Initialize tracing with file rotation
///
/// Logs are written to `<config dir>/SignupWizard/logs/`, one file per day
/// (`signup-wizard.log.YYYY-MM-DD`). Debug builds also log to stderr so
/// stdout stays clean for the wizard output.
fn initialize_tracing() {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = Config::app_dir()
        .map(|dir| dir.join("logs"))
        .unwrap_or_else(|_| PathBuf::from("logs"));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    let file_appender = rolling::daily(&log_dir, LOG_FILE_NAME);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    #[cfg(debug_assertions)]
    {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(console_layer)
            .init();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();
    }

    tracing::info!("Log directory: {}", log_dir.display());
}

struct Args {
    draft_path: PathBuf,
    dry_run: bool,
}

fn parse_args() -> AppResult<Args> {
    let mut draft_path = None;
    let mut dry_run = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--dry-run" => dry_run = true,
            flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
            path if draft_path.is_none() => draft_path = Some(PathBuf::from(path)),
            extra => bail!("Unexpected argument: {}", extra),
        }
    }

    let Some(draft_path) = draft_path else {
        bail!("Usage: signup-wizard <draft.json> [--dry-run]");
    };

    Ok(Args { draft_path, dry_run })
}

fn load_draft(path: &Path) -> AppResult<RegistrationDraft> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read draft {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse draft {}", path.display()))
}

fn print_errors(session: &RegistrationSession) {
    for (field, message) in session.errors().iter() {
        println!("  ✗ {}: {}", field, message);
    }
}

/// Walk from the current step to the last one, stopping at the first
/// step that does not validate
fn walk_steps(session: &mut RegistrationSession, settle: Duration) -> AppResult<bool> {
    loop {
        session.settle_availability(settle);

        let step = session.current_step();
        let total = session.total_steps();
        let title = session
            .current_wizard_step()
            .map(|s| s.title())
            .unwrap_or("Unknown");

        match session.advance() {
            Ok(_) => println!("✓ Step {}/{}: {}", step, total, title),
            Err(WizardError::ValidationFailed { .. }) => {
                println!("✗ Step {}/{}: {}", step, total, title);
                print_errors(session);
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        }

        if step == total {
            return Ok(true);
        }
    }
}

fn print_payload(session: &RegistrationSession, config: &Config) -> AppResult<()> {
    let payload = build_payload(session.draft(), &config.default_country)?;
    let mut json = serde_json::to_value(&payload).context("Failed to serialize payload")?;
    if let Some(password) = json.get_mut("password") {
        *password = serde_json::Value::String(PASSWORD_MASK.to_string());
    }

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn run() -> AppResult<ExitCode> {
    let args = parse_args()?;

    let config = Config::load().context("Failed to load configuration")?;
    println!("✓ Configuration loaded");
    println!("  Backend: {}", config.api_base_url);
    println!("  Config file: {}\n", Config::config_path_display());

    let draft = load_draft(&args.draft_path)?;

    let api: Arc<dyn RegistrationApi> = Arc::new(HttpRegistrationApi::new(&config));
    let mut session = RegistrationSession::new(api, &config)
        .context("Failed to start availability worker")?;
    let (events, _id) = session.subscribe();

    session.replace_draft(draft)?;
    let Some(branch) = session.branch().filter(|b| b.is_ready()) else {
        println!("✗ Draft does not pick a complete branch (userType / lawyerMode / lawyerWorkMode)");
        return Ok(ExitCode::FAILURE);
    };
    println!("✓ Branch: {:?} ({} steps)\n", branch, session.total_steps());

    // Let the checks scheduled by loading the draft come due
    std::thread::sleep(config.debounce());
    let settle = config.request_timeout() + Duration::from_secs(1);
    if !walk_steps(&mut session, settle)? {
        return Ok(ExitCode::FAILURE);
    }

    if args.dry_run {
        println!("\nDry run, payload not sent:");
        print_payload(&session, &config)?;
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = session.submit()?;
    for event in events.try_iter().filter(Event::is_notice) {
        tracing::debug!(event = event.name(), "Notice");
    }

    match outcome {
        SubmissionOutcome::Registered => {
            println!("\n✓ Registration completed");
            Ok(ExitCode::SUCCESS)
        }
        SubmissionOutcome::Failed(failure) => {
            println!("\n✗ Registration failed: {}", failure);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn main() -> ExitCode {
    initialize_tracing();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("✗ {:#}", e);
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
