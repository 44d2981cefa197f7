use jarvis_doctor::cli::Cli;
use jarvis_doctor::config::DoctorConfig;
use jarvis_doctor::core::doctor::{run_checks, HttpCheck, IsahcProbeClient, StatusPolicy};
use jarvis_doctor::render::ReportRenderer;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let code = main_impl().await?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

async fn main_impl() -> Result<i32, Box<dyn std::error::Error>> {
    let cli = Cli::parse_args();

    // Handle configuration commands
    if cli.init {
        let path = DoctorConfig::init()?;
        println!("✓ Wrote default configuration to {}", path.display());
        return Ok(0);
    }

    let mut config = match &cli.config {
        Some(path) => DoctorConfig::load_from(path)?,
        None => DoctorConfig::load()?,
    };

    if cli.check {
        config.check()?;
        println!("✓ Configuration valid");
        return Ok(0);
    }

    config.apply_env_overrides();

    // CLI flags win over file and environment
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    if cli.require_success {
        config.status_policy = StatusPolicy::RequireSuccess;
    }
    if !cli.urls.is_empty() {
        config.checks = cli
            .urls
            .iter()
            .enumerate()
            .map(|(i, url)| HttpCheck::new(format!("url-{}", i + 1), url.clone()))
            .collect();
    }

    if config.checks.is_empty() {
        eprintln!("No checks configured. Pass --url or add [[checks]] to the config file.");
        return Ok(2);
    }

    let client = IsahcProbeClient::new()?;
    let report = run_checks(&config.checks, &config.probe_options(), &client).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", ReportRenderer::new().render_report(&report));
    }

    Ok(if report.ok { 0 } else { 1 })
}
