use super::*;
use std::ffi::OsString;
use time::OffsetDateTime;

const SUCCESS: u8 = 0;
const FAILURE: u8 = 1;

pub(super) fn run() -> ExitCode {
    ExitCode::from(run_from(std::env::args_os()))
}

pub(super) fn run_from<I, T>(args: I) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return parse_error_status(&err);
        }
    };

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            let log_file = cli.log_file.clone().or_else(|| default_log_path().ok());
            logging::init(log_file.as_deref());
            error!(error = ?err, "loading configuration failed");
            eprintln!("error: {err:#}");
            return FAILURE;
        }
    };
    let log_file = match config.log_file() {
        Ok(path) => Some(path),
        Err(err) => {
            eprintln!("warning: {err:#}");
            None
        }
    };
    logging::init(log_file.as_deref());

    let invocation = match Invocation::new(
        cli.project.clone(),
        cli.username.clone(),
        cli.token.clone(),
    ) {
        Ok(invocation) => invocation,
        Err(err) => {
            error!(error = %err, "invalid parameters");
            eprintln!("error: {err}");
            eprintln!("{}", Cli::command().render_usage());
            return FAILURE;
        }
    };

    info!(
        started = %timestamp(),
        os_user = %os_user(),
        project = %invocation.project,
        "starting ado-repos"
    );
    info!(parameters = %cli.masked_parameters(), "parameters");

    match execute(&config, &invocation) {
        Ok(summary) => {
            info!(
                ended = %timestamp(),
                path = %summary.path.display(),
                rows = summary.outcome.rows,
                "ado-repos completed successfully"
            );
            println!("{}", summary.path.display());
            SUCCESS
        }
        Err(err) => {
            error!(error = ?err, "execution failed");
            error!(ended = %timestamp(), "ado-repos completed unsuccessfully");
            eprintln!("error: {}", user_message(&err, &invocation.project));
            FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let path = cli.config_path()?;
    let mut config = AppConfig::load(&path)?;
    cli.apply_overrides(&mut config);
    Ok(config)
}

fn execute(config: &AppConfig, invocation: &Invocation) -> anyhow::Result<RunSummary> {
    let org_url = config.org_url()?;
    let client = AzureDevOpsClient::new(
        org_url,
        config.timeout(),
        RetryPolicy::new(config.retries, config.retry_delay()),
    )?;
    let output_dir = config.output_dir()?;
    info!(org_url, output_dir = %output_dir.display(), "resolved configuration");
    run_report(&client, &output_dir, invocation)
}

fn os_user() -> String {
    std::env::var("USERNAME")
        .or_else(|_| std::env::var("USER"))
        .unwrap_or_else(|_| "unknown".to_string())
}

fn timestamp() -> String {
    logging::format_timestamp(OffsetDateTime::now_utc())
}
