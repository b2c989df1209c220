use crate::logging;
use ado_core::config::{AppConfig, default_config_path, default_log_path};
use ado_core::model::{Invocation, mask_secret};
use ado_core::paths::report_path;
use ado_core::report::{ReportOutcome, TraversalEnd, write_report};
use ado_providers::RepositorySource;
use ado_providers::azure_devops::AzureDevOpsClient;
use ado_providers::decode::decode_repositories;
use ado_providers::http::{FetchError, RetryPolicy};
use anyhow::Context;
use clap::{CommandFactory, Parser};
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

mod app;
mod args;
mod errors;
mod report_cmd;

use args::*;
use errors::user_message;
use report_cmd::{RunSummary, run_report};

pub fn run() -> ExitCode {
    app::run()
}
