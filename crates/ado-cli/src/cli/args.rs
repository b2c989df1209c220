use super::*;

#[derive(Parser)]
#[command(
    name = "ado-repos",
    author,
    version,
    about = "Write the Git repositories of an Azure DevOps project to a CSV report"
)]
pub(super) struct Cli {
    #[arg(value_name = "ProjectName", help = "Azure DevOps project name (Example: MyADOProject)")]
    pub(super) project: String,
    #[arg(value_name = "UserName", help = "Azure DevOps user name (Example: MyUserName)")]
    pub(super) username: String,
    #[arg(
        value_name = "PersonalAccessToken",
        help = "Azure DevOps personal access token (PAT)"
    )]
    pub(super) token: String,
    #[arg(long, help = "Path to the JSON config file")]
    pub(super) config: Option<PathBuf>,
    #[arg(long, help = "Organization URL, e.g. https://dev.azure.com/MyCompany")]
    pub(super) org_url: Option<String>,
    #[arg(long, help = "Directory the CSV report is written to")]
    pub(super) output_dir: Option<PathBuf>,
    #[arg(long, help = "Append log output to this file")]
    pub(super) log_file: Option<PathBuf>,
    #[arg(long, help = "Request timeout in seconds")]
    pub(super) timeout_secs: Option<u64>,
    #[arg(long, help = "Retries on connection failures and throttling")]
    pub(super) retries: Option<u32>,
}

impl Cli {
    pub(super) fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => default_config_path(),
        }
    }

    pub(super) fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(org_url) = &self.org_url {
            config.org_url = Some(org_url.clone());
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = Some(output_dir.clone());
        }
        if let Some(log_file) = &self.log_file {
            config.log_file = Some(log_file.clone());
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = timeout_secs;
        }
        if let Some(retries) = self.retries {
            config.retries = retries;
        }
    }

    pub(super) fn masked_parameters(&self) -> String {
        format!(
            "{} {} {}",
            self.project,
            self.username,
            mask_secret(&self.token)
        )
    }
}

pub(super) fn parse_error_status(err: &clap::Error) -> u8 {
    match err.kind() {
        clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}
