use super::*;

#[derive(Debug)]
pub(super) struct RunSummary {
    pub(super) path: PathBuf,
    pub(super) outcome: ReportOutcome,
}

pub(super) fn run_report<S: RepositorySource>(
    source: &S,
    output_dir: &Path,
    invocation: &Invocation,
) -> anyhow::Result<RunSummary> {
    let body = source
        .fetch_repositories(&invocation.project, &invocation.credentials)
        .context("call Azure DevOps list repos")?;
    let data = decode_repositories(&body).context("decode repos response")?;

    let path = report_path(output_dir, &invocation.project);
    let outcome =
        write_report(&data, &path).with_context(|| format!("write report {}", path.display()))?;
    match &outcome.end {
        TraversalEnd::Complete => {
            info!(path = %path.display(), rows = outcome.rows, "report written")
        }
        TraversalEnd::TrailingField { field } => info!(
            path = %path.display(),
            rows = outcome.rows,
            stopped_at = %field,
            "report written, stopped at end of repository data"
        ),
        TraversalEnd::NonRecordElement { field, index } => warn!(
            path = %path.display(),
            rows = outcome.rows,
            stopped_at = %format!("{field}[{index}]"),
            "report written, stopped at an element that is not a repository record"
        ),
    }
    Ok(RunSummary { path, outcome })
}
