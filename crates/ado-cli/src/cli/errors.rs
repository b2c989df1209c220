use super::*;

pub(super) fn user_message(err: &anyhow::Error, project: &str) -> String {
    if let Some(status) = err.downcast_ref::<FetchError>().and_then(FetchError::status)
        && let Some(message) = azdo_status_message(project, status)
    {
        return message;
    }
    format!("{err:#}")
}

pub(super) fn azdo_status_message(project: &str, status: StatusCode) -> Option<String> {
    match status {
        StatusCode::UNAUTHORIZED
        | StatusCode::FORBIDDEN
        | StatusCode::NON_AUTHORITATIVE_INFORMATION => Some(format!(
            "Azure DevOps authentication failed for project {project} (HTTP {status}). Check your user name and PAT.",
        )),
        StatusCode::NOT_FOUND => Some(format!(
            "Azure DevOps project not found: {project} (HTTP {status}). Check the project name and organization URL.",
        )),
        _ => None,
    }
}
