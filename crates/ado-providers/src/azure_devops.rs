use crate::RepositorySource;
use crate::decode::strip_bom;
use crate::http::{FetchError, RetryPolicy, send_with_retry};
use ado_core::model::Credentials;
use anyhow::Context;
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use std::time::Duration;
use tracing::info;

pub const API_VERSION: &str = "6.1-preview.1";

pub struct AzureDevOpsClient {
    client: Client,
    org_url: Url,
    retry: RetryPolicy,
}

impl AzureDevOpsClient {
    pub fn new(org_url: &str, timeout: Duration, retry: RetryPolicy) -> anyhow::Result<Self> {
        let org_url = Url::parse(org_url)
            .with_context(|| format!("parse Azure DevOps organization url {org_url}"))?;
        if org_url.cannot_be_a_base() {
            anyhow::bail!("Azure DevOps organization url {org_url} cannot carry a project path");
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            client,
            org_url,
            retry,
        })
    }

    pub fn repos_url(&self, project: &str) -> Url {
        build_repos_url(&self.org_url, project)
    }
}

pub(crate) fn build_repos_url(org_url: &Url, project: &str) -> Url {
    let mut url = org_url.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments
            .pop_if_empty()
            .extend([project, "_apis", "git", "repositories"]);
    }
    url.query_pairs_mut()
        .clear()
        .append_pair("api-version", API_VERSION);
    url
}

impl RepositorySource for AzureDevOpsClient {
    fn fetch_repositories(
        &self,
        project: &str,
        credentials: &Credentials,
    ) -> Result<Vec<u8>, FetchError> {
        let url = self.repos_url(project);
        let target = url.to_string();
        info!(url = %target, project, "listing Azure DevOps repos");

        let response = send_with_retry(&target, &self.retry, || {
            self.client
                .get(url.clone())
                .basic_auth(&credentials.username, Some(&credentials.token))
        })?;

        // Azure DevOps answers an unauthenticated call with 203 and an HTML sign-in page.
        let status = response.status();
        if status == StatusCode::NON_AUTHORITATIVE_INFORMATION {
            return Err(FetchError::Status {
                url: target,
                status,
                detail: None,
            });
        }

        let body = response.bytes().map_err(|source| FetchError::Transport {
            url: target.clone(),
            source,
        })?;
        info!(
            url = %target,
            body = %String::from_utf8_lossy(strip_bom(&body)),
            "Azure DevOps list repos response"
        );
        Ok(body.to_vec())
    }
}
