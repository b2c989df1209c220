pub mod azure_devops;
pub mod decode;
pub mod http;
#[cfg(test)]
mod stub_server;

use ado_core::model::Credentials;
use crate::http::FetchError;

pub trait RepositorySource {
    fn fetch_repositories(
        &self,
        project: &str,
        credentials: &Credentials,
    ) -> Result<Vec<u8>, FetchError>;
}
