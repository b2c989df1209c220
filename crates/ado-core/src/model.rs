use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvocationError {
    #[error("parameter {field} is empty")]
    Empty { field: &'static str },
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &mask_secret(&self.token))
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub project: String,
    pub credentials: Credentials,
}

impl Invocation {
    pub fn new(project: String, username: String, token: String) -> Result<Self, InvocationError> {
        require("Azure DevOps project", &project)?;
        require("Azure DevOps user name", &username)?;
        require("Azure DevOps personal access token (PAT)", &token)?;
        Ok(Self {
            project,
            credentials: Credentials { username, token },
        })
    }
}

fn require(field: &'static str, value: &str) -> Result<(), InvocationError> {
    if value.trim().is_empty() {
        return Err(InvocationError::Empty { field });
    }
    Ok(())
}

pub fn mask_secret(secret: &str) -> &'static str {
    if secret.is_empty() { "" } else { "**********" }
}
