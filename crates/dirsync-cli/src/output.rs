//! Console rendering of directory records

use crate::OutputFormat;
use async_trait::async_trait;
use serde::Serialize;
use dirsync_core::types::{AccountProfile, User};
use dirsync_core::Result;
use dirsync_ldap::{AuthOutcome, UserSink};

const NOT_SET: &str = "(not set)";

/// Attribute lines printed for a looked-up account
pub fn profile_lines(profile: &AccountProfile) -> Vec<String> {
    let value = |v: &Option<String>| v.clone().unwrap_or_else(|| NOT_SET.to_string());

    vec![
        format!("distinguishedName: {}", value(&profile.distinguished_name)),
        format!("mail: {}", value(&profile.mail)),
        format!("displayName: {}", value(&profile.display_name)),
        format!("title: {}", value(&profile.title)),
    ]
}

/// One-line summary of a synchronized user
pub fn user_line(user: &User) -> String {
    format!(
        "Account: {}, Name: {}, Email: {}, Org: {}, Title: {}, Region: {}",
        user.id,
        user.display_name.as_deref().unwrap_or(NOT_SET),
        user.email.as_deref().unwrap_or(NOT_SET),
        user.org,
        user.job_title.as_deref().unwrap_or(NOT_SET),
        user.region,
    )
}

pub fn outcome_label(outcome: &AuthOutcome) -> &'static str {
    match outcome {
        AuthOutcome::Success(_) => "success",
        AuthOutcome::InvalidCredentials => "invalid_credentials",
        AuthOutcome::AccountDisabled => "account_disabled",
        AuthOutcome::DirectoryError(_) => "directory_error",
        AuthOutcome::Failed(_) => "failed",
    }
}

#[derive(Serialize)]
struct AuthResult<'a> {
    username: &'a str,
    authenticated: bool,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    profiles: &'a [AccountProfile],
}

/// Authentication result as a single JSON line, matching the sync records
pub fn auth_json(username: &str, outcome: &AuthOutcome) -> serde_json::Result<String> {
    let error = match outcome {
        AuthOutcome::DirectoryError(e) | AuthOutcome::Failed(e) => Some(e.as_str()),
        _ => None,
    };

    serde_json::to_string(&AuthResult {
        username,
        authenticated: outcome.is_success(),
        outcome: outcome_label(outcome),
        error,
        profiles: outcome.profiles(),
    })
}

/// Prints every synchronized user to stdout, as text or JSON lines
pub struct ConsoleSink {
    format: OutputFormat,
    printed: usize,
}

impl ConsoleSink {
    pub fn new(format: OutputFormat) -> Self {
        Self { format, printed: 0 }
    }

    fn render(&self, user: &User) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(user_line(user)),
            OutputFormat::Json => {
                serde_json::to_string(user).map_err(|e| dirsync_core::Error::Other(e.into()))
            }
        }
    }
}

#[async_trait]
impl UserSink for ConsoleSink {
    async fn accept(&mut self, user: &User) -> Result<()> {
        println!("{}", self.render(user)?);
        self.printed += 1;
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        tracing::debug!("Printed {} users", self.printed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "alice".to_string(),
            display_name: Some("Alice Chen".to_string()),
            email: None,
            org: "Sales".to_string(),
            job_title: Some("Engineer".to_string()),
            region: "Taipei".to_string(),
        }
    }

    #[test]
    fn test_profile_lines() {
        let profile = AccountProfile {
            distinguished_name: Some("CN=Alice,OU=Taipei,DC=corp".to_string()),
            mail: Some("alice@corp.com".to_string()),
            display_name: None,
            title: None,
        };

        let lines = profile_lines(&profile);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "distinguishedName: CN=Alice,OU=Taipei,DC=corp");
        assert_eq!(lines[1], "mail: alice@corp.com");
        assert_eq!(lines[2], "displayName: (not set)");
    }

    #[test]
    fn test_user_line() {
        assert_eq!(
            user_line(&user()),
            "Account: alice, Name: Alice Chen, Email: (not set), Org: Sales, Title: Engineer, Region: Taipei"
        );
    }

    #[test]
    fn test_json_render() {
        let sink = ConsoleSink::new(OutputFormat::Json);
        let json: serde_json::Value = serde_json::from_str(&sink.render(&user()).unwrap()).unwrap();
        assert_eq!(json["id"], "alice");
        assert_eq!(json["region"], "Taipei");
        assert!(json["email"].is_null());
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(outcome_label(&AuthOutcome::Success(vec![])), "success");
        assert_eq!(
            outcome_label(&AuthOutcome::InvalidCredentials),
            "invalid_credentials"
        );
    }

    #[test]
    fn test_auth_json_is_one_line() {
        let outcome = AuthOutcome::Success(vec![AccountProfile {
            distinguished_name: Some("CN=Alice,OU=Taipei,DC=corp".to_string()),
            mail: Some("alice@corp.com".to_string()),
            display_name: None,
            title: None,
        }]);

        let line = auth_json("alice", &outcome).unwrap();
        assert!(!line.contains('\n'));

        let json: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(json["authenticated"], true);
        assert_eq!(json["outcome"], "success");
        assert_eq!(json["profiles"][0]["mail"], "alice@corp.com");
        assert!(json.get("error").is_none());

        let failed = auth_json("alice", &AuthOutcome::DirectoryError("timeout".into())).unwrap();
        assert!(!failed.contains('\n'));
        assert!(failed.contains("\"error\":\"timeout\""));
    }
}
