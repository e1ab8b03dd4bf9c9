//! auth command - verify the credential and show the account

use super::CommandContext;
use crate::output::{auth_json, outcome_label, profile_lines};
use anyhow::Result;
use colored::Colorize;
use dirsync_ldap::{AuthOutcome, Authenticator, Ldap3Connector};

/// Returns whether the credential was accepted
pub async fn execute(ctx: &CommandContext) -> Result<bool> {
    let config = &ctx.config;
    config.validate()?;
    config.lookup.validate()?;

    let authenticator = Authenticator::new(
        Ldap3Connector::new(config.directory.clone()),
        config.directory.bind_format,
        config.lookup.clone(),
    );

    let credential = config.credential();
    let outcome = authenticator.authenticate(&credential).await;

    if ctx.is_json() {
        println!("{}", auth_json(&credential.username, &outcome)?);
        return Ok(outcome.is_success());
    }

    match &outcome {
        AuthOutcome::Success(profiles) => {
            println!(
                "{} {} authenticated",
                "✓".green().bold(),
                credential.username.bold()
            );
            for profile in profiles {
                for line in profile_lines(profile) {
                    println!("  {}", line);
                }
            }
        }
        AuthOutcome::DirectoryError(e) | AuthOutcome::Failed(e) => {
            println!(
                "{} {} not authenticated: {}",
                "✗".red().bold(),
                credential.username.bold(),
                e
            );
        }
        other => {
            println!(
                "{} {} not authenticated: {}",
                "✗".red().bold(),
                credential.username.bold(),
                outcome_label(other).replace('_', " ")
            );
        }
    }

    Ok(outcome.is_success())
}
