//! check-config command - validate and display the resolved configuration

use super::CommandContext;
use anyhow::Result;
use colored::Colorize;

pub fn execute(ctx: &CommandContext) -> Result<bool> {
    let config = &ctx.config;

    let checks = [
        ("directory", config.validate()),
        ("lookup", config.lookup.validate()),
        ("sync", config.sync.validate()),
    ];

    if ctx.is_json() {
        let mut redacted = config.clone();
        if !redacted.credentials.password.is_empty() {
            redacted.credentials.password = "***".to_string();
        }
        let errors: Vec<String> = checks
            .iter()
            .filter_map(|(section, r)| r.as_ref().err().map(|e| format!("{}: {}", section, e)))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "valid": errors.is_empty(),
                "errors": errors,
                "config": redacted,
            }))?
        );
        return Ok(errors.is_empty());
    }

    println!("{}", "Resolved configuration:".bold());
    println!();
    match config.directory.server_url() {
        Ok(url) => println!("  {}: {}", "Server".cyan(), url),
        Err(_) => println!("  {}: (not set)", "Server".cyan()),
    }
    println!("  {}: {:?}", "Bind format".cyan(), config.directory.bind_format);
    println!("  {}: {}", "Domain".cyan(), config.credentials.domain);
    println!("  {}: {}", "Username".cyan(), config.credentials.username);
    println!(
        "  {}: {}",
        "Password".cyan(),
        if config.credentials.password.is_empty() { "(not set)" } else { "***" }
    );
    println!("  {}: {}", "Lookup base".cyan(), config.lookup.base_dn);
    println!("  {}: {}", "Lookup filter".cyan(), config.lookup.filter);
    println!("  {}: {}", "Sync base".cyan(), config.sync.base_dn);
    println!("  {}: {}", "Sync filter".cyan(), config.sync.filter);
    println!(
        "  {}: region=OU[{}] org=OU[{}]",
        "OU layout".cyan(),
        config.sync.org_units.region_index,
        config.sync.org_units.org_index
    );
    println!();

    let mut valid = true;
    for (section, result) in &checks {
        match result {
            Ok(()) => println!("  {} {}", "✓".green(), section),
            Err(e) => {
                valid = false;
                println!("  {} {}: {}", "✗".red(), section, e);
            }
        }
    }

    Ok(valid)
}
