//! `check-config` command handler.

use std::path::Path;

use leadrelay_config::{ConfigLoader, ConfigValidator};

pub(crate) fn handle_check_config(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigLoader::load(path)?;
    let result = ConfigValidator::validate(&config);

    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }

    if !result.is_valid() {
        return Err(format!(
            "{} has {} error(s)",
            path.display(),
            result.errors.len()
        )
        .into());
    }

    println!(
        "{} is valid ({} mode, endpoint {})",
        path.display(),
        serde_json::to_string(&config.submission.channel_mode)?.trim_matches('"'),
        config.submission.endpoint
    );
    Ok(())
}
