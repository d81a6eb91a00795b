use crate::error::{Result, ResultExt};
use crate::ui;
use api_harness::config::ensure_config_file_exists;

pub fn execute(config_path: &str, force: bool) -> Result<()> {
    ui::section_header("API Harness Configuration Setup");

    let written = ensure_config_file_exists(config_path, force)
        .with_context(|| format!("Failed to create {}", config_path))?;

    if written {
        ui::success_message(&format!("Created {}", config_path));
        ui::info_message("Edit it to configure environments, services and suite commands");
    } else {
        ui::warning_message(&format!(
            "{} already exists; use --force to overwrite it",
            config_path
        ));
    }
    Ok(())
}
