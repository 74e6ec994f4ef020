//! Schema command implementation.
//!
//! Prints the JSON Schema of `blockpack.config.json`, for editors and CI
//! validation of project files.

use crate::cli::SchemaArgs;
use crate::commands::utils;
use crate::config::{ProjectConfig, CONFIG_FILE};
use crate::emit::writer;
use crate::error::{Result, ResultExt};
use crate::ui;

/// Execute the schema command.
pub async fn execute(args: SchemaArgs) -> Result<()> {
    let schema = ProjectConfig::json_schema()
        .and_then(|schema| serde_json::to_string_pretty(&schema))
        .context(format!("Failed to generate the {CONFIG_FILE} schema"))?;

    match &args.out {
        Some(out) => {
            let path = utils::resolve_path(out, &utils::get_cwd()?);
            writer::write_file(&path, schema.as_bytes())?;
            ui::success(&format!("schema written to {}", path.display()));
        }
        None => println!("{schema}"),
    }

    Ok(())
}
