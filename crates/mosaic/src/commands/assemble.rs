//! Component assembly command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use mosaic_static::{Assembler, Slot, SlotOutcome};

use super::config::ConfigFile;

/// Run the assemble command.
pub fn run(
    config: &ConfigFile,
    template: Option<PathBuf>,
    components: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut assemble = config.assemble_config();
    if let Some(template) = template {
        assemble.template = template;
    }
    if let Some(components) = components {
        assemble.components_dir = components;
    }
    if let Some(output) = output {
        assemble.output = output;
    }

    let report = Assembler::new(assemble)
        .run()
        .context("Component assembly failed")?;

    let unplaced: Vec<Slot> = report
        .outcomes
        .iter()
        .filter(|(_, outcome)| *outcome == SlotOutcome::NoMatch)
        .map(|(slot, _)| *slot)
        .collect();
    if !unplaced.is_empty() {
        tracing::warn!(
            "No placeholder found for: {}",
            unplaced
                .iter()
                .map(|s| s.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    tracing::info!(
        "Assembled {} of {} sections into {}",
        report.integrated(),
        Slot::ALL.len(),
        report.output_path.display()
    );

    Ok(())
}
