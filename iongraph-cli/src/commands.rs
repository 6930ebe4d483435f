// CLI command handlers
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use iongraph_core::{LayoutConfig, LayoutPipeline, Pass};

pub fn layout_pass(input: &Path, output: Option<&Path>, pretty: bool) -> Result<()> {
    println!("Reading pass file: {}", input.display());

    let data = fs::read_to_string(input)
        .with_context(|| format!("Failed to read pass file: {}", input.display()))?;

    let pass: Pass = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse pass file: {}", input.display()))?;

    println!(
        "Pass parsed: {} mir blocks, {} lir blocks",
        pass.mir.blocks.len(),
        pass.lir.blocks.len()
    );

    let config = LayoutConfig::default();
    let (layout, stats) = LayoutPipeline::run(&pass, &config).context("Layout failed")?;

    println!("Layout complete");
    println!("  mir: {} layers, {} dummy nodes", stats.mir_layers, stats.mir_dummy_nodes);
    println!("  lir: {} layers, {} dummy nodes", stats.lir_layers, stats.lir_dummy_nodes);

    let output = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| default_output_path(input));

    let body = if pretty {
        serde_json::to_string_pretty(&layout.mir).context("Failed to serialize mir layout")?
    } else {
        serde_json::to_string(&layout.mir).context("Failed to serialize mir layout")?
    };
    fs::write(&output, body)
        .with_context(|| format!("Failed to write layout to: {}", output.display()))?;

    println!("mir layout written to: {}", output.display());
    Ok(())
}

pub fn stats_pass(input: &Path) -> Result<()> {
    let data = fs::read_to_string(input)
        .with_context(|| format!("Failed to read pass file: {}", input.display()))?;

    let pass: Pass = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse pass file: {}", input.display()))?;

    let config = LayoutConfig::default();
    let (_layout, stats) = LayoutPipeline::run(&pass, &config).context("Layout failed")?;

    let json = serde_json::to_string_pretty(&stats).context("Failed to serialize stats")?;
    println!("{json}");
    Ok(())
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("pass");
    PathBuf::from(format!("{stem}.layout.json"))
}
