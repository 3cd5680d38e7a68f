use std::process::Command;

use anyhow::{Context, Result};

/// Each tier must compile without the ones above it.
const FEATURE_COMBINATIONS: &[&[&str]] = &[
    &[], // default
    &["foundation"],
    &["observability"],
    &["runtime"],
    &["platform"],
    &["runtime", "test-utils"],
    &["platform", "test-utils"],
];

/// Check that every `passage-common` tier compiles on its own.
pub fn test_feature_matrix() -> Result<()> {
    println!("Testing {} passage-common feature combinations...", FEATURE_COMBINATIONS.len());

    for (index, features) in FEATURE_COMBINATIONS.iter().enumerate() {
        let joined = features.join(",");
        let display_label = if features.is_empty() { "default".to_string() } else { joined.clone() };

        println!(
            "\n[{}/{}] cargo check -p passage-common --no-default-features{}",
            index + 1,
            FEATURE_COMBINATIONS.len(),
            if features.is_empty() { String::new() } else { format!(" --features {joined}") }
        );

        let mut command = Command::new("cargo");
        command.args(["check", "-p", "passage-common", "--no-default-features"]);
        if !features.is_empty() {
            command.arg("--features").arg(&joined);
        }

        let status = command
            .status()
            .with_context(|| format!("Failed to run cargo check for '{display_label}'"))?;

        if !status.success() {
            anyhow::bail!("Feature combination '{display_label}' failed to compile");
        }

        println!("✅ Features '{display_label}' compiled successfully");
    }

    println!("\n✅ All {} feature combinations compile successfully!", FEATURE_COMBINATIONS.len());

    Ok(())
}
