//! Development automation tasks for the Passage workspace.
//!
//! Run with: `cargo xtask <command>`
//!
//! This is a CLI tool for developers, so `println!` and `eprintln!` are
//! used for user-facing output rather than structured logging.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::env;
use std::process::{Command, ExitCode};

use anyhow::{anyhow, bail, Context};

mod features;

fn main() -> ExitCode {
    let task = env::args().nth(1);

    let result = match task.as_deref() {
        Some("ci") => run_ci(),
        Some("fmt") => run_fmt(),
        Some("clippy") => run_clippy(),
        Some("test") => run_test(),
        Some("deny") => run_cargo_tool("deny", &["check"]),
        Some("audit") => run_cargo_tool("audit", &[]),
        Some("test-features") => features::test_feature_matrix(),
        Some("help") | None => {
            print_help();
            Ok(())
        }
        Some(unknown) => {
            eprintln!("Unknown task: {unknown}");
            eprintln!();
            print_help();
            Err(anyhow!("Unknown task"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Task failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("Passage Development Tasks");
    println!();
    println!("USAGE:");
    println!("    cargo xtask <TASK>");
    println!();
    println!("TASKS:");
    println!("    ci             Run all CI checks (fmt, clippy, feature matrix, test)");
    println!("    fmt            Check Rust code formatting");
    println!("    clippy         Run Clippy lints");
    println!("    test           Run all tests");
    println!("    test-features  Verify the passage-common feature tiers compile on their own");
    println!("    deny           Check dependencies with cargo-deny");
    println!("    audit          Audit dependencies for security vulnerabilities");
    println!("    help           Show this help message");
}

/// Run all CI checks in sequence
fn run_ci() -> anyhow::Result<()> {
    println!("==> Running CI checks...\n");

    println!("==> Step 1/4: Checking Rust format...");
    run_fmt()?;

    println!("\n==> Step 2/4: Running Clippy...");
    run_clippy()?;

    println!("\n==> Step 3/4: Checking feature tiers...");
    features::test_feature_matrix()?;

    println!("\n==> Step 4/4: Running tests...");
    run_test()?;

    println!("\n✓ All CI checks passed!");
    Ok(())
}

fn cargo(args: &[&str]) -> anyhow::Result<bool> {
    let status = Command::new("cargo")
        .args(args)
        .status()
        .with_context(|| format!("Failed to run cargo {}", args.join(" ")))?;
    Ok(status.success())
}

/// Check Rust code formatting
fn run_fmt() -> anyhow::Result<()> {
    if !cargo(&["fmt", "--all", "--", "--check"])? {
        bail!("Format check failed. Run 'cargo fmt --all' to fix.");
    }
    Ok(())
}

/// Run Clippy lints
fn run_clippy() -> anyhow::Result<()> {
    if !cargo(&["clippy", "--workspace", "--all-targets", "--all-features"])? {
        bail!("Clippy run failed. See output above.");
    }
    Ok(())
}

/// Run all workspace tests
fn run_test() -> anyhow::Result<()> {
    if !cargo(&["test", "--workspace", "--all-features"])? {
        bail!("Tests failed");
    }
    Ok(())
}

/// Run an optional cargo subcommand such as `cargo deny`
fn run_cargo_tool(tool: &str, args: &[&str]) -> anyhow::Result<()> {
    let installed = Command::new("cargo")
        .args([tool, "--version"])
        .output()
        .is_ok_and(|o| o.status.success());

    if !installed {
        eprintln!("cargo-{tool} is not installed.");
        eprintln!("Install it with: cargo install cargo-{tool}");
        bail!("cargo-{tool} not found");
    }

    let mut full = vec![tool];
    full.extend_from_slice(args);
    if !cargo(&full)? {
        bail!("cargo-{tool} found issues");
    }
    Ok(())
}
