//! List command - show discovered test cases without provisioning

use crate::testing::{DiscoveryOptions, TestSuite};
use anyhow::Result;
use colored::*;
use std::path::PathBuf;

/// Arguments for the list command
pub struct ListArgs {
    /// Test root (defaults to current directory)
    pub dir: PathBuf,
    /// Output in JSON format
    pub json: bool,
}

impl Default for ListArgs {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            json: false,
        }
    }
}

/// Run the list command
pub fn run(args: ListArgs) -> Result<()> {
    let config = super::load_config(&args.dir)?;
    let suite = TestSuite::discover(&args.dir, &DiscoveryOptions::from_config(&config))?;

    if args.json {
        println!("{}", to_json(&suite));
        return Ok(());
    }

    if suite.is_empty() {
        println!("{}", "No test cases found.".yellow());
        return Ok(());
    }

    for case in &suite.cases {
        if case.has_prereq() {
            println!("{} {}", case.name, "(prereq)".dimmed());
        } else {
            println!("{}", case.name);
        }
    }
    println!();
    println!(
        "{} test case{}",
        suite.len().to_string().bold(),
        if suite.len() == 1 { "" } else { "s" }
    );

    Ok(())
}

fn to_json(suite: &TestSuite) -> serde_json::Value {
    let cases: Vec<_> = suite
        .cases
        .iter()
        .map(|c| {
            serde_json::json!({
                "name": c.name,
                "dir": c.dir.display().to_string(),
                "prereq": c.prereq.as_ref().map(|p| p.display().to_string()),
            })
        })
        .collect();

    serde_json::json!({
        "tests": suite.len(),
        "cases": cases,
    })
}
