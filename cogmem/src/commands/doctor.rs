//! Diagnostics command.

use anyhow::Result;
use cogmem_core::triggers::TriggerMatcher;
use cogmem_core::{Config, MemoryClient, MemoryService};
use colored::Colorize;
use std::path::Path;

/// `config_found` is whether the config file existed before this run loaded
/// (and so created) it.
pub async fn execute(client: &MemoryClient, config: &Config, config_found: bool) -> Result<()> {
    println!("{}", "cogmem Doctor".cyan().bold());
    println!("{}", "─".repeat(50));
    println!();

    let mut issues = Vec::new();

    // Check config file
    println!("  Config file: {}", config_status(&Config::config_path(), config_found));

    print!("  API token: ");
    if config.api_token.is_some() {
        println!("{}", "✓ set".green());
    } else {
        println!("{}", "○ not set".yellow());
    }

    // Check keyword patterns
    print!("  Keyword patterns: ");
    let matcher = TriggerMatcher::from_patterns(&config.keyword_patterns);
    if matcher.len() == config.keyword_patterns.len() {
        println!("{}", format!("✓ {} compiled", matcher.len()).green());
    } else {
        let invalid = config.keyword_patterns.len() - matcher.len();
        println!("{}", format!("✗ {} invalid", invalid).red());
        issues.push(format!("{} keyword pattern(s) do not compile", invalid));
    }

    // Check ontology file
    if let Some(file) = &config.ontology.file {
        print!("  Ontology ({}): ", file.display());
        if file.exists() {
            println!("{}", "✓ exists".green());
        } else {
            println!("{}", "✗ not found".red());
            issues.push("Ontology file not found".to_string());
        }
    }

    // Check service
    print!("  Service ({}): ", client.base_url());
    if client.health_check().await {
        println!("{}", "✓ reachable".green());

        print!("  Datasets: ");
        match client.list_datasets().await {
            Ok(datasets) => {
                let has_dataset = datasets.iter().any(|d| d.name == config.dataset_name);
                println!("{}", format!("✓ {} found", datasets.len()).green());
                print!("  Dataset {}: ", config.dataset_name);
                if has_dataset {
                    println!("{}", "✓ exists".green());
                } else {
                    println!("{}", "○ created on first save".yellow());
                }
            }
            Err(e) => {
                println!("{}", format!("✗ {}", e).red());
                issues.push("Cannot list datasets (check the API token)".to_string());
            }
        }
    } else {
        println!("{}", "✗ unreachable".red());
        issues.push(format!(
            "Cognee service not reachable at {} - is it running?",
            client.base_url()
        ));
    }

    // Summary
    println!();
    if issues.is_empty() {
        println!("{}", "✓ All checks passed".green().bold());
    } else {
        println!("{}", format!("✗ {} issue(s) found:", issues.len()).red().bold());
        for issue in &issues {
            println!("  • {}", issue);
        }
    }

    Ok(())
}

fn config_status(path: &Path, found: bool) -> String {
    if found {
        format!("{} {}", "✓".green(), path.display())
    } else {
        format!(
            "{} {}",
            "○ not found, created with defaults at".yellow(),
            path.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_status_reports_missing_file() {
        let path = Path::new("/tmp/cogmem/config.json");
        let missing = config_status(path, false);
        assert!(missing.contains("not found"));
        assert!(missing.contains("/tmp/cogmem/config.json"));

        let present = config_status(path, true);
        assert!(!present.contains("not found"));
        assert!(present.contains("/tmp/cogmem/config.json"));
    }
}
