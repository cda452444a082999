//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use testhub_entity::folder::FolderTree;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => print_json(items),
    }
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    println!("{json}");
}

/// Print a folder forest as an indented outline
pub fn print_tree(nodes: &[FolderTree], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            println!("/");
            print_nodes(nodes, 1);
        }
        OutputFormat::Json => print_json(nodes),
    }
}

fn print_nodes(nodes: &[FolderTree], level: usize) {
    for node in nodes {
        let marker = match (node.is_archived, node.is_locked) {
            (true, _) => " [archived]",
            (false, true) => " [locked]",
            (false, false) => "",
        };
        println!(
            "{}├── {}/ ({} cases){}",
            "  ".repeat(level),
            node.name,
            node.testcase_count,
            marker
        );
        print_nodes(&node.children, level + 1);
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}
