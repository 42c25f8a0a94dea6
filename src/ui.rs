//! Terminal rendering for the CLI

use crate::scope::{BindReport, ScopeContextStore};
use crate::value::ValueRef;
use owo_colors::{OwoColorize, Style};
use std::sync::OnceLock;
use tabled::{settings::Style as TableStyle, Table, Tabled};

static PALETTE: OnceLock<Palette> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Palette {
    pub header: Style,
    pub success: Style,
    pub warn: Style,
    pub dim: Style,
}

impl Palette {
    fn detect() -> Self {
        if !console::Term::stdout().is_term() {
            return Self {
                header: Style::new(),
                success: Style::new(),
                warn: Style::new(),
                dim: Style::new(),
            };
        }
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            warn: Style::new().yellow().bold(),
            dim: Style::new().white().dimmed(),
        }
    }
}

pub fn palette() -> &'static Palette {
    PALETTE.get_or_init(Palette::detect)
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(palette().header.clone()));
}

pub fn success(label: &str) {
    println!("✅ {}", label.style(palette().success.clone()));
}

pub fn warn(label: &str) {
    eprintln!("⚠️  {}", label.style(palette().warn.clone()));
}

pub fn value_list(label: &str, values: &[ValueRef]) {
    let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
    println!("  {} {}", label.style(palette().dim.clone()), rendered.join(", "));
}

#[derive(Tabled)]
struct ScopeRow {
    #[tabled(rename = "Graph")]
    graph: String,
    #[tabled(rename = "Produced")]
    produced: String,
    #[tabled(rename = "Consumed")]
    consumed: String,
    #[tabled(rename = "Synthesized")]
    synthesized: String,
}

/// One row per scope record, sorted by graph name
pub fn scope_table(store: &ScopeContextStore) -> String {
    let rows: Vec<ScopeRow> = store
        .iter()
        .map(|(graph, record)| ScopeRow {
            graph: graph.to_string(),
            produced: join(record.produced().iter()),
            consumed: join(record.consumed().keys()),
            synthesized: join(record.synthesized().keys()),
        })
        .collect();
    if rows.is_empty() {
        return String::new();
    }
    Table::new(&rows).with(TableStyle::rounded()).to_string()
}

pub fn bind_summary(report: &BindReport) {
    for binding in &report.outer_scope {
        println!("  🔗 {} ← {}", binding.graph, binding.value.style(palette().dim.clone()));
    }
    for name in &report.synthesized {
        println!("  ✨ added top-level input {}", name.style(palette().success.clone()));
    }
    for diagnostic in &report.diagnostics {
        warn(&diagnostic.to_string());
    }
}

fn join<'s>(names: impl Iterator<Item = &'s String>) -> String {
    let names: Vec<&str> = names.map(String::as_str).collect();
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}
