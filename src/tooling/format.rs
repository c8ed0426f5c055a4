//! Text and JSON rendering for CLI output.

use crate::error::ApiError;
use crate::harness::{BenchmarkReport, Comparison, StrategyTiming};
use crate::tree::NodeKind;
use crate::types::NodeId;
use crate::vfs::{ConsistencyReport, Vfs, VfsStats};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Output format selected with `--format`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Result<Self, ApiError> {
        match value {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ApiError::InvalidArgument(format!(
                "Invalid format: {} (must be 'text' or 'json')",
                other
            ))),
        }
    }
}

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn kind_label(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::File(_) => "file",
        NodeKind::Directory(_) => "directory",
    }
}

/// Indented listing of the subtree at `from`, two spaces per level.
/// Directories carry a trailing `/`.
pub fn format_tree(vfs: &Vfs, from: NodeId) -> String {
    let mut out = String::new();
    for (depth, id) in vfs.walk(from) {
        let Some(node) = vfs.node(id) else {
            continue;
        };
        let label = if id == vfs.root() {
            crate::path::ROOT.to_string()
        } else if depth == 0 {
            vfs.find_virtual_path(id)
        } else {
            node.name().to_string()
        };
        out.push_str(&"  ".repeat(depth));
        out.push_str(&label);
        if node.is_directory() && id != vfs.root() {
            out.push('/');
        }
        out.push('\n');
    }
    out
}

/// One search hit, as rendered
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub path: String,
    pub kind: &'static str,
}

pub fn search_hits(vfs: &Vfs, ids: &[NodeId]) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = ids
        .iter()
        .filter_map(|id| {
            vfs.node(*id).map(|node| SearchHit {
                id: id.to_string(),
                path: vfs.find_virtual_path(*id),
                kind: kind_label(node.kind()),
            })
        })
        .collect();
    hits.sort_by(|a, b| a.path.cmp(&b.path));
    hits
}

pub fn format_search_hits(title: &str, hits: &[SearchHit]) -> String {
    let mut out = format!("{}\n\n", format_section_heading(title));
    if hits.is_empty() {
        out.push_str("No matches.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Path", "Kind", "Node"]);
    for hit in hits {
        table.add_row(vec![hit.path.clone(), hit.kind.to_string(), hit.id.clone()]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

pub fn format_suggestions(prefix: &str, suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        return format!("No names start with '{}'.", prefix);
    }
    suggestions.join("\n")
}

/// Details of one node, as rendered by `stat`
#[derive(Debug, Clone, Serialize)]
pub struct NodeDetails {
    pub id: String,
    pub path: String,
    pub kind: &'static str,
    pub size: u64,
    pub created_at: String,
    pub children: usize,
    pub physical_path: Option<String>,
}

pub fn node_details(vfs: &Vfs, id: NodeId) -> Result<NodeDetails, ApiError> {
    let node = vfs.node(id).ok_or(crate::error::VfsError::NodeNull)?;
    Ok(NodeDetails {
        id: id.to_string(),
        path: vfs.find_virtual_path(id),
        kind: kind_label(node.kind()),
        size: vfs.size(id)?,
        created_at: node.created_at().to_rfc3339(),
        children: node.children().len(),
        physical_path: node.physical_path().map(|p| p.display().to_string()),
    })
}

pub fn format_node_details(details: &NodeDetails) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.add_row(vec!["Path", details.path.as_str()]);
    table.add_row(vec!["Node", details.id.as_str()]);
    table.add_row(vec!["Kind", details.kind]);
    table.add_row(vec!["Size".to_string(), details.size.to_string()]);
    table.add_row(vec!["Created", details.created_at.as_str()]);
    if details.kind == "directory" {
        table.add_row(vec!["Children".to_string(), details.children.to_string()]);
    }
    if let Some(physical) = &details.physical_path {
        table.add_row(vec!["Physical path", physical.as_str()]);
    }
    table.to_string()
}

pub fn format_consistency_report(report: &ConsistencyReport) -> String {
    let mut out = format!("{}\n\n", format_section_heading("Consistency"));
    out.push_str(&format!("  Nodes checked: {}\n", report.nodes_checked));
    out.push_str(&format!("  Names checked: {}\n", report.names_checked));
    if report.is_consistent() {
        out.push_str("  Consistent: yes\n");
        return out;
    }
    out.push_str(&format!("  Consistent: no ({} problems)\n\n", report.problems.len()));
    for problem in &report.problems {
        out.push_str(&format!("  - {}\n", problem));
    }
    out
}

pub fn format_stats(stats: &VfsStats) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Directories".to_string(), stats.directories.to_string()]);
    table.add_row(vec!["Files".to_string(), stats.files.to_string()]);
    table.add_row(vec!["Distinct names".to_string(), stats.distinct_names.to_string()]);
    table.add_row(vec!["Index buckets".to_string(), stats.index_capacity.to_string()]);
    table.add_row(vec!["Total size".to_string(), stats.total_size.to_string()]);
    table.to_string()
}

fn timing_row(timing: &StrategyTiming) -> Vec<String> {
    let results = timing.samples.first().map(|s| s.results).unwrap_or(0);
    vec![
        format!("{:?}", timing.strategy).to_lowercase(),
        timing.calls().to_string(),
        timing.mean_ns().to_string(),
        timing.min_ns().to_string(),
        timing.max_ns().to_string(),
        results.to_string(),
    ]
}

pub fn format_comparison(comparison: &Comparison) -> String {
    let mut out = format!("{}\n\n", format_section_heading("Search comparison"));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Strategy", "Calls", "Mean ns", "Min ns", "Max ns", "Results"]);
    table.add_row(timing_row(&comparison.traversal));
    table.add_row(timing_row(&comparison.index));
    out.push_str(&format!("{}\n\n", table));

    match comparison.speedup() {
        Some(speedup) => out.push_str(&format!("  Index speedup: {:.1}x\n", speedup)),
        None => out.push_str("  Index speedup: n/a\n"),
    }
    if comparison.is_consistent() {
        out.push_str("  Strategies agree: yes\n");
    } else {
        out.push_str(&format!(
            "  Strategies agree: no ({})\n",
            comparison.mismatches.join(", ")
        ));
    }
    out
}

pub fn format_benchmark(report: &BenchmarkReport) -> String {
    let mut out = format!("{}\n\n", format_section_heading("Dataset"));
    out.push_str(&format!("  Seed: {}\n", report.seed));
    out.push_str(&format!("  Directories: {}\n", report.dataset.directories));
    out.push_str(&format!("  Files: {}\n", report.dataset.files));
    if report.dataset.failures > 0 {
        out.push_str(&format!("  Skipped files: {}\n", report.dataset.failures));
    }
    out.push_str(&format!("  Targets sampled: {}\n\n", report.comparison.targets.len()));
    out.push_str(&format_comparison(&report.comparison));
    out
}
