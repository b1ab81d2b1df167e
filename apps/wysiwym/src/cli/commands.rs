//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::config::{load_schema, read_text};
use crate::error::AppError;
use crate::script::{self, DiscourseScript, EditScript, NodeReport, ReplayReport};
use serde::Serialize;
use std::path::Path;
use wysiwym_core::{
    Anchor, AnchorColour, AnchorMenus, ContentGraph, ContentValue, DateValue, Menu, Schema,
};

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_menu(title: &str, menu: &Menu) {
    if menu.names.is_empty() {
        return;
    }
    match &menu.submenu {
        Some(group) => println!("  {title} [{group}]:"),
        None => println!("  {title}:"),
    }
    for (name, label) in menu.names.iter().zip(&menu.labels) {
        println!("    {label} ({name})");
    }
}

fn print_menus(menus: &AnchorMenus) {
    print_menu("Compulsory", &menus.compulsory);
    for menu in &menus.optional {
        print_menu("Optional", menu);
    }
    let removable = &menus.removable;
    if !removable.names.is_empty() {
        println!("  Removable:");
        for ((name, label), values) in removable
            .names
            .iter()
            .zip(&removable.labels)
            .zip(&removable.values)
        {
            println!("    {label} ({name}): {}", values.join(", "));
        }
    }
}

fn colour_name(colour: AnchorColour) -> &'static str {
    match colour {
        AnchorColour::Red => "red",
        AnchorColour::Blue => "blue",
    }
}

fn print_node(node: &NodeReport) {
    let colour = node.anchor.as_ref().map_or("-", |a| colour_name(a.colour));
    println!(
        "{} {:<12} {:<24} {:<10} {}",
        node.id, node.class, node.label, node.realize_state, colour
    );
    if let Some(anchor) = &node.anchor {
        print_menus(anchor);
    }
}

// =============================================================================
// ANCHOR COMMAND
// =============================================================================

#[derive(Debug, Serialize)]
struct AnchorOutput<'a> {
    class: &'a str,
    menus: AnchorMenus,
}

/// Show the anchor of a new node of `class`.
pub fn cmd_anchor(schema_path: &Path, class: &str, json_mode: bool) -> Result<(), AppError> {
    let schema = load_schema(schema_path)?;
    let mut graph = ContentGraph::new();
    let node = graph.create_root(class, ContentValue::Resource)?;
    let menus = graph.refresh_anchor(node, &schema)?.menus();

    if json_mode {
        return print_json(&AnchorOutput { class, menus });
    }

    println!("Anchor of a new {class}");
    println!("==========================");
    println!("Colour: {}", colour_name(menus.colour));
    print_menus(&menus);
    Ok(())
}

// =============================================================================
// REPLAY COMMAND
// =============================================================================

/// Replay an edit script and print the resulting graph.
pub fn cmd_replay(
    schema_path: &Path,
    script_path: &Path,
    history_depth: usize,
    json_mode: bool,
) -> Result<(), AppError> {
    let schema = load_schema(schema_path)?;
    let script = EditScript::parse(&read_text(script_path)?)?;
    tracing::info!(steps = script.steps.len(), history_depth, "replaying edit script");
    let report = script::replay(script, &schema, history_depth)?;

    if json_mode {
        return print_json(&report);
    }
    print_replay(&report);
    Ok(())
}

fn print_replay(report: &ReplayReport) {
    println!("Edit Replay");
    println!("===========");
    for step in &report.steps {
        match &step.error {
            Some(error) => println!("  #{:<3} {:<12} refused: {error}", step.index, step.op),
            None => println!("  #{:<3} {:<12} ok", step.index, step.op),
        }
    }
    println!();
    println!(
        "Steps: {} ({} refused)   Undo: {}   Redo: {}",
        report.steps.len(),
        report.refused(),
        report.undo_depth,
        report.redo_depth
    );
    println!();
    println!("Nodes");
    println!("-----");
    for node in &report.nodes {
        print_node(node);
    }
    for branch in &report.branches {
        println!();
        println!(
            "Branch at step #{} ({:?} from {})",
            branch.step, branch.kind, branch.template
        );
        println!("-----");
        for node in &branch.nodes {
            print_node(node);
        }
    }
}

// =============================================================================
// REFER COMMAND
// =============================================================================

/// Resolve the mentions of a discourse script.
pub fn cmd_refer(script_path: &Path, json_mode: bool) -> Result<(), AppError> {
    let script = DiscourseScript::parse(&read_text(script_path)?)?;
    let sentences = script::resolve_discourse(&script)?;

    if json_mode {
        return print_json(&sentences);
    }

    println!("Referring Expressions");
    println!("=====================");
    for (index, sentence) in sentences.iter().enumerate() {
        let words: Vec<String> = sentence
            .mentions
            .iter()
            .map(|m| {
                if m.anchor {
                    format!("[{}]", m.text)
                } else {
                    m.text.clone()
                }
            })
            .collect();
        println!("  {}. {}", index + 1, words.join(" / "));
    }
    Ok(())
}

// =============================================================================
// DATE COMMAND
// =============================================================================

#[derive(Debug, Serialize)]
struct DateOutput {
    kind: Option<&'static str>,
    preposition: Option<&'static str>,
    text: Option<String>,
}

/// Classify a date and print its phrase.
pub fn cmd_date(date: DateValue, json_mode: bool) -> Result<(), AppError> {
    let date = date.validated()?;
    let kind = date.kind();
    let output = DateOutput {
        kind: kind.map(|k| k.as_str()),
        preposition: kind.map(|k| k.preposition()),
        text: date.describe(),
    };

    if json_mode {
        return print_json(&output);
    }

    println!("Kind: {}", output.kind.unwrap_or("none"));
    println!("Text: {}", output.text.as_deref().unwrap_or("-"));
    Ok(())
}

// =============================================================================
// SCHEMA COMMAND
// =============================================================================

#[derive(Debug, Serialize)]
struct ClassSummary {
    class: String,
    compulsory: Vec<String>,
    optional: Vec<String>,
}

fn summarize(schema: &Schema) -> Vec<ClassSummary> {
    let mut out = Vec::new();
    for class in schema.classes.keys() {
        let mut graph = ContentGraph::new();
        let anchor = graph
            .create_node(class.as_str(), ContentValue::Resource)
            .and_then(|node| Anchor::build(&graph, node, schema));
        let (compulsory, optional) = match anchor {
            Ok(anchor) => (
                anchor.compulsory_names().into_iter().map(str::to_string).collect(),
                anchor.optional_names().into_iter().map(str::to_string).collect(),
            ),
            Err(_) => (Vec::new(), Vec::new()),
        };
        out.push(ClassSummary {
            class: class.clone(),
            compulsory,
            optional,
        });
    }
    out
}

/// Validate the schema and list each class's initial menus.
pub fn cmd_schema(schema_path: &Path, json_mode: bool) -> Result<(), AppError> {
    let schema = load_schema(schema_path)?;
    let summary = summarize(&schema);

    if json_mode {
        return print_json(&summary);
    }

    println!("Schema: {}", schema_path.display());
    println!("=======");
    println!("Classes:    {}", schema.classes.len());
    println!("Properties: {}", schema.properties.len());
    println!();
    for class in &summary {
        println!("{}", class.class);
        println!("  compulsory: {}", class.compulsory.join(", "));
        println!("  optional:   {}", class.optional.join(", "));
    }
    Ok(())
}
