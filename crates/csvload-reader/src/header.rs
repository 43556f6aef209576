//! Header resolution.
//!
//! Runs once per reader: trims raw header fields, synthesizes names for
//! empty ones, applies the duplicate-name policy, then the include/exclude
//! filters, and assigns consecutive ordinals while remembering each column's
//! source slot. Duplicate resolution runs before filtering, so filters match
//! post-rename names.

use std::collections::{HashMap, HashSet};

use csvload_parse::Field;

use crate::column::Column;
use crate::config::{CsvConfig, DuplicateHeaderAction};
use crate::error::{Error, Result};
use crate::record::apply_trim;

/// Resolve columns from a split header line.
pub(crate) fn resolve_header(fields: &[Field], config: &CsvConfig) -> Result<Vec<Column>> {
    let names: Vec<String> = fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let trimmed = apply_trim(&field.value, field.was_quoted, config.trim);
            if trimmed.trim().is_empty() {
                format!("{}{}", config.default_header_name, i)
            } else {
                trimmed.to_string()
            }
        })
        .collect();
    let (names, dropped) = resolve_duplicates(names, config.duplicate_header_action)?;
    Ok(finalize_columns(names, dropped, config))
}

/// Materialize columns for a headerless stream from its first data row's
/// width.
pub(crate) fn columns_from_width(width: usize, config: &CsvConfig) -> Vec<Column> {
    let names: Vec<String> = (0..width)
        .map(|i| format!("{}{}", config.default_header_name, i))
        .collect();
    let dropped = vec![false; width];
    finalize_columns(names, dropped, config)
}

fn resolve_duplicates(
    mut names: Vec<String>,
    action: DuplicateHeaderAction,
) -> Result<(Vec<String>, Vec<bool>)> {
    let mut dropped = vec![false; names.len()];
    let lower: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();

    match action {
        DuplicateHeaderAction::Throw => {
            let mut seen = HashSet::new();
            for (i, key) in lower.iter().enumerate() {
                if !seen.insert(key.clone()) {
                    return Err(Error::DuplicateHeader(names[i].clone()));
                }
            }
        }
        DuplicateHeaderAction::Rename => {
            let mut taken: HashSet<String> = lower.iter().cloned().collect();
            let mut counts: HashMap<String, usize> = HashMap::new();
            for i in 0..names.len() {
                let occurrence = counts.entry(lower[i].clone()).or_insert(0);
                *occurrence += 1;
                if *occurrence >= 2 {
                    names[i] = synthesize(&names[i], *occurrence, &mut taken);
                }
            }
        }
        DuplicateHeaderAction::UseFirstOccurrence => {
            let mut seen = HashSet::new();
            for (i, key) in lower.iter().enumerate() {
                if !seen.insert(key.clone()) {
                    dropped[i] = true;
                }
            }
        }
        DuplicateHeaderAction::UseLastOccurrence => {
            let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
            for (i, key) in lower.iter().enumerate() {
                groups.entry(key).or_default().push(i);
            }
            let mut taken: HashSet<String> = lower.iter().cloned().collect();
            for i in 0..names.len() {
                let Some(group) = groups.get(lower[i].as_str()) else {
                    continue;
                };
                if group.len() < 2 || group.last().copied() == Some(i) {
                    continue;
                }
                let occurrence = group.iter().position(|&ix| ix == i).unwrap_or(0) + 1;
                names[i] = synthesize(&names[i], occurrence, &mut taken);
            }
        }
    }
    Ok((names, dropped))
}

/// Build `{base}_{k}`, bumping `k` until the name is unique, and claim it.
fn synthesize(base: &str, start: usize, taken: &mut HashSet<String>) -> String {
    let mut k = start;
    loop {
        let candidate = format!("{base}_{k}");
        let key = candidate.to_lowercase();
        if !taken.contains(&key) {
            taken.insert(key);
            return candidate;
        }
        k += 1;
    }
}

fn finalize_columns(names: Vec<String>, mut dropped: Vec<bool>, config: &CsvConfig) -> Vec<Column> {
    let include: Vec<String> = config
        .include_columns
        .iter()
        .map(|n| n.to_lowercase())
        .collect();
    let exclude: Vec<String> = config
        .exclude_columns
        .iter()
        .map(|n| n.to_lowercase())
        .collect();
    for (i, name) in names.iter().enumerate() {
        if dropped[i] {
            continue;
        }
        let key = name.to_lowercase();
        if !include.is_empty() && !include.contains(&key) {
            dropped[i] = true;
            continue;
        }
        if exclude.contains(&key) {
            dropped[i] = true;
        }
    }

    let mut columns = Vec::new();
    for (i, name) in names.into_iter().enumerate() {
        if dropped[i] {
            continue;
        }
        let mut column = Column::new(name, columns.len(), i);
        for (target_name, target_type) in &config.column_types {
            if target_name.eq_ignore_ascii_case(&column.name) {
                column.target_type = *target_type;
            }
        }
        for (default_name, value) in &config.column_defaults {
            if default_name.eq_ignore_ascii_case(&column.name) {
                column.default = Some(value.clone());
                column.use_default_for_null = true;
            }
        }
        if config.use_column_defaults && column.default.is_some() {
            column.use_default_for_null = true;
        }
        columns.push(column);
    }
    tracing::debug!(columns = columns.len(), "header resolved");
    columns
}
