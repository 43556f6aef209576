//! SQL emission helpers.

use csvload_types::TargetType;

use crate::analyzer::InferredColumn;

/// Map inferred columns back to reader column-type assignments.
///
/// The result feeds directly into `CsvConfig::column_types`, so a second
/// pass over the same file delivers typed records.
#[must_use]
pub fn to_column_types(columns: &[InferredColumn]) -> Vec<(String, TargetType)> {
    columns
        .iter()
        .map(|column| (column.name.clone(), target_of(&column.sql_type)))
        .collect()
}

fn target_of(sql_type: &str) -> TargetType {
    let base = sql_type
        .split_once('(')
        .map(|(base, _)| base)
        .unwrap_or(sql_type);
    TargetType::parse(base).unwrap_or(TargetType::Text)
}

/// Emit a `CREATE TABLE` statement for the inferred columns.
///
/// Identifiers are bracket-quoted with `]` doubled, so a hostile column
/// name cannot break out of its identifier position.
#[must_use]
pub fn create_table_sql(columns: &[InferredColumn], table: &str, schema: &str) -> String {
    let mut sql = format!("CREATE TABLE {}.{} (\n", bracket(schema), bracket(table));
    let body: Vec<String> = columns
        .iter()
        .map(|column| {
            format!(
                "    {} {} {}",
                bracket(&column.name),
                column.sql_type,
                if column.is_nullable { "NULL" } else { "NOT NULL" }
            )
        })
        .collect();
    sql.push_str(&body.join(",\n"));
    sql.push_str("\n);");
    sql
}

fn bracket(identifier: &str) -> String {
    format!("[{}]", identifier.replace(']', "]]"))
}
