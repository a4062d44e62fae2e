// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Derivation of metadata the runner events don't carry: feature and rule
//! tags, `Examples`-row parameters, code references, test-case identifiers
//! and attribute conversion.
//!
//! Everything here works on raw feature-file text. The runner reports which
//! line a test case was expanded from, but not the tags above a rule or the
//! header of an `Examples` table, so those are recovered by scanning source
//! lines.

use std::{collections::BTreeSet, env, path::Path};

use derive_more::with_trait::{Display, Error};
use itertools::Itertools as _;

use crate::{
    client::{Attribute, Parameter},
    event::{FeatureChild, FeatureNode, PickleStep, RuleNode, StepArgument},
};

/// Prefix marking a tag line or token.
pub const TAG_PREFIX: &str = "@";

/// Separator between an attribute key and its value inside a tag.
pub const KEY_VALUE_SEPARATOR: &str = ":";

/// Tag prefix carrying an explicit test-case identifier.
pub const TEST_CASE_ID_PREFIX: &str = "@tc_id:";

/// Decorator wrapping doc-string content in step descriptions.
const DOCSTRING_DECORATOR: &str = "\n\"\"\"\n";

/// Failure of `Examples`-table parameter extraction.
#[derive(Debug, Display, Error)]
pub enum ExtractError {
    /// The test case line is not a `|`-delimited table row, so the test case
    /// is not an expanded outline example.
    #[display("line {line} is not an examples-table row")]
    NotExampleRow {
        /// 1-based line of the test case.
        line: usize,
    },

    /// No header row was found above the value row.
    #[display("no examples-table header found above line {line}")]
    HeaderMissing {
        /// 1-based line of the value row.
        line: usize,
    },

    /// Header and value rows disagree on cell count.
    #[display(
        "examples-table at line {line} has {names} header cells \
         but {values} value cells"
    )]
    CellCountMismatch {
        /// 1-based line of the value row.
        line: usize,

        /// Number of header cells.
        names: usize,

        /// Number of value cells.
        values: usize,
    },
}

/// Parses a feature source and returns all tags declared above the feature
/// line.
///
/// Lines are scanned from the top; every line starting with `@` contributes
/// its whitespace-split tokens, and scanning stops at the first line starting
/// with the feature keyword.
#[must_use]
pub fn feature_tags(feature: &FeatureNode) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();
    for line in feature.source.lines() {
        let bare = line.trim();
        if bare.starts_with(&feature.keyword) {
            break;
        }
        if bare.starts_with(TAG_PREFIX) {
            tags.extend(bare.split_whitespace().map(ToOwned::to_owned));
        }
    }
    tags
}

/// Parses a feature source and returns all tags declared between a rule and
/// its previous sibling (or the feature line, if the rule is the first
/// child).
#[must_use]
pub fn rule_tags(feature: &FeatureNode, rule: &RuleNode) -> BTreeSet<String> {
    let lower_bound = feature
        .children
        .iter()
        .map(FeatureChild::line)
        .filter(|&line| line < rule.line)
        .max()
        .unwrap_or(feature.line);

    let lines = feature.source.lines().collect::<Vec<_>>();
    let mut tags = BTreeSet::new();
    // Scan upward from the line right above the rule declaration.
    for index in (lower_bound..rule.line.saturating_sub(1)).rev() {
        let Some(line) = lines.get(index) else { continue };
        let bare = line.trim();
        if bare.starts_with(TAG_PREFIX) {
            tags.extend(bare.split_whitespace().map(ToOwned::to_owned));
        }
    }
    tags
}

/// Whether the given trimmed line is a `|`-delimited table row.
fn is_table_row(line: &str) -> bool {
    line.starts_with('|') && line.ends_with('|')
}

/// Splits a table row into trimmed, non-empty cells.
fn table_cells(row: &str) -> Vec<String> {
    row.split('|')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Extracts `(name, value)` parameters for a test case expanded from an
/// `Examples` table row at the given 1-based `line` of `source`.
///
/// The header row is located by walking upward from the value row: the first
/// non-blank, non-table line signals the header sits on the line immediately
/// below it.
pub fn example_parameters(
    source: &str,
    line: usize,
) -> Result<Vec<Parameter>, ExtractError> {
    let lines = source.lines().collect::<Vec<_>>();
    let value_row = line
        .checked_sub(1)
        .and_then(|i| lines.get(i))
        .map(|l| l.trim())
        .filter(|l| is_table_row(l))
        .ok_or(ExtractError::NotExampleRow { line })?;

    let header_index = find_header_row(&lines, line)
        .ok_or(ExtractError::HeaderMissing { line })?;
    let names = table_cells(lines[header_index].trim());
    let values = table_cells(value_row);

    if values.is_empty() || names.len() != values.len() {
        return Err(ExtractError::CellCountMismatch {
            line,
            names: names.len(),
            values: values.len(),
        });
    }
    Ok(names
        .into_iter()
        .zip(values)
        .map(|(name, value)| Parameter::new(name, value))
        .collect())
}

/// Finds the 0-based index of the header row of the table containing the
/// value row at 1-based `line`.
fn find_header_row(lines: &[&str], line: usize) -> Option<usize> {
    let mut candidate = line.checked_sub(2)?;
    for index in (0..=candidate).rev() {
        let row = lines.get(index)?.trim();
        if !row.is_empty() && !is_table_row(row) {
            return Some(candidate);
        }
        if !row.is_empty() {
            candidate = index;
        }
    }
    None
}

/// Builds the code reference of a test case.
///
/// Non-parameterized cases render as `<path>/[SCENARIO:<name>]`,
/// parameterized ones as `<path>/[EXAMPLE:<name>[k:v;…]]`.
#[must_use]
pub fn code_ref(
    uri: &str,
    name: &str,
    parameters: Option<&[Parameter]>,
) -> String {
    let path = relative_path(uri);
    match parameters {
        None => format!("{path}/[SCENARIO:{name}]"),
        Some(params) => {
            format!("{path}/[EXAMPLE:{name}{}]", format_parameters(params))
        }
    }
}

/// Strips the working-directory prefix (and a `file://` scheme) off a
/// feature URI.
#[must_use]
pub fn relative_path(uri: &str) -> String {
    let path = uri.strip_prefix("file://").unwrap_or(uri);
    env::current_dir()
        .ok()
        .and_then(|cwd| {
            Path::new(path).strip_prefix(&cwd).ok().map(Path::to_path_buf)
        })
        .map_or_else(|| path.to_owned(), |p| p.display().to_string())
}

/// Formats a parameter list for code references and test-case identifiers:
/// pairs sorted by key, rendered `key:value`, joined by `;` and wrapped in
/// brackets.
#[must_use]
pub fn format_parameters(parameters: &[Parameter]) -> String {
    let body = parameters
        .iter()
        .sorted_by(|a, b| (&a.key, &a.value).cmp(&(&b.key, &b.value)))
        .map(|p| format!("{}{KEY_VALUE_SEPARATOR}{}", p.key, p.value))
        .join(";");
    format!("[{body}]")
}

/// Resolves the test-case identifier of a scenario.
///
/// A tag with the `@tc_id:` prefix wins (suffixed with the formatted
/// parameter block when parameters exist); otherwise the code reference is
/// used.
#[must_use]
pub fn test_case_id(
    tags: &[String],
    uri: &str,
    name: &str,
    parameters: Option<&[Parameter]>,
) -> String {
    tags.iter()
        .find_map(|tag| tag.strip_prefix(TEST_CASE_ID_PREFIX))
        .map_or_else(
            || code_ref(uri, name, parameters),
            |id| match parameters {
                Some(params) if !params.is_empty() => {
                    format!("{id}{}", format_parameters(params))
                }
                _ => id.to_owned(),
            },
        )
}

/// Converts a tag into an attribute: the `@` prefix is stripped and a
/// `key:value` body splits into a keyed attribute, anything else stays a
/// value-only one.
#[must_use]
pub fn to_attribute(tag: &str) -> Attribute {
    let bare = tag.trim();
    let bare = bare.strip_prefix(TAG_PREFIX).unwrap_or(bare);
    match bare.split_once(KEY_VALUE_SEPARATOR) {
        Some((key, value)) => Attribute::key_value(key, value),
        None => Attribute::value(bare),
    }
}

/// Generates a name, prepending an optional prefix and an infix.
#[must_use]
pub fn build_name(prefix: Option<&str>, infix: &str, argument: &str) -> String {
    format!("{}{infix}{argument}", prefix.unwrap_or_default())
}

/// Renders a data table as a padded, `|`-delimited grid.
#[must_use]
pub fn format_data_table(cells: &[Vec<String>]) -> String {
    let columns = cells.iter().map(Vec::len).max().unwrap_or_default();
    let widths = (0..columns)
        .map(|col| {
            cells
                .iter()
                .filter_map(|row| row.get(col))
                .map(String::len)
                .max()
                .unwrap_or_default()
        })
        .collect::<Vec<_>>();

    cells
        .iter()
        .map(|row| {
            let body = widths
                .iter()
                .enumerate()
                .map(|(col, width)| {
                    format!(
                        "{:<width$}",
                        row.get(col).map_or("", String::as_str),
                    )
                })
                .join("|");
            format!("|{body}|")
        })
        .join("\n")
}

/// Renders the multiline argument of a step (doc-string or data table) for
/// use as a step description and an attached log line. Empty if the step
/// carries none.
#[must_use]
pub fn multiline_argument(step: &PickleStep) -> String {
    match &step.argument {
        Some(StepArgument::DataTable { cells }) => format_data_table(cells),
        Some(StepArgument::DocString { content }) => {
            format!("{DOCSTRING_DECORATOR}{content}{DOCSTRING_DECORATOR}")
        }
        None => String::new(),
    }
}
