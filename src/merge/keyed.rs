//! Row-keyed three-way CSV merge.
//!
//! Rows of the three inputs are aligned on a key column. For each key the
//! usual three-way rule applies: if both branches agree, take it; if only one
//! branch changed, take that branch; if both changed, merge field by field
//! with the same rule. A field changed differently on both sides is written
//! as `<<<<<<< {local} ======= {remote} >>>>>>>` and the merge is reported
//! as conflicted. A row deleted on one side and modified on the other is
//! kept with its key cell marked the same way, with `(deleted)` standing in
//! for the missing side.
//!
//! Columns are kept unless one branch removed a column the ancestor had.
//! Output columns follow the local branch, then remote-only additions.
//! Output rows follow the local branch; rows only the remote has are placed
//! after the row that precedes them remotely.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::QuoteStyle;
use crate::table::{self, Row};

use super::{MergeEngine, MergeError, MergeInputs, MergeOutcome};

pub const CONFLICT_START: &str = "<<<<<<< ";
pub const CONFLICT_SEPARATOR: &str = " ======= ";
pub const CONFLICT_END: &str = " >>>>>>>";
pub const DELETED_MARKER: &str = "(deleted)";

type Record = HashMap<String, String>;

fn conflict_cell(a: &str, b: &str) -> String {
    format!("{CONFLICT_START}{a}{CONFLICT_SEPARATOR}{b}{CONFLICT_END}")
}

/// A parsed input, rows indexed by key.
#[derive(Debug, Default)]
struct KeyedTable {
    header: Vec<String>,
    keys: Vec<String>,
    records: HashMap<String, Record>,
}

impl KeyedTable {
    fn load(path: &Path, key_column: &str) -> Result<Self, MergeError> {
        let rows = table::read_file(path).map_err(|source| MergeError::Input {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_rows(rows, key_column, path)
    }

    fn from_rows(rows: Vec<Row>, key_column: &str, path: &Path) -> Result<Self, MergeError> {
        let mut rows = rows
            .into_iter()
            .filter(|row| row.iter().any(|field| !field.is_empty()));

        let Some(header) = rows.next() else {
            return Ok(Self::default());
        };

        let key_index = header
            .iter()
            .position(|c| c == key_column)
            .ok_or_else(|| MergeError::MissingKeyColumn {
                key: key_column.to_string(),
                path: path.to_path_buf(),
            })?;

        let mut keys = Vec::new();
        let mut records = HashMap::new();

        for row in rows {
            let key = row.get(key_index).cloned().unwrap_or_default();
            let record: Record = header
                .iter()
                .enumerate()
                .map(|(i, column)| (column.clone(), row.get(i).cloned().unwrap_or_default()))
                .collect();

            if records.insert(key.clone(), record).is_some() {
                return Err(MergeError::DuplicateKey {
                    value: key,
                    path: path.to_path_buf(),
                });
            }
            keys.push(key);
        }

        Ok(Self {
            header,
            keys,
            records,
        })
    }

    fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(key)
    }
}

fn field<'a>(record: &'a Record, column: &str) -> &'a str {
    record.get(column).map_or("", String::as_str)
}

fn same(x: Option<&Record>, y: Option<&Record>, columns: &[String]) -> bool {
    match (x, y) {
        (None, None) => true,
        (Some(x), Some(y)) => columns.iter().all(|c| field(x, c) == field(y, c)),
        _ => false,
    }
}

/// Output columns given the ancestor and both branches' headers.
fn merge_columns(ancestor: &[String], a: &[String], b: &[String]) -> Vec<String> {
    let keep = |column: &String| {
        let in_a = a.contains(column);
        let in_b = b.contains(column);
        (in_a && in_b) || (!ancestor.contains(column) && (in_a || in_b))
    };

    let mut columns: Vec<String> = a.iter().filter(|c| keep(c)).cloned().collect();
    for column in b {
        if keep(column) && !columns.contains(column) {
            columns.push(column.clone());
        }
    }
    columns
}

/// Candidate key order: local order with remote-only keys spliced in.
fn merge_order(a_keys: &[String], b_keys: &[String]) -> Vec<String> {
    let mut order = a_keys.to_vec();
    let mut anchor: Option<usize> = None;

    for key in b_keys {
        if let Some(pos) = order.iter().position(|k| k == key) {
            anchor = Some(pos);
            continue;
        }
        let insert_at = anchor.map_or(0, |pos| pos + 1);
        order.insert(insert_at, key.clone());
        anchor = Some(insert_at);
    }

    order
}

/// Merge a single field.
fn merge_field(o: &str, a: &str, b: &str, conflicts: &mut usize) -> String {
    if a == b || b == o {
        a.to_string()
    } else if a == o {
        b.to_string()
    } else {
        *conflicts += 1;
        conflict_cell(a, b)
    }
}

/// Merge one keyed row. `None` means the row is gone from the result.
fn merge_record(
    key: &str,
    key_column: &str,
    o: Option<&Record>,
    a: Option<&Record>,
    b: Option<&Record>,
    columns: &[String],
    conflicts: &mut usize,
) -> Option<Record> {
    if same(a, b, columns) || same(o, b, columns) {
        return a.cloned();
    }
    if same(o, a, columns) {
        return b.cloned();
    }

    match (a, b) {
        (Some(a), Some(b)) => {
            let empty = Record::new();
            let o = o.unwrap_or(&empty);
            Some(
                columns
                    .iter()
                    .map(|c| {
                        let value = merge_field(field(o, c), field(a, c), field(b, c), conflicts);
                        (c.clone(), value)
                    })
                    .collect(),
            )
        }
        (Some(kept), None) => {
            *conflicts += 1;
            let mut record = kept.clone();
            record.insert(key_column.to_string(), conflict_cell(key, DELETED_MARKER));
            Some(record)
        }
        (None, Some(kept)) => {
            *conflicts += 1;
            let mut record = kept.clone();
            record.insert(key_column.to_string(), conflict_cell(DELETED_MARKER, key));
            Some(record)
        }
        (None, None) => None,
    }
}

/// Merge three already-parsed tables. Returns the output rows and the
/// number of conflicts.
fn merge_tables(
    o: &KeyedTable,
    a: &KeyedTable,
    b: &KeyedTable,
    key_column: &str,
) -> (Vec<Row>, usize) {
    let columns = merge_columns(&o.header, &a.header, &b.header);
    let mut conflicts = 0;
    let mut rows = Vec::new();

    if !columns.is_empty() {
        rows.push(columns.clone());
    }

    let mut emitted = HashSet::new();
    for key in merge_order(&a.keys, &b.keys) {
        if !emitted.insert(key.clone()) {
            continue;
        }
        let merged = merge_record(
            &key,
            key_column,
            o.get(&key),
            a.get(&key),
            b.get(&key),
            &columns,
            &mut conflicts,
        );
        if let Some(record) = merged {
            rows.push(columns.iter().map(|c| field(&record, c).to_string()).collect());
        } else {
            debug!(key, "row removed by merge");
        }
    }

    (rows, conflicts)
}

/// Row-keyed three-way CSV merge engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyedMerge;

impl KeyedMerge {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MergeEngine for KeyedMerge {
    fn merge(
        &self,
        inputs: MergeInputs<'_>,
        key_column: &str,
        quote_style: QuoteStyle,
        output: &Path,
    ) -> Result<MergeOutcome, MergeError> {
        let ancestor = KeyedTable::load(inputs.ancestor, key_column)?;
        let branch_a = KeyedTable::load(inputs.branch_a, key_column)?;
        let branch_b = KeyedTable::load(inputs.branch_b, key_column)?;

        let (rows, conflicts) = merge_tables(&ancestor, &branch_a, &branch_b, key_column);
        table::write_file(output, &rows, quote_style)?;

        info!(
            rows = rows.len().saturating_sub(1),
            conflicts, "merged on key '{key_column}'"
        );

        Ok(MergeOutcome {
            output: PathBuf::from(output),
            has_conflicts: conflicts > 0,
        })
    }
}
