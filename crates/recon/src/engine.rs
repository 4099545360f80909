use std::collections::HashSet;

use tracing::{debug, warn};

use crate::classify::compare_fields;
use crate::config::{DuplicatePolicy, ReconConfig, ReconOptions};
use crate::error::ReconError;
use crate::evidence::{compute_summary, InputCounts};
use crate::key::{KeySpec, MatchKey};
use crate::matcher::{dedup_last_wins, index_last_wins, Keyed};
use crate::model::{
    ComparisonResult, ComparisonRow, FieldMapping, ReconInput, ReconMeta, ReconReport, Side,
};
use crate::record::{records_from_json, Record};

/// Run reconciliation per config. Returns rows + summary + run metadata.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ReconReport, ReconError> {
    config.validate()?;

    let result = reconcile(
        &input.left,
        &input.right,
        &config.left.key,
        &config.right.key,
        &config.fields,
        &config.options(),
    )?;

    Ok(ReconReport {
        meta: ReconMeta {
            config_name: config.name.clone(),
            left_label: config.left.label.clone(),
            right_label: config.right.label.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary: result.summary,
        duplicates: result.duplicates,
        rows: result.rows,
    })
}

/// Same as [`run`], for untyped JSON record arrays.
pub fn run_json(
    config: &ReconConfig,
    left: &serde_json::Value,
    right: &serde_json::Value,
) -> Result<ReconReport, ReconError> {
    let input = ReconInput {
        left: records_from_json(Side::Left, left)?,
        right: records_from_json(Side::Right, right)?,
    };
    run(config, &input)
}

/// Reconcile two record sequences.
///
/// 1. drop left non-data rows (and right ones when `right_filter` says so)
/// 2. dedup left by key, last record wins
/// 3. index right by key, last record wins
/// 4. one row per unique left record, matched against the index
/// 5. right records whose key was never consumed, in input order
///
/// All-or-nothing: malformed input or configuration fails before any row is built.
pub fn reconcile(
    left: &[Record],
    right: &[Record],
    left_key: &KeySpec,
    right_key: &KeySpec,
    mappings: &[FieldMapping],
    options: &ReconOptions,
) -> Result<ComparisonResult, ReconError> {
    left_key.validate("left")?;
    right_key.validate("right")?;
    validate_mappings(mappings)?;
    validate_records(Side::Left, left)?;
    validate_records(Side::Right, right)?;

    let left_keyed = keyed_rows(left, left_key, |r| options.left_filter.is_data_row(r, left_key));
    let right_keyed = keyed_rows(right, right_key, |r| {
        options.right_filter.is_data_row(r, right_key)
    });
    let counts = InputCounts {
        left_records: left.len(),
        right_records: right.len(),
        left_excluded: left.len() - left_keyed.len(),
        right_excluded: right.len() - right_keyed.len(),
    };
    debug!(
        left = left.len(),
        right = right.len(),
        left_excluded = counts.left_excluded,
        right_excluded = counts.right_excluded,
        "filtered non-data rows"
    );

    let (unique_left, left_dups) = dedup_last_wins(Side::Left, &left_keyed);
    let (right_index, right_dups) = index_last_wins(Side::Right, &right_keyed);

    if options.right_duplicates == DuplicatePolicy::Reject && !right_dups.is_empty() {
        return Err(ReconError::DuplicateKeys(right_dups));
    }
    for dup in left_dups.iter().chain(&right_dups) {
        warn!(
            side = %dup.side,
            key = %dup.key,
            count = dup.count,
            kept = dup.kept_index,
            "duplicate key, keeping last record"
        );
    }

    let mut rows = Vec::with_capacity(unique_left.len() + right_keyed.len());
    let mut consumed: HashSet<&MatchKey> = HashSet::new();

    for entry in &unique_left {
        let left_rec = &left[entry.index];
        match right_index.get_key_value(&entry.key) {
            Some((right_key_ref, &ri)) => {
                consumed.insert(right_key_ref);
                let right_rec = &right[ri];
                let diffs = compare_fields(left_rec, right_rec, mappings);
                rows.push(ComparisonRow::paired(
                    entry.key.clone(),
                    left_rec.clone(),
                    right_rec.clone(),
                    diffs,
                ));
            }
            None => rows.push(ComparisonRow::left_only(entry.key.clone(), left_rec.clone())),
        }
    }
    debug!(unique_left = unique_left.len(), consumed = consumed.len(), "match pass done");

    let carry = options.right_duplicates == DuplicatePolicy::CarryForward;
    for entry in &right_keyed {
        let emit = if consumed.contains(&entry.key) {
            carry && right_index.get(&entry.key) != Some(&entry.index)
        } else {
            true
        };
        if emit {
            rows.push(ComparisonRow::right_only(entry.key.clone(), right[entry.index].clone()));
        }
    }

    let summary = compute_summary(&rows, counts);
    debug!(
        rows = summary.total_rows,
        matched = summary.matched,
        mismatched = summary.mismatched,
        left_only = summary.left_only,
        right_only = summary.right_only,
        "reconciliation complete"
    );

    let mut duplicates = left_dups;
    duplicates.extend(right_dups);

    Ok(ComparisonResult {
        rows,
        duplicates,
        summary,
    })
}

fn keyed_rows<F>(records: &[Record], spec: &KeySpec, is_data: F) -> Vec<Keyed>
where
    F: Fn(&Record) -> bool,
{
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| is_data(r))
        .map(|(index, r)| Keyed {
            index,
            key: spec.key(r),
        })
        .collect()
}

fn validate_mappings(mappings: &[FieldMapping]) -> Result<(), ReconError> {
    for (i, m) in mappings.iter().enumerate() {
        if m.left.trim().is_empty() || m.right.trim().is_empty() {
            return Err(ReconError::Configuration(format!(
                "field mapping #{i} has a blank column name ({:?} / {:?})",
                m.left, m.right
            )));
        }
    }
    Ok(())
}

fn validate_records(side: Side, records: &[Record]) -> Result<(), ReconError> {
    for (index, record) in records.iter().enumerate() {
        if let Some(column) = record.repeated_column() {
            return Err(ReconError::InvalidInput {
                side,
                index,
                reason: format!("column {column:?} appears more than once"),
            });
        }
    }
    Ok(())
}
