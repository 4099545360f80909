use crate::model::{ComparisonRow, ReconSummary, RowStatus};

/// Input-side counts the rows alone cannot recover.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputCounts {
    pub left_records: usize,
    pub right_records: usize,
    pub left_excluded: usize,
    pub right_excluded: usize,
}

/// Compute summary counts from emitted rows.
pub fn compute_summary(rows: &[ComparisonRow], counts: InputCounts) -> ReconSummary {
    let mut matched = 0;
    let mut mismatched = 0;
    let mut left_only = 0;
    let mut right_only = 0;

    for r in rows {
        match r.status {
            RowStatus::Matched => matched += 1,
            RowStatus::Mismatched => mismatched += 1,
            RowStatus::LeftOnly => left_only += 1,
            RowStatus::RightOnly => right_only += 1,
        }
    }

    let left_emitted = matched + mismatched + left_only;
    let right_emitted = matched + mismatched + right_only;

    ReconSummary {
        left_records: counts.left_records,
        right_records: counts.right_records,
        left_excluded: counts.left_excluded,
        right_excluded: counts.right_excluded,
        left_duplicates_dropped: counts
            .left_records
            .saturating_sub(counts.left_excluded + left_emitted),
        right_duplicates_dropped: counts
            .right_records
            .saturating_sub(counts.right_excluded + right_emitted),
        total_rows: rows.len(),
        matched,
        mismatched,
        left_only,
        right_only,
    }
}
