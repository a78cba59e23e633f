use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::model::{AccidentDataset, Column};

// ---------------------------------------------------------------------------
// Grouped counts over a subset of rows
// ---------------------------------------------------------------------------
//
// Every function takes the dataset plus the indices produced by
// `filter::filtered_indices`, so the same code serves the filtered and the
// unfiltered views.

/// Accidents per year, ascending.  Rows with a null year are not counted.
pub fn counts_by_year(dataset: &AccidentDataset, indices: &[usize]) -> Vec<(i32, usize)> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for &i in indices {
        if let Some(year) = dataset.records[i].year {
            *counts.entry(year).or_default() += 1;
        }
    }
    counts.into_iter().collect()
}

/// Value counts of a categorical column, descending by count.
///
/// Ties keep the order in which values first appear in `indices`.  With
/// `top_n` set the result is truncated to that many entries.
pub fn ranked_counts(
    dataset: &AccidentDataset,
    indices: &[usize],
    column: Column,
    top_n: Option<usize>,
) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();

    for &i in indices {
        let Some(value) = dataset.records[i].categorical(column) else {
            continue;
        };
        match position.get(value) {
            Some(&p) => counts[p].1 += 1,
            None => {
                position.insert(value, counts.len());
                counts.push((value.to_string(), 1));
            }
        }
    }

    // `sort_by` is stable, so equal counts stay in first-seen order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    if let Some(n) = top_n {
        counts.truncate(n);
    }
    counts
}

/// Counts for every combination of two categorical columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossTab {
    /// Labels along the category axis, sorted.
    pub rows: Vec<String>,
    /// Labels of the stacked series, sorted.
    pub stacks: Vec<String>,
    /// `counts[row][stack]`; combinations never seen are zero.
    pub counts: Vec<Vec<usize>>,
}

impl CrossTab {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Cross tabulation of `row_column` × `stack_column`.  Rows where either
/// value is null are skipped.
pub fn cross_counts(
    dataset: &AccidentDataset,
    indices: &[usize],
    row_column: Column,
    stack_column: Column,
) -> CrossTab {
    let mut pairs: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    let mut row_labels: BTreeSet<&str> = BTreeSet::new();
    let mut stack_labels: BTreeSet<&str> = BTreeSet::new();

    for &i in indices {
        let record = &dataset.records[i];
        let (Some(r), Some(s)) = (
            record.categorical(row_column),
            record.categorical(stack_column),
        ) else {
            continue;
        };
        row_labels.insert(r);
        stack_labels.insert(s);
        *pairs.entry((r, s)).or_default() += 1;
    }

    let counts = row_labels
        .iter()
        .map(|r| {
            stack_labels
                .iter()
                .map(|s| pairs.get(&(*r, *s)).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    CrossTab {
        rows: row_labels.into_iter().map(str::to_string).collect(),
        stacks: stack_labels.into_iter().map(str::to_string).collect(),
        counts,
    }
}

pub fn total_fatal_injuries(dataset: &AccidentDataset, indices: &[usize]) -> u64 {
    indices
        .iter()
        .map(|&i| u64::from(dataset.records[i].total_fatal_injuries))
        .sum()
}
