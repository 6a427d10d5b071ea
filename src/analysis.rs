//! This module contains aggregation helpers for flat benchmark metrics
//!
//! The tool output parsers and the result tree both traffic in flat
//! mappings from metric name to numeric value. Before such data can be
//! reported or plotted it usually needs a round of massaging: averaging
//! repeated runs, ranking entries, truncating to the interesting few, or
//! filling in the holes of a sparse dataset. Those operations live here.
//!
//! Every helper is a pure function over in-memory data. Sorted maps are
//! used throughout so that all outputs are deterministically ordered.

use std::collections::BTreeMap;


/// Truth that every value of a sequence is zero
///
/// Locks which were never contended, counters which never fired and other
/// all-zero records are noise in a report, and get filtered out with this.
/// Works on anything that can be viewed as a sequence of numbers, including
/// mapping value views.
///
pub fn are_all_zeros<'a, I>(values: I) -> bool
    where I: IntoIterator<Item=&'a f64>
{
    values.into_iter().all(|&value| value == 0.0)
}

/// Per-field averages over a sequence of uniform samples
///
/// The input is a series of repeated measurements, each a mapping from
/// field name to value, as produced by running one parser over the output
/// of several benchmark repetitions. The field set of the first sample
/// determines which fields are averaged; every sample must carry at least
/// those fields, anything else is a caller contract violation and panics.
///
/// An empty input produces an empty mapping.
///
pub fn average_per_key(samples: &[BTreeMap<String, f64>])
                       -> BTreeMap<String, f64> {
    let mut averages = BTreeMap::new();
    if samples.is_empty() {
        return averages;
    }
    let count = samples.len() as f64;
    for field in samples[0].keys() {
        let total: f64 = samples.iter().map(|sample| sample[field]).sum();
        averages.insert(field.clone(), total / count);
    }
    averages
}

/// Per-key averages over a mapping of value series
///
/// This is the transposed form of average_per_key: one mapping from field
/// name to the series of values that field took across runs. An empty
/// series averages to NaN, like the mean of an empty array does in the
/// usual numeric packages.
///
pub fn average_of_series(series: &BTreeMap<String, Vec<f64>>)
                         -> BTreeMap<String, f64> {
    series.iter()
          .map(|(field, values)| {
              let total: f64 = values.iter().sum();
              (field.clone(), total / (values.len() as f64))
          })
          .collect()
}

/// View of a mapping as a list of (key, value) pairs, largest value first
///
/// Ties are broken by key order, so the result is deterministic.
///
pub fn sorted_by_value<K>(data: &BTreeMap<K, f64>) -> Vec<(&K, f64)>
    where K: Ord
{
    // BTreeMap iteration is already key-ordered, and the sort is stable,
    // which together give the tie-breaking guarantee
    let mut pairs: Vec<(&K, f64)> = data.iter()
                                        .map(|(key, &value)| (key, value))
                                        .collect();
    pairs.sort_by(|a, b| b.1.partial_cmp(&a.1)
                             .expect("Metrics should not be NaN"));
    pairs
}

/// Top-N view of a mapping: the n largest-valued entries
///
/// Reports and plots of quantities with a long tail (per-symbol profiling
/// hits, per-lock contention counts...) only show the heaviest entries,
/// which this extracts. Asking for more entries than the mapping holds
/// simply returns them all.
///
pub fn top_n<K>(data: &BTreeMap<K, f64>, n: usize) -> BTreeMap<K, f64>
    where K: Clone + Ord
{
    sorted_by_value(data).into_iter()
                         .take(n)
                         .map(|(key, value)| (key.clone(), value))
                         .collect()
}

/// Harmonization of the field sets of a two-level mapping
///
/// Plotting a family of curves requires every x position to have a y value
/// for every curve, but sparse benchmark data does not always oblige. This
/// gives every inner mapping the union of all inner field names, with
/// absent fields filled in as zero.
///
pub fn fill_missing_data<K>(data: &mut BTreeMap<K, BTreeMap<String, f64>>)
    where K: Ord
{
    // Take the union of all inner field names
    let mut all_fields = Vec::new();
    for fields in data.values() {
        for field in fields.keys() {
            if !all_fields.contains(field) {
                all_fields.push(field.clone());
            }
        }
    }

    // Backfill every inner mapping with the fields it is missing
    for fields in data.values_mut() {
        for field in &all_fields {
            fields.entry(field.clone()).or_insert(0.0);
        }
    }
}
