//! This module prepares benchmark data for plotting
//!
//! Chart rendering itself is left to whichever plotting backend the report
//! generator prefers. What belongs here is the data wrangling that comes
//! right before: turning nested result mappings into families of (x, y)
//! curves, and handing out distinguishable line styles for backends that
//! draw in black and white (publications still love that).

use itertools::Itertools;
use std::collections::BTreeMap;


/// Line styles usable by black-and-white plotting themes
pub const LINE_STYLES: [&'static str; 4] = ["-", "--", "-.", ":"];

/// Point markers usable by black-and-white plotting themes
pub const LINE_MARKERS: [&'static str; 7] = ["", "x", "+", "o", "^", ".", ","];


/// Infinite iterator over all (line style, marker) combinations
///
/// Each style is exhausted with every marker before moving on to the next
/// style, and the whole sequence wraps around, so any number of curves can
/// be drawn with reasonably distinguishable looks.
///
pub struct LineStyles {
    /// Number of combinations handed out so far
    count: usize,
}
//
impl LineStyles {
    /// Start a fresh style sequence
    pub fn new() -> Self {
        Self { count: 0 }
    }
}
//
impl Iterator for LineStyles {
    /// Yields (line style, marker) pairs
    type Item = (&'static str, &'static str);

    fn next(&mut self) -> Option<Self::Item> {
        let style = LINE_STYLES[(self.count / LINE_MARKERS.len())
                                    % LINE_STYLES.len()];
        let marker = LINE_MARKERS[self.count % LINE_MARKERS.len()];
        self.count += 1;
        Some((style, marker))
    }
}


/// One plottable curve: parallel x and y sequences plus a legend label
#[derive(Clone, Debug, PartialEq)]
pub struct Curve<X> {
    /// Positions on the x axis, in ascending order
    pub xs: Vec<X>,

    /// One y value per x position
    pub ys: Vec<f64>,

    /// Legend label of the curve
    pub label: String,
}


/// Curves from a two-level "x -> (label -> y)" mapping
///
/// This is the shape that top-N profiling views naturally take: for each
/// x-axis position (say, a thread count) there is a mapping from symbol or
/// lock name to its measured weight. Each distinct label becomes one curve
/// across all x positions.
///
/// By default only the labels present at every x position are emitted,
/// which keeps a top-N-derived plot to the entries that stayed in the top N
/// throughout. With show_all set, every label that ever occurred is
/// emitted, with zeroes at the x positions where it was absent.
///
/// Curves are returned in label order.
///
pub fn curves_from_top_data<X>(data: &BTreeMap<X, BTreeMap<String, f64>>,
                               show_all: bool) -> Vec<Curve<X>>
    where X: Clone + Ord
{
    // The x axis is the sorted sequence of outer keys
    let xs: Vec<X> = data.keys().cloned().collect();

    // Establish which labels get a curve
    let mut labels: Vec<&String> = if show_all {
        data.values()
            .flat_map(|fields| fields.keys())
            .unique()
            .collect()
    } else {
        match data.values().next() {
            Some(first) => {
                first.keys()
                     .filter(|label| data.values()
                                         .all(|f| f.contains_key(*label)))
                     .collect()
            },
            None => Vec::new(),
        }
    };
    labels.sort();

    // Build one curve per label, zero-filling any holes
    labels.into_iter()
          .map(|label| {
              Curve {
                  xs: xs.clone(),
                  ys: data.values()
                          .map(|fields| fields.get(label)
                                              .cloned()
                                              .unwrap_or(0.0))
                          .collect(),
                  label: label.clone(),
              }
          })
          .collect()
}
