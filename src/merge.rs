//! Caller-side merge policies over a dispatch result.
//!
//! The dispatcher never merges; these helpers exist for callers that want one
//! flat list out of a multi-provider search.

use crate::dispatcher::DispatchResult;
use crate::types::ImageResult;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// Provider lists back to back, in the given provider order.
    #[default]
    Concatenate,
    /// One item from each provider in turn.
    RoundRobin,
    /// Concatenate, then stable-sort by quality tier, best first.
    QualityFirst,
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "concat" | "concatenate" => Ok(MergePolicy::Concatenate),
            "round-robin" | "roundrobin" => Ok(MergePolicy::RoundRobin),
            "quality" | "quality-first" => Ok(MergePolicy::QualityFirst),
            _ => Err(format!("Unknown merge policy: {}", s)),
        }
    }
}

/// Flatten `results` following `order` (ids missing from the map are skipped),
/// dropping later duplicates of the same `file_name`.
pub fn merge(results: &DispatchResult, order: &[String], policy: MergePolicy) -> Vec<ImageResult> {
    let lists: Vec<&[ImageResult]> = order
        .iter()
        .filter_map(|id| results.get(id))
        .filter_map(|outcome| outcome.result())
        .map(|result| result.list.as_slice())
        .collect();

    let merged: Vec<ImageResult> = match policy {
        MergePolicy::Concatenate => lists.iter().flat_map(|l| l.iter().cloned()).collect(),
        MergePolicy::RoundRobin => round_robin(&lists),
        MergePolicy::QualityFirst => {
            let mut all: Vec<ImageResult> =
                lists.iter().flat_map(|l| l.iter().cloned()).collect();
            all.sort_by(|a, b| b.quality.cmp(&a.quality));
            all
        }
    };

    let mut seen = HashSet::new();
    merged
        .into_iter()
        .filter(|image| seen.insert(image.file_name.clone()))
        .collect()
}

fn round_robin(lists: &[&[ImageResult]]) -> Vec<ImageResult> {
    let longest = lists.iter().map(|l| l.len()).max().unwrap_or(0);
    let mut merged = Vec::with_capacity(lists.iter().map(|l| l.len()).sum());
    for index in 0..longest {
        for list in lists {
            if let Some(image) = list.get(index) {
                merged.push(image.clone());
            }
        }
    }
    merged
}
