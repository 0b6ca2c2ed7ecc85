//! Roadmap construction from ranked search results.
//!
//! Consumes the `{...fields, similarity_score}` sequence the search service
//! guarantees, in ranking order, and partitions it into ordered learning
//! steps. Records carrying a `level` (or `difficulty`) field are grouped by
//! it, easiest first; bare records fall back to positional chunks.

pub mod fishbone;

use serde::Serialize;

use crate::search::SearchResult;

/// One step of a learning roadmap: a label and the resources to work
/// through, strongest matches first.
#[derive(Debug, Clone, Serialize)]
pub struct RoadmapStep {
    pub step: usize,
    pub label: String,
    pub resources: Vec<SearchResult>,
}

/// Positional labels used when records carry no level metadata.
const STAGE_LABELS: [&str; 5] = [
    "Foundations",
    "Core concepts",
    "Applied practice",
    "Deep dives",
    "Mastery",
];

/// Known level names, easiest first. Grouping follows this order so a
/// roadmap always progresses from introductory to advanced material.
const LEVEL_ORDER: [&str; 4] = ["beginner", "intermediate", "advanced", "expert"];

/// Build at most `max_steps` ordered steps from ranked results.
///
/// Every input resource appears in exactly one step; within a step the
/// ranking order is preserved. Empty input or `max_steps == 0` yields an
/// empty roadmap.
pub fn build_roadmap(results: &[SearchResult], max_steps: usize) -> Vec<RoadmapStep> {
    if results.is_empty() || max_steps == 0 {
        return Vec::new();
    }

    if results.iter().any(|r| level_rank(r).is_some()) {
        by_level(results, max_steps)
    } else {
        by_position(results, max_steps)
    }
}

/// Group by declared level, easiest first. Unleveled records keep their
/// ranking slot at the end. Overflow beyond `max_steps` merges into the
/// last step so nothing is dropped.
fn by_level(results: &[SearchResult], max_steps: usize) -> Vec<RoadmapStep> {
    let mut groups: Vec<(String, Vec<SearchResult>)> = Vec::new();
    let mut sorted: Vec<&SearchResult> = results.iter().collect();
    sorted.sort_by_key(|r| level_rank(r).unwrap_or(LEVEL_ORDER.len()));

    for result in sorted {
        let label = level_label(result).unwrap_or_else(|| "Further study".to_string());
        match groups.last_mut() {
            Some((last, resources)) if *last == label => resources.push(result.clone()),
            _ => groups.push((label, vec![result.clone()])),
        }
    }

    while groups.len() > max_steps {
        let (_, overflow) = groups.pop().unwrap_or_default();
        if let Some((_, resources)) = groups.last_mut() {
            resources.extend(overflow);
        }
    }

    groups
        .into_iter()
        .enumerate()
        .map(|(i, (label, resources))| RoadmapStep {
            step: i + 1,
            label,
            resources,
        })
        .collect()
}

/// Evenly chunk ranked results into at most `max_steps` contiguous steps.
fn by_position(results: &[SearchResult], max_steps: usize) -> Vec<RoadmapStep> {
    let steps = max_steps.min(results.len());
    let chunk = results.len().div_ceil(steps);

    results
        .chunks(chunk)
        .enumerate()
        .map(|(i, resources)| RoadmapStep {
            step: i + 1,
            label: STAGE_LABELS
                .get(i)
                .map_or_else(|| format!("Stage {}", i + 1), |label| (*label).to_string()),
            resources: resources.to_vec(),
        })
        .collect()
}

fn level_field(result: &SearchResult) -> Option<&str> {
    result
        .record
        .extra
        .get("level")
        .or_else(|| result.record.extra.get("difficulty"))
        .and_then(|value| value.as_str())
}

fn level_rank(result: &SearchResult) -> Option<usize> {
    let level = level_field(result)?.to_lowercase();
    LEVEL_ORDER.iter().position(|known| *known == level)
}

fn level_label(result: &SearchResult) -> Option<String> {
    let level = level_field(result)?;
    let mut chars = level.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().collect::<String>() + chars.as_str())
}
