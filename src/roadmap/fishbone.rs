//! Fishbone (cause-and-effect) diagram construction.
//!
//! The query is the spine; branches group ranked results by their
//! `category` field when present, falling back to a single general branch.

use serde::Serialize;

use crate::search::SearchResult;

#[derive(Debug, Clone, Serialize)]
pub struct FishboneBranch {
    pub category: String,
    pub resources: Vec<SearchResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FishboneDiagram {
    pub query: String,
    pub branches: Vec<FishboneBranch>,
}

const DEFAULT_BRANCH: &str = "General";

/// Build a fishbone diagram from ranked results.
///
/// Branch order follows first appearance in the ranking; within a branch
/// the ranking order is preserved. Every resource lands in exactly one
/// branch.
pub fn build_fishbone(query: &str, results: &[SearchResult]) -> FishboneDiagram {
    let mut branches: Vec<FishboneBranch> = Vec::new();

    for result in results {
        let category = result
            .record
            .extra
            .get("category")
            .and_then(|value| value.as_str())
            .unwrap_or(DEFAULT_BRANCH)
            .to_string();

        match branches.iter_mut().find(|b| b.category == category) {
            Some(branch) => branch.resources.push(result.clone()),
            None => branches.push(FishboneBranch {
                category,
                resources: vec![result.clone()],
            }),
        }
    }

    FishboneDiagram {
        query: query.to_string(),
        branches,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, Value};

    use super::*;
    use crate::search::CorpusRecord;

    fn result(title: &str, category: Option<&str>) -> SearchResult {
        let mut extra = Map::new();
        if let Some(category) = category {
            extra.insert("category".to_string(), Value::from(category));
        }
        SearchResult {
            record: CorpusRecord {
                title: title.to_string(),
                summary: None,
                extra,
            },
            similarity_score: 0.5,
        }
    }

    #[test]
    fn test_groups_by_category_in_first_appearance_order() {
        let results = vec![
            result("A", Some("video")),
            result("B", Some("book")),
            result("C", Some("video")),
        ];
        let diagram = build_fishbone("learn rust", &results);

        assert_eq!(diagram.query, "learn rust");
        assert_eq!(diagram.branches.len(), 2);
        assert_eq!(diagram.branches[0].category, "video");
        assert_eq!(diagram.branches[0].resources.len(), 2);
        assert_eq!(diagram.branches[1].category, "book");
    }

    #[test]
    fn test_uncategorized_resources_share_the_general_branch() {
        let results = vec![result("A", None), result("B", Some("book")), result("C", None)];
        let diagram = build_fishbone("q", &results);

        let total: usize = diagram.branches.iter().map(|b| b.resources.len()).sum();
        assert_eq!(total, 3, "every resource lands in exactly one branch");
        assert_eq!(diagram.branches[0].category, "General");
        assert_eq!(diagram.branches[0].resources.len(), 2);
    }

    #[test]
    fn test_empty_results_give_empty_branches() {
        let diagram = build_fishbone("q", &[]);
        assert!(diagram.branches.is_empty());
    }
}
