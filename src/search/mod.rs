//! Search Module
//!
//! Turns the UI state of an index into a hosted search query and decodes the
//! results the page renders.
//!
//! - Pages are 1-based in the UI state and 0-based on the wire
//! - Refinements become `facetFilters`: values of one facet are OR-ed,
//!   facets are AND-ed
//! - The `sortBy` value names the index (or replica) that is queried

mod algolia;

pub use algolia::AlgoliaClient;

use std::collections::BTreeMap;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::routing::{DEFAULT_HITS_PER_PAGE, DEFAULT_PAGE, IndexUiState, MAX_ITEMS_PER_PAGE};

/// Backend able to run a query against a search index.
pub trait SearchBackend: Send + Sync {
    fn search<'a>(
        &'a self,
        request: &'a SearchRequest,
    ) -> BoxFuture<'a, Result<SearchResults, SearchError>>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub index_name: String,
    pub params: SearchParams,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub query: String,
    pub page: u32,
    pub hits_per_page: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facet_filters: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics_tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes_to_retrieve: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distinct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faceting_after_distinct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_values_per_facet: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personalization_impact: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_contexts: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    #[serde(default)]
    pub hits: Vec<Hit>,
    #[serde(default)]
    pub nb_hits: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub nb_pages: u32,
    #[serde(default)]
    pub hits_per_page: u32,
    #[serde(default)]
    pub facets: BTreeMap<String, BTreeMap<String, u64>>,
    #[serde(default)]
    pub query: String,
    #[serde(default, rename = "processingTimeMS")]
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "objectID")]
    pub object_id: String,
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl Hit {
    /// Display title: `title`, else `name`, else the object id.
    pub fn title(&self) -> &str {
        ["title", "name"]
            .iter()
            .find_map(|key| self.attributes.get(*key).and_then(|v| v.as_str()))
            .unwrap_or(self.object_id.as_str())
    }
}

/// Builds the query for one index UI state. `default_index` is queried when
/// the state carries no sort; `facets` are always requested alongside the
/// refined attributes.
pub fn build_request(state: &IndexUiState, default_index: &str, facets: &[String]) -> SearchRequest {
    let index_name = state
        .sort_by
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default_index.to_string());

    let page = state.page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE);
    let hits_per_page = state
        .hits_per_page
        .filter(|h| *h > 0)
        .unwrap_or(DEFAULT_HITS_PER_PAGE)
        .min(MAX_ITEMS_PER_PAGE);

    let mut requested_facets: Vec<String> = facets.to_vec();
    let mut facet_filters = Vec::new();
    if let Some(list) = &state.refinement_list {
        for (attribute, values) in list {
            if !requested_facets.contains(attribute) {
                requested_facets.push(attribute.clone());
            }
            if values.is_empty() {
                continue;
            }
            facet_filters.push(
                values
                    .iter()
                    .map(|value| facet_filter(attribute, value))
                    .collect(),
            );
        }
    }

    let configure = state.configure.clone().unwrap_or_default();

    SearchRequest {
        index_name,
        params: SearchParams {
            query: configure.query.unwrap_or_default(),
            page: page - 1,
            hits_per_page,
            facets: requested_facets,
            facet_filters,
            filters: configure.filters.filter(|f| !f.is_empty()),
            analytics_tags: configure.analytics_tags,
            attributes_to_retrieve: configure.attributes_to_retrieve,
            distinct: configure.distinct,
            faceting_after_distinct: configure.faceting_after_distinct,
            max_values_per_facet: configure.max_values_per_facet,
            personalization_impact: configure.personalization_impact,
            rule_contexts: configure.rule_contexts,
        },
    }
}

fn facet_filter(attribute: &str, value: &str) -> String {
    // a leading '-' would negate the filter
    match value.strip_prefix('-') {
        Some(rest) => format!("{attribute}:\\-{rest}"),
        None => format!("{attribute}:{value}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{Configure, RefinementList};

    #[test]
    fn converts_pages_to_zero_based() {
        let state = IndexUiState {
            page: Some(3),
            hits_per_page: Some(24),
            ..Default::default()
        };
        let request = build_request(&state, "products", &[]);

        assert_eq!(request.index_name, "products");
        assert_eq!(request.params.page, 2);
        assert_eq!(request.params.hits_per_page, 24);
    }

    #[test]
    fn hits_per_page_is_capped() {
        let state = IndexUiState {
            hits_per_page: Some(5000),
            ..Default::default()
        };
        let request = build_request(&state, "products", &[]);
        assert_eq!(request.params.hits_per_page, MAX_ITEMS_PER_PAGE);
    }

    #[test]
    fn sort_selects_the_replica_index() {
        let state = IndexUiState {
            sort_by: Some("products_recently_ordered_count_desc".to_string()),
            ..Default::default()
        };
        let request = build_request(&state, "products", &[]);

        assert_eq!(request.index_name, "products_recently_ordered_count_desc");
        assert_eq!(request.params.page, 0);
        assert_eq!(request.params.hits_per_page, DEFAULT_HITS_PER_PAGE);
    }

    #[test]
    fn refinements_become_facet_filters() {
        let state = IndexUiState {
            refinement_list: Some(RefinementList::from([
                ("color".to_string(), vec!["red".to_string(), "blue".to_string()]),
                ("size".to_string(), vec!["-XS".to_string()]),
            ])),
            configure: Some(Configure {
                query: Some("shirt".to_string()),
                filters: Some("collections:summer".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let request = build_request(&state, "products", &["vendor".to_string(), "color".to_string()]);

        assert_eq!(request.params.query, "shirt");
        assert_eq!(request.params.filters.as_deref(), Some("collections:summer"));
        assert_eq!(request.params.facets, vec!["vendor", "color", "size"]);
        assert_eq!(
            request.params.facet_filters,
            vec![vec!["color:red", "color:blue"], vec!["size:\\-XS"]]
        );
    }

    #[test]
    fn params_serialize_with_wire_names() {
        let request = build_request(&IndexUiState::default(), "products", &[]);
        let json = serde_json::to_value(&request.params).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"query": "", "page": 0, "hitsPerPage": 60})
        );
    }

    #[test]
    fn decodes_search_response() {
        let body = r#"{
            "hits": [
                {"objectID": "1", "title": "Linen Shirt", "price": 40},
                {"objectID": "2", "name": "Wool Hat"},
                {"objectID": "3"}
            ],
            "nbHits": 3,
            "page": 0,
            "nbPages": 1,
            "hitsPerPage": 60,
            "facets": {"color": {"red": 2, "blue": 1}},
            "query": "",
            "processingTimeMS": 1
        }"#;
        let results: SearchResults = serde_json::from_str(body).unwrap();

        assert_eq!(results.nb_hits, 3);
        assert_eq!(results.facets["color"]["red"], 2);
        let titles: Vec<&str> = results.hits.iter().map(Hit::title).collect();
        assert_eq!(titles, vec!["Linen Shirt", "Wool Hat", "3"]);
        assert_eq!(results.hits[0].attributes["price"], 40);
    }
}
