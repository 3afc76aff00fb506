use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Selected facet values, keyed by facet attribute.
pub type RefinementList = BTreeMap<String, Vec<String>>;

/// Search parameters applied to every query of an index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Configure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics_tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes_to_retrieve: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distinct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faceting_after_distinct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_values_per_facet: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personalization_impact: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_contexts: Option<Vec<String>>,
}

/// UI state of a single index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexUiState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hits_per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configure: Option<Configure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refinement_list: Option<RefinementList>,
}

impl IndexUiState {
    pub fn query(&self) -> Option<&str> {
        self.configure.as_ref()?.query.as_deref()
    }

    pub fn is_refined(&self, attribute: &str, value: &str) -> bool {
        self.refinement_list
            .as_ref()
            .and_then(|list| list.get(attribute))
            .is_some_and(|values| values.iter().any(|v| v == value))
    }

    /// Adds the value to the attribute's refinements, or removes it if already
    /// selected. Empty attributes and an empty list are pruned.
    pub fn toggle_refinement(&mut self, attribute: &str, value: &str) {
        let list = self.refinement_list.get_or_insert_with(RefinementList::new);
        let values = list.entry(attribute.to_string()).or_default();

        if let Some(pos) = values.iter().position(|v| v == value) {
            values.remove(pos);
        } else {
            values.push(value.to_string());
        }

        if values.is_empty() {
            list.remove(attribute);
        }
        if list.is_empty() {
            self.refinement_list = None;
        }
    }
}

/// Full UI state, keyed by index name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UiState(pub BTreeMap<String, IndexUiState>);

impl UiState {
    pub fn single(index_name: &str, state: IndexUiState) -> Self {
        UiState(BTreeMap::from([(index_name.to_string(), state)]))
    }

    pub fn index(&self, index_name: &str) -> Option<&IndexUiState> {
        self.0.get(index_name)
    }
}
