use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const ITEMS_PER_PAGE_KEY: &str = "itemsPerPage";
pub const QUERY_KEY: &str = "query";
pub const SORT_KEY: &str = "sort";
pub const PAGE_KEY: &str = "page";

/// Keys of the route state that carry search parameters rather than facet filters.
/// Largest page size the search backend accepts.
pub const MAX_ITEMS_PER_PAGE: u32 = 1000;

pub const RESERVED_KEYS: [&str; 4] = [ITEMS_PER_PAGE_KEY, QUERY_KEY, SORT_KEY, PAGE_KEY];

pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// A single value of the route state, as read from a query string or produced
/// from the UI state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteValue {
    Number(serde_json::Number),
    Text(String),
    List(Vec<String>),
}

impl RouteValue {
    /// Reads the value as a positive integer. Lists and non-numeric text yield `None`.
    pub fn as_positive_int(&self) -> Option<u32> {
        let n = match self {
            RouteValue::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            RouteValue::Text(s) => s.trim().parse::<u32>().ok(),
            RouteValue::List(_) => None,
        }?;
        (n > 0).then_some(n)
    }

    pub fn as_text(&self) -> String {
        match self {
            RouteValue::Number(n) => n.to_string(),
            RouteValue::Text(s) => s.clone(),
            RouteValue::List(values) => values.join(","),
        }
    }
}

impl fmt::Display for RouteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

impl From<&str> for RouteValue {
    fn from(value: &str) -> Self {
        RouteValue::Text(value.to_string())
    }
}

impl From<String> for RouteValue {
    fn from(value: String) -> Self {
        RouteValue::Text(value)
    }
}

impl From<u32> for RouteValue {
    fn from(value: u32) -> Self {
        RouteValue::Number(value.into())
    }
}

impl From<Vec<String>> for RouteValue {
    fn from(values: Vec<String>) -> Self {
        RouteValue::List(values)
    }
}

impl From<Vec<&str>> for RouteValue {
    fn from(values: Vec<&str>) -> Self {
        RouteValue::List(values.into_iter().map(str::to_string).collect())
    }
}

/// The part of the search state that lives in the URL query string.
///
/// Reserved keys are lifted into typed fields; every other key is a facet
/// filter name kept verbatim in `filters`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, RouteValue>",
    into = "BTreeMap<String, RouteValue>"
)]
pub struct RouteState {
    pub items_per_page: Option<u32>,
    pub query: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub filters: BTreeMap<String, RouteValue>,
}

impl RouteState {
    /// Builds a route state from flat key/value pairs, partitioning reserved
    /// keys from facet filters. Reserved numeric keys that are not positive
    /// integers are dropped.
    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, RouteValue)>,
    {
        let mut state = RouteState::default();

        for (key, value) in entries {
            let key = key.into();
            match key.as_str() {
                ITEMS_PER_PAGE_KEY => {
                    state.items_per_page =
                        positive_or_warn(ITEMS_PER_PAGE_KEY, &value).map(clamp_items_per_page)
                }
                PAGE_KEY => state.page = positive_or_warn(PAGE_KEY, &value),
                QUERY_KEY => state.query = Some(value.as_text()),
                SORT_KEY => state.sort = Some(value.as_text()),
                _ => {
                    state.filters.insert(key, value);
                }
            }
        }

        state
    }

    /// Flattens the route state back into key/value pairs, reserved keys first.
    pub fn to_entries(&self) -> Vec<(String, RouteValue)> {
        let mut entries = Vec::with_capacity(self.filters.len() + RESERVED_KEYS.len());

        if let Some(sort) = &self.sort {
            entries.push((SORT_KEY.to_string(), RouteValue::from(sort.as_str())));
        }
        if let Some(items_per_page) = self.items_per_page {
            entries.push((ITEMS_PER_PAGE_KEY.to_string(), items_per_page.into()));
        }
        if let Some(page) = self.page {
            entries.push((PAGE_KEY.to_string(), page.into()));
        }
        if let Some(query) = &self.query {
            entries.push((QUERY_KEY.to_string(), RouteValue::from(query.as_str())));
        }
        for (key, value) in &self.filters {
            entries.push((key.clone(), value.clone()));
        }

        entries
    }

    pub fn is_empty(&self) -> bool {
        self.items_per_page.is_none()
            && self.query.is_none()
            && self.sort.is_none()
            && self.page.is_none()
            && self.filters.is_empty()
    }
}

fn positive_or_warn(key: &str, value: &RouteValue) -> Option<u32> {
    let parsed = value.as_positive_int();
    if parsed.is_none() {
        tracing::warn!(key, value = %value, "ignoring non-numeric route state value");
    }
    parsed
}

fn clamp_items_per_page(items: u32) -> u32 {
    if items > MAX_ITEMS_PER_PAGE {
        tracing::warn!(items, max = MAX_ITEMS_PER_PAGE, "clamping itemsPerPage");
        return MAX_ITEMS_PER_PAGE;
    }
    items
}

impl From<BTreeMap<String, RouteValue>> for RouteState {
    fn from(map: BTreeMap<String, RouteValue>) -> Self {
        RouteState::from_entries(map)
    }
}

impl From<RouteState> for BTreeMap<String, RouteValue> {
    fn from(state: RouteState) -> Self {
        state.to_entries().into_iter().collect()
    }
}
