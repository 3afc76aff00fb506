use std::collections::BTreeMap;

use crate::error::RouteStateError;

use super::route_state::{RouteState, RouteValue, is_reserved_key};
use super::ui_state::{Configure, IndexUiState, RefinementList, UiState};

pub const DEFAULT_HITS_PER_PAGE: u32 = 60;
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_SORT_BY: &str = "products";

const VALUE_DELIMITER: char = ',';

/// Maps between the URL route state and the UI state of one index.
#[derive(Debug, Clone)]
pub struct StateMapping {
    index_name: String,
    configure: Configure,
}

impl StateMapping {
    pub fn new(index_name: impl Into<String>) -> Self {
        StateMapping {
            index_name: index_name.into(),
            configure: Configure::default(),
        }
    }

    /// Static search parameters merged into every UI state built from a route.
    pub fn with_configure(mut self, configure: Configure) -> Self {
        self.configure = configure;
        self
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Sort applied when the route carries none: the index itself.
    pub fn default_sort_by(&self) -> &str {
        if self.index_name.is_empty() {
            DEFAULT_SORT_BY
        } else {
            &self.index_name
        }
    }

    pub fn route_to_state(&self, route: &RouteState) -> UiState {
        let refinement_list = refinement_list_from_route_state(&route.filters);

        let configure = Configure {
            query: route.query.clone(),
            ..self.configure.clone()
        };

        let state = IndexUiState {
            hits_per_page: Some(route.items_per_page.unwrap_or(DEFAULT_HITS_PER_PAGE)),
            page: Some(route.page.unwrap_or(DEFAULT_PAGE)),
            sort_by: Some(
                route
                    .sort
                    .clone()
                    .unwrap_or_else(|| self.default_sort_by().to_string()),
            ),
            configure: Some(configure),
            refinement_list: refinement_list.filter(|list| !list.is_empty()),
        };

        UiState::single(&self.index_name, state)
    }

    pub fn state_to_route(&self, ui_state: &UiState) -> RouteState {
        let Some(state) = ui_state.index(&self.index_name) else {
            return RouteState::default();
        };

        let mut route = RouteState::default();

        if let Some(sort_by) = state.sort_by.as_deref() {
            if !sort_by.is_empty() && sort_by != self.default_sort_by() {
                route.sort = Some(sort_by.to_string());
            }
        }

        if let Some(hits_per_page) = state.hits_per_page {
            if hits_per_page != 0 && hits_per_page != DEFAULT_HITS_PER_PAGE {
                route.items_per_page = Some(hits_per_page);
            }
        }

        if let Some(page) = state.page {
            if page != 0 && page != DEFAULT_PAGE {
                route.page = Some(page);
            }
        }

        if let Some(query) = state.query() {
            if !query.is_empty() {
                route.query = Some(query.to_string());
            }
        }

        if let Some(list) = &state.refinement_list {
            for (attribute, values) in list {
                if is_reserved_key(attribute) {
                    tracing::warn!(
                        attribute = %attribute,
                        "refinement collides with a reserved route key, skipping"
                    );
                    continue;
                }
                route
                    .filters
                    .insert(attribute.clone(), RouteValue::List(values.clone()));
            }
        }

        route
    }
}

/// Extracts the facet refinements of a route. Every value is wrapped or split
/// into a list; a facet without a name is logged and drops the whole
/// refinement list rather than failing the render.
pub fn refinement_list_from_route_state(
    filters: &BTreeMap<String, RouteValue>,
) -> Option<RefinementList> {
    match normalize_filters(filters) {
        Ok(list) => Some(list),
        Err(e) => {
            tracing::error!(error = %e, "error on parsing search route state");
            None
        }
    }
}

fn normalize_filters(
    filters: &BTreeMap<String, RouteValue>,
) -> Result<RefinementList, RouteStateError> {
    let mut list = RefinementList::new();
    for (key, value) in filters.iter().filter(|(key, _)| !is_reserved_key(key)) {
        if key.is_empty() {
            return Err(RouteStateError::EmptyFacetName);
        }
        let values = normalize_value(value);
        if values.is_empty() {
            tracing::warn!(facet = %key, "facet has no values, skipping");
            continue;
        }
        list.insert(key.clone(), values);
    }
    Ok(list)
}

fn normalize_value(value: &RouteValue) -> Vec<String> {
    match value {
        RouteValue::Text(s) => s.split(VALUE_DELIMITER).map(str::to_string).collect(),
        RouteValue::Number(n) => vec![n.to_string()],
        RouteValue::List(values) => values.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> StateMapping {
        StateMapping::new("products")
    }

    fn route(entries: Vec<(&str, RouteValue)>) -> RouteState {
        RouteState::from_entries(entries)
    }

    #[test]
    fn empty_route_gets_defaults_and_no_refinements() {
        let ui = mapping().route_to_state(&RouteState::default());
        let state = ui.index("products").unwrap();

        assert_eq!(state.hits_per_page, Some(DEFAULT_HITS_PER_PAGE));
        assert_eq!(state.page, Some(1));
        assert_eq!(state.sort_by.as_deref(), Some("products"));
        assert_eq!(state.query(), None);
        assert_eq!(state.refinement_list, None);
    }

    #[test]
    fn delimited_values_are_split_into_refinements() {
        let ui = mapping().route_to_state(&route(vec![("color", "red,blue".into())]));
        let list = ui.index("products").unwrap().refinement_list.clone().unwrap();

        assert_eq!(list["color"], vec!["red", "blue"]);
    }

    #[test]
    fn scalars_and_numbers_are_wrapped() {
        let ui = mapping().route_to_state(&route(vec![
            ("size", "M".into()),
            ("rating", RouteValue::Number(4.into())),
            ("tags", vec!["summer", "sale"].into()),
        ]));
        let list = ui.index("products").unwrap().refinement_list.clone().unwrap();

        assert_eq!(list["size"], vec!["M"]);
        assert_eq!(list["rating"], vec!["4"]);
        assert_eq!(list["tags"], vec!["summer", "sale"]);
    }

    #[test]
    fn reserved_keys_populate_search_parameters() {
        let ui = mapping().route_to_state(&route(vec![
            ("itemsPerPage", "24".into()),
            ("page", "3".into()),
            ("sort", "products_recently_ordered_count_desc".into()),
            ("query", "wool".into()),
        ]));
        let state = ui.index("products").unwrap();

        assert_eq!(state.hits_per_page, Some(24));
        assert_eq!(state.page, Some(3));
        assert_eq!(
            state.sort_by.as_deref(),
            Some("products_recently_ordered_count_desc")
        );
        assert_eq!(state.query(), Some("wool"));
        assert_eq!(state.refinement_list, None);
    }

    #[test]
    fn empty_facet_value_keeps_other_refinements() {
        let ui = mapping().route_to_state(&route(vec![
            ("color", "red".into()),
            ("size", "".into()),
            ("page", "2".into()),
        ]));
        let state = ui.index("products").unwrap();
        let list = state.refinement_list.clone().unwrap();

        assert_eq!(list["color"], vec!["red"]);
        assert_eq!(list["size"], vec![""]);
        assert_eq!(state.page, Some(2));
    }

    #[test]
    fn trailing_delimiter_keeps_empty_part() {
        let ui = mapping().route_to_state(&route(vec![("color", "red,".into())]));
        let list = ui.index("products").unwrap().refinement_list.clone().unwrap();
        assert_eq!(list["color"], vec!["red", ""]);

        let ui = mapping().route_to_state(&route(vec![("size", ",".into())]));
        let list = ui.index("products").unwrap().refinement_list.clone().unwrap();
        assert_eq!(list["size"], vec!["", ""]);
    }

    #[test]
    fn empty_list_skips_only_that_facet() {
        let ui = mapping().route_to_state(&route(vec![
            ("color", "red".into()),
            ("size", RouteValue::List(Vec::new())),
        ]));
        let list = ui.index("products").unwrap().refinement_list.clone().unwrap();

        assert_eq!(list.len(), 1);
        assert_eq!(list["color"], vec!["red"]);
    }

    #[test]
    fn unnamed_facet_drops_refinement_list() {
        let ui = mapping().route_to_state(&route(vec![
            ("color", "red".into()),
            ("", "x".into()),
            ("page", "2".into()),
        ]));
        let state = ui.index("products").unwrap();

        assert_eq!(state.refinement_list, None);
        assert_eq!(state.page, Some(2));
    }

    #[test]
    fn configure_parameters_are_merged_with_query() {
        let mapping = mapping().with_configure(Configure {
            filters: Some("collections:summer".to_string()),
            ..Default::default()
        });
        let ui = mapping.route_to_state(&route(vec![("query", "hat".into())]));
        let configure = ui.index("products").unwrap().configure.clone().unwrap();

        assert_eq!(configure.filters.as_deref(), Some("collections:summer"));
        assert_eq!(configure.query.as_deref(), Some("hat"));
    }

    #[test]
    fn non_default_page_survives_round_trip() {
        let m = mapping();
        let start = route(vec![("page", 3.into())]);
        assert_eq!(m.state_to_route(&m.route_to_state(&start)), start);
    }

    #[test]
    fn defaults_never_leak_into_route() {
        let m = mapping();
        let back = m.state_to_route(&m.route_to_state(&RouteState::default()));
        assert!(back.is_empty());
    }

    #[test]
    fn all_default_ui_state_maps_to_empty_route() {
        let ui = UiState::single(
            "products",
            IndexUiState {
                sort_by: Some("products".to_string()),
                hits_per_page: Some(60),
                page: Some(1),
                ..Default::default()
            },
        );
        assert!(mapping().state_to_route(&ui).is_empty());
    }

    #[test]
    fn refinements_become_top_level_keys() {
        let ui = UiState::single(
            "products",
            IndexUiState {
                page: Some(2),
                refinement_list: Some(RefinementList::from([(
                    "size".to_string(),
                    vec!["M".to_string()],
                )])),
                ..Default::default()
            },
        );

        let expected = route(vec![("page", 2.into()), ("size", vec!["M"].into())]);
        assert_eq!(mapping().state_to_route(&ui), expected);
    }

    #[test]
    fn missing_index_maps_to_empty_route() {
        let ui = UiState::single("other", IndexUiState::default());
        assert!(mapping().state_to_route(&ui).is_empty());
    }

    #[test]
    fn refinement_named_like_reserved_key_is_skipped() {
        let ui = UiState::single(
            "products",
            IndexUiState {
                refinement_list: Some(RefinementList::from([(
                    "page".to_string(),
                    vec!["4".to_string()],
                )])),
                ..Default::default()
            },
        );
        assert!(mapping().state_to_route(&ui).is_empty());
    }

    #[test]
    fn state_to_route_is_stable_after_one_pass() {
        let m = mapping();
        let start = route(vec![
            ("sort", "products_recently_ordered_count_desc".into()),
            ("itemsPerPage", 30.into()),
            ("query", "linen shirt".into()),
            ("color", "red,blue".into()),
            ("size", "L".into()),
        ]);

        let once = m.state_to_route(&m.route_to_state(&start));
        let twice = m.state_to_route(&m.route_to_state(&once));
        assert_eq!(once, twice);
        assert_eq!(once.filters["color"], RouteValue::from(vec!["red", "blue"]));
    }

    mod properties {
        use super::*;
        use crate::routing::qs;
        use proptest::prelude::*;

        fn arb_facet_name() -> impl Strategy<Value = String> {
            proptest::string::string_regex("[a-z][a-z_.]{0,11}")
                .expect("valid regex")
                .prop_filter("reserved route key", |key| !is_reserved_key(key))
        }

        // Empty strings, lone commas and trailing commas all show up here.
        fn arb_facet_value() -> impl Strategy<Value = String> {
            proptest::string::string_regex("[a-z,]{0,8}").expect("valid regex")
        }

        fn arb_facets() -> impl Strategy<Value = BTreeMap<String, String>> {
            proptest::collection::btree_map(arb_facet_name(), arb_facet_value(), 0..6)
        }

        fn facet_route(facets: &BTreeMap<String, String>) -> RouteState {
            RouteState::from_entries(
                facets
                    .iter()
                    .map(|(key, value)| (key.clone(), RouteValue::from(value.as_str()))),
            )
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(256))]

            #[test]
            fn every_facet_is_wrapped_or_split(facets in arb_facets()) {
                let ui = mapping().route_to_state(&facet_route(&facets));
                let list = ui.index("products").unwrap().refinement_list.clone();

                let expected: RefinementList = facets
                    .iter()
                    .map(|(key, value)| {
                        (key.clone(), value.split(',').map(str::to_string).collect())
                    })
                    .collect();

                if expected.is_empty() {
                    prop_assert_eq!(list, None);
                } else {
                    prop_assert_eq!(list, Some(expected));
                }
            }

            #[test]
            fn second_round_trip_changes_nothing(facets in arb_facets(), page in 0u32..5) {
                let m = mapping();
                let mut start = facet_route(&facets);
                start.page = (page > 0).then_some(page);

                let once = m.state_to_route(&m.route_to_state(&start));
                let twice = m.state_to_route(&m.route_to_state(&once));
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn query_string_preserves_ui_state(facets in arb_facets()) {
                let m = mapping();
                let ui = m.route_to_state(&facet_route(&facets));

                let search = qs::stringify(&m.state_to_route(&ui).to_entries());
                let reparsed = m.route_to_state(&RouteState::from_entries(qs::parse(&search)));
                prop_assert_eq!(reparsed, ui);
            }
        }
    }
}
