use serde::Serialize;

use crate::config::SortOption;
use crate::routing::{GetLocation, HistoryRouter, IndexUiState, RouteState, UiState};
use crate::search::SearchResults;
use crate::templates::{inline_json, render_template};

/// State handed to the client so it can resume without searching again.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerState {
    pub index_name: String,
    pub ui_state: UiState,
    pub route_state: RouteState,
    pub results: SearchResults,
}

#[derive(Debug, Serialize)]
pub struct LinkView {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Serialize)]
struct HitView {
    object_id: String,
    title: String,
}

#[derive(Debug, Serialize)]
struct PageLinkView {
    number: u32,
    href: String,
    current: bool,
}

#[derive(Debug, Serialize)]
struct SortOptionView {
    label: String,
    value: String,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct HiddenField {
    name: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct FacetValueView {
    value: String,
    count: u64,
    refined: bool,
    href: String,
}

#[derive(Debug, Serialize)]
struct FacetView {
    attribute: String,
    values: Vec<FacetValueView>,
}

#[derive(Debug, Serialize)]
struct RefinementView {
    attribute: String,
    value: String,
    href: String,
}

#[derive(Debug, Serialize)]
pub struct CollectionPage {
    handle: String,
    collections: Vec<LinkView>,
    query: String,
    nb_hits: u64,
    hits: Vec<HitView>,
    pages: Vec<PageLinkView>,
    sort_action: String,
    sort_hidden: Vec<HiddenField>,
    sort_options: Vec<SortOptionView>,
    facets: Vec<FacetView>,
    refinements: Vec<RefinementView>,
    clear_href: String,
    server_state_json: String,
}

pub fn collection_links(handles: &[String]) -> Vec<LinkView> {
    handles
        .iter()
        .map(|handle| LinkView {
            label: handle.clone(),
            href: format!("/collections/{}", urlencoding::encode(handle)),
        })
        .collect()
}

pub fn render_home(featured: &[String]) -> Result<String, minijinja::Error> {
    render_template(
        "home.html",
        minijinja::context! { collections => collection_links(featured) },
    )
}

pub fn render_collection(page: &CollectionPage) -> Result<String, minijinja::Error> {
    render_template("collection.html", page)
}

/// Binds the search page controls to URLs produced by the router.
pub struct PageBuilder<'a, L> {
    router: &'a HistoryRouter<L>,
    state: IndexUiState,
}

impl<'a, L: GetLocation> PageBuilder<'a, L> {
    pub fn new(router: &'a HistoryRouter<L>, ui_state: &UiState) -> Self {
        let state = ui_state
            .index(router.mapping().index_name())
            .cloned()
            .unwrap_or_default();
        PageBuilder { router, state }
    }

    fn href_with(&self, update: impl FnOnce(&mut IndexUiState)) -> String {
        let mut state = self.state.clone();
        update(&mut state);
        let ui = UiState::single(self.router.mapping().index_name(), state);
        self.router.href_for(&ui)
    }

    fn current_page(&self) -> u32 {
        self.state.page.filter(|p| *p > 0).unwrap_or(1)
    }

    fn pages(&self, results: &SearchResults) -> Vec<PageLinkView> {
        let current = self.current_page();
        (1..=results.nb_pages)
            .map(|number| PageLinkView {
                number,
                href: self.href_with(|s| s.page = Some(number)),
                current: number == current,
            })
            .collect()
    }

    fn sort_options(&self, options: &[SortOption]) -> Vec<SortOptionView> {
        let current = self
            .state
            .sort_by
            .as_deref()
            .unwrap_or(self.router.mapping().default_sort_by());
        options
            .iter()
            .map(|option| SortOptionView {
                label: option.label.clone(),
                value: option.value.clone(),
                selected: option.value == current,
            })
            .collect()
    }

    /// Route entries the sort form must carry over; sort and page are reset.
    fn sort_hidden(&self) -> Vec<HiddenField> {
        let ui = UiState::single(self.router.mapping().index_name(), self.state.clone());
        let mut route = self.router.mapping().state_to_route(&ui);
        route.sort = None;
        route.page = None;
        route
            .to_entries()
            .into_iter()
            .map(|(name, value)| HiddenField {
                name,
                value: value.as_text(),
            })
            .collect()
    }

    fn facets(&self, attributes: &[String], results: &SearchResults) -> Vec<FacetView> {
        let mut names: Vec<String> = attributes.to_vec();
        if let Some(list) = &self.state.refinement_list {
            for attribute in list.keys() {
                if !names.contains(attribute) {
                    names.push(attribute.clone());
                }
            }
        }

        names
            .into_iter()
            .filter_map(|attribute| {
                let mut counts: Vec<(String, u64)> = results
                    .facets
                    .get(&attribute)
                    .map(|values| values.iter().map(|(v, c)| (v.clone(), *c)).collect())
                    .unwrap_or_default();

                // keep refined values visible even when the result set lost them
                if let Some(selected) = self
                    .state
                    .refinement_list
                    .as_ref()
                    .and_then(|list| list.get(&attribute))
                {
                    for value in selected {
                        if !counts.iter().any(|(v, _)| v == value) {
                            counts.push((value.clone(), 0));
                        }
                    }
                }

                if counts.is_empty() {
                    return None;
                }
                counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

                let values = counts
                    .into_iter()
                    .map(|(value, count)| FacetValueView {
                        refined: self.state.is_refined(&attribute, &value),
                        href: self.href_with(|s| {
                            s.toggle_refinement(&attribute, &value);
                            s.page = Some(1);
                        }),
                        value,
                        count,
                    })
                    .collect();

                Some(FacetView { attribute, values })
            })
            .collect()
    }

    fn refinements(&self) -> Vec<RefinementView> {
        let Some(list) = &self.state.refinement_list else {
            return Vec::new();
        };

        list.iter()
            .flat_map(|(attribute, values)| {
                values.iter().map(move |value| (attribute.clone(), value.clone()))
            })
            .map(|(attribute, value)| RefinementView {
                href: self.href_with(|s| {
                    s.toggle_refinement(&attribute, &value);
                    s.page = Some(1);
                }),
                attribute,
                value,
            })
            .collect()
    }

    pub fn build(
        &self,
        handle: &str,
        featured: &[String],
        sort_options: &[SortOption],
        facet_attributes: &[String],
        server_state: &ServerState,
    ) -> Result<CollectionPage, minijinja::Error> {
        let results = &server_state.results;

        Ok(CollectionPage {
            handle: handle.to_string(),
            collections: collection_links(featured),
            query: self.state.query().unwrap_or_default().to_string(),
            nb_hits: results.nb_hits,
            hits: results
                .hits
                .iter()
                .map(|hit| HitView {
                    object_id: hit.object_id.clone(),
                    title: hit.title().to_string(),
                })
                .collect(),
            pages: self.pages(results),
            sort_action: self.router.get_location().pathname,
            sort_hidden: self.sort_hidden(),
            sort_options: self.sort_options(sort_options),
            facets: self.facets(facet_attributes, results),
            refinements: self.refinements(),
            clear_href: self.href_with(|s| {
                s.refinement_list = None;
                s.page = Some(1);
            }),
            server_state_json: inline_json(server_state)?,
        })
    }
}
