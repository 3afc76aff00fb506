use crate::error::LocationError;

use super::location::{GetLocation, Location, ServerLocation};
use super::mapping::StateMapping;
use super::qs;
use super::route_state::RouteState;
use super::ui_state::{Configure, UiState};

/// Inputs for wiring routing to a single rendered request.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    pub index_name: String,
    pub server_url: String,
    pub configure: Configure,
}

/// Reads UI state from the current location and writes it back as URLs.
#[derive(Debug, Clone)]
pub struct HistoryRouter<L> {
    location: L,
    mapping: StateMapping,
}

pub fn build_routing(
    config: &RoutingConfig,
) -> Result<HistoryRouter<ServerLocation>, LocationError> {
    let location = ServerLocation::new(&config.server_url)?;
    let mapping =
        StateMapping::new(config.index_name.clone()).with_configure(config.configure.clone());
    Ok(HistoryRouter::new(location, mapping))
}

impl<L: GetLocation> HistoryRouter<L> {
    pub fn new(location: L, mapping: StateMapping) -> Self {
        HistoryRouter { location, mapping }
    }

    pub fn mapping(&self) -> &StateMapping {
        &self.mapping
    }

    pub fn get_location(&self) -> Location {
        self.location.get_location()
    }

    pub fn parse_url(location: &Location) -> RouteState {
        RouteState::from_entries(qs::parse(&location.search))
    }

    pub fn create_url(route_state: &RouteState, location: &Location) -> String {
        let base = format!("{}{}", location.origin, location.pathname);
        if route_state.is_empty() {
            return base;
        }
        format!("{}{}", base, qs::stringify(&route_state.to_entries()))
    }

    /// UI state for the current location.
    pub fn read(&self) -> UiState {
        let route = Self::parse_url(&self.get_location());
        self.mapping.route_to_state(&route)
    }

    /// Route state for the current location, normalized through the UI state.
    pub fn route_state(&self) -> RouteState {
        self.mapping.state_to_route(&self.read())
    }

    /// URL for the given UI state at the current location.
    pub fn href_for(&self, ui_state: &UiState) -> String {
        let route = self.mapping.state_to_route(ui_state);
        Self::create_url(&route, &self.get_location())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::route_state::RouteValue;

    fn router(url: &str) -> HistoryRouter<ServerLocation> {
        build_routing(&RoutingConfig {
            index_name: "products".to_string(),
            server_url: url.to_string(),
            configure: Configure::default(),
        })
        .unwrap()
    }

    #[test]
    fn reads_ui_state_from_server_url() {
        let router = router("http://localhost/collections/a?page=2&color=red%2Cblue&size=M");
        let ui = router.read();
        let state = ui.index("products").unwrap();

        assert_eq!(state.page, Some(2));
        let list = state.refinement_list.clone().unwrap();
        assert_eq!(list["color"], vec!["red", "blue"]);
        assert_eq!(list["size"], vec!["M"]);
    }

    #[test]
    fn create_url_without_state_is_bare_path() {
        let location: Location = "https://shop.example.com/collections/a?page=4".parse().unwrap();
        assert_eq!(
            HistoryRouter::<Location>::create_url(&RouteState::default(), &location),
            "https://shop.example.com/collections/a"
        );
    }

    #[test]
    fn create_url_encodes_route_state() {
        let location: Location = "https://shop.example.com/collections/a".parse().unwrap();
        let route = RouteState::from_entries([
            ("page", RouteValue::from(2)),
            ("color", RouteValue::from(vec!["red", "blue"])),
        ]);
        assert_eq!(
            HistoryRouter::<Location>::create_url(&route, &location),
            "https://shop.example.com/collections/a?page=2&color=red,blue"
        );
    }

    #[test]
    fn href_for_read_state_is_canonical() {
        let router = router("http://localhost/collections/a?page=1&sort=products&size=M&itemsPerPage=60");
        assert_eq!(
            router.href_for(&router.read()),
            "http://localhost/collections/a?size=M"
        );
    }

    #[test]
    fn route_state_drops_defaults() {
        let router = router("http://localhost/collections/a?page=1&query=");
        assert!(router.route_state().is_empty());
    }
}
