use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use super::{SearchBackend, SearchRequest, SearchResults};
use crate::config::Search;
use crate::error::SearchError;

const APPLICATION_ID_HEADER: &str = "X-Algolia-Application-Id";
const API_KEY_HEADER: &str = "X-Algolia-API-Key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the hosted search REST API.
#[derive(Debug, Clone)]
pub struct AlgoliaClient {
    http: reqwest::Client,
    host: String,
    app_id: String,
    api_key: String,
}

impl AlgoliaClient {
    pub fn new(cfg: &Search) -> Result<Self, SearchError> {
        if cfg.app_id.is_empty() || cfg.api_key.is_empty() {
            return Err(SearchError::Config(
                "app_id and api_key are required".to_string(),
            ));
        }

        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(AlgoliaClient {
            http,
            host: cfg.get_host(),
            app_id: cfg.app_id.clone(),
            api_key: cfg.api_key.clone(),
        })
    }

    fn query_url(&self, index_name: &str) -> String {
        format!(
            "{}/1/indexes/{}/query",
            self.host,
            urlencoding::encode(index_name)
        )
    }

    pub async fn query(&self, request: &SearchRequest) -> Result<SearchResults, SearchError> {
        let t0 = std::time::Instant::now();
        let response = self
            .http
            .post(self.query_url(&request.index_name))
            .header(APPLICATION_ID_HEADER, &self.app_id)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request.params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let results: SearchResults = serde_json::from_str(&body)?;
        tracing::info!(
            index = %request.index_name,
            nb_hits = results.nb_hits,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "search completed"
        );
        Ok(results)
    }
}

impl SearchBackend for AlgoliaClient {
    fn search<'a>(
        &'a self,
        request: &'a SearchRequest,
    ) -> BoxFuture<'a, Result<SearchResults, SearchError>> {
        self.query(request).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn search_config(extra: &str) -> Search {
        let yaml = format!(
            "app:\n  port: 3000\nsearch:\n  app_id: APPID\n  api_key: key\n{extra}"
        );
        Config::from_yaml_str(&yaml).unwrap().search
    }

    #[test]
    fn query_url_targets_the_index() {
        let client = AlgoliaClient::new(&search_config("")).unwrap();
        assert_eq!(
            client.query_url("products_recently_ordered_count_desc"),
            "https://APPID-dsn.algolia.net/1/indexes/products_recently_ordered_count_desc/query"
        );
    }

    #[test]
    fn custom_host_is_used() {
        let client = AlgoliaClient::new(&search_config("  host: http://127.0.0.1:7700\n")).unwrap();
        assert_eq!(
            client.query_url("my index"),
            "http://127.0.0.1:7700/1/indexes/my%20index/query"
        );
    }

    #[test]
    fn missing_credentials_are_rejected() {
        let mut cfg = search_config("");
        cfg.api_key.clear();
        assert!(matches!(
            AlgoliaClient::new(&cfg),
            Err(SearchError::Config(_))
        ));
    }
}
