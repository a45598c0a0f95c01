//! Identifier source: the RCSB search service, or a plain identifier list.

use crate::config::SearchSettings;
use crate::error::Result;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

pub const SEARCH_URL: &str = "https://search.rcsb.org/rcsbsearch/v2/query";

const ZINC_COMPONENT_ID: &str = "ZN";
const HUMAN_ORGANISM: &str = "Homo sapiens";

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    total_count: usize,
    #[serde(default)]
    result_set: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    identifier: String,
}

/// Builds the search request for entries containing a zinc non-polymer instance.
pub fn zinc_query(human_only: bool, start: usize, rows: usize) -> Value {
    let zinc_node = terminal_node(
        "rcsb_nonpolymer_instance_annotation.comp_id",
        ZINC_COMPONENT_ID,
    );
    let query = if human_only {
        json!({
            "type": "group",
            "logical_operator": "and",
            "nodes": [
                zinc_node,
                terminal_node("rcsb_entity_source_organism.taxonomy_lineage.name", HUMAN_ORGANISM),
            ],
        })
    } else {
        zinc_node
    };

    json!({
        "query": query,
        "return_type": "entry",
        "request_options": { "paginate": { "start": start, "rows": rows } },
    })
}

fn terminal_node(attribute: &str, value: &str) -> Value {
    json!({
        "type": "terminal",
        "service": "text",
        "parameters": {
            "attribute": attribute,
            "operator": "exact_match",
            "value": value,
        },
    })
}

pub struct RcsbSearchClient {
    client: reqwest::Client,
    url: String,
}

impl RcsbSearchClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_url(client, SEARCH_URL)
    }

    pub fn with_url(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Collects every matching entry identifier, page by page.
    ///
    /// Paging stops at an empty page, once `total_count` identifiers are collected, or
    /// after a page shorter than requested.
    #[instrument(skip_all, fields(human_only = settings.human_only))]
    pub async fn zinc_entries(&self, settings: &SearchSettings) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut start = 0;
        let mut total_count = None;

        loop {
            let payload = zinc_query(settings.human_only, start, settings.page_size);
            let response = self
                .client
                .post(&self.url)
                .json(&payload)
                .send()
                .await?
                .error_for_status()?;

            // The service answers 204 when nothing matches.
            if response.status() == StatusCode::NO_CONTENT {
                break;
            }
            let page: SearchPage = serde_json::from_slice(&response.bytes().await?)?;
            debug!(start, hits = page.result_set.len(), total = page.total_count, "Received search page.");

            if total_count.is_none() && page.total_count > 0 {
                total_count = Some(page.total_count);
            }
            if page.result_set.is_empty() {
                break;
            }

            let page_len = page.result_set.len();
            ids.extend(page.result_set.into_iter().map(|hit| hit.identifier));

            if total_count.is_some_and(|total| ids.len() >= total) || page_len < settings.page_size {
                break;
            }
            start += page_len;
        }

        info!(entries = ids.len(), "Zinc-containing entries found.");
        Ok(ids)
    }
}

/// Parses an identifier list: whitespace or comma separated, `#` starts a comment.
/// Identifiers are upper-cased and de-duplicated, keeping first occurrence order.
pub fn parse_identifier_list(text: &str) -> Vec<String> {
    let tokens = text
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(|line| line.split(|c: char| c.is_whitespace() || c == ','))
        .filter(|token| !token.is_empty())
        .map(str::to_ascii_uppercase);
    dedup_identifiers(tokens)
}

/// Upper-cases and de-duplicates identifiers, keeping first occurrence order.
pub fn dedup_identifiers<I>(ids: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut seen = HashSet::new();
    ids.into_iter()
        .map(|id| id.as_ref().trim().to_ascii_uppercase())
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockServer, Response};

    #[test]
    fn query_without_organism_filter_is_a_single_terminal_node() {
        let query = zinc_query(false, 0, 1000);
        assert_eq!(query["query"]["type"], "terminal");
        assert_eq!(query["query"]["parameters"]["value"], "ZN");
        assert_eq!(query["return_type"], "entry");
        assert_eq!(query["request_options"]["paginate"]["rows"], 1000);
    }

    #[test]
    fn human_only_query_joins_both_nodes_with_and() {
        let query = zinc_query(true, 2000, 500);
        assert_eq!(query["query"]["type"], "group");
        assert_eq!(query["query"]["logical_operator"], "and");
        assert_eq!(query["query"]["nodes"][1]["parameters"]["value"], "Homo sapiens");
        assert_eq!(query["request_options"]["paginate"]["start"], 2000);
    }

    #[test]
    fn identifier_list_skips_comments_and_duplicates() {
        let text = "# zinc fingers\n1ca2\n2XYZ, 1CA2  # again\n\n  3abc 4def\n";
        assert_eq!(parse_identifier_list(text), vec!["1CA2", "2XYZ", "3ABC", "4DEF"]);
    }

    fn page_for(body: &[u8], total: usize, page_size: usize) -> Response {
        let request: Value = serde_json::from_slice(body).unwrap();
        let start = request["request_options"]["paginate"]["start"].as_u64().unwrap() as usize;
        let end = (start + page_size).min(total);
        let hits: Vec<Value> = (start..end)
            .map(|i| json!({ "identifier": format!("{i}ZN"), "score": 1.0 }))
            .collect();
        Response::ok(json!({ "total_count": total, "result_set": hits }).to_string())
    }

    #[tokio::test]
    async fn pages_are_followed_until_total_count() {
        let server = MockServer::start(|request| page_for(&request.body, 7, 3)).await;
        let client = RcsbSearchClient::with_url(reqwest::Client::new(), &server.url);
        let settings = SearchSettings {
            human_only: false,
            page_size: 3,
        };

        let ids = client.zinc_entries(&settings).await.unwrap();
        assert_eq!(ids.len(), 7);
        assert_eq!(ids[0], "0ZN");
        assert_eq!(ids[6], "6ZN");
        assert_eq!(server.hits(), 3);
    }

    #[tokio::test]
    async fn exact_multiple_of_page_size_stops_at_total() {
        let server = MockServer::start(|request| page_for(&request.body, 4, 2)).await;
        let client = RcsbSearchClient::with_url(reqwest::Client::new(), &server.url);
        let settings = SearchSettings {
            human_only: true,
            page_size: 2,
        };

        let ids = client.zinc_entries(&settings).await.unwrap();
        assert_eq!(ids.len(), 4);
        assert_eq!(server.hits(), 2);
    }

    #[tokio::test]
    async fn no_content_means_no_entries() {
        let server = MockServer::start(|_| Response::status(204, Vec::new())).await;
        let client = RcsbSearchClient::with_url(reqwest::Client::new(), &server.url);
        let settings = SearchSettings {
            human_only: false,
            page_size: 10,
        };
        assert!(client.zinc_entries(&settings).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn server_errors_are_reported() {
        let server = MockServer::start(|_| Response::status(500, "boom")).await;
        let client = RcsbSearchClient::with_url(reqwest::Client::new(), &server.url);
        let settings = SearchSettings {
            human_only: false,
            page_size: 10,
        };
        assert!(matches!(
            client.zinc_entries(&settings).await,
            Err(crate::error::CliError::Network(_))
        ));
    }
}
