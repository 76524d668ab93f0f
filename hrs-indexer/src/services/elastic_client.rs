//! Elasticsearch document store
//!
//! Keeps hotel documents in one Elasticsearch index over the REST API.
//! The index is created with the hotel mapping on first use. Lookup is an
//! exact `term` query on the keyword `name` field; writes replace the whole
//! document under its id.

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::models::{DocumentId, HotelDocument};
use crate::types::{DocumentStore, StoreError};

pub const DEFAULT_ELASTIC_URL: &str = "http://127.0.0.1:9200";
pub const DEFAULT_INDEX_NAME: &str = "hotels";

/// Index settings and mappings for hotel documents
pub fn hotel_index_mapping() -> Value {
    let tone = json!({
        "type": "nested",
        "properties": {
            "toneId": { "type": "keyword" },
            "score": { "type": "float" }
        }
    });

    json!({
        "settings": {
            "analysis": {
                "analyzer": {
                    "edge_analyzer": { "tokenizer": "edge_tokenizer" },
                    "std_analyzer": { "type": "standard" }
                },
                "tokenizer": {
                    "edge_tokenizer": {
                        "type": "edge_ngram",
                        "min_gram": 2,
                        "max_gram": 10,
                        "token_chars": ["letter", "digit"]
                    }
                }
            }
        },
        "mappings": {
            "properties": {
                "name": { "type": "keyword" },
                "city": { "type": "keyword" },
                "country": { "type": "keyword" },
                "location": { "type": "geo_point" },
                "postalCode": { "type": "keyword" },
                "reviews": {
                    "type": "nested",
                    "properties": {
                        "date": { "type": "date" },
                        "dateAdded": { "type": "date" },
                        "rating": { "type": "integer" },
                        "text": { "type": "text", "analyzer": "edge_analyzer" },
                        "title": { "type": "text", "analyzer": "std_analyzer" },
                        "userCity": { "type": "keyword" },
                        "username": { "type": "keyword" },
                        "userProvince": { "type": "keyword" },
                        "tones": tone.clone()
                    }
                },
                "normTones": tone
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source")]
    source: Option<Value>,
}

/// Decode a search response into the first matching document, if any
pub fn parse_search_response(body: Value) -> Result<Option<HotelDocument>, StoreError> {
    let response: SearchResponse = serde_json::from_value(body)
        .map_err(|e| StoreError::Unavailable(format!("unexpected search response: {}", e)))?;

    let Some(hit) = response.hits.hits.into_iter().next() else {
        return Ok(None);
    };

    let source = hit
        .source
        .ok_or_else(|| StoreError::Malformed(format!("{}: hit has no _source", hit.id)))?;
    let id = DocumentId::new(hit.id);
    HotelDocument::from_stored(id.clone(), source)
        .map(Some)
        .map_err(|e| StoreError::Malformed(format!("{}: {}", id, e)))
}

pub struct ElasticDocumentStore {
    http_client: reqwest::Client,
    base_url: Url,
    index_name: String,
    index_ready: OnceCell<()>,
}

impl ElasticDocumentStore {
    pub fn new(base_url: &str, index_name: impl Into<String>) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::Unavailable(format!("invalid Elasticsearch URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Unavailable(format!(
                "invalid Elasticsearch URL {}",
                base_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Unavailable(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
            index_name: index_name.into(),
            index_ready: OnceCell::new(),
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// `{base_url}/{segments...}` with each segment percent-encoded
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Create the index with the hotel mapping unless it already exists (runs once)
    async fn ensure_index(&self) -> Result<(), StoreError> {
        self.index_ready
            .get_or_try_init(|| async {
                let url = self.endpoint(&[&self.index_name]);

                let response = self
                    .http_client
                    .head(url.clone())
                    .send()
                    .await
                    .map_err(|e| StoreError::Unavailable(e.to_string()))?;

                let status = response.status();
                if status.is_success() {
                    return Ok::<(), StoreError>(());
                }
                if status != StatusCode::NOT_FOUND {
                    return Err(StoreError::Unavailable(format!(
                        "index check for {} returned {}",
                        self.index_name, status
                    )));
                }

                let response = self
                    .http_client
                    .put(url)
                    .json(&hotel_index_mapping())
                    .send()
                    .await
                    .map_err(|e| StoreError::Unavailable(e.to_string()))?;

                let status = response.status();
                if status.is_success() {
                    tracing::info!(index = %self.index_name, "Created Elasticsearch index");
                    return Ok(());
                }

                let body = response.text().await.unwrap_or_default();
                // Another writer created it between our check and create
                if body.contains("resource_already_exists_exception") {
                    return Ok(());
                }
                Err(StoreError::Unavailable(format!(
                    "index create for {} returned {}: {}",
                    self.index_name, status, body
                )))
            })
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl DocumentStore for ElasticDocumentStore {
    fn name(&self) -> &'static str {
        "elasticsearch"
    }

    async fn fetch_by_name(&self, hotel_name: &str) -> Result<Option<HotelDocument>, StoreError> {
        self.ensure_index().await?;

        let query = json!({
            "size": 1,
            "query": { "term": { "name": hotel_name } }
        });

        let response = self
            .http_client
            .post(self.endpoint(&[&self.index_name, "_search"]))
            .json(&query)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Unavailable(format!("search returned {}: {}", status, body)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Unavailable(format!("search response unreadable: {}", e)))?;

        parse_search_response(body)
    }

    async fn upsert(&self, id: &DocumentId, document: &HotelDocument) -> Result<(), StoreError> {
        self.ensure_index().await.map_err(|e| StoreError::Write(e.to_string()))?;

        let mut url = self.endpoint(&[&self.index_name, "_doc", id.as_str()]);
        // Make the write visible to the next lookup of this hotel
        url.query_pairs_mut().append_pair("refresh", "wait_for");

        let response = self
            .http_client
            .put(url)
            .json(document)
            .send()
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Write(format!("index returned {}: {}", status, body)));
        }

        tracing::debug!(doc_id = %id, hotel = %document.name, index = %self.index_name, "Stored hotel document");

        Ok(())
    }
}
