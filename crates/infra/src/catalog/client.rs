//! GENESIS webservice client
//!
//! JSON client for the statistics office's data catalog and export
//! endpoints. Credentials travel as query parameters (the webservice's
//! convention), every call is timeout-wrapped, and failures surface as
//! `Catalog` errors. Batch-level retry is the caller's concern, never
//! the client's.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use quader_core::{coerce_value, CatalogService};
use quader_domain::{CatalogConfig, CatalogEntry, CubePayload, QuaderError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

/// Configuration for the GENESIS client
#[derive(Debug, Clone)]
pub struct GenesisClientConfig {
    /// Base URL of the webservice
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Timeout for webservice requests
    pub timeout: Duration,
    /// Maximum number of catalog entries per listing request
    pub page_size: u32,
}

impl Default for GenesisClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www-genesis.destatis.de/genesisWS/rest/2020".to_string(),
            username: String::new(),
            password: String::new(),
            timeout: Duration::from_secs(60),
            page_size: 500,
        }
    }
}

impl From<&CatalogConfig> for GenesisClientConfig {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
            page_size: config.page_size,
        }
    }
}

/// HTTP client for the catalog index and cube export endpoints.
pub struct GenesisClient {
    http: reqwest::Client,
    config: GenesisClientConfig,
}

#[derive(Debug, Deserialize)]
struct CatalogListResponse {
    cubes: Vec<CatalogCubeDto>,
}

#[derive(Debug, Deserialize)]
struct CatalogCubeDto {
    code: String,
    #[serde(default)]
    stand: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CubeFileResponse {
    #[serde(default)]
    download: BTreeMap<String, String>,
    metadata: BTreeMap<String, String>,
    data: String,
}

impl GenesisClient {
    /// Create a new client.
    ///
    /// # Errors
    /// Returns `Config` if the underlying HTTP client cannot be built.
    pub fn new(config: GenesisClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| QuaderError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        debug!(url = %url, "Catalog request");

        let request = self
            .http
            .get(&url)
            .query(&[
                ("username", self.config.username.as_str()),
                ("password", self.config.password.as_str()),
            ])
            .query(query);

        let response = tokio::time::timeout(self.config.timeout, request.send())
            .await
            .map_err(|_| {
                QuaderError::Catalog(format!(
                    "Catalog request to `{url}` timed out after {:?}",
                    self.config.timeout
                ))
            })?
            .map_err(|e| QuaderError::Catalog(format!("Catalog unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuaderError::Catalog(format!(
                "Catalog request to `{url}` failed with status {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| QuaderError::Catalog(format!("Invalid catalog response: {e}")))
    }

    fn coerce_metadata(raw: BTreeMap<String, String>) -> Map<String, Value> {
        raw.into_iter().map(|(key, value)| (key, coerce_value(&value))).collect()
    }
}

#[async_trait]
impl CatalogService for GenesisClient {
    #[instrument(skip(self))]
    async fn entries(&self, prefix: Option<&str>) -> Result<Vec<CatalogEntry>> {
        let selection = prefix.map_or_else(|| "*".to_string(), |p| format!("{p}*"));
        let page_size = self.config.page_size.to_string();

        let response: CatalogListResponse = self
            .get_json(
                "catalogue/cubes",
                &[("selection", selection.as_str()), ("pagelength", page_size.as_str())],
            )
            .await?;

        if response.cubes.len() as u32 == self.config.page_size {
            return Err(QuaderError::Catalog(format!(
                "Cube list for `{selection}` exceeds one page ({} entries)",
                self.config.page_size
            )));
        }

        info!(count = response.cubes.len(), selection = %selection, "Fetched catalog entries");
        Ok(response
            .cubes
            .into_iter()
            .map(|dto| CatalogEntry { code: dto.code, stand: dto.stand, status: dto.status })
            .collect())
    }

    #[instrument(skip(self))]
    async fn cube_metadata(&self, name: &str) -> Result<CatalogEntry> {
        debug!(cube = name, "Obtaining catalog metadata for cube");
        let response: CatalogListResponse =
            self.get_json("catalogue/cubes", &[("selection", name), ("pagelength", "2")]).await?;

        let mut cubes = response.cubes;
        if cubes.len() > 1 {
            return Err(QuaderError::Catalog(format!(
                "Got more than one catalog entry for `{name}`"
            )));
        }
        let dto = cubes.pop().ok_or_else(|| {
            QuaderError::Catalog(format!("Cube `{name}` is not in the catalog"))
        })?;
        Ok(CatalogEntry { code: dto.code, stand: dto.stand, status: dto.status })
    }

    #[instrument(skip(self))]
    async fn download_cube(&self, name: &str) -> Result<CubePayload> {
        info!(cube = name, url = %self.config.base_url, "Downloading cube");
        let response: CubeFileResponse =
            self.get_json("data/cubefile", &[("name", name), ("format", "csv")]).await?;

        info!(cube = name, "Downloaded cube");
        Ok(CubePayload {
            download_metadata: Self::coerce_metadata(response.download),
            metadata: Self::coerce_metadata(response.metadata),
            data: response.data,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> GenesisClient {
        GenesisClient::new(GenesisClientConfig {
            base_url: server.uri(),
            username: "user".to_string(),
            password: "secret".to_string(),
            timeout: Duration::from_secs(5),
            page_size: 500,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_entries_with_prefix() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/catalogue/cubes"))
            .and(query_param("selection", "111*"))
            .and(query_param("username", "user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cubes": [
                    {"code": "11111BJ001", "stand": "01.01.2020", "status": "vollständig"},
                    {"code": "11111KJ001", "stand": "15.06.2020"}
                ]
            })))
            .mount(&server)
            .await;

        let entries = client_for(&server).entries(Some("111")).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].code, "11111BJ001");
        assert_eq!(entries[0].stand.as_deref(), Some("01.01.2020"));
        assert!(entries[1].status.is_none());
    }

    #[tokio::test]
    async fn test_entries_rejects_truncated_listing() {
        let server = MockServer::start().await;

        let cubes: Vec<_> =
            (0..3).map(|i| json!({"code": format!("1111{i}AB"), "stand": "01.01.2020"})).collect();
        Mock::given(method("GET"))
            .and(path("/catalogue/cubes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "cubes": cubes })))
            .mount(&server)
            .await;

        let mut config = GenesisClientConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
            ..Default::default()
        };
        config.page_size = 3;

        let result = GenesisClient::new(config).unwrap().entries(None).await;
        assert!(matches!(result, Err(QuaderError::Catalog(_))));
    }

    #[tokio::test]
    async fn test_cube_metadata_single_entry() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/catalogue/cubes"))
            .and(query_param("selection", "11111BJ001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cubes": [{"code": "11111BJ001", "stand": "01.01.2020"}]
            })))
            .mount(&server)
            .await;

        let entry = client_for(&server).cube_metadata("11111BJ001").await.unwrap();
        assert_eq!(entry.code, "11111BJ001");
        assert!(entry.stand_date().is_some());
    }

    #[tokio::test]
    async fn test_cube_metadata_missing_cube() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/catalogue/cubes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "cubes": [] })))
            .mount(&server)
            .await;

        let result = client_for(&server).cube_metadata("99999ZZ999").await;
        assert!(matches!(result, Err(QuaderError::Catalog(_))));
    }

    #[tokio::test]
    async fn test_download_cube_coerces_metadata() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/cubefile"))
            .and(query_param("name", "11111BJ001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "download": {"language": "de"},
                "metadata": {
                    "stand": "01.01.2020",
                    "werte": "42",
                    "inhalte": "[BEVZ01, BEVZ02]"
                },
                "data": "DLAND;JAHR;BEVZ01\n08;2015;1234\n"
            })))
            .mount(&server)
            .await;

        let payload = client_for(&server).download_cube("11111BJ001").await.unwrap();
        assert_eq!(payload.stand(), Some("01.01.2020"));
        assert_eq!(payload.metadata.get("werte"), Some(&json!(42)));
        assert_eq!(payload.metadata.get("inhalte"), Some(&json!(["BEVZ01", "BEVZ02"])));
        assert!(payload.data.starts_with("DLAND;JAHR;BEVZ01"));
    }

    #[tokio::test]
    async fn test_server_error_surfaces_as_catalog_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/catalogue/cubes"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = client_for(&server).entries(None).await;
        assert!(matches!(result, Err(QuaderError::Catalog(_))));
    }
}
