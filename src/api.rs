// API client module: a small blocking HTTP client for the three Workato
// endpoints the provisioner needs. Calls are issued one at a time, so the
// synchronous reqwest client is all we need.

use crate::error::{ProvisionError, Result};
use crate::structure::{Properties, RecipeSpec};
use anyhow::Context;
use log::debug;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default API root; override with `WORKATO_API_URL`.
pub const DEFAULT_BASE_URL: &str = "https://www.workato.com/api";
pub const BASE_URL_ENV: &str = "WORKATO_API_URL";

/// The calls the provisioner makes against the platform. `ApiClient` is the
/// real implementation; tests substitute an in-memory one.
pub trait WorkatoApi {
    /// Create a folder and return its assigned ID.
    fn create_folder(&self, req: &CreateFolderRequest) -> Result<u64>;
    /// Create a recipe and return its assigned ID.
    fn create_recipe(&self, req: &CreateRecipeRequest) -> Result<u64>;
    /// Replace the project's properties with `req.properties`.
    fn upsert_properties(&self, project_id: u64, req: &PropertiesRequest) -> Result<()>;
}

/// Body of `POST /folders`. `parent_id` is omitted for top-level folders.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CreateFolderRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
}

/// Body of `POST /recipes`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CreateRecipeRequest {
    pub recipe: RecipePayload,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RecipePayload {
    pub name: String,
    pub code: Value,
    pub config: Value,
    /// The API expects the folder ID as a string here.
    pub folder_id: String,
    pub description: Option<String>,
}

impl CreateRecipeRequest {
    pub fn new(recipe: &RecipeSpec, folder_id: u64) -> Self {
        CreateRecipeRequest {
            recipe: RecipePayload {
                name: recipe.name.clone(),
                code: recipe.code.clone(),
                config: recipe.config.clone(),
                folder_id: folder_id.to_string(),
                description: recipe.description.clone(),
            },
        }
    }
}

/// Body of `POST /properties?project_id=...`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PropertiesRequest {
    pub properties: Properties,
}

/// Both create endpoints answer with the new resource's ID.
#[derive(Deserialize, Debug)]
struct Created {
    id: u64,
}

/// Blocking client holding one connection pool for the whole run, with the
/// bearer token installed as a default header.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for `base_url` authenticated with `token`.
    pub fn new(base_url: &str, token: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .context("API token contains characters not allowed in a header")?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create an ApiClient for the URL in `WORKATO_API_URL`, falling back to
    /// the public Workato endpoint.
    pub fn from_env(token: &str) -> anyhow::Result<Self> {
        let base_url = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        Self::new(&base_url, token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// Anything but a 200 is a failure; the body text is kept as the detail.
fn check_status(res: Response) -> Result<String> {
    let status = res.status();
    let body = res.text()?;
    if status != reqwest::StatusCode::OK {
        return Err(ProvisionError::ApiCallFailed {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

fn parse_created(body: String) -> Result<u64> {
    match serde_json::from_str::<Created>(&body) {
        Ok(created) => Ok(created.id),
        Err(_) => Err(ProvisionError::ApiCallFailed { status: 200, body }),
    }
}

impl WorkatoApi for ApiClient {
    fn create_folder(&self, req: &CreateFolderRequest) -> Result<u64> {
        let url = self.url("folders");
        debug!("POST {} name={:?} parent_id={:?}", url, req.name, req.parent_id);
        let res = self.client.post(&url).json(req).send()?;
        parse_created(check_status(res)?)
    }

    fn create_recipe(&self, req: &CreateRecipeRequest) -> Result<u64> {
        let url = self.url("recipes");
        debug!("POST {} name={:?} folder_id={}", url, req.recipe.name, req.recipe.folder_id);
        let res = self.client.post(&url).json(req).send()?;
        parse_created(check_status(res)?)
    }

    fn upsert_properties(&self, project_id: u64, req: &PropertiesRequest) -> Result<()> {
        let url = self.url("properties");
        debug!("POST {} project_id={} ({} keys)", url, project_id, req.properties.len());
        let res = self
            .client
            .post(&url)
            .query(&[("project_id", project_id)])
            .json(req)
            .send()?;
        check_status(res)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn folder_payload_omits_missing_parent() {
        let root = CreateFolderRequest { name: "Root".into(), parent_id: None };
        assert_eq!(serde_json::to_value(&root).unwrap(), json!({"name": "Root"}));

        let child = CreateFolderRequest { name: "A".into(), parent_id: Some(7) };
        assert_eq!(
            serde_json::to_value(&child).unwrap(),
            json!({"name": "A", "parent_id": 7})
        );
    }

    #[test]
    fn recipe_payload_sends_folder_id_as_string() {
        let recipe = RecipeSpec {
            name: "R1".into(),
            code: json!({"trigger": "scheduler"}),
            config: json!([]),
            description: None,
        };
        let req = CreateRecipeRequest::new(&recipe, 3);

        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "recipe": {
                    "name": "R1",
                    "code": {"trigger": "scheduler"},
                    "config": [],
                    "folder_id": "3",
                    "description": null
                }
            })
        );
    }

    #[test]
    fn created_id_is_parsed_or_reported_with_body() {
        assert_eq!(parse_created(r#"{"id": 42, "name": "x"}"#.into()).unwrap(), 42);

        match parse_created("<html>oops</html>".into()) {
            Err(ProvisionError::ApiCallFailed { status, body }) => {
                assert_eq!(status, 200);
                assert_eq!(body, "<html>oops</html>");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn client_trims_trailing_slash_from_base_url() {
        let api = ApiClient::new("http://localhost:9000/api/", "secret").unwrap();
        assert_eq!(api.base_url(), "http://localhost:9000/api");
        assert_eq!(api.url("folders"), "http://localhost:9000/api/folders");
    }

    #[test]
    fn client_rejects_token_with_newline() {
        assert!(ApiClient::new(DEFAULT_BASE_URL, "abc\ndef").is_err());
    }
}
