//! Client for Pinecone's environment-addressed REST API.
//!
//! Control-plane calls (`/actions/whoami`, `/databases`) go to
//! `https://controller.{environment}.pinecone.io`; data-plane calls go to the
//! index host `https://{index}-{project}.svc.{environment}.pinecone.io`.

use crate::call_context::CallContext;
use crate::error::ServiceError;
use crate::models::DeleteRequest;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};

pub const DEFAULT_DIMENSION: u32 = 1536;
const API_KEY_HEADER: &str = "Api-Key";

#[derive(Debug, Clone)]
pub struct PineconeSettings {
    pub api_key: String,
    pub environment: String,
    pub index_name: String,
    pub dimension: u32,
    pub controller_url: Option<String>,
    pub index_host: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WhoAmI {
    project_name: String,
}

pub struct PineconeService {
    client: Client,
    settings: PineconeSettings,
}

impl DeleteRequest {
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        let namespace = match self {
            DeleteRequest::All { namespace } => {
                body.insert("deleteAll".to_string(), Value::Bool(true));
                namespace
            }
            DeleteRequest::Ids { ids, namespace } => {
                body.insert("ids".to_string(), json!(ids));
                namespace
            }
        };
        if let Some(namespace) = namespace {
            body.insert("namespace".to_string(), Value::String(namespace.clone()));
        }
        Value::Object(body)
    }
}

impl PineconeService {
    pub fn new(client: Client, settings: PineconeSettings) -> Self {
        Self { client, settings }
    }

    pub async fn delete_vectors(
        &self,
        context: &CallContext,
        request: &DeleteRequest,
    ) -> Result<(), ServiceError> {
        let host = self.index_host(context).await?;
        let body = request.body();

        log::info!(
            "Deleting vectors from index {}: {}",
            self.settings.index_name,
            body
        );

        context
            .run(async {
                let response = self
                    .authorized(self.client.post(format!("{host}/vectors/delete")))
                    .json(&body)
                    .send()
                    .await?;
                check_status(response).await?;
                Ok::<_, ServiceError>(())
            })
            .await
    }

    /// Creates the configured index when it does not exist yet.
    ///
    /// Returns `true` when the index was created by this call.
    pub async fn ensure_index(&self, context: &CallContext) -> Result<bool, ServiceError> {
        let controller = self.controller_url();
        let name = &self.settings.index_name;

        context
            .run(async {
                let response = self
                    .authorized(self.client.get(format!("{controller}/databases")))
                    .send()
                    .await?;
                let indexes: Vec<String> = check_status(response).await?.json().await?;

                if indexes.iter().any(|existing| existing == name) {
                    log::info!("Pinecone index {} already exists", name);
                    return Ok::<_, ServiceError>(false);
                }

                log::info!(
                    "Creating Pinecone index {} (dimension {})",
                    name,
                    self.settings.dimension
                );
                let response = self
                    .authorized(self.client.post(format!("{controller}/databases")))
                    .json(&json!({
                        "name": name,
                        "dimension": self.settings.dimension,
                        "metric": "cosine"
                    }))
                    .send()
                    .await?;
                check_status(response).await?;
                Ok::<_, ServiceError>(true)
            })
            .await
    }

    fn controller_url(&self) -> String {
        match &self.settings.controller_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!(
                "https://controller.{}.pinecone.io",
                self.settings.environment
            ),
        }
    }

    async fn index_host(&self, context: &CallContext) -> Result<String, ServiceError> {
        if let Some(host) = &self.settings.index_host {
            return Ok(host.trim_end_matches('/').to_string());
        }

        let controller = self.controller_url();
        let whoami: WhoAmI = context
            .run(async {
                let response = self
                    .authorized(self.client.get(format!("{controller}/actions/whoami")))
                    .send()
                    .await?;
                let whoami: WhoAmI = check_status(response).await?.json().await?;
                Ok::<_, ServiceError>(whoami)
            })
            .await?;

        Ok(format!(
            "https://{}-{}.svc.{}.pinecone.io",
            self.settings.index_name, whoami.project_name, self.settings.environment
        ))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(API_KEY_HEADER, &self.settings.api_key)
    }
}

async fn check_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    log::error!("Pinecone error ({}): {}", status, body);
    Err(ServiceError::Remote {
        status: status.as_u16(),
        body,
    })
}
