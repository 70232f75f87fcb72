use crate::call_context::CallContext;
use crate::error::ServiceError;
use crate::models::TrainPayload;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde_json::Value;

pub const MODEL_NAME: &str = "gpt-3.5-turbo";
pub const TEMPERATURE: &str = "1";

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub url: String,
    pub bearer_token: String,
    /// Forwarded as `openAIApiKey` on uploads when configured.
    pub llm_api_key: Option<String>,
}

/// Client for the private AI engine that trains on documents and answers questions.
pub struct EngineService {
    client: Client,
    settings: EngineSettings,
}

impl EngineService {
    pub fn new(client: Client, settings: EngineSettings) -> Self {
        Self { client, settings }
    }

    /// Uploads a document together with the question the engine should answer about it.
    pub async fn train(
        &self,
        context: &CallContext,
        payload: TrainPayload,
    ) -> Result<Value, ServiceError> {
        log::info!(
            "Sending {} ({} bytes) to the AI engine",
            payload.file_name,
            payload.bytes.len()
        );

        let form = self.build_form(payload)?;

        context
            .run(async {
                let response = self
                    .client
                    .post(&self.settings.url)
                    .bearer_auth(&self.settings.bearer_token)
                    .multipart(form)
                    .send()
                    .await?;

                read_body(response).await
            })
            .await
    }

    /// Forwards a JSON query body and returns the engine's answer untouched.
    pub async fn query(&self, context: &CallContext, body: &Value) -> Result<Value, ServiceError> {
        context
            .run(async {
                let response = self
                    .client
                    .post(&self.settings.url)
                    .bearer_auth(&self.settings.bearer_token)
                    .json(body)
                    .send()
                    .await?;

                read_body(response).await
            })
            .await
    }

    fn build_form(&self, payload: TrainPayload) -> Result<Form, ServiceError> {
        let file = Part::bytes(payload.bytes)
            .file_name(payload.file_name)
            .mime_str(&payload.content_type)?;

        let mut form = Form::new().part("files", file);
        if let Some(api_key) = &self.settings.llm_api_key {
            form = form.text("openAIApiKey", api_key.clone());
        }

        Ok(form
            .text("modelName", MODEL_NAME)
            .text("temperature", TEMPERATURE)
            .text("question", payload.question))
    }
}

async fn read_body(response: Response) -> Result<Value, ServiceError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        log::error!("AI engine error ({}): {}", status, body);
        return Err(ServiceError::Remote {
            status: status.as_u16(),
            body,
        });
    }

    // Non-JSON answers are relayed as a JSON string.
    match serde_json::from_str(&body) {
        Ok(value) => Ok(value),
        Err(_) => Ok(Value::String(body)),
    }
}
