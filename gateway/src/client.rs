//! reqwest implementation of [`BackendGateway`].

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use serde_json::{json, Value};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::gateway::BackendGateway;
use crate::http::{build_client, read_json};
use crate::types::{
    list_items, AudioClip, CommandResponse, RelationRecord, StatusResponse, TextCommandRequest,
};

/// Gateway that talks JSON over HTTP to the commerce backend.
pub struct HttpGateway {
    config: GatewayConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.config.base_url)
            .field("authenticated", &self.config.token.is_some())
            .finish()
    }
}

impl HttpGateway {
    /// Create a gateway after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] if the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        config.validate()?;
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }

    /// Returns the gateway configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.authorization() {
            Some(value) => request.header(reqwest::header::AUTHORIZATION, value),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, GatewayError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| GatewayError::from_reqwest(&e))?;
        read_json(response).await
    }

    fn decode_command(body: Value) -> Result<CommandResponse, GatewayError> {
        serde_json::from_value(body)
            .map_err(|e| GatewayError::Decode(format!("invalid command response: {e}")))
    }
}

#[async_trait]
impl BackendGateway for HttpGateway {
    async fn status(&self) -> Result<StatusResponse, GatewayError> {
        let url = self.config.endpoint(&self.config.status_path);
        let body = self
            .send(
                self.client
                    .get(&url)
                    .header(reqwest::header::CACHE_CONTROL, "no-store"),
            )
            .await?;
        serde_json::from_value(body)
            .map_err(|e| GatewayError::Decode(format!("invalid status response: {e}")))
    }

    async fn submit_text(
        &self,
        request: &TextCommandRequest,
    ) -> Result<CommandResponse, GatewayError> {
        let url = self.config.endpoint(&self.config.text_command_path);
        tracing::trace!(usar_ia = request.usar_ia, comando = %request.comando, "submitting text command");
        let body = self.send(self.client.post(&url).json(request)).await?;
        Self::decode_command(body)
    }

    async fn submit_audio(&self, clip: &AudioClip) -> Result<CommandResponse, GatewayError> {
        let url = self.config.endpoint(&self.config.audio_command_path);
        let part = Part::bytes(clip.payload.to_vec()).file_name(clip.filename.clone());
        let form = Form::new().part("audio", part);
        tracing::trace!(bytes = clip.payload.len(), filename = %clip.filename, "submitting audio command");
        let body = self.send(self.client.post(&url).multipart(form)).await?;
        Self::decode_command(body)
    }

    async fn create_relation(
        &self,
        owner_id: u64,
        member_id: u64,
    ) -> Result<RelationRecord, GatewayError> {
        let fields = &self.config.relation_fields;
        let url = self.config.endpoint(&self.config.relation_path);
        let mut payload = serde_json::Map::new();
        payload.insert(fields.member_id.clone(), json!(member_id));
        payload.insert(fields.owner_id.clone(), json!(owner_id));

        let body = self
            .send(self.client.post(&url).json(&Value::Object(payload)))
            .await?;
        RelationRecord::from_wire(&body, fields).map_err(|e| {
            GatewayError::Decode(format!(
                "invalid server response while creating relation: {}",
                e.message()
            ))
        })
    }

    async fn delete_relation(&self, relation_id: u64) -> Result<(), GatewayError> {
        let url = self.config.relation_item(relation_id);
        self.send(self.client.delete(&url)).await?;
        Ok(())
    }

    async fn list_relations(&self, owner_id: u64) -> Result<Vec<RelationRecord>, GatewayError> {
        let fields = &self.config.relation_fields;
        let url = self.config.endpoint(&self.config.relation_path);
        let body = self
            .send(
                self.client
                    .get(&url)
                    .query(&[(fields.owner_filter.as_str(), owner_id)]),
            )
            .await?;
        list_items(body)?
            .iter()
            .map(|item| RelationRecord::from_wire(item, fields))
            .collect()
    }

    fn name(&self) -> &str {
        "http"
    }
}
