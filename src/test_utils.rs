//! Shared test utilities: a scripted in-memory [`BackendGateway`].
//!
//! Every call is recorded in order before its scripted reply is produced,
//! so tests can assert on call order even for calls that never complete.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use commerce_gateway::{
    AudioClip, BackendGateway, CommandResponse, GatewayError, RelationRecord, ReportPayload,
    StatusResponse, TextCommandRequest,
};

/// One recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Status,
    Text { comando: String, usar_ia: bool },
    Audio { filename: String, bytes: usize },
    Create { owner_id: u64, member_id: u64 },
    Delete { relation_id: u64 },
    List { owner_id: u64 },
}

/// Scripted reply for a command endpoint.
#[derive(Debug, Clone)]
pub enum Reply {
    Respond(CommandResponse),
    Fail(GatewayError),
    /// Never resolves.
    Hang,
    /// Resolves with the response after the delay.
    Delayed(Duration, CommandResponse),
}

/// Successful interpreter response with a small report.
pub fn ok_response(interpreted: &str) -> CommandResponse {
    CommandResponse {
        success: true,
        comando_procesado: Some(interpreted.to_owned()),
        reporte: Some(ReportPayload::default()),
        ..Default::default()
    }
}

/// Interpreter response with `success: false`.
pub fn error_response(message: &str) -> CommandResponse {
    CommandResponse {
        success: false,
        error: Some(message.to_owned()),
        ..Default::default()
    }
}

pub struct MockGateway {
    calls: Mutex<Vec<GatewayCall>>,
    status: Result<StatusResponse, GatewayError>,
    status_delay: Option<Duration>,
    ai_text: Reply,
    local_text: Reply,
    audio: Reply,
    create_failures: HashMap<u64, GatewayError>,
    existing: Result<Vec<RelationRecord>, GatewayError>,
    delete_failures: HashSet<u64>,
    next_id: AtomicU64,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    /// AI unavailable, every interpreter succeeds, every relation call succeeds.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            status: Ok(StatusResponse::default()),
            status_delay: None,
            ai_text: Reply::Respond(ok_response("ai")),
            local_text: Reply::Respond(ok_response("local")),
            audio: Reply::Respond(ok_response("audio")),
            create_failures: HashMap::new(),
            existing: Ok(Vec::new()),
            delete_failures: HashSet::new(),
            next_id: AtomicU64::new(1000),
        }
    }

    pub fn ai_available(mut self, available: bool) -> Self {
        self.status = Ok(StatusResponse {
            success: Some(true),
            status: None,
            ia_disponible: available,
        });
        self
    }

    pub fn status_error(mut self, err: GatewayError) -> Self {
        self.status = Err(err);
        self
    }

    pub fn status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = Some(delay);
        self
    }

    pub fn ai_reply(mut self, reply: Reply) -> Self {
        self.ai_text = reply;
        self
    }

    pub fn local_reply(mut self, reply: Reply) -> Self {
        self.local_text = reply;
        self
    }

    pub fn audio_reply(mut self, reply: Reply) -> Self {
        self.audio = reply;
        self
    }

    pub fn fail_create(mut self, member_id: u64, err: GatewayError) -> Self {
        self.create_failures.insert(member_id, err);
        self
    }

    pub fn existing_relations(mut self, records: Vec<RelationRecord>) -> Self {
        self.existing = Ok(records);
        self
    }

    pub fn list_error(mut self, err: GatewayError) -> Self {
        self.existing = Err(err);
        self
    }

    pub fn fail_delete(mut self, relation_id: u64) -> Self {
        self.delete_failures.insert(relation_id);
        self
    }

    /// All calls so far, in issue order.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&GatewayCall) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().expect("calls lock").push(call);
    }

    async fn play(reply: &Reply) -> Result<CommandResponse, GatewayError> {
        match reply {
            Reply::Respond(resp) => Ok(resp.clone()),
            Reply::Fail(err) => Err(err.clone()),
            Reply::Hang => std::future::pending().await,
            Reply::Delayed(delay, resp) => {
                tokio::time::sleep(*delay).await;
                Ok(resp.clone())
            }
        }
    }
}

/// Relation record fixture.
pub fn record(id: u64, owner_id: u64, member_id: u64) -> RelationRecord {
    RelationRecord {
        id,
        owner_id,
        member_id,
        created_at: None,
    }
}

#[async_trait]
impl BackendGateway for MockGateway {
    async fn status(&self) -> Result<StatusResponse, GatewayError> {
        self.record(GatewayCall::Status);
        if let Some(delay) = self.status_delay {
            tokio::time::sleep(delay).await;
        }
        self.status.clone()
    }

    async fn submit_text(
        &self,
        request: &TextCommandRequest,
    ) -> Result<CommandResponse, GatewayError> {
        self.record(GatewayCall::Text {
            comando: request.comando.clone(),
            usar_ia: request.usar_ia,
        });
        if request.usar_ia {
            Self::play(&self.ai_text).await
        } else {
            Self::play(&self.local_text).await
        }
    }

    async fn submit_audio(&self, clip: &AudioClip) -> Result<CommandResponse, GatewayError> {
        self.record(GatewayCall::Audio {
            filename: clip.filename.clone(),
            bytes: clip.payload.len(),
        });
        Self::play(&self.audio).await
    }

    async fn create_relation(
        &self,
        owner_id: u64,
        member_id: u64,
    ) -> Result<RelationRecord, GatewayError> {
        self.record(GatewayCall::Create {
            owner_id,
            member_id,
        });
        // Yield so bounded-parallel runs genuinely interleave.
        tokio::task::yield_now().await;
        if let Some(err) = self.create_failures.get(&member_id) {
            return Err(err.clone());
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(record(id, owner_id, member_id))
    }

    async fn delete_relation(&self, relation_id: u64) -> Result<(), GatewayError> {
        self.record(GatewayCall::Delete { relation_id });
        if self.delete_failures.contains(&relation_id) {
            return Err(GatewayError::Status {
                status: 404,
                message: "No encontrado.".into(),
                from_body: true,
            });
        }
        Ok(())
    }

    async fn list_relations(&self, owner_id: u64) -> Result<Vec<RelationRecord>, GatewayError> {
        self.record(GatewayCall::List { owner_id });
        self.existing.clone()
    }

    fn name(&self) -> &str {
        "mock"
    }
}
