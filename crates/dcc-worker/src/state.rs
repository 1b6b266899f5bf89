//! Messages exchanged between the host and the worker thread.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use dcc_core::commands::CampaignCommand;
use dcc_core::events::CampaignEvent;
use dcc_core::state::CampaignStateView;
use dcc_sim::engine::CommandOutcome;
use dcc_sim::serialization::{SaveData, Snapshot};
use dcc_sim::CampaignError;

/// Request from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "request")]
pub enum WorkerRequest {
    /// Run one engine command to completion.
    Command { command: CampaignCommand },
    /// Current campaign state view.
    State,
    /// Serialized registry.
    Snapshot,
    /// Replace the registry with a snapshot; the campaign is kept.
    RestoreWorld { snapshot: Snapshot },
    /// Replace the whole campaign with a save.
    LoadSave { save: Box<SaveData> },
    /// Stop the worker thread after replying.
    Shutdown,
}

/// Worker reply to exactly one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "response")]
pub enum WorkerResponse {
    Outcome {
        outcome: CommandOutcome,
        /// Events raised while the command ran.
        events: Vec<CampaignEvent>,
    },
    State { state: Box<CampaignStateView> },
    Snapshot { snapshot: Snapshot },
    Restored,
    Error { kind: ErrorKind, message: String },
    ShuttingDown,
}

impl WorkerResponse {
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        WorkerResponse::Error {
            kind,
            message: message.into(),
        }
    }
}

impl From<CampaignError> for WorkerResponse {
    fn from(err: CampaignError) -> Self {
        WorkerResponse::error(ErrorKind::from(&err), err.to_string())
    }
}

/// Error class reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Configuration,
    NotFound,
    WrongEntityType,
    Inactive,
    InvalidRequest,
    Snapshot,
    /// The request line itself could not be decoded.
    Protocol,
}

impl From<&CampaignError> for ErrorKind {
    fn from(err: &CampaignError) -> Self {
        match err {
            CampaignError::Configuration(_) => ErrorKind::Configuration,
            CampaignError::NotFound(_) => ErrorKind::NotFound,
            CampaignError::WrongEntityType { .. } => ErrorKind::WrongEntityType,
            CampaignError::Inactive => ErrorKind::Inactive,
            CampaignError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            CampaignError::Snapshot(_) => ErrorKind::Snapshot,
        }
    }
}

/// Correlates a reply with its request.
///
/// The body's fields sit beside `id` on the wire. Decoding goes through a
/// `serde_json::Value` so that map keys inside the body (entity ids) are
/// parsed by the body's own types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "RawEnvelope",
    bound(deserialize = "T: DeserializeOwned")
)]
pub struct Envelope<T> {
    pub id: u64,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Envelope<T> {
    pub fn new(id: u64, body: T) -> Self {
        Self { id, body }
    }
}

#[derive(Deserialize)]
struct RawEnvelope {
    id: u64,
    #[serde(flatten)]
    body: serde_json::Value,
}

impl<T: DeserializeOwned> TryFrom<RawEnvelope> for Envelope<T> {
    type Error = serde_json::Error;

    fn try_from(raw: RawEnvelope) -> Result<Self, Self::Error> {
        Ok(Envelope::new(raw.id, serde_json::from_value(raw.body)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcc_core::enums::{Coalition, Task};
    use dcc_core::types::EntityId;

    #[test]
    fn test_request_wire_format() {
        let request: Envelope<WorkerRequest> = serde_json::from_str(
            r#"{"id":7,"request":"Command","command":{"type":"GeneratePackage","coalition":"red","task":"CAS"}}"#,
        )
        .unwrap();
        assert_eq!(request.id, 7);
        assert_eq!(
            request.body,
            WorkerRequest::Command {
                command: CampaignCommand::GeneratePackage {
                    coalition: Coalition::Red,
                    task: Task::Cas,
                }
            }
        );

        let state: Envelope<WorkerRequest> =
            serde_json::from_str(r#"{"id":8,"request":"State"}"#).unwrap();
        assert_eq!(state.body, WorkerRequest::State);
    }

    #[test]
    fn test_error_kinds() {
        let response = WorkerResponse::from(CampaignError::NotFound(EntityId(3)));
        let WorkerResponse::Error { kind, message } = response else {
            panic!("expected an error response");
        };
        assert_eq!(kind, ErrorKind::NotFound);
        assert_eq!(message, "entity #3 not found");

        assert_eq!(ErrorKind::from(&CampaignError::Inactive), ErrorKind::Inactive);
    }

    #[test]
    fn test_every_response_decodes_from_its_line() {
        use std::sync::Arc;

        use dcc_core::data::DataStore;
        use dcc_core::enums::AiSkill;
        use dcc_sim::engine::EngineConfig;
        use dcc_sim::CampaignEngine;

        let data = Arc::new(DataStore::builtin().unwrap());
        let mut engine = CampaignEngine::new(EngineConfig::default(), data);
        let outcome = engine
            .handle_command(CampaignCommand::Activate {
                blue_faction: "USA 1977".to_string(),
                red_faction: "Russia 1984".to_string(),
                ai_skill: AiSkill::Good,
                hardcore: false,
                scenario: None,
            })
            .unwrap();
        let events = engine.drain_events();
        assert!(!events.is_empty());

        let state = engine.state().unwrap();
        let blue = state.blue_faction.as_ref().unwrap();
        assert!(!blue.inventory.aircrafts.is_empty());
        let saved = engine
            .handle_command(CampaignCommand::SaveCampaignRound)
            .unwrap();

        let responses = vec![
            WorkerResponse::Outcome { outcome, events },
            WorkerResponse::Outcome {
                outcome: saved,
                events: Vec::new(),
            },
            WorkerResponse::State {
                state: Box::new(state),
            },
            WorkerResponse::Snapshot {
                snapshot: engine.snapshot().unwrap(),
            },
            WorkerResponse::Restored,
            WorkerResponse::from(CampaignError::Inactive),
            WorkerResponse::ShuttingDown,
        ];
        for (id, response) in responses.into_iter().enumerate() {
            let envelope = Envelope::new(id as u64, response);
            let line = serde_json::to_string(&envelope).unwrap();
            let decoded: Envelope<WorkerResponse> = serde_json::from_str(&line).unwrap();
            assert_eq!(decoded, envelope);
        }
    }

    #[test]
    fn test_response_wire_format() {
        let json = serde_json::to_value(Envelope::new(2, WorkerResponse::Restored)).unwrap();
        assert_eq!(json, serde_json::json!({"id": 2, "response": "Restored"}));
    }
}
