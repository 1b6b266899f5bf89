//! Worker thread: owns the engine and serves requests strictly in arrival
//! order, each one to completion before the next is read.
//!
//! The engine is created inside the thread. Requests arrive on an `mpsc`
//! channel and every request gets exactly one reply on the response
//! channel, carrying the request's id.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use dcc_core::data::DataStore;
use dcc_sim::engine::EngineConfig;
use dcc_sim::CampaignEngine;

use crate::error::WorkerError;
use crate::state::{Envelope, WorkerRequest, WorkerResponse};

/// Host side of a running worker.
pub struct WorkerHandle {
    requests: mpsc::Sender<Envelope<WorkerRequest>>,
    responses: mpsc::Receiver<Envelope<WorkerResponse>>,
    thread: Option<JoinHandle<()>>,
    next_id: u64,
}

/// Spawn the worker thread with a fresh, inactive engine.
pub fn spawn_worker(
    config: EngineConfig,
    data: Arc<DataStore>,
) -> Result<WorkerHandle, WorkerError> {
    let (request_tx, request_rx) = mpsc::channel::<Envelope<WorkerRequest>>();
    let (response_tx, response_rx) = mpsc::channel::<Envelope<WorkerResponse>>();

    let thread = std::thread::Builder::new()
        .name("dcc-campaign-worker".into())
        .spawn(move || run_worker(config, data, request_rx, response_tx))
        .map_err(WorkerError::Spawn)?;

    Ok(WorkerHandle {
        requests: request_tx,
        responses: response_rx,
        thread: Some(thread),
        next_id: 1,
    })
}

impl WorkerHandle {
    /// Queue a request without waiting for its reply.
    pub fn send(&self, envelope: Envelope<WorkerRequest>) -> Result<(), WorkerError> {
        self.requests
            .send(envelope)
            .map_err(|_| WorkerError::Disconnected)
    }

    /// Next reply, in request order.
    pub fn recv(&self) -> Result<Envelope<WorkerResponse>, WorkerError> {
        self.responses.recv().map_err(|_| WorkerError::Disconnected)
    }

    /// Send one request and wait for its reply.
    pub fn request(&mut self, request: WorkerRequest) -> Result<WorkerResponse, WorkerError> {
        let id = self.next_id;
        self.next_id += 1;
        self.send(Envelope::new(id, request))?;
        let reply = self.recv()?;
        debug_assert_eq!(reply.id, id);
        Ok(reply.body)
    }

    /// Ask the worker to stop and wait for the thread to finish.
    pub fn shutdown(mut self) -> Result<(), WorkerError> {
        if self.request(WorkerRequest::Shutdown).is_err() {
            tracing::debug!(target: "dcc::worker", "worker already stopped");
        }
        self.join();
        Ok(())
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!(target: "dcc::worker", "worker thread panicked");
            }
        }
    }
}

/// The worker loop. Runs until Shutdown or until either channel closes.
fn run_worker(
    config: EngineConfig,
    data: Arc<DataStore>,
    requests: mpsc::Receiver<Envelope<WorkerRequest>>,
    responses: mpsc::Sender<Envelope<WorkerResponse>>,
) {
    let mut engine = CampaignEngine::new(config.clone(), data.clone());
    tracing::info!(target: "dcc::worker", seed = config.seed, "worker started");

    while let Ok(Envelope { id, body }) = requests.recv() {
        let shutdown = matches!(body, WorkerRequest::Shutdown);
        let reply = handle_request(&mut engine, &config, &data, body);
        if responses.send(Envelope::new(id, reply)).is_err() || shutdown {
            break;
        }
    }
    tracing::info!(target: "dcc::worker", "worker stopped");
}

/// Serve one request against `engine`.
pub fn handle_request(
    engine: &mut CampaignEngine,
    config: &EngineConfig,
    data: &Arc<DataStore>,
    request: WorkerRequest,
) -> WorkerResponse {
    match request {
        WorkerRequest::Command { command } => match engine.handle_command(command) {
            Ok(outcome) => WorkerResponse::Outcome {
                outcome,
                events: engine.drain_events(),
            },
            Err(err) => {
                // Events raised before the failure stay queued for the next command.
                err.into()
            }
        },
        WorkerRequest::State => match engine.state() {
            Ok(state) => WorkerResponse::State {
                state: Box::new(state),
            },
            Err(err) => err.into(),
        },
        WorkerRequest::Snapshot => match engine.snapshot() {
            Ok(snapshot) => WorkerResponse::Snapshot { snapshot },
            Err(err) => err.into(),
        },
        WorkerRequest::RestoreWorld { snapshot } => match engine.restore_world(&snapshot) {
            Ok(()) => WorkerResponse::Restored,
            Err(err) => err.into(),
        },
        WorkerRequest::LoadSave { save } => {
            match CampaignEngine::restore(config.clone(), data.clone(), &save) {
                Ok(restored) => {
                    *engine = restored;
                    WorkerResponse::Restored
                }
                Err(err) => err.into(),
            }
        }
        WorkerRequest::Shutdown => WorkerResponse::ShuttingDown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcc_core::commands::CampaignCommand;
    use dcc_core::enums::{AiSkill, Coalition, Task};
    use dcc_core::events::CampaignEvent;
    use dcc_sim::engine::CommandOutcome;

    use crate::state::ErrorKind;

    fn worker() -> WorkerHandle {
        let data = Arc::new(DataStore::builtin().unwrap());
        spawn_worker(EngineConfig::default(), data).unwrap()
    }

    fn activate() -> WorkerRequest {
        WorkerRequest::Command {
            command: CampaignCommand::Activate {
                blue_faction: "USA 1977".to_string(),
                red_faction: "Russia 1984".to_string(),
                ai_skill: AiSkill::Good,
                hardcore: false,
                scenario: None,
            },
        }
    }

    #[test]
    fn test_replies_in_request_order() {
        let handle = worker();
        handle.send(Envelope::new(10, WorkerRequest::State)).unwrap();
        handle.send(Envelope::new(11, activate())).unwrap();
        handle.send(Envelope::new(12, WorkerRequest::Snapshot)).unwrap();

        let ids: Vec<u64> = (0..3).map(|_| handle.recv().unwrap().id).collect();
        assert_eq!(ids, vec![10, 11, 12]);
        handle.shutdown().unwrap();
    }

    #[test]
    fn test_command_outcome_carries_events() {
        let mut handle = worker();
        let WorkerResponse::Outcome { outcome, events } = handle.request(activate()).unwrap()
        else {
            panic!("expected an outcome");
        };
        assert_eq!(outcome, CommandOutcome::Done);
        assert!(events
            .iter()
            .any(|e| matches!(e, CampaignEvent::PackageCreated { .. })));

        let WorkerResponse::State { state } = handle.request(WorkerRequest::State).unwrap() else {
            panic!("expected a state view");
        };
        assert!(state.active);
        handle.shutdown().unwrap();
    }

    #[test]
    fn test_errors_do_not_stop_worker() {
        let mut handle = worker();
        let reply = handle
            .request(WorkerRequest::Command {
                command: CampaignCommand::GeneratePackage {
                    coalition: Coalition::Blue,
                    task: Task::Cap,
                },
            })
            .unwrap();
        assert!(matches!(
            reply,
            WorkerResponse::Error {
                kind: ErrorKind::Inactive,
                ..
            }
        ));

        // Still serving.
        let reply = handle.request(activate()).unwrap();
        assert!(matches!(reply, WorkerResponse::Outcome { .. }));
        handle.shutdown().unwrap();
    }

    #[test]
    fn test_load_save_replaces_campaign() {
        let mut handle = worker();
        handle.request(activate()).unwrap();
        let WorkerResponse::Outcome {
            outcome: CommandOutcome::Saved { save },
            ..
        } = handle
            .request(WorkerRequest::Command {
                command: CampaignCommand::SaveCampaignRound,
            })
            .unwrap()
        else {
            panic!("expected save data");
        };
        handle
            .request(WorkerRequest::Command {
                command: CampaignCommand::Reset,
            })
            .unwrap();

        assert_eq!(
            handle.request(WorkerRequest::LoadSave { save }).unwrap(),
            WorkerResponse::Restored
        );
        let WorkerResponse::State { state } = handle.request(WorkerRequest::State).unwrap() else {
            panic!("expected a state view");
        };
        assert!(state.active);
        assert_eq!(state.round, 1);
        handle.shutdown().unwrap();
    }

    #[test]
    fn test_requests_after_shutdown_fail() {
        let mut handle = worker();
        assert_eq!(
            handle.request(WorkerRequest::Shutdown).unwrap(),
            WorkerResponse::ShuttingDown
        );
        handle.join();
        assert!(matches!(
            handle.request(WorkerRequest::State),
            Err(WorkerError::Disconnected)
        ));
    }
}
