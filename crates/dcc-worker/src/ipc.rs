//! JSON-lines transport for the worker protocol.
//!
//! One request per input line, one response per output line, both as
//! [`Envelope`] objects. Blank lines are ignored. A line that does not
//! decode gets a `Protocol` error reply carrying the id when one could be
//! read, 0 otherwise.

use std::io::{BufRead, Write};

use serde::Serialize;

use crate::error::WorkerError;
use crate::state::{Envelope, ErrorKind, WorkerRequest, WorkerResponse};
use crate::worker::WorkerHandle;

/// Decode one request line.
pub fn decode_request(line: &str) -> Result<Envelope<WorkerRequest>, Envelope<WorkerResponse>> {
    serde_json::from_str(line).map_err(|err| {
        let id = serde_json::from_str::<serde_json::Value>(line)
            .ok()
            .and_then(|v| v.get("id").and_then(|id| id.as_u64()))
            .unwrap_or(0);
        Envelope::new(id, WorkerResponse::error(ErrorKind::Protocol, err.to_string()))
    })
}

/// Write one message as a single line and flush.
pub fn write_line<W: Write, T: Serialize>(writer: &mut W, message: &T) -> Result<(), WorkerError> {
    serde_json::to_writer(&mut *writer, message)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Relay requests from `reader` to the worker until input ends or a
/// Shutdown request has been answered. Returns the number of requests
/// served.
pub fn serve<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    worker: &WorkerHandle,
) -> Result<u64, WorkerError> {
    let mut served = 0;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let request = match decode_request(&line) {
            Ok(request) => request,
            Err(reply) => {
                tracing::warn!(target: "dcc::ipc", id = reply.id, "undecodable request");
                write_line(writer, &reply)?;
                continue;
            }
        };

        let shutdown = matches!(request.body, WorkerRequest::Shutdown);
        worker.send(request)?;
        let reply = worker.recv()?;
        write_line(writer, &reply)?;
        served += 1;
        if shutdown {
            break;
        }
    }
    Ok(served)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use dcc_core::data::DataStore;
    use dcc_sim::engine::EngineConfig;

    use super::*;
    use crate::worker::spawn_worker;

    fn replies(output: &[u8]) -> Vec<Envelope<WorkerResponse>> {
        String::from_utf8(output.to_vec())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_decode_failure_keeps_id() {
        let reply = decode_request(r#"{"id": 5, "request": "Teleport"}"#).unwrap_err();
        assert_eq!(reply.id, 5);
        assert!(matches!(
            reply.body,
            WorkerResponse::Error {
                kind: ErrorKind::Protocol,
                ..
            }
        ));

        let reply = decode_request("not json").unwrap_err();
        assert_eq!(reply.id, 0);
    }

    #[test]
    fn test_serve_json_lines() {
        let data = Arc::new(DataStore::builtin().unwrap());
        let worker = spawn_worker(EngineConfig::default(), data).unwrap();
        let input = concat!(
            r#"{"id":1,"request":"Command","command":{"type":"Activate","blue_faction":"USA 1977","red_faction":"Russia 1984"}}"#,
            "\n",
            "\n",
            r#"{"id":2,"request":"Command","command":{"type":"Tick","multiplier":60.0}}"#,
            "\n",
            "garbage\n",
            r#"{"id":3,"request":"State"}"#,
            "\n",
            r#"{"id":4,"request":"Shutdown"}"#,
            "\n",
            r#"{"id":5,"request":"State"}"#,
            "\n",
        );
        let mut output = Vec::new();
        let served = serve(Cursor::new(input), &mut output, &worker).unwrap();
        assert_eq!(served, 4);

        let replies = replies(&output);
        let ids: Vec<u64> = replies.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 0, 3, 4]);
        assert!(matches!(replies[0].body, WorkerResponse::Outcome { .. }));
        let WorkerResponse::State { state } = &replies[3].body else {
            panic!("expected a state view");
        };
        assert_eq!(state.timer, 32_400.0 + 60.0);
        assert_eq!(replies[4].body, WorkerResponse::ShuttingDown);
    }
}
