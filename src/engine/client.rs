//! Child-process engine client.
//!
//! Spawns the engine binary and speaks the JSON-lines protocol over its
//! stdio. One i/o task owns both pipe halves; callers go through cloneable
//! handles and await their reply on a oneshot. Events are forwarded to an
//! unbounded channel the UI loop drains.

use std::collections::HashMap;
use std::process::Stdio;

use futures::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use uuid::Uuid;

use super::error::{EngineError, Result};
use super::protocol::{EngineEvent, ImageFixture, Request, RequestOp, ServerMessage, TransferMode};
use super::Engine;

enum Outbound {
    /// Request with an awaited reply.
    Call {
        request: Request,
        reply: oneshot::Sender<Result<Value>>,
    },
    /// Fire-and-forget request; the engine never replies.
    Fire { request: Request },
}

/// Cloneable handle to the engine i/o task.
#[derive(Clone)]
pub struct EngineClient {
    tx: mpsc::UnboundedSender<Outbound>,
}

/// The receiving side of an engine connection.
pub struct EngineConnection {
    pub events: mpsc::UnboundedReceiver<EngineEvent>,
    pub io_task: JoinHandle<()>,
}

impl EngineClient {
    /// Spawn the engine binary and connect over its stdio. The child's
    /// stderr is drained into the log so it cannot block or hit the
    /// terminal the UI owns.
    pub fn spawn(command: &[String]) -> Result<(Self, EngineConnection, Child)> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| EngineError::Spawn(std::io::Error::other("empty engine command")))?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(EngineError::Spawn)?;

        let stdin = child.stdin.take().expect("engine stdin is piped");
        let stdout = child.stdout.take().expect("engine stdout is piped");
        let stderr = child.stderr.take().expect("engine stderr is piped");

        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::warn!(target: "engine", "{}", line);
            }
        });

        let (client, connection) = Self::connect(stdout, stdin);
        Ok((client, connection, child))
    }

    /// Connect over arbitrary byte streams. Used by [`Self::spawn`] and by
    /// tests driving the protocol over an in-memory duplex.
    pub fn connect<R, W>(reader: R, writer: W) -> (Self, EngineConnection)
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let io_task = tokio::spawn(io_loop(reader, writer, rx, event_tx));
        (
            Self { tx },
            EngineConnection {
                events: event_rx,
                io_task,
            },
        )
    }

    async fn call(&self, op: RequestOp) -> Result<Value> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Outbound::Call {
                request: Request::new(op),
                reply,
            })
            .map_err(|_| EngineError::Closed)?;
        rx.await.map_err(|_| EngineError::Closed)?
    }

    async fn call_as<T: DeserializeOwned>(&self, op: RequestOp) -> Result<T> {
        let value = self.call(op).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn ack(&self, op: RequestOp) -> Result<()> {
        self.call(op).await.map(|_| ())
    }
}

impl Engine for EngineClient {
    async fn select_start_directories(&self) -> Result<Vec<String>> {
        self.call_as(RequestOp::SelectStartDirectories).await
    }

    async fn select_destination_directory(&self) -> Result<Option<String>> {
        self.call_as(RequestOp::SelectDestinationDirectory).await
    }

    async fn remove_start_directory(&self, directory: &str) -> Result<Vec<String>> {
        self.call_as(RequestOp::RemoveStartDirectory {
            directory: directory.to_string(),
        })
        .await
    }

    async fn set_min_size(&self, value: Option<u64>) -> Result<()> {
        self.ack(RequestOp::SetMinSize { value }).await
    }

    async fn set_min_width(&self, value: Option<u32>) -> Result<()> {
        self.ack(RequestOp::SetMinWidth { value }).await
    }

    async fn set_min_height(&self, value: Option<u32>) -> Result<()> {
        self.ack(RequestOp::SetMinHeight { value }).await
    }

    async fn set_naming_convention(&self, value: &str) -> Result<()> {
        self.ack(RequestOp::SetNamingConvention {
            value: value.to_string(),
        })
        .await
    }

    async fn set_transfer_mode(&self, value: TransferMode) -> Result<()> {
        self.ack(RequestOp::SetTransferMode { value }).await
    }

    async fn set_verify(&self, value: bool) -> Result<()> {
        self.ack(RequestOp::SetVerify { value }).await
    }

    async fn process_run(&self) -> Result<()> {
        self.ack(RequestOp::ProcessRun).await
    }

    async fn verify_relocation(&self) -> Result<()> {
        self.ack(RequestOp::VerifyRelocation).await
    }

    async fn reset_everything(&self) -> Result<()> {
        self.ack(RequestOp::ResetEverything).await
    }

    async fn preview_naming(
        &self,
        template: &str,
        metadata: &ImageFixture,
        description: &str,
    ) -> Result<String> {
        #[derive(serde::Deserialize)]
        struct Preview {
            path: String,
        }
        let preview: Preview = self
            .call_as(RequestOp::PreviewNaming {
                template: template.to_string(),
                metadata: metadata.clone(),
                description: description.to_string(),
            })
            .await?;
        Ok(preview.path)
    }

    fn open_host_location(&self, path: &str) {
        let _ = self.tx.send(Outbound::Fire {
            request: Request::new(RequestOp::OpenHostLocation {
                path: path.to_string(),
            }),
        });
    }
}

async fn io_loop<R, W>(
    reader: R,
    writer: W,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
    event_tx: mpsc::UnboundedSender<EngineEvent>,
) where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines_in = FramedRead::new(reader, LinesCodec::new());
    let mut lines_out = FramedWrite::new(writer, LinesCodec::new());
    let mut pending: HashMap<Uuid, oneshot::Sender<Result<Value>>> = HashMap::new();

    loop {
        tokio::select! {
            outbound = rx.recv() => {
                let Some(outbound) = outbound else { break };
                let (request, reply) = match outbound {
                    Outbound::Call { request, reply } => (request, Some(reply)),
                    Outbound::Fire { request } => (request, None),
                };
                let line = match serde_json::to_string(&request) {
                    Ok(line) => line,
                    Err(e) => {
                        if let Some(reply) = reply {
                            let _ = reply.send(Err(e.into()));
                        }
                        continue;
                    }
                };
                if let Some(reply) = reply {
                    pending.insert(request.id, reply);
                }
                if lines_out.send(line).await.is_err() {
                    break;
                }
            }
            line = lines_in.next() => {
                let Some(line) = line else { break };
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!("engine stream framing error: {}", e);
                        break;
                    }
                };
                match serde_json::from_str::<ServerMessage>(&line) {
                    Ok(ServerMessage::Response(resp)) => {
                        match pending.remove(&resp.id) {
                            Some(reply) => {
                                let result = match resp.error {
                                    Some(message) => Err(EngineError::Rejected(message)),
                                    None => Ok(resp.result.unwrap_or(Value::Null)),
                                };
                                let _ = reply.send(result);
                            }
                            None => {
                                tracing::debug!(id = %resp.id, "engine reply with no pending request");
                            }
                        }
                    }
                    Ok(ServerMessage::Event(event)) => {
                        // Receiver gone means the UI is shutting down; keep
                        // draining so pending replies still resolve.
                        let _ = event_tx.send(event);
                    }
                    Err(e) => {
                        tracing::warn!("unparseable engine line ({}): {}", e, line);
                    }
                }
            }
        }
    }

    for (_, reply) in pending.drain() {
        let _ = reply.send(Err(EngineError::Closed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// In-memory engine end for driving the client over a duplex pipe.
    struct ScriptedEngine {
        lines_in: FramedRead<tokio::io::ReadHalf<tokio::io::DuplexStream>, LinesCodec>,
        lines_out: FramedWrite<tokio::io::WriteHalf<tokio::io::DuplexStream>, LinesCodec>,
    }

    fn wire_up() -> (EngineClient, EngineConnection, ScriptedEngine) {
        let (near, far) = tokio::io::duplex(64 * 1024);
        let (near_read, near_write) = tokio::io::split(near);
        let (client, connection) = EngineClient::connect(near_read, near_write);
        let (far_read, far_write) = tokio::io::split(far);
        let engine = ScriptedEngine {
            lines_in: FramedRead::new(far_read, LinesCodec::new()),
            lines_out: FramedWrite::new(far_write, LinesCodec::new()),
        };
        (client, connection, engine)
    }

    impl ScriptedEngine {
        async fn next_request(&mut self) -> Value {
            let line = self.lines_in.next().await.unwrap().unwrap();
            serde_json::from_str(&line).unwrap()
        }

        async fn send(&mut self, value: Value) {
            self.lines_out.send(value.to_string()).await.unwrap();
        }
    }

    #[tokio::test]
    async fn replies_are_matched_by_request_id() {
        let (client, _connection, mut engine) = wire_up();

        let task = tokio::spawn(async move { client.select_start_directories().await });

        let request = engine.next_request().await;
        assert_eq!(request["op"], "select-start-directories");
        engine
            .send(json!({"id": request["id"], "result": ["/photos", "/more"]}))
            .await;

        let dirs = task.await.unwrap().unwrap();
        assert_eq!(dirs, vec!["/photos".to_string(), "/more".to_string()]);
    }

    #[tokio::test]
    async fn engine_error_reply_surfaces_as_rejection() {
        let (client, _connection, mut engine) = wire_up();

        let fixture = ImageFixture::default();
        let task = {
            let client = client.clone();
            tokio::spawn(async move { client.preview_naming("{bogus}", &fixture, "fixture").await })
        };

        let request = engine.next_request().await;
        assert_eq!(request["op"], "preview-naming");
        engine
            .send(json!({"id": request["id"], "error": "unknown placeholder"}))
            .await;

        match task.await.unwrap() {
            Err(EngineError::Rejected(message)) => assert_eq!(message, "unknown placeholder"),
            other => panic!("expected rejection, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn events_flow_to_the_event_channel() {
        let (_client, mut connection, mut engine) = wire_up();

        engine.send(json!({"event": "finding-complete"})).await;

        let event = connection.events.recv().await.unwrap();
        assert_eq!(event.topic(), super::super::Topic::FindingComplete);
    }

    #[tokio::test]
    async fn closed_pipe_fails_pending_calls() {
        let (client, _connection, mut engine) = wire_up();

        let task = tokio::spawn(async move { client.process_run().await });
        let _ = engine.next_request().await;
        drop(engine);

        match task.await.unwrap() {
            Err(EngineError::Closed) => {}
            other => panic!("expected closed, got {:?}", other.map(|_| ())),
        }
    }
}
