//! `GpClient`: one authenticated duplex connection to a mod's loopback
//! socket (§4.3).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use gabs_protocol::{new_request_id, read_frame, write_frame, JsonRpcMessage, JsonRpcRequest};
use serde_json::{json, Value};
use tokio::io::BufReader;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

use crate::backoff::BackoffConfig;
use crate::handshake::{Capabilities, ClientInfo, HelloParams, Welcome};
use crate::GpClientError;

const CONNECT_ATTEMPT_BUDGET: u32 = 5;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Invoked, possibly concurrently with sibling handlers on the same event,
/// whenever the mod pushes a `{type:"event", ...}` frame on a subscribed
/// channel (§4.3 "Event subscription").
pub type EventHandler = Arc<dyn Fn(gabs_protocol::GpEvent) + Send + Sync>;

type PendingMap = Arc<Mutex<HashMap<String, oneshot::Sender<Result<Value, GpClientError>>>>>;
type HandlerMap = Arc<Mutex<HashMap<String, Vec<EventHandler>>>>;

/// Identifying information the core sends in `session/hello`.
#[derive(Debug, Clone)]
pub struct LaunchIdentity {
    pub bridge_version: String,
    pub platform: String,
    pub launch_id: String,
}

pub struct GpClient {
    writer: Arc<Mutex<OwnedWriteHalf>>,
    pending: PendingMap,
    handlers: HandlerMap,
    reader_handle: JoinHandle<()>,
    capabilities: Capabilities,
    agent_id: String,
    request_timeout: Duration,
}

impl GpClient {
    /// Dial, retrying with jittered backoff up to [`CONNECT_ATTEMPT_BUDGET`]
    /// attempts, then perform the `session/hello`/`session/welcome`
    /// handshake (§4.3 "Connect protocol").
    pub async fn connect(
        port: u16,
        token: &str,
        identity: LaunchIdentity,
        backoff: &BackoffConfig,
    ) -> Result<Self, GpClientError> {
        let stream = Self::dial_with_retry(port, backoff).await?;
        let (read_half, write_half) = stream.into_split();

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let handlers: HandlerMap = Arc::new(Mutex::new(HashMap::new()));
        let writer = Arc::new(Mutex::new(write_half));

        let reader_handle = tokio::spawn(reader_loop(
            BufReader::new(read_half),
            Arc::clone(&pending),
            Arc::clone(&handlers),
        ));

        let mut client = Self {
            writer,
            pending,
            handlers,
            reader_handle,
            capabilities: Capabilities::default(),
            agent_id: String::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        };

        let hello = HelloParams {
            token: token.to_string(),
            bridge_version: identity.bridge_version,
            platform: identity.platform,
            launch_id: identity.launch_id,
            client_info: ClientInfo {
                name: "gabs".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };
        let result = client
            .request(
                "session/hello",
                serde_json::to_value(hello).expect("HelloParams always serializes"),
            )
            .await?;
        let welcome: Welcome = serde_json::from_value(result)
            .map_err(|e| GpClientError::HandshakeFailed(e.to_string()))?;

        client.agent_id = welcome.agent_id;
        client.capabilities = welcome.capabilities;
        Ok(client)
    }

    async fn dial_with_retry(port: u16, backoff: &BackoffConfig) -> Result<TcpStream, GpClientError> {
        let mut last_err = None;
        for attempt in 0..CONNECT_ATTEMPT_BUDGET {
            match TcpStream::connect(("127.0.0.1", port)).await {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    tracing::warn!(port, attempt, error = %e, "GP dial failed, retrying");
                    last_err = Some(e);
                    tokio::time::sleep(backoff.sample(attempt)).await;
                }
            }
        }
        Err(GpClientError::ConnectExhausted {
            port,
            attempts: CONNECT_ATTEMPT_BUDGET,
            source: last_err.unwrap(),
        })
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// `(method, params)` -> result, per §4.3 "Request API": generates an
    /// id, installs a waiter, writes the request, and waits with a 30s
    /// default timeout.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, GpClientError> {
        let id = new_request_id();
        let key = id.to_string();
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(key.clone(), tx);

        let request = JsonRpcRequest::new(id, method, Some(params));
        let bytes = serde_json::to_vec(&request).expect("JsonRpcRequest always serializes");

        {
            let mut writer = self.writer.lock().await;
            if let Err(e) = write_frame(&mut *writer, &bytes).await {
                self.pending.lock().await.remove(&key);
                return Err(e.into());
            }
        }

        match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(GpClientError::Closed),
            Err(_) => {
                self.pending.lock().await.remove(&key);
                Err(GpClientError::Timeout {
                    method: method.to_string(),
                    elapsed_secs: self.request_timeout.as_secs(),
                })
            }
        }
    }

    /// Register `handler` under every channel in `channels` and issue the
    /// `events/subscribe` request listing them (§4.3 "Event subscription").
    pub async fn subscribe_events(&self, channels: Vec<String>, handler: EventHandler) -> Result<(), GpClientError> {
        {
            let mut map = self.handlers.lock().await;
            for channel in &channels {
                map.entry(channel.clone()).or_default().push(Arc::clone(&handler));
            }
        }
        self.request("events/subscribe", json!({ "channels": channels })).await?;
        Ok(())
    }

    /// Signal the reader, close the socket, and fail every pending waiter
    /// with a connection-closed error (§4.3 "Close").
    pub async fn close(self) {
        self.reader_handle.abort();
        let mut pending = self.pending.lock().await;
        for (_, tx) in pending.drain() {
            let _ = tx.send(Err(GpClientError::Closed));
        }
    }
}

async fn reader_loop(mut reader: BufReader<OwnedReadHalf>, pending: PendingMap, handlers: HandlerMap) {
    loop {
        match read_frame(&mut reader).await {
            Ok(Some(bytes)) => match JsonRpcMessage::parse(&bytes) {
                Ok(JsonRpcMessage::Response(response)) => {
                    let key = response.id.to_string();
                    let waiter = pending.lock().await.remove(&key);
                    if let Some(waiter) = waiter {
                        let result = match response.error {
                            Some(err) => Err(GpClientError::RequestError {
                                code: err.code,
                                message: err.message,
                            }),
                            None => Ok(response.result.unwrap_or(Value::Null)),
                        };
                        let _ = waiter.send(result);
                    } else {
                        tracing::debug!(id = %key, "GP response for unknown id, dropping");
                    }
                }
                Ok(JsonRpcMessage::Event(event)) => {
                    let subscribed = handlers.lock().await.get(&event.channel).cloned();
                    if let Some(subscribed) = subscribed {
                        for handler in subscribed {
                            let event = event.clone();
                            tokio::spawn(async move { handler(event) });
                        }
                    }
                }
                Ok(JsonRpcMessage::Unknown(raw)) => {
                    tracing::warn!(?raw, "unrecognized GP message, dropping");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "malformed GP frame, dropping");
                }
            },
            Ok(None) => {
                tracing::info!("GP connection closed by peer");
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, "GP frame read failed, closing reader");
                break;
            }
        }
    }

    let mut pending = pending.lock().await;
    for (_, tx) in pending.drain() {
        let _ = tx.send(Err(GpClientError::Closed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn spawn_mock_mod(listener: TcpListener) -> JoinHandle<()> {
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (read_half, mut write_half) = socket.into_split();
            let mut reader = BufReader::new(read_half);

            // session/hello
            let hello_line = gabs_protocol::read_frame(&mut reader).await.unwrap().unwrap();
            let hello: serde_json::Value = serde_json::from_slice(&hello_line).unwrap();
            let id = hello["id"].clone();
            let welcome = json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {
                    "agentId": "mock-mod",
                    "capabilities": {"methods": ["tools/list"], "events": [], "resources": []},
                    "schemaVersion": "1",
                }
            });
            write_half
                .write_all(format!("{}\n", serde_json::to_string(&welcome).unwrap()).as_bytes())
                .await
                .unwrap();

            // tools/list echo
            let call_line = gabs_protocol::read_frame(&mut reader).await.unwrap().unwrap();
            let call: serde_json::Value = serde_json::from_slice(&call_line).unwrap();
            let response = json!({"jsonrpc": "2.0", "id": call["id"], "result": {"tools": []}});
            write_half
                .write_all(format!("{}\n", serde_json::to_string(&response).unwrap()).as_bytes())
                .await
                .unwrap();

            let _ = reader;
        })
    }

    #[tokio::test]
    async fn handshake_then_request_round_trips() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let _mod_task = spawn_mock_mod(listener).await;

        let client = GpClient::connect(
            port,
            "t0ken",
            LaunchIdentity {
                bridge_version: "0.1.0".to_string(),
                platform: "linux".to_string(),
                launch_id: "abc".to_string(),
            },
            &BackoffConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(client.agent_id(), "mock-mod");
        let result = client.request("tools/list", json!({})).await.unwrap();
        assert_eq!(result["tools"], json!([]));
    }

    #[tokio::test]
    async fn event_handlers_receive_frames_on_their_channel() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (read_half, mut write_half) = socket.into_split();
            let mut reader = BufReader::new(read_half);

            let hello_line = gabs_protocol::read_frame(&mut reader).await.unwrap().unwrap();
            let hello: serde_json::Value = serde_json::from_slice(&hello_line).unwrap();
            let welcome = json!({
                "jsonrpc": "2.0", "id": hello["id"],
                "result": {"agentId": "mock-mod", "capabilities": {"methods": [], "events": ["inventory"], "resources": []}}
            });
            write_half.write_all(format!("{}\n", welcome).as_bytes()).await.unwrap();

            let sub_line = gabs_protocol::read_frame(&mut reader).await.unwrap().unwrap();
            let sub: serde_json::Value = serde_json::from_slice(&sub_line).unwrap();
            let ack = json!({"jsonrpc": "2.0", "id": sub["id"], "result": {}});
            write_half.write_all(format!("{}\n", ack).as_bytes()).await.unwrap();

            let event = json!({"type": "event", "channel": "inventory", "seq": 1, "payload": {"item": "sword"}});
            write_half.write_all(format!("{}\n", event).as_bytes()).await.unwrap();

            let _ = reader;
        });

        let client = GpClient::connect(
            port,
            "t0ken",
            LaunchIdentity {
                bridge_version: "0.1.0".to_string(),
                platform: "linux".to_string(),
                launch_id: "abc".to_string(),
            },
            &BackoffConfig::default(),
        )
        .await
        .unwrap();

        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);
        client
            .subscribe_events(
                vec!["inventory".to_string()],
                Arc::new(move |event| {
                    assert_eq!(event.channel, "inventory");
                    seen_clone.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        server.await.unwrap();
    }
}
