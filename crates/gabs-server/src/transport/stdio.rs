//! Agent stdio transport: one frame in, one frame (or notification) out
//! (§4.1, §4.4).

use std::sync::Arc;

use gabs_protocol::{read_frame, write_frame, JsonRpcRequest, ProtocolError};
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::dispatch::dispatch;
use crate::registries::Registries;

/// Run the stdio loop until the agent closes its side. Registers an
/// outbound writer so `*_list_changed` notifications reach this agent
/// while the loop is running.
pub async fn serve_stdio<R, W>(registries: Arc<Registries>, mut reader: R, mut writer: W) -> Result<(), ProtocolError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    registries.add_writer(tx);

    loop {
        tokio::select! {
            frame = read_frame(&mut reader) => {
                match frame? {
                    None => break,
                    Some(bytes) => {
                        let request: JsonRpcRequest = match serde_json::from_slice(&bytes) {
                            Ok(request) => request,
                            Err(err) => {
                                tracing::warn!(error = %err, "dropping malformed AP frame");
                                continue;
                            }
                        };
                        let response = dispatch(&registries, request).await;
                        let payload = serde_json::to_vec(&response).expect("JsonRpcResponse always serializes");
                        write_frame(&mut writer, &payload).await?;
                    }
                }
            }
            Some(notification) = rx.recv() => {
                let payload = serde_json::to_vec(&notification).expect("notification always serializes");
                write_frame(&mut writer, &payload).await?;
            }
        }
    }

    writer.flush().await.ok();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gabs_protocol::RpcId;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn round_trips_a_single_request() {
        let registries = Arc::new(Registries::new(None));
        let request = JsonRpcRequest::new(RpcId::Number(1), "tools/list", None);
        let mut input = serde_json::to_vec(&request).unwrap();
        input.push(b'\n');
        let reader = BufReader::new(&input[..]);
        let mut output = Vec::new();

        serve_stdio(registries, reader, &mut output).await.unwrap();

        let line = String::from_utf8(output).unwrap();
        assert!(line.contains("\"tools\""));
    }
}
