use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::client::StoreError;
use crate::sync::SyncEvent;

const TOPIC: &str = "realtime:public:financial_entries";
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// A live change feed. Aborts its task on drop, so replacing or discarding
/// the subscription is enough to guarantee no orphaned handler keeps firing
/// against a stale user or connection.
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    pub fn new(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Derives the realtime websocket URL from the REST endpoint.
pub fn realtime_url(base_url: &Url, key: &str) -> Result<Url, StoreError> {
    let mut url = base_url
        .join("realtime/v1/websocket")
        .map_err(|err| StoreError::Server(format!("invalid endpoint: {err}")))?;
    let scheme = match url.scheme() {
        "https" => "wss",
        _ => "ws",
    };
    url.set_scheme(scheme)
        .map_err(|()| StoreError::Server("invalid endpoint scheme".to_string()))?;
    url.query_pairs_mut()
        .append_pair("apikey", key)
        .append_pair("vsn", "1.0.0");
    Ok(url)
}

/// Drives the websocket change feed until the receiving side goes away.
///
/// Edge-triggered and payload-agnostic: any `postgres_changes` frame on the
/// watched topic becomes one [`SyncEvent::ChangeNotice`]; the payload itself
/// is never interpreted. Reconnects with a fixed delay while the owning
/// scope is still alive.
pub async fn run_change_feed(url: Url, events: UnboundedSender<SyncEvent>, generation: u64) {
    loop {
        match connect_async(url.as_str()).await {
            Ok((socket, _)) => {
                tracing::info!("realtime channel connected");
                feed_loop(socket, &events, generation).await;
                tracing::warn!("realtime channel closed");
            }
            Err(err) => {
                tracing::warn!("realtime connect failed: {err}");
            }
        }

        if events.is_closed() {
            return;
        }
        tokio::time::sleep(RETRY_DELAY).await;
    }
}

async fn feed_loop<S>(socket: S, events: &UnboundedSender<SyncEvent>, generation: u64)
where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>>
        + futures_util::Sink<Message, Error = tokio_tungstenite::tungstenite::Error>
        + Unpin,
{
    let (mut write, mut read) = socket.split();
    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    let mut reference: u64 = 1;

    if let Err(err) = write.send(Message::Text(join_payload().into())).await {
        tracing::warn!("realtime join failed: {err}");
        return;
    }

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                reference += 1;
                if let Err(err) = write
                    .send(Message::Text(heartbeat_payload(reference).into()))
                    .await
                {
                    tracing::warn!("realtime heartbeat failed: {err}");
                    return;
                }
            }
            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if is_change_frame(text.as_str())
                            && events
                                .send(SyncEvent::ChangeNotice { generation })
                                .is_err()
                        {
                            return;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        tracing::warn!("realtime read error: {err}");
                        return;
                    }
                    None => return,
                }
            }
        }
    }
}

fn join_payload() -> String {
    serde_json::json!({
        "topic": TOPIC,
        "event": "phx_join",
        "payload": {
            "config": {
                "postgres_changes": [
                    { "event": "*", "schema": "public", "table": "financial_entries" }
                ]
            }
        },
        "ref": "1",
    })
    .to_string()
}

fn heartbeat_payload(reference: u64) -> String {
    serde_json::json!({
        "topic": "phoenix",
        "event": "heartbeat",
        "payload": {},
        "ref": reference.to_string(),
    })
    .to_string()
}

/// Only the event discriminator is inspected; the row payload is opaque.
fn is_change_frame(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text)
        .map(|frame| frame["event"] == "postgres_changes")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn realtime_url_swaps_scheme_and_carries_key() {
        let base = Url::parse("https://example.supabase.co/").unwrap();
        let url = realtime_url(&base, "anon").unwrap();
        assert_eq!(url.scheme(), "wss");
        assert!(url.path().ends_with("realtime/v1/websocket"));
        assert!(url.query().unwrap().contains("apikey=anon"));
    }

    #[test]
    fn change_frames_are_recognized_by_event_only() {
        assert!(is_change_frame(
            r#"{"topic":"realtime:public:financial_entries","event":"postgres_changes","payload":{"anything":1},"ref":null}"#
        ));
        assert!(!is_change_frame(
            r#"{"topic":"phoenix","event":"phx_reply","payload":{},"ref":"1"}"#
        ));
        assert!(!is_change_frame("not json"));
    }
}
