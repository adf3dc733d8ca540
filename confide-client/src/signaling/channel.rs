use confide_core::utils::ROOM_QUERY_PARAM;
use confide_core::{RoomToken, SignalMessage};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use url::Url;

use crate::ClientError;
use crate::signaling::SignalSender;

const CLOSE_FLUSH: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Open,
    Message(SignalMessage),
    Closed,
    Error(String),
}

/// Cloneable handle that queues frames on the channel's writer task.
#[derive(Clone)]
pub struct ChannelSender {
    outbound: mpsc::UnboundedSender<Message>,
}

impl SignalSender for ChannelSender {
    fn send(&self, msg: SignalMessage) -> Result<(), ClientError> {
        let json = msg.encode()?;
        self.outbound
            .send(Message::Text(json.into()))
            .map_err(|_| ClientError::ChannelClosed)
    }
}

/// One WebSocket connection to the signaling server, bound to a room.
///
/// The connection is never retried; a dropped socket surfaces as
/// [`ChannelEvent::Closed`] or [`ChannelEvent::Error`].
pub struct SignalingChannel {
    sender: ChannelSender,
    writer: JoinHandle<()>,
    reader: JoinHandle<()>,
    keepalive: JoinHandle<()>,
}

impl SignalingChannel {
    pub fn endpoint(base: &Url, room: &RoomToken) -> Url {
        let mut url = base.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair(ROOM_QUERY_PARAM, room.as_str());
        url
    }

    pub async fn connect(
        base: &Url,
        room: &RoomToken,
        keepalive: Duration,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ChannelEvent>), ClientError> {
        let url = Self::endpoint(base, room);
        let (stream, _) = connect_async(url.as_str()).await?;
        info!("Signaling channel open for room {}", room);

        let (mut ws_sender, mut ws_receiver) = stream.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let _ = events_tx.send(ChannelEvent::Open);

        let writer = tokio::spawn(async move {
            while let Some(msg) = outbound_rx.recv().await {
                let closing = matches!(msg, Message::Close(_));
                if let Err(e) = ws_sender.send(msg).await {
                    debug!("Signaling write failed: {}", e);
                    break;
                }
                if closing {
                    break;
                }
            }
        });

        let reader = tokio::spawn(async move {
            while let Some(frame) = ws_receiver.next().await {
                match frame {
                    Ok(Message::Text(text)) => match SignalMessage::decode(text.as_str()) {
                        Ok(msg) => {
                            if events_tx.send(ChannelEvent::Message(msg)).is_err() {
                                return;
                            }
                        }
                        Err(e) => warn!("Ignoring undecodable signal: {}", e),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        let _ = events_tx.send(ChannelEvent::Error(e.to_string()));
                        return;
                    }
                }
            }
            let _ = events_tx.send(ChannelEvent::Closed);
        });

        let ping_tx = outbound_tx.clone();
        let keepalive_task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(keepalive);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if ping_tx.send(Message::Ping(Vec::new().into())).is_err() {
                    break;
                }
            }
        });

        let channel = Self {
            sender: ChannelSender {
                outbound: outbound_tx,
            },
            writer,
            reader,
            keepalive: keepalive_task,
        };
        Ok((channel, events_rx))
    }

    pub fn sender(&self) -> Arc<dyn SignalSender> {
        Arc::new(self.sender.clone())
    }

    pub fn send(&self, msg: SignalMessage) -> Result<(), ClientError> {
        self.sender.send(msg)
    }

    /// Sends a close frame and waits briefly for it to be written.
    pub async fn close(&mut self) {
        self.keepalive.abort();
        if !self.writer.is_finished()
            && self.sender.outbound.send(Message::Close(None)).is_ok()
            && tokio::time::timeout(CLOSE_FLUSH, &mut self.writer)
                .await
                .is_err()
        {
            debug!("Close frame not flushed in time");
        }
        self.reader.abort();
    }
}

impl Drop for SignalingChannel {
    fn drop(&mut self) {
        self.writer.abort();
        self.reader.abort();
        self.keepalive.abort();
    }
}
