use confide_core::{ConnectionStatus, RoomToken, SignalMessage};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::engine::Negotiator;
use crate::guard::{
    ActorRole, Authorization, BookingLookup, Clock, HttpBookingLookup, SessionGuard, SystemClock,
};
use crate::media::{LocalMediaState, MediaCapture, MediaSource, NoCapture, SampleTrackSource};
use crate::peer::{PeerEvent, PeerFactory, RemoteStream, RtcPeerFactory};
use crate::signaling::{ChannelEvent, SignalingChannel};
use crate::{AuthorizationError, ClientConfig, ClientError, MediaError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Hangup,
    ToggleAudio,
    ToggleVideo,
}

/// Why a session stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    HungUp,
    /// The room already had two participants. Not worth retrying.
    RoomFull,
    TransportClosed,
    TransportError(String),
}

/// Collaborators a session is assembled from.
pub struct SessionDeps {
    pub lookup: Arc<dyn BookingLookup>,
    pub clock: Arc<dyn Clock>,
    pub media: Arc<dyn MediaSource>,
    pub peers: Arc<dyn PeerFactory>,
}

impl SessionDeps {
    /// HTTP booking lookup, system clock and webrtc-rs peer connections.
    pub fn native(config: &ClientConfig, receive_only: bool) -> Result<Self, ClientError> {
        let lookup = HttpBookingLookup::new(config.booking_endpoint()?, config.lookup_timeout())
            .map_err(AuthorizationError::Backend)?;
        let media: Arc<dyn MediaSource> = if receive_only {
            Arc::new(NoCapture(MediaError::NoDevices))
        } else {
            Arc::new(SampleTrackSource)
        };

        Ok(Self {
            lookup: Arc::new(lookup),
            clock: Arc::new(SystemClock),
            media,
            peers: Arc::new(RtcPeerFactory::new(config.ice_server_configs())),
        })
    }
}

/// Caller's side of a running session. Dropping it hangs up.
pub struct SessionHandle {
    authorization: Authorization,
    commands: mpsc::UnboundedSender<SessionCommand>,
    status: watch::Receiver<ConnectionStatus>,
    remote: watch::Receiver<Option<RemoteStream>>,
    media: watch::Receiver<LocalMediaState>,
    end: watch::Receiver<Option<SessionEnd>>,
    task: JoinHandle<SessionEnd>,
}

impl SessionHandle {
    pub fn authorization(&self) -> &Authorization {
        &self.authorization
    }

    pub fn hangup(&self) {
        let _ = self.commands.send(SessionCommand::Hangup);
    }

    pub fn toggle_audio(&self) {
        let _ = self.commands.send(SessionCommand::ToggleAudio);
    }

    pub fn toggle_video(&self) {
        let _ = self.commands.send(SessionCommand::ToggleVideo);
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    pub fn status_watch(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    pub fn remote_stream(&self) -> Option<RemoteStream> {
        self.remote.borrow().clone()
    }

    pub fn remote_watch(&self) -> watch::Receiver<Option<RemoteStream>> {
        self.remote.clone()
    }

    pub fn media_state(&self) -> LocalMediaState {
        self.media.borrow().clone()
    }

    pub fn media_watch(&self) -> watch::Receiver<LocalMediaState> {
        self.media.clone()
    }

    /// Set as soon as the session decides to stop, before teardown publishes
    /// its final status.
    pub fn ended(&self) -> Option<SessionEnd> {
        self.end.borrow().clone()
    }

    /// Waits for the session to end without hanging up.
    pub async fn finished(self) -> SessionEnd {
        let Self { commands, task, .. } = self;
        let end = match task.await {
            Ok(end) => end,
            Err(e) => SessionEnd::TransportError(e.to_string()),
        };
        drop(commands);
        end
    }
}

/// One participant's membership in a room: the signaling channel, the
/// negotiator and the local media, all owned by a single task.
pub struct CallSession {
    negotiator: Negotiator,
    channel: SignalingChannel,
    media: MediaCapture,
    channel_events: mpsc::UnboundedReceiver<ChannelEvent>,
    peer_events: mpsc::UnboundedReceiver<PeerEvent>,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    end: watch::Sender<Option<SessionEnd>>,
}

impl CallSession {
    /// Authorizes, acquires media and joins the room.
    ///
    /// Missing media is not an error; the session continues receive-only.
    pub async fn start(
        config: &ClientConfig,
        room: RoomToken,
        role: ActorRole,
        deps: SessionDeps,
    ) -> Result<SessionHandle, ClientError> {
        let guard = SessionGuard::new(deps.lookup, deps.clock, config.fail_open);
        let authorization = guard.authorize(&room, role).await?;

        let mut media = MediaCapture::new(deps.media);
        if let Err(e) = media.acquire().await {
            warn!("Joining room {} without local media: {}", room, e);
        }

        let endpoint = config.signaling_endpoint()?;
        let (channel, channel_events) =
            SignalingChannel::connect(&endpoint, &room, config.keepalive()).await?;

        let (negotiator, peer_events) =
            Negotiator::new(deps.peers, channel.sender(), media.tracks());
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        let status = negotiator.subscribe_status();
        let remote = negotiator.subscribe_remote();
        let media_state = media.subscribe();
        let (end_tx, end_rx) = watch::channel(None);

        let session = CallSession {
            negotiator,
            channel,
            media,
            channel_events,
            peer_events,
            commands: commands_rx,
            end: end_tx,
        };
        let task = tokio::spawn(session.run());

        Ok(SessionHandle {
            authorization,
            commands: commands_tx,
            status,
            remote,
            media: media_state,
            end: end_rx,
            task,
        })
    }

    async fn run(mut self) -> SessionEnd {
        let end = loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(SessionCommand::Hangup) | None => break SessionEnd::HungUp,
                    Some(SessionCommand::ToggleAudio) => {
                        let enabled = self.media.toggle_audio();
                        info!("Microphone {}", if enabled { "on" } else { "muted" });
                    }
                    Some(SessionCommand::ToggleVideo) => {
                        let enabled = self.media.toggle_video();
                        info!("Camera {}", if enabled { "on" } else { "off" });
                    }
                },

                event = self.channel_events.recv() => match event {
                    Some(ChannelEvent::Open) => self.negotiator.on_channel_open(),
                    Some(ChannelEvent::Message(SignalMessage::Full)) => {
                        warn!("Room is full");
                        break SessionEnd::RoomFull;
                    }
                    Some(ChannelEvent::Message(msg)) => {
                        if let Err(e) = self.negotiator.handle_signal(msg).await {
                            break Self::transport_end(e);
                        }
                    }
                    Some(ChannelEvent::Closed) | None => break SessionEnd::TransportClosed,
                    Some(ChannelEvent::Error(e)) => {
                        error!("Signaling channel failed: {}", e);
                        break SessionEnd::TransportError(e);
                    }
                },

                Some(event) = self.peer_events.recv() => {
                    if let Err(e) = self.negotiator.handle_peer_event(event).await {
                        break Self::transport_end(e);
                    }
                }
            }
        };

        self.end.send_replace(Some(end.clone()));
        self.teardown().await;
        info!("Session ended: {:?}", end);
        end
    }

    fn transport_end(err: ClientError) -> SessionEnd {
        match err {
            ClientError::ChannelClosed => SessionEnd::TransportClosed,
            other => SessionEnd::TransportError(other.to_string()),
        }
    }

    async fn teardown(&mut self) {
        self.negotiator.close().await;
        self.channel.close().await;
        self.media.stop();
    }
}
