use confide_core::{ConnectionStatus, SignalMessage};
use tracing::{info, warn};

use crate::ClientError;
use crate::engine::Negotiator;

impl Negotiator {
    /// Feeds one message from the signaling channel into the state machine.
    ///
    /// Only transport failures are returned; negotiation problems are logged.
    pub async fn handle_signal(&mut self, msg: SignalMessage) -> Result<(), ClientError> {
        match msg {
            SignalMessage::PeerJoined => {
                info!("Peer joined, initiating");
                match self.create_offer().await {
                    Err(ClientError::ChannelClosed) => return Err(ClientError::ChannelClosed),
                    Err(e) => warn!("Could not start negotiation: {}", e),
                    Ok(()) => {}
                }
            }

            SignalMessage::Offer(offer) => match self.handle_offer(offer).await {
                Err(ClientError::ChannelClosed) => return Err(ClientError::ChannelClosed),
                Err(e) => warn!("Could not answer offer: {}", e),
                Ok(()) => {}
            },

            SignalMessage::Answer(answer) => self.handle_answer(answer).await,

            SignalMessage::Candidate(candidate) => self.handle_candidate(candidate).await,

            SignalMessage::PeerLeft => {
                info!("Peer left");
                self.discard_peer().await;
                self.remote.send_replace(None);
                self.set_status(ConnectionStatus::Disconnected);
            }

            SignalMessage::Full => warn!("Room is full"),
        }
        Ok(())
    }
}
