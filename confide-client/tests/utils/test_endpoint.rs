use confide_client::Negotiator;
use confide_client::media::LocalTrack;
use confide_client::peer::PeerEvent;
use confide_core::SignalMessage;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::utils::{MockPeerFactory, RecordingSignals};

/// One side of an in-memory call: a negotiator wired to mock collaborators.
pub struct TestEndpoint {
    pub negotiator: Negotiator,
    pub events: mpsc::UnboundedReceiver<PeerEvent>,
    pub signals: RecordingSignals,
    pub factory: MockPeerFactory,
}

impl TestEndpoint {
    pub fn new(local_tracks: Vec<LocalTrack>) -> Self {
        let signals = RecordingSignals::new();
        let factory = MockPeerFactory::new();
        let (negotiator, events) = Negotiator::new(
            Arc::new(factory.clone()),
            Arc::new(signals.clone()),
            local_tracks,
        );
        Self {
            negotiator,
            events,
            signals,
            factory,
        }
    }

    pub fn receive_only() -> Self {
        Self::new(Vec::new())
    }

    /// Feeds every queued peer event to the negotiator.
    pub async fn pump_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.negotiator
                .handle_peer_event(event)
                .await
                .expect("peer event failed");
            handled += 1;
        }
        handled
    }

    pub async fn deliver(&mut self, messages: Vec<SignalMessage>) {
        for msg in messages {
            self.negotiator
                .handle_signal(msg)
                .await
                .expect("signal failed");
        }
    }
}

/// Relays signals between `a` and `b` until neither has anything left to say.
pub async fn exchange(a: &mut TestEndpoint, b: &mut TestEndpoint) {
    loop {
        let handled = a.pump_events().await + b.pump_events().await;
        let to_b = a.signals.take();
        let to_a = b.signals.take();
        if handled == 0 && to_a.is_empty() && to_b.is_empty() {
            break;
        }
        b.deliver(to_b).await;
        a.deliver(to_a).await;
    }
}
