use confide_client::ClientError;
use confide_client::signaling::SignalSender;
use confide_core::SignalMessage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// SignalSender that keeps everything it was asked to send.
#[derive(Clone, Default)]
pub struct RecordingSignals {
    sent: Arc<Mutex<Vec<SignalMessage>>>,
    outbox: Arc<Mutex<Vec<SignalMessage>>>,
    closed: Arc<AtomicBool>,
}

impl RecordingSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything ever sent, in order.
    pub fn sent(&self) -> Vec<SignalMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Messages sent since the last call.
    pub fn take(&self) -> Vec<SignalMessage> {
        std::mem::take(&mut *self.outbox.lock().unwrap())
    }

    pub fn count_of(&self, kind: &str) -> usize {
        self.sent().iter().filter(|m| m.kind() == kind).count()
    }

    /// Makes every further send fail as if the socket were gone.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl SignalSender for RecordingSignals {
    fn send(&self, msg: SignalMessage) -> Result<(), ClientError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ClientError::ChannelClosed);
        }
        tracing::debug!("[RecordingSignals] {}", msg.kind());
        self.sent.lock().unwrap().push(msg.clone());
        self.outbox.lock().unwrap().push(msg);
        Ok(())
    }
}
