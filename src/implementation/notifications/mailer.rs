//! Transactional e-mail seam

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::CommerceError;

/// Rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEmail {
    /// Sender address.
    pub from:      String,
    /// Recipient address.
    pub to:        String,
    /// Subject line.
    pub subject:   String,
    /// Plain-text body.
    pub text_body: String,
}

/// Delivers transactional e-mail.
pub trait Mailer: Send + Sync {
    /// Sends one message.
    fn send(&self, email: &OutboundEmail) -> Result<(), CommerceError>;
}

/// Mailer that only writes messages to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, email: &OutboundEmail) -> Result<(), CommerceError> {
        info!(to = %email.to, subject = %email.subject, "email dispatched");
        debug!(body = %email.text_body, "email body");
        Ok(())
    }
}

/// In-memory mailer that keeps every message it accepts.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent:    Mutex<Vec<OutboundEmail>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    /// Creates a mailer that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mailer that rejects every message.
    #[must_use]
    pub fn failing() -> Self {
        let mailer = Self::default();
        mailer.set_failing(true);
        mailer
    }

    /// Switches forced failure on or off.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Messages accepted so far.
    pub fn sent(&self) -> Result<Vec<OutboundEmail>, CommerceError> {
        self.sent.lock().map(|s| s.clone()).map_err(|_| CommerceError::LockError)
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, email: &OutboundEmail) -> Result<(), CommerceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CommerceError::EmailError(format!("delivery to {} refused", email.to)));
        }
        self.sent.lock().map_err(|_| CommerceError::LockError)?.push(email.clone());
        Ok(())
    }
}
