//! # Notifications
//!
//! In-app notifications per user and the transactional e-mail seam.

mod mailer;
mod service;
pub mod templates;
mod types;

pub use mailer::{LogMailer, Mailer, OutboundEmail, RecordingMailer};
pub use service::NotificationService;
pub use types::{Notification, NotificationId, NotificationKind};
