// --- File: crates/consulta_common/src/services.rs ---
//! Service abstractions for external providers.
//!
//! Booking follow-ups talk to the meeting and notification providers only
//! through these traits, so the core can run with real providers, with none
//! configured, or with test doubles.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// A video meeting to put on the clinic calendar.
///
/// Times are wall-clock times in `time_zone`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingRequest {
    pub summary: String,
    pub description: String,
    pub attendee_email: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub time_zone: String,
}

/// Represents the result of scheduling a meeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingResult {
    /// The provider's event id.
    pub event_id: Option<String>,
    /// Join URL, when the provider created a conference.
    pub meeting_link: Option<String>,
}

/// A calendar/video provider.
pub trait MeetingService: Send + Sync {
    /// Error type returned by meeting service operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates a calendar event with a video conference attached.
    fn schedule_meeting(
        &self,
        request: MeetingRequest,
    ) -> BoxFuture<'_, MeetingResult, Self::Error>;
}

/// Represents the result of a notification operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    /// The ID of the notification, when the provider returns one.
    pub message_id: Option<String>,
    /// The provider's status for the notification.
    pub status: String,
}

/// A trait for notification service operations.
pub trait NotificationService: Send + Sync {
    /// Error type returned by notification service operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send an email notification.
    fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        is_html: bool,
    ) -> BoxFuture<'_, NotificationResult, Self::Error>;
}

/// A factory for the provider instances configured at startup.
///
/// `None` means the provider is disabled or could not be initialised.
pub trait ServiceFactory: Send + Sync {
    /// Get a meeting service instance.
    fn meeting_service(&self) -> Option<Arc<dyn MeetingService<Error = BoxedError>>>;

    /// Get a notification service instance.
    fn notification_service(&self) -> Option<Arc<dyn NotificationService<Error = BoxedError>>>;
}
