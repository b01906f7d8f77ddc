//! Google Calendar integration: creates the consultation event with a Google
//! Meet conference attached and hands back the join link.

pub mod auth;
pub mod service;

pub use auth::{create_calendar_hub, HubType};
pub use service::{build_meeting_event, meeting_link_from_event, GcalServiceError, GoogleMeetService};
