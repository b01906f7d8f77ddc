// --- File: crates/consulta_gcal/src/service.rs ---
//! Google Meet backed implementation of [`MeetingService`].
//!
//! Every booking becomes one event on the clinic calendar, with the client as
//! attendee and a Meet conference attached. Google sends the invitation.

use crate::auth::HubType;
use chrono::{NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use consulta_common::services::{BoxFuture, MeetingRequest, MeetingResult, MeetingService};
use consulta_common::ConsultaError;
use google_calendar3::api::{
    ConferenceData, ConferenceSolutionKey, CreateConferenceRequest, Event, EventAttendee,
    EventDateTime,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur when interacting with Google Calendar.
#[derive(Error, Debug)]
pub enum GcalServiceError {
    #[error("Google API Error: {0}")]
    ApiError(#[from] google_calendar3::Error),
    #[error("Failed to convert time: {0}")]
    TimeConversion(String),
    #[error("Invalid meeting: {0}")]
    InvalidMeeting(String),
}

impl From<GcalServiceError> for ConsultaError {
    fn from(err: GcalServiceError) -> Self {
        ConsultaError::ProviderError {
            service_name: "Google Calendar".to_string(),
            message: err.to_string(),
        }
    }
}

pub struct GoogleMeetService {
    calendar_hub: Arc<HubType>,
    calendar_id: String,
}

impl GoogleMeetService {
    /// `calendar_id` falls back to the service account's `primary` calendar.
    pub fn new(calendar_hub: Arc<HubType>, calendar_id: Option<String>) -> Self {
        Self {
            calendar_hub,
            calendar_id: calendar_id.unwrap_or_else(|| "primary".to_string()),
        }
    }
}

fn event_time(
    local: &NaiveDateTime,
    tz: Tz,
    time_zone: &str,
) -> Result<EventDateTime, GcalServiceError> {
    let instant = tz
        .from_local_datetime(local)
        .earliest()
        .ok_or_else(|| {
            GcalServiceError::TimeConversion(format!("{} does not exist in {}", local, time_zone))
        })?
        .with_timezone(&Utc);

    Ok(EventDateTime {
        date_time: Some(instant),
        time_zone: Some(time_zone.to_string()),
        ..Default::default()
    })
}

/// Builds the calendar event for a meeting request.
///
/// `request_id` makes the conference creation idempotent on Google's side.
pub fn build_meeting_event(
    request: &MeetingRequest,
    request_id: &str,
) -> Result<Event, GcalServiceError> {
    if request.end_time <= request.start_time {
        return Err(GcalServiceError::InvalidMeeting(
            "End time must be after start time".to_string(),
        ));
    }

    let tz: Tz = request.time_zone.parse().map_err(|_| {
        GcalServiceError::TimeConversion(format!("Unknown time zone {}", request.time_zone))
    })?;

    Ok(Event {
        summary: Some(request.summary.clone()),
        description: Some(request.description.clone()),
        start: Some(event_time(&request.start_time, tz, &request.time_zone)?),
        end: Some(event_time(&request.end_time, tz, &request.time_zone)?),
        attendees: Some(vec![EventAttendee {
            email: Some(request.attendee_email.clone()),
            ..Default::default()
        }]),
        conference_data: Some(ConferenceData {
            create_request: Some(CreateConferenceRequest {
                request_id: Some(request_id.to_string()),
                conference_solution_key: Some(ConferenceSolutionKey {
                    type_: Some("hangoutsMeet".to_string()),
                }),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// The join link of a created event.
///
/// Prefers `hangoutLink`; otherwise the first video entry point of the conference.
pub fn meeting_link_from_event(event: &Event) -> Option<String> {
    if let Some(link) = event.hangout_link.as_ref().filter(|l| !l.is_empty()) {
        return Some(link.clone());
    }

    event
        .conference_data
        .as_ref()?
        .entry_points
        .as_ref()?
        .iter()
        .find(|entry| entry.entry_point_type.as_deref() == Some("video"))
        .and_then(|entry| entry.uri.clone())
}

impl MeetingService for GoogleMeetService {
    type Error = GcalServiceError;

    fn schedule_meeting(
        &self,
        request: MeetingRequest,
    ) -> BoxFuture<'_, MeetingResult, Self::Error> {
        let calendar_hub = self.calendar_hub.clone();
        let calendar_id = self.calendar_id.clone();

        Box::pin(async move {
            let request_id = uuid::Uuid::new_v4().to_string();
            let event = build_meeting_event(&request, &request_id)?;
            debug!(
                "Creating event '{}' on calendar {} at {}",
                request.summary, calendar_id, request.start_time
            );

            let (_response, created_event) = calendar_hub
                .events()
                .insert(event, &calendar_id)
                .conference_data_version(1)
                .send_updates("all")
                .doit()
                .await?;

            let meeting_link = meeting_link_from_event(&created_event);
            match &meeting_link {
                Some(link) => info!("Meeting created: {}", link),
                None => warn!(
                    "Event {:?} was created without a conference link",
                    created_event.id
                ),
            }

            Ok(MeetingResult {
                event_id: created_event.id,
                meeting_link,
            })
        })
    }
}
