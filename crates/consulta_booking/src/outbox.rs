//! Follow-up queue for admitted bookings.
//!
//! Admission only persists the booking. Creating the video meeting and
//! sending the confirmation email are queued here and run on a single worker
//! task, in order, with the outcome of every step recorded on a status board
//! that operators can read and retry from.

use crate::confirmation::{confirmation_body, confirmation_subject};
use chrono::{DateTime, Duration, Utc};
use consulta_common::models::Booking;
use consulta_common::services::{BoxedError, MeetingRequest, MeetingService, NotificationService};
use consulta_db::BookingRepository;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Done,
    Failed,
    /// The provider is not configured, or the booking is gone.
    Skipped,
}

/// Status board entry for one booking.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUpRecord {
    pub booking_id: i64,
    pub meeting: StepStatus,
    pub notification: StepStatus,
    pub meeting_link: Option<String>,
    pub last_error: Option<String>,
    /// Times the worker picked this booking up.
    pub attempts: u32,
    pub updated_at: DateTime<Utc>,
}

impl FollowUpRecord {
    fn new(booking_id: i64) -> Self {
        Self {
            booking_id,
            meeting: StepStatus::Pending,
            notification: StepStatus::Pending,
            meeting_link: None,
            last_error: None,
            attempts: 0,
            updated_at: Utc::now(),
        }
    }

    /// Nothing is left to do: both steps are done or skipped.
    pub fn is_settled(&self) -> bool {
        [self.meeting, self.notification]
            .iter()
            .all(|step| matches!(step, StepStatus::Done | StepStatus::Skipped))
    }
}

/// Shared status board, keyed by booking id.
#[derive(Debug, Clone, Default)]
pub struct FollowUpLog {
    records: Arc<RwLock<BTreeMap<i64, FollowUpRecord>>>,
}

impl FollowUpLog {
    pub fn get(&self, booking_id: i64) -> Option<FollowUpRecord> {
        self.records
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&booking_id)
            .cloned()
    }

    /// All records ordered by booking id.
    pub fn snapshot(&self) -> Vec<FollowUpRecord> {
        self.records
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .cloned()
            .collect()
    }

    /// Applies `change` to the record of `booking_id`, creating it if needed.
    pub fn update<F>(&self, booking_id: i64, change: F) -> FollowUpRecord
    where
        F: FnOnce(&mut FollowUpRecord),
    {
        let mut records = self
            .records
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let record = records
            .entry(booking_id)
            .or_insert_with(|| FollowUpRecord::new(booking_id));
        change(record);
        record.updated_at = Utc::now();
        record.clone()
    }

    pub fn remove(&self, booking_id: i64) -> Option<FollowUpRecord> {
        self.records
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&booking_id)
    }

    /// Drops settled records last updated before `cutoff` and returns how many went.
    ///
    /// Failed and pending records stay until they are retried or their booking is deleted.
    pub fn prune_settled(&self, cutoff: DateTime<Utc>) -> usize {
        let mut records = self
            .records
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = records.len();
        records.retain(|_, record| !(record.is_settled() && record.updated_at < cutoff));
        before - records.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowUpJob {
    pub booking_id: i64,
}

/// Producer side of the follow-up channel.
#[derive(Debug, Clone)]
pub struct FollowUpQueue {
    sender: mpsc::Sender<FollowUpJob>,
    log: FollowUpLog,
}

impl FollowUpQueue {
    /// Creates a bounded queue and the receiver to hand to a [`FollowUpWorker`].
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<FollowUpJob>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            Self {
                sender,
                log: FollowUpLog::default(),
            },
            receiver,
        )
    }

    pub fn log(&self) -> &FollowUpLog {
        &self.log
    }

    /// Queues the follow-up of a booking without waiting.
    ///
    /// Steps that already succeeded stay done. When the queue is full or the
    /// worker is gone, the pending steps are marked failed so that an
    /// operator can retry them; the call itself never fails.
    pub fn enqueue(&self, booking_id: i64) -> FollowUpRecord {
        self.log.update(booking_id, |record| {
            if record.meeting != StepStatus::Done {
                record.meeting = StepStatus::Pending;
            }
            if record.notification != StepStatus::Done {
                record.notification = StepStatus::Pending;
            }
        });

        let failure = match self.sender.try_send(FollowUpJob { booking_id }) {
            Ok(()) => None,
            Err(TrySendError::Full(_)) => Some("follow-up queue is full"),
            Err(TrySendError::Closed(_)) => Some("follow-up worker is not running"),
        };

        match failure {
            None => self.log.get(booking_id).unwrap_or_else(|| FollowUpRecord::new(booking_id)),
            Some(reason) => {
                warn!("Could not queue follow-up of booking {}: {}", booking_id, reason);
                self.log.update(booking_id, |record| {
                    if record.meeting == StepStatus::Pending {
                        record.meeting = StepStatus::Failed;
                    }
                    if record.notification == StepStatus::Pending {
                        record.notification = StepStatus::Failed;
                    }
                    record.last_error = Some(reason.to_string());
                })
            }
        }
    }
}

type SharedMeetingService = Arc<dyn MeetingService<Error = BoxedError>>;
type SharedNotificationService = Arc<dyn NotificationService<Error = BoxedError>>;

/// How long settled records stay on the board unless configured otherwise.
pub const DEFAULT_FOLLOW_UP_RETENTION_MINUTES: i64 = 24 * 60;

/// Consumer side: runs the meeting and notification steps for each job.
pub struct FollowUpWorker<B> {
    receiver: mpsc::Receiver<FollowUpJob>,
    bookings: B,
    log: FollowUpLog,
    meeting: Option<SharedMeetingService>,
    notifier: Option<SharedNotificationService>,
    time_zone: String,
    retention: Duration,
}

impl<B> FollowUpWorker<B>
where
    B: BookingRepository + Send + Sync + 'static,
{
    pub fn new(
        receiver: mpsc::Receiver<FollowUpJob>,
        bookings: B,
        log: FollowUpLog,
        time_zone: impl Into<String>,
    ) -> Self {
        Self {
            receiver,
            bookings,
            log,
            meeting: None,
            notifier: None,
            time_zone: time_zone.into(),
            retention: Duration::minutes(DEFAULT_FOLLOW_UP_RETENTION_MINUTES),
        }
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_meeting_service(mut self, meeting: Option<SharedMeetingService>) -> Self {
        self.meeting = meeting;
        self
    }

    pub fn with_notification_service(mut self, notifier: Option<SharedNotificationService>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Processes jobs until every [`FollowUpQueue`] handle is dropped.
    pub async fn run(mut self) {
        info!(
            "Follow-up worker started (meeting: {}, notification: {})",
            self.meeting.is_some(),
            self.notifier.is_some()
        );
        while let Some(job) = self.receiver.recv().await {
            self.process(job).await;
            let pruned = self.log.prune_settled(Utc::now() - self.retention);
            if pruned > 0 {
                debug!("Dropped {} settled follow-up records", pruned);
            }
        }
        info!("Follow-up queue closed, worker stopping");
    }

    #[instrument(skip(self), fields(booking_id = job.booking_id))]
    pub async fn process(&self, job: FollowUpJob) -> FollowUpRecord {
        let booking_id = job.booking_id;
        let previous = self.log.update(booking_id, |record| record.attempts += 1);

        let booking = match self.bookings.find_by_id(booking_id).await {
            Ok(Some(booking)) => booking,
            Ok(None) => {
                warn!("Booking {} no longer exists, skipping follow-up", booking_id);
                return self.log.update(booking_id, |record| {
                    record.meeting = settle(record.meeting, StepStatus::Skipped);
                    record.notification = settle(record.notification, StepStatus::Skipped);
                    record.last_error = Some("booking no longer exists".to_string());
                });
            }
            Err(e) => {
                error!("Failed to load booking {}: {}", booking_id, e);
                return self.log.update(booking_id, |record| {
                    record.meeting = settle(record.meeting, StepStatus::Failed);
                    record.notification = settle(record.notification, StepStatus::Failed);
                    record.last_error = Some(e.to_string());
                });
            }
        };

        let mut errors = Vec::new();
        let (meeting, meeting_link) = self
            .meeting_step(&booking, previous.meeting_link.as_deref(), &mut errors)
            .await;

        let notification = if previous.notification == StepStatus::Done {
            StepStatus::Done
        } else {
            self.notification_step(&booking, meeting_link.as_deref(), &mut errors)
                .await
        };

        self.log.update(booking_id, |record| {
            record.meeting = meeting;
            record.meeting_link = meeting_link;
            record.notification = notification;
            record.last_error = if errors.is_empty() {
                None
            } else {
                Some(errors.join("; "))
            };
        })
    }

    /// Creates the meeting and stores its link on the booking.
    ///
    /// `created_link` is the link of an event created by an earlier attempt
    /// whose link never reached the booking; it is stored again instead of
    /// creating a second event.
    async fn meeting_step(
        &self,
        booking: &Booking,
        created_link: Option<&str>,
        errors: &mut Vec<String>,
    ) -> (StepStatus, Option<String>) {
        if let Some(link) = &booking.meeting_link {
            return (StepStatus::Done, Some(link.clone()));
        }
        if let Some(link) = created_link {
            let status = self.store_meeting_link(booking.id, link, errors).await;
            return (status, Some(link.to_string()));
        }
        let Some(meeting) = &self.meeting else {
            return (StepStatus::Skipped, None);
        };

        let professional = professional_label(booking);
        let request = MeetingRequest {
            summary: format!("Consulta con {}", professional),
            description: format!("Consulta online con {}", booking.client_name),
            attendee_email: booking.client_email.clone(),
            start_time: booking.start_at,
            end_time: booking.end_at,
            time_zone: self.time_zone.clone(),
        };

        match meeting.schedule_meeting(request).await {
            Ok(result) => match result.meeting_link {
                Some(link) => {
                    let status = self.store_meeting_link(booking.id, &link, errors).await;
                    (status, Some(link))
                }
                None => {
                    warn!("Meeting for booking {} has no join link", booking.id);
                    (StepStatus::Done, None)
                }
            },
            Err(e) => {
                error!("Meeting creation failed for booking {}: {}", booking.id, e);
                errors.push(format!("meeting: {}", e));
                (StepStatus::Failed, None)
            }
        }
    }

    async fn store_meeting_link(
        &self,
        booking_id: i64,
        link: &str,
        errors: &mut Vec<String>,
    ) -> StepStatus {
        match self.bookings.attach_meeting_link(booking_id, link).await {
            Ok(true) => {
                info!("Meeting link attached to booking {}", booking_id);
                StepStatus::Done
            }
            Ok(false) => {
                warn!("Booking {} was removed before its link was stored", booking_id);
                StepStatus::Skipped
            }
            Err(e) => {
                warn!("Could not store meeting link of booking {}: {}", booking_id, e);
                errors.push(format!("storing meeting link: {}", e));
                StepStatus::Failed
            }
        }
    }

    async fn notification_step(
        &self,
        booking: &Booking,
        meeting_link: Option<&str>,
        errors: &mut Vec<String>,
    ) -> StepStatus {
        let Some(notifier) = &self.notifier else {
            return StepStatus::Skipped;
        };

        let professional = professional_label(booking);
        let subject = confirmation_subject(&professional);
        let body = confirmation_body(
            &booking.client_name,
            &professional,
            &booking.start_at,
            meeting_link,
        );

        match notifier
            .send_email(&booking.client_email, &subject, &body, true)
            .await
        {
            Ok(result) => {
                info!(
                    "Confirmation for booking {} sent to {} ({})",
                    booking.id, booking.client_email, result.status
                );
                StepStatus::Done
            }
            Err(e) => {
                error!("Confirmation email for booking {} failed: {}", booking.id, e);
                errors.push(format!("notification: {}", e));
                StepStatus::Failed
            }
        }
    }
}

/// Keeps `Done` steps, replaces everything else with `outcome`.
fn settle(current: StepStatus, outcome: StepStatus) -> StepStatus {
    if current == StepStatus::Done {
        current
    } else {
        outcome
    }
}

fn professional_label(booking: &Booking) -> String {
    booking
        .professional_name
        .clone()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("profesional #{}", booking.professional_id))
}
