//! Service factory implementation.
//!
//! Builds the meeting and notification providers enabled by cargo features
//! and the `use_*` flags, and erases their concrete error types so the
//! follow-up worker can hold them as trait objects.
use consulta_common::services::{
    BoxFuture, BoxedError, MeetingRequest, MeetingResult, MeetingService, NotificationResult,
    NotificationService, ServiceFactory,
};
use consulta_config::AppConfig;
use std::sync::Arc;
#[allow(unused_imports)] // used only by certain features
use {
    consulta_common::is_feature_enabled,
    tracing::{error, info, warn},
};

#[cfg(feature = "gcal")]
use consulta_gcal::{create_calendar_hub, GoogleMeetService};

#[cfg(feature = "mail")]
use consulta_mail::SmtpNotificationService;

/// Adapts any meeting provider to `Error = BoxedError`.
pub struct BoxedMeetingService<S> {
    inner: S,
}

impl<S> BoxedMeetingService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: MeetingService> MeetingService for BoxedMeetingService<S> {
    type Error = BoxedError;

    fn schedule_meeting(
        &self,
        request: MeetingRequest,
    ) -> BoxFuture<'_, MeetingResult, Self::Error> {
        let inner = &self.inner;
        Box::pin(async move {
            inner
                .schedule_meeting(request)
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }
}

/// Adapts any notification provider to `Error = BoxedError`.
pub struct BoxedNotificationService<S> {
    inner: S,
}

impl<S> BoxedNotificationService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: NotificationService> NotificationService for BoxedNotificationService<S> {
    type Error = BoxedError;

    fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        is_html: bool,
    ) -> BoxFuture<'_, NotificationResult, Self::Error> {
        let to = to.to_string();
        let subject = subject.to_string();
        let body = body.to_string();
        let inner = &self.inner;

        Box::pin(async move {
            inner
                .send_email(&to, &subject, &body, is_html)
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }
}

/// Providers configured at startup.
///
/// A provider that is enabled but fails to initialise is logged and left out;
/// bookings are still admitted and their follow-ups record the skipped step.
pub struct ConsultaServiceFactory {
    meeting_service: Option<Arc<dyn MeetingService<Error = BoxedError>>>,
    notification_service: Option<Arc<dyn NotificationService<Error = BoxedError>>>,
}

impl ConsultaServiceFactory {
    #[allow(unused_variables)]
    pub async fn new(config: Arc<AppConfig>) -> Self {
        #[allow(unused_mut)]
        let mut factory = Self {
            meeting_service: None,
            notification_service: None,
        };

        #[cfg(feature = "gcal")]
        if let Some(gcal_config) = config
            .gcal
            .as_ref()
            .filter(|section| is_feature_enabled(config.use_gcal, Some(*section)))
        {
            info!("Initializing Google Calendar meeting service...");
            match create_calendar_hub(gcal_config).await {
                Ok(hub) => {
                    let service =
                        GoogleMeetService::new(Arc::new(hub), gcal_config.calendar_id.clone());
                    factory.meeting_service = Some(Arc::new(BoxedMeetingService::new(service)));
                    info!("Google Calendar meeting service initialized.");
                }
                Err(e) => error!("Failed to create Google Calendar hub: {}", e),
            }
        }

        #[cfg(feature = "mail")]
        if let Some(mail_config) = config
            .mail
            .as_ref()
            .filter(|section| is_feature_enabled(config.use_mail, Some(*section)))
        {
            info!("Initializing SMTP notification service...");
            match SmtpNotificationService::new(mail_config) {
                Ok(service) => {
                    factory.notification_service =
                        Some(Arc::new(BoxedNotificationService::new(service)));
                    info!("SMTP notification service initialized.");
                }
                Err(e) => error!("Failed to create SMTP transport: {}", e),
            }
        }

        if factory.meeting_service.is_none() {
            warn!("No meeting provider; bookings will not get a meeting link");
        }
        if factory.notification_service.is_none() {
            warn!("No notification provider; confirmation emails are disabled");
        }

        factory
    }
}

impl ServiceFactory for ConsultaServiceFactory {
    fn meeting_service(&self) -> Option<Arc<dyn MeetingService<Error = BoxedError>>> {
        self.meeting_service.clone()
    }

    fn notification_service(&self) -> Option<Arc<dyn NotificationService<Error = BoxedError>>> {
        self.notification_service.clone()
    }
}
