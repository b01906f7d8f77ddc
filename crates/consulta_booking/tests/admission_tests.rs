
use chrono::NaiveDate;
use consulta_booking::slots::free_slots_for;
use consulta_booking::{Admission, BookingError, BookingRequest, FollowUpQueue, ProfessionalRef, StepStatus};
use consulta_common::models::{BookingFilter, NewProfessional, Professional};
use consulta_db::{
    AvailabilityRepository, BookingRepository, DbError, ProfessionalRepository,
    SqlAvailabilityRepository, SqlBookingRepository, SqlProfessionalRepository,
};
use fixtures::{add_professional, booking_config, request, test_db, ANA};
use std::future::Future;
use std::sync::Arc;

type SqlAdmission = Admission<SqlProfessionalRepository, SqlBookingRepository>;

fn admission(client: &consulta_db::DbClient, queue: FollowUpQueue) -> SqlAdmission {
    Admission::new(
        SqlProfessionalRepository::new(client.clone()),
        SqlBookingRepository::new(client.clone()),
        queue,
        &booking_config(),
    )
    .unwrap()
}

fn june_10() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
}

#[tokio::test]
async fn test_day_of_bookings_for_ana() {
    let db = test_db().await;
    let ana = add_professional(&db.client, ANA, 30).await;
    let availability = SqlAvailabilityRepository::new(db.client.clone());
    let bookings = SqlBookingRepository::new(db.client.clone());
    let (queue, _receiver) = FollowUpQueue::channel(16);
    let admission = admission(&db.client, queue);

    availability
        .set_day_hours(ana.id, june_10(), &["09:00".to_string(), "09:30".to_string()])
        .await
        .unwrap();
    assert_eq!(
        free_slots_for(&availability, &bookings, ana.id, june_10()).await.unwrap(),
        vec!["09:00", "09:30"]
    );

    let first = admission
        .admit(&request(ProfessionalRef::Name(ANA.to_string()), "2024-06-10T09:00"))
        .await
        .unwrap();
    assert_eq!(first.professional_id, ana.id);
    assert_eq!(first.professional_name.as_deref(), Some(ANA));
    assert_eq!(first.end_at.to_string(), "2024-06-10 09:30:00");
    assert_eq!(
        free_slots_for(&availability, &bookings, ana.id, june_10()).await.unwrap(),
        vec!["09:30"]
    );

    let again = admission
        .admit(&request(ProfessionalRef::Name(ANA.to_string()), "2024-06-10T09:00"))
        .await;
    assert!(matches!(again, Err(BookingError::SlotOccupied { .. })), "got {:?}", again);

    // Back-to-back with the first booking
    admission
        .admit(&request(ProfessionalRef::Id(ana.id), "2024-06-10T09:30"))
        .await
        .unwrap();
    assert!(free_slots_for(&availability, &bookings, ana.id, june_10())
        .await
        .unwrap()
        .is_empty());
    assert_eq!(bookings.list_all(BookingFilter::default()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_professional_duration_sets_the_interval() {
    let db = test_db().await;
    let roberto = add_professional(&db.client, "Lic. Roberto Ruiz", 50).await;
    let (queue, _receiver) = FollowUpQueue::channel(16);
    let admission = admission(&db.client, queue);

    let booking = admission
        .admit(&request(ProfessionalRef::Id(roberto.id), "2024-06-10T10:00"))
        .await
        .unwrap();
    assert_eq!(booking.end_at.to_string(), "2024-06-10 10:50:00");

    let overlapping = admission
        .admit(&request(ProfessionalRef::Id(roberto.id), "2024-06-10T10:30"))
        .await;
    assert!(matches!(overlapping, Err(BookingError::SlotOccupied { .. })));

    admission
        .admit(&request(ProfessionalRef::Id(roberto.id), "2024-06-10T10:50"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_same_time_with_other_professional_is_allowed() {
    let db = test_db().await;
    let ana = add_professional(&db.client, ANA, 30).await;
    let maria = add_professional(&db.client, "Dra. María Gómez", 30).await;
    let (queue, _receiver) = FollowUpQueue::channel(16);
    let admission = admission(&db.client, queue);

    for id in [ana.id, maria.id] {
        admission
            .admit(&request(ProfessionalRef::Id(id), "2024-06-10T09:00"))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_invalid_request_persists_nothing() {
    let db = test_db().await;
    add_professional(&db.client, ANA, 30).await;
    let bookings = SqlBookingRepository::new(db.client.clone());
    let (queue, _receiver) = FollowUpQueue::channel(16);
    let admission = admission(&db.client, queue);

    let mut bad = request(ProfessionalRef::Name(ANA.to_string()), "2024-06-10T09:00");
    bad.rut = Some("7520873-9".to_string());
    bad.phone = None;

    match admission.admit(&bad).await {
        Err(BookingError::Validation { fields }) => assert_eq!(fields, vec!["rut", "phone"]),
        other => panic!("expected validation error, got {:?}", other),
    }
    match admission.admit(&BookingRequest::default()).await {
        Err(BookingError::Validation { fields }) => assert_eq!(fields.len(), 6),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(bookings.list_all(BookingFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_professional() {
    let db = test_db().await;
    let (queue, _receiver) = FollowUpQueue::channel(16);
    let admission = admission(&db.client, queue);

    let by_name = admission
        .admit(&request(ProfessionalRef::Name("Dr. Nadie".to_string()), "2024-06-10T09:00"))
        .await;
    assert!(matches!(by_name, Err(BookingError::ProfessionalNotFound(_))));

    let by_id = admission
        .admit(&request(ProfessionalRef::Id(99), "2024-06-10T09:00"))
        .await;
    assert!(matches!(by_id, Err(BookingError::ProfessionalNotFound(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_admissions_yield_one_booking() {
    const ATTEMPTS: usize = 8;

    let db = test_db().await;
    let ana = add_professional(&db.client, ANA, 30).await;
    let bookings = SqlBookingRepository::new(db.client.clone());
    let (queue, _receiver) = FollowUpQueue::channel(16);
    let admission = Arc::new(admission(&db.client, queue));

    let mut handles = Vec::new();
    for _ in 0..ATTEMPTS {
        let admission = admission.clone();
        let request = request(ProfessionalRef::Id(ana.id), "2024-06-10T09:00");
        handles.push(tokio::spawn(async move { admission.admit(&request).await }));
    }

    let mut admitted = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(BookingError::SlotOccupied { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(admitted, 1);
    assert_eq!(conflicts, ATTEMPTS - 1);
    assert_eq!(bookings.list_all(BookingFilter::default()).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_admissions_for_different_professionals_all_succeed() {
    const PROFESSIONALS: usize = 8;
    const ROUNDS: u32 = 10;

    let db = test_db().await;
    let mut ids = Vec::new();
    for i in 0..PROFESSIONALS {
        ids.push(add_professional(&db.client, &format!("Profesional {}", i), 30).await.id);
    }
    let bookings = SqlBookingRepository::new(db.client.clone());
    let (queue, _receiver) = FollowUpQueue::channel(256);
    let admission = Arc::new(admission(&db.client, queue));

    let mut storage_errors = 0;
    for round in 0..ROUNDS {
        let mut handles = Vec::new();
        for &id in &ids {
            let admission = admission.clone();
            let request = request(
                ProfessionalRef::Id(id),
                &format!("2024-06-10T{:02}:00", 8 + round),
            );
            handles.push(tokio::spawn(async move { admission.admit(&request).await }));
        }
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => {}
                Err(BookingError::Storage(err)) => {
                    eprintln!("round {}: {}", round, err);
                    storage_errors += 1;
                }
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }
    }

    assert_eq!(storage_errors, 0);
    assert_eq!(
        bookings.list_all(BookingFilter::default()).await.unwrap().len(),
        PROFESSIONALS * ROUNDS as usize
    );
}

/// Deletes the professional right after handing it out, like an admin
/// removing them while a booking is being admitted.
struct DeletedAfterLookup(SqlProfessionalRepository);

impl ProfessionalRepository for DeletedAfterLookup {
    fn init_schema(&self) -> impl Future<Output = Result<(), DbError>> + Send {
        self.0.init_schema()
    }

    fn create(
        &self,
        professional: NewProfessional,
        default_duration: i64,
    ) -> impl Future<Output = Result<Professional, DbError>> + Send {
        self.0.create(professional, default_duration)
    }

    fn update(
        &self,
        id: i64,
        professional: NewProfessional,
        default_duration: i64,
    ) -> impl Future<Output = Result<Option<Professional>, DbError>> + Send {
        self.0.update(id, professional, default_duration)
    }

    fn find_by_id(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<Professional>, DbError>> + Send {
        async move {
            let found = self.0.find_by_id(id).await?;
            self.0.delete_cascade(id).await?;
            Ok(found)
        }
    }

    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Professional>, DbError>> + Send {
        self.0.find_by_name(name)
    }

    fn list(&self) -> impl Future<Output = Result<Vec<Professional>, DbError>> + Send {
        self.0.list()
    }

    fn count(&self) -> impl Future<Output = Result<i64, DbError>> + Send {
        self.0.count()
    }

    fn delete_cascade(&self, id: i64) -> impl Future<Output = Result<bool, DbError>> + Send {
        self.0.delete_cascade(id)
    }
}

#[tokio::test]
async fn test_professional_deleted_during_admission_is_not_found() {
    let db = test_db().await;
    let ana = add_professional(&db.client, ANA, 30).await;
    let bookings = SqlBookingRepository::new(db.client.clone());
    let (queue, _receiver) = FollowUpQueue::channel(16);
    let admission = Admission::new(
        DeletedAfterLookup(SqlProfessionalRepository::new(db.client.clone())),
        SqlBookingRepository::new(db.client.clone()),
        queue,
        &booking_config(),
    )
    .unwrap();

    let result = admission
        .admit(&request(ProfessionalRef::Id(ana.id), "2024-06-10T09:00"))
        .await;

    assert!(matches!(result, Err(BookingError::ProfessionalNotFound(_))), "got {:?}", result);
    assert!(bookings.list_all(BookingFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_admission_queues_follow_up_and_survives_a_closed_queue() {
    let db = test_db().await;
    let ana = add_professional(&db.client, ANA, 30).await;

    let (queue, receiver) = FollowUpQueue::channel(16);
    let admission = admission(&db.client, queue.clone());
    let booking = admission
        .admit(&request(ProfessionalRef::Id(ana.id), "2024-06-10T09:00"))
        .await
        .unwrap();
    let record = queue.log().get(booking.id).unwrap();
    assert_eq!(record.meeting, StepStatus::Pending);

    drop(receiver);
    let second = admission
        .admit(&request(ProfessionalRef::Id(ana.id), "2024-06-10T11:00"))
        .await
        .unwrap();
    let record = queue.log().get(second.id).unwrap();
    assert_eq!(record.meeting, StepStatus::Failed);
    assert_eq!(record.notification, StepStatus::Failed);
}
