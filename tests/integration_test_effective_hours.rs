mod common;

use common::{TestApp, next_date_for_day};
use scheduling_backend::domain::models::schedule::DayHours;
use scheduling_backend::domain::services::scheduling_service::ExceptionInput;
use scheduling_backend::error::AppError;

#[tokio::test]
async fn test_weekly_default_resolution() {
    let app = TestApp::new().await;
    app.seed_weekday(1, "18:00", "21:30", 10, 2).await;

    let date = next_date_for_day(1);
    let effective = app.scheduling().resolve_effective_hours(date).await.unwrap();
    assert!(effective.is_open);
    let hours = effective.hours.unwrap();
    assert_eq!(hours.open, "18:00");
    assert_eq!(hours.close, "21:30");
    assert_eq!(effective.slot_duration, 10);
    assert_eq!(effective.orders_per_slot, 2);
}

#[tokio::test]
async fn test_unconfigured_day_fails() {
    let app = TestApp::new().await;
    let date = next_date_for_day(6);
    let err = app.scheduling().resolve_effective_hours(date).await.unwrap_err();
    assert!(matches!(err, AppError::ScheduleNotConfigured(6)));
}

#[tokio::test]
async fn test_exception_overrides_then_removal_restores() {
    let app = TestApp::new().await;
    app.seed_weekday(1, "18:00", "21:30", 10, 2).await;
    let date = next_date_for_day(1);

    // 1. Closing exception wins over the weekly default
    app.scheduling()
        .add_exception(
            date,
            ExceptionInput {
                is_closed: true,
                reason: Some("Public holiday".to_string()),
                custom_hours: None,
            },
        )
        .await
        .unwrap();
    let effective = app.scheduling().resolve_effective_hours(date).await.unwrap();
    assert!(!effective.is_open);
    assert!(effective.hours.is_none());

    // 2. Removing it restores the weekly default
    app.scheduling().remove_exception(date).await.unwrap();
    let effective = app.scheduling().resolve_effective_hours(date).await.unwrap();
    assert!(effective.is_open);
    assert_eq!(effective.hours.unwrap().open, "18:00");

    // 3. Removing again is a no-op, not an error
    app.scheduling().remove_exception(date).await.unwrap();
}

#[tokio::test]
async fn test_exception_custom_hours() {
    let app = TestApp::new().await;
    app.seed_weekday(2, "09:00", "17:00", 10, 3).await;
    let date = next_date_for_day(2);

    app.scheduling()
        .add_exception(
            date,
            ExceptionInput {
                is_closed: false,
                reason: Some("Early closure".to_string()),
                custom_hours: Some(DayHours {
                    open: "09:00".to_string(),
                    close: "13:00".to_string(),
                }),
            },
        )
        .await
        .unwrap();

    let effective = app.scheduling().resolve_effective_hours(date).await.unwrap();
    assert!(effective.is_open);
    assert_eq!(effective.hours.unwrap().close, "13:00");
    // Duration and capacity are never overridden by an exception
    assert_eq!(effective.slot_duration, 10);
    assert_eq!(effective.orders_per_slot, 3);
}

#[tokio::test]
async fn test_exception_without_custom_hours_keeps_weekly_hours() {
    let app = TestApp::new().await;
    app.seed_weekday(3, "08:00", "12:00", 10, 2).await;
    let date = next_date_for_day(3);

    app.scheduling()
        .add_exception(
            date,
            ExceptionInput {
                is_closed: false,
                reason: Some("Staffed anyway".to_string()),
                custom_hours: None,
            },
        )
        .await
        .unwrap();

    let effective = app.scheduling().resolve_effective_hours(date).await.unwrap();
    assert!(effective.is_open);
    assert_eq!(effective.hours.unwrap().open, "08:00");
}

#[tokio::test]
async fn test_exception_upsert_by_date_keeps_latest() {
    let app = TestApp::new().await;
    app.seed_weekday(5, "09:00", "17:00", 10, 2).await;
    let date = next_date_for_day(5);

    app.scheduling()
        .add_exception(
            date,
            ExceptionInput {
                is_closed: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    app.scheduling()
        .add_exception(
            date,
            ExceptionInput {
                is_closed: false,
                custom_hours: Some(DayHours {
                    open: "10:00".to_string(),
                    close: "15:00".to_string(),
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Only the latest exception survives
    let listed = app.scheduling().list_exceptions(date, date).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(!listed[0].is_closed);

    let effective = app.scheduling().resolve_effective_hours(date).await.unwrap();
    assert_eq!(effective.hours.unwrap().open, "10:00");
}

#[tokio::test]
async fn test_exception_validation() {
    let app = TestApp::new().await;
    app.seed_weekday(1, "09:00", "17:00", 10, 2).await;
    let date = next_date_for_day(1);

    // Exception on an unconfigured weekday
    let saturday = next_date_for_day(6);
    let err = app
        .scheduling()
        .add_exception(
            saturday,
            ExceptionInput {
                is_closed: true,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ScheduleNotConfigured(6)));

    // Closing exception with custom hours
    let err = app
        .scheduling()
        .add_exception(
            date,
            ExceptionInput {
                is_closed: true,
                custom_hours: Some(DayHours {
                    open: "09:00".to_string(),
                    close: "10:00".to_string(),
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Reason above 200 characters
    let err = app
        .scheduling()
        .add_exception(
            date,
            ExceptionInput {
                is_closed: true,
                reason: Some("x".repeat(201)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Custom hours must be a valid forward interval
    let err = app
        .scheduling()
        .add_exception(
            date,
            ExceptionInput {
                is_closed: false,
                custom_hours: Some(DayHours {
                    open: "14:00".to_string(),
                    close: "09:00".to_string(),
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}
