mod common;

use common::{TestApp, next_date_for_day};
use scheduling_backend::domain::models::slot::{STATUS_ACTIVE, STATUS_CLOSED, STATUS_FULL, TimeSlot};
use scheduling_backend::domain::ports::TimeSlotRepository;
use scheduling_backend::error::AppError;

async fn generated_slots(app: &TestApp, day_of_week: i32) -> Vec<TimeSlot> {
    let date = next_date_for_day(day_of_week);
    app.scheduling().generate_slots_for_date(date).await.unwrap()
}

#[tokio::test]
async fn test_capacity_lifecycle() {
    let app = TestApp::new().await;
    app.seed_weekday(1, "18:00", "19:00", 10, 2).await;
    let slots = generated_slots(&app, 1).await;
    let slot_id = slots[0].id.clone();

    // 1. Fill to capacity
    let after_first = app.scheduling().add_order(&slot_id, "order-1").await.unwrap();
    assert_eq!(after_first.current_orders, 1);
    assert_eq!(after_first.status, STATUS_ACTIVE);
    assert!(after_first.is_available());

    let after_second = app.scheduling().add_order(&slot_id, "order-2").await.unwrap();
    assert_eq!(after_second.current_orders, 2);
    assert_eq!(after_second.status, STATUS_FULL);
    assert!(!after_second.is_available());
    assert_eq!(after_second.orders(), vec!["order-1", "order-2"]);

    // 2. Beyond capacity fails without mutating anything
    let err = app.scheduling().add_order(&slot_id, "order-3").await.unwrap_err();
    assert!(matches!(err, AppError::SlotFull(_)));
    let unchanged = app.state.slot_repo.find_by_id(&slot_id).await.unwrap().unwrap();
    assert_eq!(unchanged.current_orders, 2);
    assert_eq!(unchanged.orders().len(), 2);

    // 3. Removal reverts FULL and frees a seat
    let after_remove = app.scheduling().remove_order(&slot_id, "order-1").await.unwrap();
    assert_eq!(after_remove.current_orders, 1);
    assert_eq!(after_remove.status, STATUS_ACTIVE);
    assert_eq!(after_remove.orders(), vec!["order-2"]);

    let refilled = app.scheduling().add_order(&slot_id, "order-3").await.unwrap();
    assert_eq!(refilled.current_orders, 2);
    assert_eq!(refilled.status, STATUS_FULL);
}

#[tokio::test]
async fn test_duplicate_add_rejected() {
    let app = TestApp::new().await;
    app.seed_weekday(2, "09:00", "10:00", 10, 3).await;
    let slots = generated_slots(&app, 2).await;
    let slot_id = slots[0].id.clone();

    app.scheduling().add_order(&slot_id, "order-1").await.unwrap();
    let err = app.scheduling().add_order(&slot_id, "order-1").await.unwrap_err();
    assert!(matches!(err, AppError::OrderAlreadyAssigned { .. }));

    let slot = app.state.slot_repo.find_by_id(&slot_id).await.unwrap().unwrap();
    assert_eq!(slot.current_orders, 1);
    assert_eq!(slot.orders().len(), 1);
}

#[tokio::test]
async fn test_remove_is_noop_for_absent_order() {
    let app = TestApp::new().await;
    app.seed_weekday(3, "09:00", "10:00", 10, 2).await;
    let slots = generated_slots(&app, 3).await;
    let slot_id = slots[0].id.clone();

    let slot = app.scheduling().remove_order(&slot_id, "ghost-order").await.unwrap();
    assert_eq!(slot.current_orders, 0);

    // Missing slot is still an error for both operations
    let err = app.scheduling().remove_order("no-such-slot", "x").await.unwrap_err();
    assert!(matches!(err, AppError::SlotNotFound(_)));
    let err = app.scheduling().add_order("no-such-slot", "x").await.unwrap_err();
    assert!(matches!(err, AppError::SlotNotFound(_)));
}

#[tokio::test]
async fn test_assign_order_by_exact_window() {
    let app = TestApp::new().await;
    app.seed_weekday(4, "14:00", "15:00", 20, 2).await;
    let date = next_date_for_day(4);
    app.scheduling().generate_slots_for_date(date).await.unwrap();

    let slot = app
        .scheduling()
        .assign_order_to_slot("order-9", date, "14:20")
        .await
        .unwrap();
    assert_eq!(slot.start_time, "14:20");
    assert_eq!(slot.orders(), vec!["order-9"]);

    // No slot starts at 14:10 with a 20-minute grid
    let err = app
        .scheduling()
        .assign_order_to_slot("order-9", date, "14:10")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::SlotNotFound(_)));

    let err = app
        .scheduling()
        .assign_order_to_slot("order-9", date, "not-a-time")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_find_next_available_skips_full_and_closed() {
    let app = TestApp::new().await;
    app.seed_weekday(5, "10:00", "10:30", 10, 1).await;
    let date = next_date_for_day(5);
    let slots = app.scheduling().generate_slots_for_date(date).await.unwrap();
    assert_eq!(slots.len(), 3);

    // Fill the first slot, close the second
    app.scheduling().add_order(&slots[0].id, "order-1").await.unwrap();
    app.scheduling()
        .set_slot_status(&slots[1].id, STATUS_CLOSED)
        .await
        .unwrap();

    let next = app
        .scheduling()
        .find_next_available_slot(date, 7)
        .await
        .unwrap();
    assert_eq!(next.id, slots[2].id);
    assert_eq!(next.start_time, "10:20");
}

#[tokio::test]
async fn test_find_next_available_generates_on_demand() {
    let app = TestApp::new().await;
    app.seed_weekday(1, "18:00", "19:00", 10, 2).await;
    let monday = next_date_for_day(1);

    // Nothing generated yet; the scan must create the horizon itself,
    // tolerating the unconfigured weekdays in between.
    let from = monday - chrono::Duration::days(3);
    let next = app
        .scheduling()
        .find_next_available_slot(from, 14)
        .await
        .unwrap();
    assert_eq!(next.date, monday);
    assert_eq!(next.start_time, "18:00");
}

#[tokio::test]
async fn test_find_next_available_exhausts_horizon() {
    let app = TestApp::new().await;
    // Only a closed Sunday configured: nothing can ever be generated
    app.seed_closed_weekday(0).await;

    let from = next_date_for_day(0);
    let err = app
        .scheduling()
        .find_next_available_slot(from, 5)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NoAvailableSlot(5, _)));
}

#[tokio::test]
async fn test_set_status_transitions() {
    let app = TestApp::new().await;
    app.seed_weekday(6, "09:00", "09:30", 10, 1).await;
    let slots = generated_slots(&app, 6).await;
    let slot_id = slots[0].id.clone();

    // Closing a slot with an order keeps the order but removes availability
    app.scheduling().add_order(&slot_id, "order-1").await.unwrap();
    let closed = app
        .scheduling()
        .set_slot_status(&slot_id, STATUS_CLOSED)
        .await
        .unwrap();
    assert_eq!(closed.status, STATUS_CLOSED);
    assert_eq!(closed.orders(), vec!["order-1"]);

    // Forcing ACTIVE on a slot at capacity is rejected
    let err = app
        .scheduling()
        .set_slot_status(&slot_id, STATUS_ACTIVE)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::SlotFull(_)));

    // After freeing a seat it can rejoin the rotation
    app.scheduling().remove_order(&slot_id, "order-1").await.unwrap();
    let reopened = app
        .scheduling()
        .set_slot_status(&slot_id, STATUS_ACTIVE)
        .await
        .unwrap();
    assert_eq!(reopened.status, STATUS_ACTIVE);
    assert!(reopened.is_available());

    // Unknown status strings and unknown slots are rejected
    let err = app
        .scheduling()
        .set_slot_status(&slot_id, "DORMANT")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    let err = app
        .scheduling()
        .set_slot_status("no-such-slot", STATUS_CLOSED)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::SlotNotFound(_)));
}

#[tokio::test]
async fn test_order_count_matches_order_list_after_any_sequence() {
    let app = TestApp::new().await;
    app.seed_weekday(1, "18:00", "18:30", 10, 3).await;
    let slots = generated_slots(&app, 1).await;
    let slot_id = slots[0].id.clone();
    let svc = app.scheduling();

    svc.add_order(&slot_id, "a").await.unwrap();
    svc.add_order(&slot_id, "b").await.unwrap();
    svc.remove_order(&slot_id, "a").await.unwrap();
    svc.remove_order(&slot_id, "a").await.unwrap(); // idempotent
    svc.add_order(&slot_id, "c").await.unwrap();
    let _ = svc.add_order(&slot_id, "b").await.unwrap_err(); // duplicate
    svc.add_order(&slot_id, "d").await.unwrap();
    let _ = svc.add_order(&slot_id, "e").await.unwrap_err(); // full

    let slot = app.state.slot_repo.find_by_id(&slot_id).await.unwrap().unwrap();
    assert_eq!(slot.current_orders as usize, slot.orders().len());
    assert_eq!(slot.orders(), vec!["b", "c", "d"]);
    assert_eq!(slot.status, STATUS_FULL);
}
