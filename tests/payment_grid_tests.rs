mod common;

use common::{Fixture, YEAR};
use condodesk::domain::grid::INVALID_CELL_TITLE;
use condodesk::optimistic::{REFRESH_FAILED_TITLE, SAVE_FAILED_TITLE};
use condodesk::store::DEMO_MONTHLY_QUOTA_CENTS;
use condodesk::{
    CondoConfig, CondoError, Injection, PaymentEntry, PaymentGrid, PaymentStatus, PaymentTool,
    Period, ToastVariant,
};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

fn period(month: u8) -> Period {
    Period::new(YEAR, month).unwrap()
}

#[tokio::test]
async fn grid_loads_the_seeded_year() {
    let fixture = Fixture::new().await;
    let grid = fixture.grid().await;

    let rows = grid.rows().unwrap();
    let units: Vec<&str> = rows.iter().map(|row| row.unit.as_str()).collect();
    assert_eq!(units, vec!["1A", "1B", "2A", "2B", "3A", "3B"]);

    let march = grid.summary(3).unwrap();
    assert_eq!(march.paid, 4);
    assert_eq!(march.late, 2);
    assert_eq!(march.collected_cents, 4 * DEMO_MONTHLY_QUOTA_CENTS);

    let april = grid.summary(4).unwrap();
    assert_eq!(april.pending, 6);
}

#[tokio::test]
async fn clicking_without_a_tool_does_nothing() {
    let fixture = Fixture::new().await;
    let grid = fixture.grid().await;

    let report = grid.click_cell(fixture.apartment(0), 4).await.unwrap();
    assert!(report.is_none());
    assert_eq!(fixture.store.mutation_count(), 0);
}

#[tokio::test]
async fn confirmed_click_persists_and_keeps_the_edit_until_next_refresh() {
    let fixture = Fixture::new().await;
    let mut grid = fixture.grid().await;
    let apartment = fixture.apartment(0);
    grid.select_tool(PaymentTool::MarkPaid);

    let report = grid.click_cell(apartment, 4).await.unwrap().unwrap();

    assert!(report.is_confirmed());
    assert_eq!(
        report.data(),
        Some(&PaymentEntry::paid(DEMO_MONTHLY_QUOTA_CENTS))
    );
    assert_eq!(grid.row(apartment).unwrap().unwrap().status(4), PaymentStatus::Paid);
    assert_eq!(
        fixture.store.payment(apartment, period(4)).await,
        Some(PaymentEntry::paid(DEMO_MONTHLY_QUOTA_CENTS))
    );
    assert_eq!(grid.view().pending_count().unwrap(), 1);
    assert!(fixture.toasts.is_empty());

    assert_ok!(grid.load().await);
    assert_eq!(grid.view().pending_count().unwrap(), 0);
    assert_eq!(grid.row(apartment).unwrap().unwrap().status(4), PaymentStatus::Paid);
}

#[tokio::test]
async fn refresh_after_success_reloads_from_the_server() {
    let fixture = Fixture::with_config(CondoConfig::new().refresh_after_success(true)).await;
    let mut grid = fixture.grid().await;
    grid.select_tool(PaymentTool::MarkLate);

    let report = grid.click_cell(fixture.apartment(1), 5).await.unwrap().unwrap();

    assert!(report.refreshed);
    assert_eq!(grid.view().pending_count().unwrap(), 0);
    assert_eq!(
        grid.row(fixture.apartment(1)).unwrap().unwrap().status(5),
        PaymentStatus::Late
    );
}

#[tokio::test(start_paused = true)]
async fn rejected_click_renders_immediately_then_rolls_back_with_a_toast() {
    let fixture = Fixture::new().await;
    let mut grid = fixture.grid().await;
    let apartment = fixture.apartment(0);
    grid.select_tool(PaymentTool::MarkPaid);
    fixture
        .store
        .push_injection(Injection::reject("conflict").delayed(Duration::from_millis(100)));

    let observe = async {
        let row = grid.row(apartment).unwrap().unwrap();
        assert_eq!(row.status(4), PaymentStatus::Paid);
        assert_eq!(row.entry(4), Some(&PaymentEntry::paid(DEMO_MONTHLY_QUOTA_CENTS)));
    };
    let (report, ()) = tokio::join!(grid.click_cell(apartment, 4), observe);
    let report = report.unwrap().unwrap();

    assert_eq!(report.error(), Some("conflict"));
    assert_eq!(grid.row(apartment).unwrap().unwrap().status(4), PaymentStatus::Pending);
    assert_eq!(fixture.store.payment(apartment, period(4)).await, None);

    let toasts = fixture.toasts.entries();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].title, SAVE_FAILED_TITLE);
    assert_eq!(toasts[0].description.as_deref(), Some("conflict"));
    assert_eq!(toasts[0].variant, ToastVariant::Destructive);
}

#[tokio::test]
async fn rollback_shows_a_concurrent_write_from_another_session() {
    let fixture = Fixture::new().await;
    let mut grid = fixture.grid().await;
    let apartment = fixture.apartment(2);
    grid.select_tool(PaymentTool::MarkPaid);

    fixture
        .store
        .set_payment(apartment, period(6), PaymentEntry::late())
        .await;
    fixture.store.fail_next("cell changed by another manager");

    let report = grid.click_cell(apartment, 6).await.unwrap().unwrap();

    assert!(!report.is_confirmed());
    assert_eq!(grid.row(apartment).unwrap().unwrap().status(6), PaymentStatus::Late);
}

#[tokio::test(start_paused = true)]
async fn edits_to_different_cells_settle_independently() {
    let fixture = Fixture::new().await;
    let mut grid = fixture.grid().await;
    let (first, second) = (fixture.apartment(0), fixture.apartment(1));
    grid.select_tool(PaymentTool::MarkLate);

    fixture
        .store
        .push_injection(Injection::reject("locked").delayed(Duration::from_millis(50)));
    fixture
        .store
        .push_injection(Injection::pass().delayed(Duration::from_millis(10)));

    let observe = async {
        let rows = grid.rows().unwrap();
        assert_eq!(rows[0].status(3), PaymentStatus::Late);
        assert_eq!(rows[1].status(3), PaymentStatus::Late);
    };
    let (a, b, ()) = tokio::join!(
        grid.click_cell(first, 3),
        grid.click_cell(second, 3),
        observe
    );

    assert_eq!(a.unwrap().unwrap().error(), Some("locked"));
    assert!(b.unwrap().unwrap().is_confirmed());

    assert_eq!(grid.row(first).unwrap().unwrap().status(3), PaymentStatus::Paid);
    assert_eq!(grid.row(second).unwrap().unwrap().status(3), PaymentStatus::Late);
    assert_eq!(fixture.toasts.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn a_cell_confirmed_after_a_sibling_rollback_still_shows_the_server_write() {
    let fixture = Fixture::new().await;
    let mut grid = fixture.grid().await;
    let (first, second) = (fixture.apartment(0), fixture.apartment(1));
    grid.select_tool(PaymentTool::MarkPaid);

    fixture
        .store
        .push_injection(Injection::reject("locked").delayed(Duration::from_millis(10)));
    fixture
        .store
        .push_injection(Injection::pass().delayed(Duration::from_millis(50)));

    let (a, b) = tokio::join!(grid.click_cell(first, 4), grid.click_cell(second, 4));

    assert!(!a.unwrap().unwrap().is_confirmed());
    let b = b.unwrap().unwrap();
    assert!(b.is_confirmed());
    assert!(b.refreshed);

    assert_eq!(
        fixture.store.payment(second, period(4)).await,
        Some(PaymentEntry::paid(DEMO_MONTHLY_QUOTA_CENTS))
    );
    assert_eq!(grid.row(first).unwrap().unwrap().status(4), PaymentStatus::Pending);
    assert_eq!(grid.row(second).unwrap().unwrap().status(4), PaymentStatus::Paid);
    assert_eq!(grid.view().pending_count().unwrap(), 0);
    assert_eq!(fixture.toasts.len(), 1);
}

#[tokio::test]
async fn months_of_one_apartment_are_distinct_cells() {
    let fixture = Fixture::new().await;
    let mut grid = fixture.grid().await;
    let apartment = fixture.apartment(4);
    grid.select_tool(PaymentTool::MarkPaid);

    assert!(grid.click_cell(apartment, 7).await.unwrap().unwrap().is_confirmed());
    fixture.store.fail_next("closed period");
    let failed = grid.click_cell(apartment, 8).await.unwrap().unwrap();

    assert!(!failed.is_confirmed());
    let row = grid.row(apartment).unwrap().unwrap();
    assert_eq!(row.status(7), PaymentStatus::Paid);
    assert_eq!(row.status(8), PaymentStatus::Pending);
}

#[tokio::test]
async fn invalid_cells_never_reach_the_server() {
    let fixture = Fixture::new().await;
    let mut grid = fixture.grid().await;
    grid.select_tool(PaymentTool::MarkPaid);

    let err = assert_err!(grid.click_cell(fixture.apartment(0), 13).await);
    assert!(matches!(err, CondoError::Validation(_)));

    let err = assert_err!(grid.click_cell(uuid::Uuid::new_v4(), 2).await);
    assert!(matches!(err, CondoError::Validation(_)));

    assert_eq!(fixture.store.mutation_count(), 0);
    assert_eq!(grid.view().pending_count().unwrap(), 0);
    let titles: Vec<String> = fixture.toasts.entries().into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec![INVALID_CELL_TITLE, INVALID_CELL_TITLE]);
}

#[tokio::test]
async fn transport_failures_roll_back_like_rejections() {
    let fixture = Fixture::new().await;
    let mut grid = fixture.grid().await;
    let apartment = fixture.apartment(5);
    grid.select_tool(PaymentTool::MarkPending);
    fixture.store.break_next("connection reset");

    let report = grid.click_cell(apartment, 1).await.unwrap().unwrap();

    assert_eq!(report.error(), Some("Transport error: connection reset"));
    assert_eq!(grid.row(apartment).unwrap().unwrap().status(1), PaymentStatus::Paid);
    assert_eq!(fixture.toasts.len(), 1);
}

#[tokio::test]
async fn a_failed_rollback_refresh_is_reported_and_the_edit_still_dropped() {
    let fixture = Fixture::new().await;
    let mut grid = fixture.grid().await;
    let apartment = fixture.apartment(0);
    grid.select_tool(PaymentTool::MarkLate);
    fixture.store.fail_next("conflict");
    fixture.store.break_next_fetch("backend unavailable");

    let report = grid.click_cell(apartment, 2).await.unwrap().unwrap();

    assert!(!report.refreshed);
    assert_eq!(grid.row(apartment).unwrap().unwrap().status(2), PaymentStatus::Paid);
    let titles: Vec<String> = fixture.toasts.entries().into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec![SAVE_FAILED_TITLE, REFRESH_FAILED_TITLE]);
}

#[tokio::test]
async fn only_managers_open_the_payment_grid() {
    let fixture = Fixture::new().await;

    let result = PaymentGrid::new(
        fixture.building.resident.clone(),
        YEAR,
        fixture.actions(),
        fixture.notifier(),
        &fixture.config,
    );

    assert!(matches!(result, Err(CondoError::Forbidden(_))));
}
