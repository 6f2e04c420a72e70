//! Search task lifecycle: submission, polling, grouping invariants, and
//! timeout behavior.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use flight_assist::config::SearchConfig;
use flight_assist::error::ProviderError;
use flight_assist::search::SearchOrchestrator;
use flight_assist::search::model::{Passengers, RawItinerary, SearchRequest, TravelClass};
use flight_assist::search::provider::{FlightProvider, LegQuery};
use flight_assist::search::store::TaskStore;
use flight_assist::search::strategy::RouteBook;
use flight_assist::search::task::{TaskSnapshot, TaskStatus};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

struct TableProvider {
    name: String,
    delay: Option<Duration>,
    rows: Vec<RawItinerary>,
}

impl TableProvider {
    fn new(name: &str, rows: Vec<RawItinerary>) -> Self {
        Self {
            name: name.into(),
            delay: None,
            rows,
        }
    }

    fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl FlightProvider for TableProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, query: &LegQuery) -> Result<Vec<RawItinerary>, ProviderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .rows
            .iter()
            .filter(|r| {
                r.routing.first().map(String::as_str) == Some(query.origin.as_str())
                    && r.routing.last().map(String::as_str) == Some(query.destination.as_str())
            })
            .cloned()
            .collect())
    }
}

fn itinerary(code: &str, routing: &[&str], stops: u32, price: Decimal, minutes: u32) -> RawItinerary {
    RawItinerary {
        provider: String::new(),
        airline: format!("{code} Air"),
        airline_code: code.into(),
        routing: routing.iter().map(|s| s.to_string()).collect(),
        stops,
        through_fare: stops == 0,
        price_total: price,
        currency: "USD".into(),
        duration_minutes: minutes,
        departure: Utc.with_ymd_and_hms(2026, 9, 15, 9, 0, 0).unwrap(),
        arrival: Utc.with_ymd_and_hms(2026, 9, 15, 18, 0, 0).unwrap(),
        booking_url: None,
    }
}

fn request() -> SearchRequest {
    SearchRequest {
        origin: "DAR".into(),
        destination: "BKK".into(),
        departure_date: NaiveDate::from_ymd_opt(2026, 9, 15).unwrap(),
        return_date: None,
        passengers: Passengers::default(),
        travel_class: TravelClass::Economy,
    }
}

fn config() -> SearchConfig {
    SearchConfig {
        task_budget: Duration::from_secs(5),
        provider_timeout: Duration::from_secs(2),
        task_ttl: Duration::from_secs(600),
        sweep_interval: Duration::from_secs(60),
        max_strategies: 4,
        max_offers_per_group: 5,
    }
}

fn orchestrator(
    config: SearchConfig,
    providers: Vec<Arc<dyn FlightProvider>>,
) -> Arc<SearchOrchestrator> {
    SearchOrchestrator::new(
        config,
        Arc::new(RouteBook::builtin()),
        providers,
        TaskStore::new(),
    )
}

async fn poll_until_terminal(orch: &SearchOrchestrator, id: Uuid) -> TaskSnapshot {
    for _ in 0..250 {
        let snap = orch.task_store().snapshot(id).await.unwrap();
        if snap.status != TaskStatus::Processing {
            return snap;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("task stuck in processing");
}

#[tokio::test]
async fn offers_in_every_group_are_sorted_by_price() {
    let provider = TableProvider::new(
        "alpha",
        vec![
            itinerary("QR", &["DAR", "BKK"], 0, dec!(910), 560),
            itinerary("EK", &["DAR", "BKK"], 0, dec!(740), 540),
            itinerary("TK", &["DAR", "BKK"], 0, dec!(820), 600),
            itinerary("KQ", &["ZNZ", "BKK"], 0, dec!(655), 620),
            itinerary("ET", &["DAR", "DXB"], 0, dec!(280), 320),
            itinerary("EK", &["DAR", "DXB"], 0, dec!(260), 330),
            itinerary("EK", &["DXB", "BKK"], 0, dec!(340), 380),
        ],
    );

    let orch = orchestrator(config(), vec![Arc::new(provider)]);
    let id = orch.submit(request()).await.unwrap();
    let snap = poll_until_terminal(&orch, id).await;

    assert_eq!(snap.status, TaskStatus::Completed);
    let results = snap.results.unwrap();

    for group in [&results.direct, &results.nearby_airport, &results.hub_connections] {
        for pair in group.windows(2) {
            assert!(
                pair[0].effective_total <= pair[1].effective_total,
                "group not sorted by price"
            );
        }
    }

    assert_eq!(results.direct[0].price_total, dec!(740));

    // Hub invariant: routing > 2 airports or stops > 0, and the stitched
    // separate-ticket offer carries a booking guide.
    for offer in &results.hub_connections {
        assert!(offer.routing.len() > 2 || offer.stops > 0);
    }
    let stitched = &results.hub_connections[0];
    assert_eq!(stitched.price_total, dec!(600)); // 260 + 340
    assert_eq!(stitched.routing, vec!["DAR", "DXB", "BKK"]);
    let guide = stitched.booking_guide.as_ref().unwrap();
    assert_eq!(guide.len(), 2);
    assert_eq!(guide[0].step, 1);
    assert_eq!(guide[0].from, "DAR");
    assert_eq!(guide[1].to, "BKK");

    // Direct offers all have a two-airport path
    for offer in &results.direct {
        assert_eq!(offer.routing.len(), 2);
        assert_eq!(offer.stops, 0);
    }
}

#[tokio::test]
async fn unresponsive_providers_fail_the_task_within_budget() {
    let mut cfg = config();
    cfg.task_budget = Duration::from_millis(150);
    cfg.provider_timeout = Duration::from_secs(30);

    let provider = TableProvider::new(
        "slow",
        vec![itinerary("EK", &["DAR", "BKK"], 0, dec!(700), 540)],
    )
    .slow(Duration::from_secs(10));

    let orch = orchestrator(cfg, vec![Arc::new(provider)]);
    let id = orch.submit(request()).await.unwrap();
    let snap = poll_until_terminal(&orch, id).await;

    assert_eq!(snap.status, TaskStatus::Failed);
    assert!(snap.error.unwrap().contains("timed out"));
    // Partial results are discarded, never returned as completed
    assert!(snap.results.is_none());
}

#[tokio::test]
async fn per_provider_timeout_isolates_slow_sources() {
    let mut cfg = config();
    cfg.provider_timeout = Duration::from_millis(100);

    let fast = TableProvider::new(
        "fast",
        vec![itinerary("EK", &["DAR", "BKK"], 0, dec!(700), 540)],
    );
    let slow = TableProvider::new(
        "slow",
        vec![itinerary("QR", &["DAR", "BKK"], 0, dec!(600), 500)],
    )
    .slow(Duration::from_secs(10));

    let orch = orchestrator(cfg, vec![Arc::new(fast), Arc::new(slow)]);
    let id = orch.submit(request()).await.unwrap();
    let snap = poll_until_terminal(&orch, id).await;

    // The slow source's offers are missing but the task completes.
    assert_eq!(snap.status, TaskStatus::Completed);
    let results = snap.results.unwrap();
    assert_eq!(results.direct.len(), 1);
    assert_eq!(results.direct[0].airline_code, "EK");
    assert!(results.summary.failed_queries > 0);
}

#[tokio::test]
async fn progress_only_ever_moves_forward() {
    let provider = TableProvider::new(
        "alpha",
        vec![itinerary("EK", &["DAR", "BKK"], 0, dec!(700), 540)],
    )
    .slow(Duration::from_millis(30));

    let orch = orchestrator(config(), vec![Arc::new(provider)]);
    let id = orch.submit(request()).await.unwrap();

    let mut last = 0u8;
    loop {
        let snap = orch.task_store().snapshot(id).await.unwrap();
        assert!(
            snap.progress.percentage >= last,
            "progress went backwards: {} -> {}",
            last,
            snap.progress.percentage
        );
        last = snap.progress.percentage;
        if snap.status != TaskStatus::Processing {
            assert_eq!(snap.progress.percentage, 100);
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn unknown_and_expired_tasks_read_as_not_found() {
    let orch = orchestrator(config(), vec![Arc::new(TableProvider::new("alpha", vec![]))]);

    assert!(orch.task_store().snapshot(Uuid::new_v4()).await.is_err());

    let mut cfg = config();
    cfg.task_ttl = Duration::from_millis(300);
    let orch = orchestrator(cfg, vec![Arc::new(TableProvider::new("alpha", vec![]))]);
    let id = orch.submit(request()).await.unwrap();
    poll_until_terminal(&orch, id).await;

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(orch.task_store().snapshot(id).await.is_err());

    // The sweep actually removes it
    assert_eq!(orch.task_store().sweep_expired().await, 1);
    assert_eq!(orch.task_store().len().await, 0);
}

#[tokio::test]
async fn concurrent_tasks_are_tracked_independently() {
    let provider = TableProvider::new(
        "alpha",
        vec![itinerary("EK", &["DAR", "BKK"], 0, dec!(700), 540)],
    );
    let orch = orchestrator(config(), vec![Arc::new(provider)]);

    let a = orch.submit(request()).await.unwrap();
    let b = orch.submit(request()).await.unwrap();
    assert_ne!(a, b);

    let snap_a = poll_until_terminal(&orch, a).await;
    let snap_b = poll_until_terminal(&orch, b).await;
    assert_eq!(snap_a.status, TaskStatus::Completed);
    assert_eq!(snap_b.status, TaskStatus::Completed);
    assert_eq!(snap_a.task_id, a);
    assert_eq!(snap_b.task_id, b);
}
