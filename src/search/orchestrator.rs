//! Search task orchestrator.
//!
//! `submit` never blocks on provider I/O: it validates, records the task,
//! spawns the worker, and returns the id. The worker fans provider queries
//! out concurrently, joins them under a wall-clock budget, and publishes
//! progress through fixed monotonic checkpoints. On timeout the task fails
//! and any partial results are discarded.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::SearchConfig;
use crate::error::{ProviderError, SearchError};

use super::budget::budget_alternatives;
use super::model::{
    BookingStep, FlightOffer, OfferGroup, RawItinerary, SearchRequest, SearchResults,
    SearchSummary, sort_offers,
};
use super::provider::{FlightProvider, LegQuery};
use super::store::TaskStore;
use super::strategy::{RouteBook, SearchStrategy, StrategyKind};
use super::task::{SearchTask, checkpoints};

/// Orchestrates asynchronous flight searches across providers.
pub struct SearchOrchestrator {
    config: SearchConfig,
    book: Arc<RouteBook>,
    providers: Vec<Arc<dyn FlightProvider>>,
    tasks: Arc<TaskStore>,
}

/// Outcome of one provider query, tagged with its strategy context.
struct QueryOutcome {
    provider: String,
    transport_cost: Decimal,
    result: Result<Vec<RawItinerary>, ProviderError>,
}

impl SearchOrchestrator {
    pub fn new(
        config: SearchConfig,
        book: Arc<RouteBook>,
        providers: Vec<Arc<dyn FlightProvider>>,
        tasks: Arc<TaskStore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            book,
            providers,
            tasks,
        })
    }

    pub fn task_store(&self) -> Arc<TaskStore> {
        Arc::clone(&self.tasks)
    }

    /// Validate and register a search, returning the task id immediately.
    /// The provider fan-out runs on a spawned worker.
    pub async fn submit(self: &Arc<Self>, request: SearchRequest) -> Result<Uuid, SearchError> {
        request.validate()?;

        let id = Uuid::new_v4();
        let task = SearchTask::new(
            id,
            request.clone(),
            self.config.task_budget,
            self.config.task_ttl,
        );
        self.tasks.insert(task).await;

        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            orchestrator.run(id, request).await;
        });

        Ok(id)
    }

    /// Worker entry: execute under the wall-clock budget and publish the
    /// terminal state.
    async fn run(self: Arc<Self>, id: Uuid, request: SearchRequest) {
        match tokio::time::timeout(self.config.task_budget, self.execute(id, &request)).await {
            Ok(Ok(results)) => {
                info!(task_id = %id, offers = results.summary.total_offers_found,
                      "Search task completed");
                self.tasks.update(id, |t| t.complete(results)).await;
            }
            Ok(Err(e)) => {
                warn!(task_id = %id, error = %e, "Search task failed");
                self.tasks.update(id, |t| t.fail(e.to_string())).await;
            }
            Err(_) => {
                warn!(task_id = %id, budget = ?self.config.task_budget, "Search task timed out");
                self.tasks.update(id, |t| t.fail("Search timed out")).await;
            }
        }
    }

    async fn execute(&self, id: Uuid, request: &SearchRequest) -> Result<SearchResults, SearchError> {
        self.tasks
            .update(id, |t| {
                t.set_progress(
                    checkpoints::STRATEGIES,
                    "generating_strategies",
                    "Planning routing strategies".into(),
                    None,
                )
            })
            .await;

        let strategies = self.book.strategies(request, self.config.max_strategies);

        self.tasks
            .update(id, |t| {
                t.set_progress(
                    checkpoints::DISPATCH,
                    "querying_providers",
                    format!(
                        "Querying {} providers across {} routings",
                        self.providers.len(),
                        strategies.len()
                    ),
                    None,
                )
            })
            .await;

        // One future per (provider, strategy) pair; hub strategies search
        // their legs inside the job so the join point stays flat.
        let mut jobs = FuturesUnordered::new();
        for strategy in &strategies {
            for provider in &self.providers {
                jobs.push(self.query(Arc::clone(provider), strategy.clone(), request.clone()));
            }
        }

        let total_jobs = jobs.len();
        let mut completed = 0usize;
        let mut successes = 0usize;
        let mut failures = 0usize;
        let mut tagged: Vec<(RawItinerary, Decimal)> = Vec::new();

        while let Some(outcome) = jobs.next().await {
            completed += 1;
            match outcome.result {
                Ok(itineraries) => {
                    successes += 1;
                    for itinerary in itineraries {
                        tagged.push((itinerary, outcome.transport_cost));
                    }
                }
                Err(e) => {
                    failures += 1;
                    warn!(provider = %outcome.provider, error = %e, "Provider query failed");
                }
            }

            // Walk the provider checkpoints as the join drains.
            let step = (completed * checkpoints::PROVIDERS.len()) / total_jobs.max(1);
            if step > 0 {
                let pct = checkpoints::PROVIDERS[step.min(checkpoints::PROVIDERS.len()) - 1];
                let found = tagged.len();
                self.tasks
                    .update(id, |t| {
                        t.set_progress(
                            pct,
                            "querying_providers",
                            format!("{completed}/{total_jobs} provider queries done"),
                            Some(found),
                        )
                    })
                    .await;
            }
        }

        if successes == 0 {
            return Err(SearchError::AllProvidersFailed {
                attempted: total_jobs,
            });
        }

        self.tasks
            .update(id, |t| {
                t.set_progress(
                    checkpoints::BUDGET_CARRIERS,
                    "checking_budget_airlines",
                    "Checking budget carriers outside aggregator coverage".into(),
                    None,
                )
            })
            .await;
        let budget = budget_alternatives(&self.book, request);

        self.tasks
            .update(id, |t| {
                t.set_progress(
                    checkpoints::GROUPING,
                    "grouping_results",
                    "Grouping and ranking offers".into(),
                    None,
                )
            })
            .await;

        Ok(self.group_results(request, &strategies, tagged, budget, successes, failures))
    }

    /// Run one provider query with its own timeout. Hub strategies search
    /// each leg and combine the cheapest into a separate-ticket itinerary.
    async fn query(
        &self,
        provider: Arc<dyn FlightProvider>,
        strategy: SearchStrategy,
        request: SearchRequest,
    ) -> QueryOutcome {
        let timeout = self.config.provider_timeout;
        let name = provider.name().to_string();

        let result = match strategy.kind {
            StrategyKind::Direct | StrategyKind::Nearby => {
                let query = LegQuery::for_trip(
                    &request,
                    &strategy.outbound_route[0],
                    &strategy.outbound_route[1],
                );
                run_with_timeout(&*provider, &query, timeout).await
            }
            StrategyKind::Hub => self.query_hub_legs(&*provider, &strategy, &request).await,
        };

        QueryOutcome {
            provider: name,
            transport_cost: strategy.extra_transport_cost,
            result,
        }
    }

    /// Search each hub leg concurrently and stitch the cheapest fares into
    /// one multi-leg, separate-ticket itinerary.
    async fn query_hub_legs(
        &self,
        provider: &dyn FlightProvider,
        strategy: &SearchStrategy,
        request: &SearchRequest,
    ) -> Result<Vec<RawItinerary>, ProviderError> {
        let timeout = self.config.provider_timeout;
        let route = &strategy.outbound_route;

        let leg_queries: Vec<LegQuery> = route
            .windows(2)
            .map(|pair| LegQuery::for_leg(request, &pair[0], &pair[1]))
            .collect();

        let leg_results = futures::future::join_all(
            leg_queries
                .iter()
                .map(|q| run_with_timeout(provider, q, timeout)),
        )
        .await;

        let mut cheapest_legs = Vec::with_capacity(leg_results.len());
        for result in leg_results {
            let mut itineraries = result?;
            itineraries.retain(|i| i.routing.len() == 2 && i.stops == 0);
            let Some(cheapest) = itineraries
                .into_iter()
                .min_by(|a, b| a.price_total.cmp(&b.price_total))
            else {
                // A hub routing with an unserved leg produces nothing.
                return Ok(vec![]);
            };
            cheapest_legs.push(cheapest);
        }

        Ok(vec![combine_legs(route, cheapest_legs)])
    }

    fn group_results(
        &self,
        request: &SearchRequest,
        strategies: &[SearchStrategy],
        tagged: Vec<(RawItinerary, Decimal)>,
        budget: Vec<super::model::BudgetOption>,
        successes: usize,
        failures: usize,
    ) -> SearchResults {
        let nearby = self.book.proximity_set(&request.origin, &request.destination);

        let mut direct = Vec::new();
        let mut nearby_airport = Vec::new();
        let mut hub_connections = Vec::new();

        for (itinerary, transport_cost) in tagged {
            let group =
                OfferGroup::classify(&itinerary, &request.origin, &request.destination, &nearby);
            let offer = self.build_offer(request, itinerary, transport_cost, group);
            match group {
                OfferGroup::Direct => direct.push(offer),
                OfferGroup::NearbyAirport => nearby_airport.push(offer),
                OfferGroup::HubConnection => hub_connections.push(offer),
                OfferGroup::BudgetAlternative => {}
            }
        }

        for group in [&mut direct, &mut nearby_airport, &mut hub_connections] {
            sort_offers(group);
            group.truncate(self.config.max_offers_per_group);
        }

        let total_offers_found = direct.len() + nearby_airport.len() + hub_connections.len();
        SearchResults {
            summary: SearchSummary {
                strategies_attempted: strategies.len(),
                successful_queries: successes,
                failed_queries: failures,
                total_offers_found,
                request: request.clone(),
            },
            direct,
            nearby_airport,
            hub_connections,
            budget_alternatives: budget,
        }
    }

    fn build_offer(
        &self,
        request: &SearchRequest,
        itinerary: RawItinerary,
        transport_cost: Decimal,
        group: OfferGroup,
    ) -> FlightOffer {
        let policies = self.book.policy(&itinerary.airline_code);
        let booking_guide = (group == OfferGroup::HubConnection && !itinerary.through_fare)
            .then(|| booking_guide(&itinerary.routing, request));

        FlightOffer {
            id: Uuid::new_v4(),
            group,
            effective_total: itinerary.price_total + transport_cost,
            airline: itinerary.airline,
            airline_code: itinerary.airline_code,
            routing: itinerary.routing,
            stops: itinerary.stops,
            price_total: itinerary.price_total,
            currency: itinerary.currency,
            duration_minutes: itinerary.duration_minutes,
            departure: itinerary.departure,
            arrival: itinerary.arrival,
            policies,
            booking_url: itinerary.booking_url,
            booking_guide,
        }
    }
}

async fn run_with_timeout(
    provider: &dyn FlightProvider,
    query: &LegQuery,
    timeout: std::time::Duration,
) -> Result<Vec<RawItinerary>, ProviderError> {
    match tokio::time::timeout(timeout, provider.search(query)).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout {
            provider: provider.name().to_string(),
            timeout,
        }),
    }
}

/// Stitch per-leg fares into one separate-ticket itinerary. Layovers are
/// assumed at two hours per connection for the duration estimate.
fn combine_legs(route: &[String], legs: Vec<RawItinerary>) -> RawItinerary {
    const LAYOVER_MINUTES: u32 = 120;

    let first = legs.first().expect("at least one leg");
    let last = legs.last().expect("at least one leg");
    let connections = (legs.len() as u32).saturating_sub(1);

    RawItinerary {
        provider: first.provider.clone(),
        airline: legs
            .iter()
            .map(|l| l.airline.as_str())
            .collect::<Vec<_>>()
            .join(" + "),
        airline_code: first.airline_code.clone(),
        routing: route.to_vec(),
        stops: connections,
        through_fare: false,
        price_total: legs.iter().map(|l| l.price_total).sum(),
        currency: first.currency.clone(),
        duration_minutes: legs.iter().map(|l| l.duration_minutes).sum::<u32>()
            + connections * LAYOVER_MINUTES,
        departure: first.departure,
        arrival: last.arrival,
        booking_url: None,
    }
}

/// Derive the human-followable booking guide for a separate-ticket routing.
fn booking_guide(routing: &[String], request: &SearchRequest) -> Vec<BookingStep> {
    routing
        .windows(2)
        .enumerate()
        .map(|(i, pair)| BookingStep {
            step: i + 1,
            from: pair[0].clone(),
            to: pair[1].clone(),
            date: request.departure_date,
            instruction: format!(
                "Book {} → {} as a separate ticket for {}; allow at least 3 hours \
                 for the connection and re-check baggage between legs",
                pair[0],
                pair[1],
                request.departure_date.format("%Y-%m-%d"),
            ),
        })
        .collect()
}
