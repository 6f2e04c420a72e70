//! Asynchronous flight search: models, routing strategies, providers, and
//! the task orchestrator behind `POST /search`.

pub mod budget;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod store;
pub mod strategy;
pub mod task;

pub use model::{
    BudgetOption, FlightOffer, OfferGroup, Passengers, RawItinerary, SearchRequest, SearchResults,
    TravelClass,
};
pub use orchestrator::SearchOrchestrator;
pub use provider::{FlightProvider, HttpProvider, LegQuery};
pub use store::{TaskStore, spawn_sweep_task};
pub use strategy::RouteBook;
pub use task::{SearchTask, TaskSnapshot, TaskStatus};
