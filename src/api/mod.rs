//! HTTP API for the pricing engine.
//!
//! Exposes piece costing, freight, assembly and monthly index derivation as
//! JSON endpoints over a shared, read-only reference-data snapshot.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AssemblyRequest, DeliverySite, DeriveIndexRequest, DistanceSource, FreightRequest,
    PieceCostRequest,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
