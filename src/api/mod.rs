pub mod client;
pub mod generation;
pub mod query;

pub use client::{api_url, fetch_data, fetch_operators, fetch_problems, fetch_route_stops, fetch_stop_popup, submit_manual_match};
pub use generation::{Generation, RequestGeneration};
pub use query::{problems_query, DataQuery};
