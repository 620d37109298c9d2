//! HTTP surface for the artifact mediation core: the Request Adaptor.
//!
//! Routing, request parsing, and response shaping live here; the state
//! machine, invariants, and backend dispatch live in `artifact::service`.

mod handlers;
mod server;
mod state;

pub use server::start_server;
pub use state::AppState;
