// Library root
// -----------
// This crate builds reversible change plans against an Immich server and
// replays or undoes them later. The binary (`main.rs`) only parses the
// command line and calls into `cli`.
//
// Module responsibilities:
// - `api`: authenticated HTTP calls to the server, behind a `Transport`
//   seam so the network can be swapped out.
// - `plan`: the persisted plan document (operations of paired
//   apply/revert requests).
// - `generators`: read current server state and diff it against the
//   requested state, one generator per use case.
// - `applier`: execute or preview a plan, forwards or backwards.
// - `cli`, `config`, `logging`, `ui`: process plumbing around the core.
pub mod api;
pub mod applier;
pub mod cli;
pub mod config;
pub mod error;
pub mod generators;
pub mod logging;
pub mod plan;
pub mod types;
pub mod ui;

pub use api::{ApiClient, ApiError, Transport};
pub use applier::Applier;
pub use error::PlanError;
pub use generators::Generator;
pub use plan::{Body, Direction, Operation, Plan, Request};
