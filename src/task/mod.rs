//! Construction task workflow.
//!
//! Tasks belong to a building, are assigned to one contractor and move
//! through a review-gated lifecycle: a contractor records progress and
//! requests approval, and the builder who owns the building approves or
//! rejects the work. Every transition appends an audit entry and may emit a
//! notification. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
