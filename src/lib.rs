//! Sitework: construction task workflow core.
//!
//! Buildings contain tasks, tasks are assigned to contractors, and finished
//! work only counts once the builder who owns the building approves it.
//! This crate implements that workflow as an in-process library: a
//! role-gated task state machine with an append-only audit trail,
//! dependency gating, notification generation, and an autonomous deadline
//! scheduler.
//!
//! # Architecture
//!
//! Sitework follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage, directories and
//!   notification delivery
//! - **Adapters**: Concrete implementations of ports (in-memory here)
//!
//! # Modules
//!
//! - [`task`]: Task aggregate, authorization policy and lifecycle service
//! - [`notification`]: Notification records, sink port and message templates
//! - [`scheduler`]: Overdue, reminder, cleanup and summary jobs
//! - [`config`]: TOML configuration
//! - [`clock`]: Manually advanced clock for deterministic runs

pub mod clock;
pub mod config;
pub mod notification;
pub mod scheduler;
pub mod task;
