//! Unit tests for the deadline scheduler.

mod runner_tests;
