//! Unit tests for the task workflow.

mod state_transition_tests;
