//! Test utilities.
//!
//! This module provides:
//! - Test data factories for creating valid test fixtures
//! - In-memory repository implementations for mocking persistence
//! - Scripted fakes for the billing, image and storage providers
//! - A builder for an `AppState` wired entirely to in-memory doubles

mod app_state_builder;
mod billing_mocks;
mod factories;
mod thumbnail_mocks;

pub use app_state_builder::*;
pub use billing_mocks::*;
pub use factories::*;
pub use thumbnail_mocks::*;
