//! Family Link client contract
//!
//! This crate provides:
//! - The [`FamilyLinkApi`] trait the reconciler talks to
//! - Wire models for the service's JSON responses
//! - [`MockFamilyLink`] for tests

mod mock;
mod models;
mod traits;

pub use mock::*;
pub use models::*;
pub use traits::*;
