//! HTTP Family Link client
//!
//! This crate provides:
//! - [`FamilyLink`], the [`famlink_api::FamilyLinkApi`] implementation
//!   backed by the Family Link web endpoints
//! - Netscape cookie file loading ([`cookies`])
//! - SAPISIDHASH request signing ([`auth`])

pub mod auth;
pub mod cookies;

mod client;

pub use client::FamilyLink;
