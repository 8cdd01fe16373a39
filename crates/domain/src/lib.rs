//! Domain layer for the beverage machine.
//!
//! This crate provides the pure parts of the preparation pipeline:
//! - Recipe resolution, merging a base recipe with per-request options
//! - Stock availability, comparing an effective recipe with a ledger snapshot
//! - A read-only catalog service for display queries

pub mod availability;
pub mod catalog;
pub mod error;
pub mod recipe;

pub use availability::{Availability, LedgerSnapshot, StockShortage, compute_availability};
pub use catalog::{BeverageView, CatalogService};
pub use error::DomainError;
pub use recipe::{EffectiveRecipe, PrepareOptions, SUGAR, SUGAR_UNIT, apply_options};
