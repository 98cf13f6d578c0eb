//! # lb-core
//!
//! Core types and pure transformations for the npm leaderboard.
//!
//! This crate provides the pieces of the enrichment pipeline that never touch
//! the network or the store:
//! - The persisted [`record::PackageRecord`] document and its update projection
//! - Typed results of the three upstream fetches
//! - The calendar-week download aggregator and its observation window
//! - The record builder merging fetch results into an update
//! - Failure entries collected during a run
//! - Unit and run-mode enums

pub mod builder;
pub mod enums;
pub mod failure;
pub mod record;
pub mod upstream;
pub mod weekly;
