//! # lb-enrich
//!
//! The enrichment pipeline: turns a list of package names into stored,
//! enriched records.
//!
//! - [`BoundedExecutor`] caps how many units hold an admission slot at once.
//! - [`Upstream`] abstracts the three fetches so runs can be driven against
//!   the live services or an in-memory fake.
//! - [`BatchDriver`] plans a run (ingest or refresh), walks it in sequential
//!   batches, and writes each successful unit to the store.
//! - [`FailureSink`] collects per-unit failures and writes them to one
//!   timestamped artifact at the end of the run.
//!
//! A failing unit never fails the run. Only an unloadable input set or an
//! unwritable failure artifact is fatal ([`EnrichError`]).

pub mod context;
pub mod driver;
pub mod error;
pub mod executor;
pub mod sink;
pub mod upstream;

pub use context::{BatchReport, RunReport, RunTally};
pub use driver::{BatchDriver, RunPlan};
pub use error::{EnrichError, UnitError};
pub use executor::BoundedExecutor;
pub use sink::FailureSink;
pub use upstream::Upstream;
