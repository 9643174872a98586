//! # Crucible Core
//!
//! The engine of the Crucible system - a stateful tool-invocation
//! pipeline: session establishment, parallel request fan-out with
//! workbench indirection, remote analysis, and schema-validated
//! publishing.
//!
//! ## Architecture
//!
//! - `models` - the three payload schemas crossing the boundary
//! - `router` - the tool router seam (simulated and HTTP backends)
//! - `tools` - the four stage wrappers plus the slug registry
//! - `pipeline` - fixed-order orchestration with an event stream
//! - `report` - the durable report sink
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crucible_core::models::ResearchQuery;
//! use crucible_core::pipeline::{Orchestrator, OrchestratorConfig};
//! use crucible_core::router::SimulatedRouter;
//!
//! let router = Arc::new(SimulatedRouter::default());
//! let mut orchestrator = Orchestrator::new(OrchestratorConfig::default(), router);
//! let outcome = orchestrator.run(query).await?;
//! ```

pub mod error;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod router;
pub mod tools;
