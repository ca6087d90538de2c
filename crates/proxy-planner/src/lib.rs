//! COS Proxy Planner
//!
//! Derives the ordered list of Juju operations that inserts a pair of
//! `cos-proxy` applications between an existing deployment and a Canonical
//! Observability Stack (COS) model.
//!
//! The planner never talks to Juju. It works from `juju status --format yaml`
//! snapshots of the COS model, the primary model and any secondary models,
//! and prints the operations for an operator to run.
//!
//! # Example
//!
//! ```no_run
//! use proxy_planner::{PlanBuilder, PlanInputs, PlanOptions};
//! use topology_config::{CapabilityRegistries, parser};
//!
//! fn main() -> anyhow::Result<()> {
//!     let cos = parser::parse_file("cos.yaml")?;
//!     let primary = parser::parse_file("main.yaml")?;
//!
//!     let builder = PlanBuilder::new(CapabilityRegistries::default(), PlanOptions::new("lxd:0"))?;
//!     let plan = builder.build(&PlanInputs {
//!         cos: &cos,
//!         primary: &primary,
//!         secondaries: &[],
//!     })?;
//!
//!     println!("{plan}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod builder;
pub mod classifier;
pub mod error;
pub mod offers;
pub mod plan;
pub mod release;

pub use builder::{PlanBuilder, PlanInputs, PlanOptions};
pub use classifier::{CharmMatcher, Classification, Classifier, MatchMode};
pub use error::{PlanError, Result};
pub use offers::{OfferReference, resolve_offers};
pub use plan::{ActionPlan, ActionStep};
pub use release::{ReleaseClass, resolve_mode};
