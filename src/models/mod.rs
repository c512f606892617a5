//! Domain model: declarative resource specs as the host plans them.

pub mod cleanup;
pub mod repository;
pub mod routing;

pub use cleanup::{CleanupCriteria, CleanupPolicy};
pub use repository::{RepositorySpec, Topology};
pub use routing::RoutingRule;
