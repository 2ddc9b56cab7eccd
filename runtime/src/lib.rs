//! # Knotwork Runtime
//!
//! Request-scoped dispatch through a chain of knots.
//!
//! * [`KnotRegistry`]: address -> knot, populated once at startup
//! * [`KnotProxy`]: the traced, time-bounded handle the router invokes
//! * [`TransitionRouter`]: follows transitions through a [`TransitionTable`]

pub mod proxy;
pub mod registry;
pub mod router;
pub mod routing;

pub mod prelude {
    pub use crate::proxy::{DeliveryOptions, KnotProxy};
    pub use crate::registry::KnotRegistry;
    pub use crate::router::{Routed, RouterError, Termination, TransitionRouter};
    pub use crate::routing::{RoutingEntry, TransitionTable};
}

pub use proxy::{DeliveryOptions, KnotProxy};
pub use registry::KnotRegistry;
pub use router::{Routed, RouterError, Termination, TransitionRouter};
pub use routing::{RoutingEntry, TransitionTable};
