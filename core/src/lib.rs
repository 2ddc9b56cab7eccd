//! # Knotwork Core
//!
//! Protocol-light building blocks shared by every Knotwork crate:
//!
//! * [`Fragment`]: a unit of page content, raw or snippet
//! * [`KnotContext`]: the request-scoped value threaded through the knots
//! * [`Knot`]: the uniform asynchronous stage contract
//! * [`Splitter`]: the boundary that slices a page template into fragments

pub mod context;
pub mod fragment;
pub mod knot;
pub mod splitter;

pub use context::{ClientRequest, ClientResponse, KnotContext};
pub use fragment::{Fragment, FragmentError, RAW_FRAGMENT_ID, SNIPPET_FRAGMENT_ID};
pub use knot::{Knot, KnotError, KnotResult};
pub use splitter::Splitter;

pub mod prelude {
    pub use crate::context::{ClientRequest, ClientResponse, KnotContext};
    pub use crate::fragment::{Fragment, FragmentError};
    pub use crate::knot::{Knot, KnotError, KnotResult};
    pub use crate::splitter::Splitter;
    pub use async_trait::async_trait;
}
