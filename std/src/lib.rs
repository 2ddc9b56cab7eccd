//! # Knotwork Std
//!
//! Stock pieces most deployments need: the HTML splitter that cuts a page
//! into fragments and the assembler knot that joins them back into a
//! response body.

pub mod knots;
pub mod prelude;
pub mod splitter;

pub use knots::assembler::{FragmentAssemblerKnot, UnprocessedStrategy};
pub use splitter::HtmlFragmentSplitter;
