pub use crate::knots::assembler::{FragmentAssemblerKnot, UnprocessedStrategy};
pub use crate::splitter::HtmlFragmentSplitter;
