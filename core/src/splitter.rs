use crate::fragment::Fragment;

/// Slices a page template into an ordered sequence of fragments.
///
/// Implementations never produce empty fragments, and concatenating the
/// content of the returned fragments reproduces the template.
pub trait Splitter: Send + Sync {
    fn split(&self, template: &str) -> Vec<Fragment>;
}
