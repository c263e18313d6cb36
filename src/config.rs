use typed_builder::TypedBuilder;

use crate::sssp::matrix::Weight;

/// The integer the original input format used for an absent edge.
pub const DEFAULT_SENTINEL: Weight = 1_000_000;

/// Run configuration shared by the library driver and the CLI.
#[derive(Debug, Clone, TypedBuilder)]
pub struct Config {
    /// Number of cooperating workers. Must divide the vertex count.
    #[builder(default = 1)]
    pub workers: usize,
    /// Input value read as "no edge".
    #[builder(default = DEFAULT_SENTINEL)]
    pub sentinel: Weight,
}

impl Default for Config {
    fn default() -> Self {
        Self::builder().build()
    }
}
