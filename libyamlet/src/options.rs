//! Parser configuration.

/// Limits applied while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum number of blocks nested below the top-level map.
    pub max_depth: usize,
}

impl ParseOptions {
    /// Default nesting limit.
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    pub const fn new() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    /// No nesting limit. Only use on trusted input: each level is one
    /// recursive call.
    pub const fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }

    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}
