/// Default limit for nested types (arrays of tuples of arrays, ...).
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Knobs shared by the type parser, the decoder and the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Maximum nesting level of a type tree or value tree.
    pub max_depth: usize,
    /// Reject `string` payloads that are not valid UTF-8. Off by default:
    /// payloads are passed through as raw bytes.
    pub strict_utf8: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict_utf8: false,
        }
    }
}

impl CodecConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_strict_utf8(mut self, strict_utf8: bool) -> Self {
        self.strict_utf8 = strict_utf8;
        self
    }
}
