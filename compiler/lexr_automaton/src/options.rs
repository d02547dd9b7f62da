//! Compilation options supplied by the caller.

/// Options that apply on top of the specification's own `%option`s.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CompileOptions {
    /// Fold ASCII case in every pattern (`-i`). Also enabled by
    /// `%option caseless` in the specification.
    pub case_insensitive: bool,
    /// Report rules that can never match (W3001).
    pub report_unreachable: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            case_insensitive: false,
            report_unreachable: true,
        }
    }
}
