use thiserror::Error;

/// Malformed input facts. Fatal: the run aborts without a report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphIntegrityError {
    #[error("file path '{path}' does not resolve to a canonical identity")]
    UnresolvableFile { path: String },

    #[error("{what} in '{file}' has line number 0 (lines are 1-based)")]
    InvalidLine { file: String, what: String },
}

/// Configuration that cannot be compiled into an analysis context.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid pattern '{pattern}' in {context}")]
    InvalidPattern {
        pattern: String,
        context: String,
        #[source]
        source: globset::Error,
    },

    #[error(
        "score weights must be monotonic (blocked >= circular >= warning >= complexity), \
         got blocked={blocked}, circular={circular}, warning={warning}, complexity={complexity}"
    )]
    NonMonotonicWeights {
        blocked: u32,
        circular: u32,
        warning: u32,
        complexity: u32,
    },

    #[error("grade breakpoints must satisfy 100 >= a > b > c > d >= 0, got a={a}, b={b}, c={c}, d={d}")]
    InvalidGradeBands { a: u8, b: u8, c: u8, d: u8 },

    #[error("layer rule {index} has an empty '{field}' pattern")]
    EmptyRulePattern { index: usize, field: &'static str },
}

/// Everything that can stop a run short of a report, other than cancellation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    GraphIntegrity(#[from] GraphIntegrityError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
