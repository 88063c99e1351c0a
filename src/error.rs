use thiserror::Error;

/// Which side of a keyword comparison a table belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusSide {
    Study,
    Reference,
}

impl std::fmt::Display for CorpusSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorpusSide::Study => f.write_str("study"),
            CorpusSide::Reference => f.write_str("reference"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("keyword must not be empty or whitespace")]
    EmptyKeyword,

    #[error("n-gram size must be between 2 and 5, got {n}")]
    InvalidNGramSize { n: usize },

    #[error("{side} corpus has zero tokens")]
    EmptyCorpus { side: CorpusSide },

    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error while {context}: {source}")]
    Csv {
        context: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl AnalysisError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn csv(context: &'static str, source: csv::Error) -> Self {
        Self::Csv { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
