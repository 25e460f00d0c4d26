#[derive(Debug, thiserror::Error)]
pub enum DialogueError {
    #[error("dialogue section marker '{0}' not found in script")]
    MissingSectionMarker(String),

    #[error("header row missing after section marker")]
    MissingHeaderRow,

    #[error("required column '{0}' not found in header row")]
    MissingColumn(String),

    #[error("failed to read script: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid cleaning rule pattern '{pattern}': {source}")]
    InvalidRulePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to load cleaning rules: {0}")]
    Rules(String),
}
