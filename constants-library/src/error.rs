/// Errors from reading measurement notation and NIST tables.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("cannot parse measurement: {input}")]
    Measurement { input: String },
    #[error("expected name and value columns in {row:?}")]
    MissingColumns { row: String },
    #[error("line {line}: {source}")]
    Row {
        line: usize,
        #[source]
        source: Box<ParseError>,
    },
}
