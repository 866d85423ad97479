use thiserror::Error;

/// Failures of a single SNMP GET. "No such object" is not an error; the
/// query engine reports it as `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid object identifier: {0}")]
    InvalidOid(String),
}
