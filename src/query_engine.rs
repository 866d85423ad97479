use crate::error::QueryError;
use async_snmp::{Auth, Client, Error as SnmpError, ErrorStatus, Oid, Retry, Value};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_PORT: u16 = 161;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Where and how to reach one printer's SNMP agent.
#[derive(Clone, Debug)]
pub struct SnmpTarget {
    pub address: String,
    pub port: u16,
    pub community: String,
    pub timeout: Duration,
    pub retries: u32,
}

impl SnmpTarget {
    pub fn new(address: &str, community: &str) -> Self {
        Self {
            address: address.to_string(),
            port: DEFAULT_PORT,
            community: community.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retries: 0,
        }
    }

    fn socket(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

/// A single-OID GET against one target.
///
/// `Ok(None)` means the agent answered but has no usable value at that OID
/// (noSuchObject, noSuchInstance, endOfMibView, or an empty string).
#[async_trait]
pub trait QueryEngine: Send + Sync {
    async fn query(&self, target: &SnmpTarget, oid: &str) -> Result<Option<String>, QueryError>;
}

/// SNMPv2c GET over UDP. A fresh client is built per request.
#[derive(Debug, Default, Clone, Copy)]
pub struct SnmpQueryEngine;

#[async_trait]
impl QueryEngine for SnmpQueryEngine {
    async fn query(&self, target: &SnmpTarget, oid: &str) -> Result<Option<String>, QueryError> {
        let oid = parse_oid(oid)?;

        let client = Client::builder(target.socket(), Auth::v2c(target.community.as_str()))
            .timeout(target.timeout)
            .retry(Retry {
                max_attempts: target.retries,
                ..Retry::default()
            })
            .connect()
            .await
            .map_err(|e| classify(*e))?;

        match client.get(&oid).await.map_err(|e| *e) {
            Ok(varbind) => Ok(as_string(&varbind.value)),
            // SNMPv1 agents signal a missing object through the error status
            Err(SnmpError::Snmp {
                status: ErrorStatus::NoSuchName,
                ..
            }) => Ok(None),
            Err(e) => Err(classify(e)),
        }
    }
}

fn classify(error: SnmpError) -> QueryError {
    match error {
        SnmpError::Timeout { .. } => QueryError::Timeout,
        other => QueryError::Transport(other.to_string()),
    }
}

/// Parses a dotted numeric OID such as `1.3.6.1.2.1.1.5.0`.
pub fn parse_oid(oid: &str) -> Result<Oid, QueryError> {
    let arcs = oid
        .trim()
        .trim_start_matches('.')
        .split('.')
        .map(|arc| arc.parse::<u32>())
        .collect::<Result<Vec<u32>, _>>()
        .map_err(|_| QueryError::InvalidOid(oid.to_string()))?;

    if arcs.len() < 2 {
        return Err(QueryError::InvalidOid(oid.to_string()));
    }

    Ok(Oid::from_slice(&arcs))
}

/// Decodes a value to text, dropping the NUL padding some firmware appends.
pub fn as_string(value: &Value) -> Option<String> {
    let text = match value {
        Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView | Value::Null => {
            debug!("No such object at OID");
            return None;
        }
        Value::OctetString(s) => String::from_utf8_lossy(s).into_owned(),
        Value::Opaque(s) => String::from_utf8_lossy(s).into_owned(),
        Value::Integer(i) => i.to_string(),
        Value::Counter32(i) => i.to_string(),
        Value::Gauge32(i) => i.to_string(),
        Value::TimeTicks(i) => i.to_string(),
        Value::Counter64(i) => i.to_string(),
        other => other.to_string(),
    };

    let text = text.trim_end_matches('\0');
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dotted_oids() {
        assert!(parse_oid("1.3.6.1.2.1.1.5.0").is_ok());
        assert!(parse_oid(".1.3.6.1.2.1.1.5.0").is_ok());
    }

    #[test]
    fn rejects_malformed_oids() {
        assert_eq!(
            parse_oid("1.3.six.1").unwrap_err(),
            QueryError::InvalidOid("1.3.six.1".to_string())
        );
        assert!(parse_oid("").is_err());
        assert!(parse_oid("1").is_err());
    }

    #[test]
    fn strips_trailing_nul_padding() {
        let value = Value::OctetString(b"Xerox VersaLink\0\0".to_vec().into());
        assert_eq!(as_string(&value), Some("Xerox VersaLink".to_string()));
    }

    #[test]
    fn missing_objects_decode_to_none() {
        assert_eq!(as_string(&Value::NoSuchObject), None);
        assert_eq!(as_string(&Value::NoSuchInstance), None);
        assert_eq!(as_string(&Value::OctetString(b"\0".to_vec().into())), None);
    }

    #[test]
    fn numbers_decode_to_text() {
        assert_eq!(as_string(&Value::Integer(-3)), Some("-3".to_string()));
        assert_eq!(as_string(&Value::Counter32(1500)), Some("1500".to_string()));
    }
}
