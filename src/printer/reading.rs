use crate::error::QueryError;

/// One measured field: either a value, or the reason there is none.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reading<T> {
    Value(T),
    /// Not bound for this variant, or the agent has nothing at the OID.
    Unsupported,
    Timeout,
    /// Any other transport or protocol failure.
    Failed,
}

impl<T> Reading<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Reading::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Reading::Value(_))
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Reading<U>) -> Reading<U> {
        match self {
            Reading::Value(v) => f(v),
            Reading::Unsupported => Reading::Unsupported,
            Reading::Timeout => Reading::Timeout,
            Reading::Failed => Reading::Failed,
        }
    }
}

impl Reading<String> {
    /// Non-negative integer readings. Negative status codes and free text
    /// are not measurements.
    pub fn to_count(&self) -> Reading<u64> {
        self.clone().and_then(|text| match text.trim().parse::<u64>() {
            Ok(n) => Reading::Value(n),
            Err(_) => Reading::Unsupported,
        })
    }

    /// Signed integer view, used for the paired manual-consumable codes.
    pub fn to_code(&self) -> Option<i64> {
        self.value().and_then(|text| text.trim().parse::<i64>().ok())
    }
}

impl From<Result<Option<String>, QueryError>> for Reading<String> {
    fn from(result: Result<Option<String>, QueryError>) -> Self {
        match result {
            Ok(Some(value)) => Reading::Value(value),
            Ok(None) => Reading::Unsupported,
            Err(QueryError::Timeout) => Reading::Timeout,
            Err(_) => Reading::Failed,
        }
    }
}
