// shared/src/lib.rs

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("invalid ttl: {0} minutes")]
    InvalidTtl(f64),
    #[error("deserialization: {0}")]
    Deserialization(String),
    #[error("quota exceeded: need {needed} bytes, quota is {quota}")]
    QuotaExceeded { needed: u64, quota: u64 },
    #[error("store: {0}")]
    Store(String),
}

/// Coarse failure taxonomy surfaced to callers of the `try_*` API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    Serialization,
    Deserialization,
    StoreFault,
}

impl Error {
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Serialization(_) | Error::InvalidTtl(_) => FailureKind::Serialization,
            Error::Deserialization(_) => FailureKind::Deserialization,
            Error::QuotaExceeded { .. } | Error::Store(_) => FailureKind::StoreFault,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Time-to-live in (possibly fractional) minutes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TtlMinutes(pub f64);

impl TtlMinutes {
    pub const MS_PER_MINUTE: f64 = 60_000.0;

    /// NaN and infinity have no place in the JSON record.
    pub fn is_encodable(&self) -> bool {
        self.0.is_finite()
    }

    /// Zero and NaN mean "never expires". Negative values expire immediately.
    pub fn expires(&self) -> bool {
        self.0 != 0.0 && !self.0.is_nan()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }

    pub fn as_ms(&self) -> f64 {
        self.0 * Self::MS_PER_MINUTE
    }
}

pub mod config;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::Serialization("x".into()).kind(),
            FailureKind::Serialization
        );
        assert_eq!(Error::InvalidTtl(-1.0).kind(), FailureKind::Serialization);
        assert_eq!(
            Error::Deserialization("x".into()).kind(),
            FailureKind::Deserialization
        );
        assert_eq!(
            Error::QuotaExceeded { needed: 10, quota: 5 }.kind(),
            FailureKind::StoreFault
        );
        assert_eq!(Error::Store("x".into()).kind(), FailureKind::StoreFault);
    }

    #[test]
    fn test_ttl_predicates() {
        assert!(TtlMinutes(1.0).is_encodable());
        assert!(TtlMinutes(0.0).is_encodable());
        assert!(TtlMinutes(-3.0).is_encodable());
        assert!(!TtlMinutes(f64::NAN).is_encodable());
        assert!(!TtlMinutes(f64::INFINITY).is_encodable());

        assert!(TtlMinutes(0.5).expires());
        assert!(TtlMinutes(-3.0).expires());
        assert!(!TtlMinutes(0.0).expires());
        assert!(!TtlMinutes(f64::NAN).expires());

        assert!(TtlMinutes(0.5).is_positive());
        assert!(!TtlMinutes(0.0).is_positive());
        assert!(!TtlMinutes(-3.0).is_positive());
        assert_eq!(TtlMinutes(2.0).as_ms(), 120_000.0);
    }
}
