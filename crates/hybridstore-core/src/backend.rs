use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Backend role discriminant on a stored-file record.
///
/// Every record names exactly one role; the record's URL resolves only through
/// the backend holding that role. It's defined in core because it's used in
/// configuration and database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "backend_role", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum BackendRole {
    Primary,
    Secondary,
}

impl Display for BackendRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            BackendRole::Primary => write!(f, "primary"),
            BackendRole::Secondary => write!(f, "secondary"),
        }
    }
}

impl FromStr for BackendRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "primary" => Ok(BackendRole::Primary),
            "secondary" => Ok(BackendRole::Secondary),
            _ => Err(anyhow::anyhow!("Invalid backend role: {}", s)),
        }
    }
}

/// Storage backend implementation types
///
/// This enum defines the available blob-store implementations a role can be
/// bound to. The memory backend exists for tests and local development.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    S3,
    Local,
    Memory,
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(BackendKind::S3),
            "local" => Ok(BackendKind::Local),
            "memory" => Ok(BackendKind::Memory),
            _ => Err(anyhow::anyhow!("Invalid backend kind: {}", s)),
        }
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            BackendKind::S3 => write!(f, "s3"),
            BackendKind::Local => write!(f, "local"),
            BackendKind::Memory => write!(f, "memory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_role_round_trip() {
        assert_eq!("primary".parse::<BackendRole>().unwrap(), BackendRole::Primary);
        assert_eq!("Secondary".parse::<BackendRole>().unwrap(), BackendRole::Secondary);
        assert_eq!(BackendRole::Primary.to_string(), "primary");
        assert!("tertiary".parse::<BackendRole>().is_err());
    }

    #[test]
    fn test_backend_role_serde_lowercase() {
        let json = serde_json::to_string(&BackendRole::Secondary).unwrap();
        assert_eq!(json, "\"secondary\"");
    }

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!("S3".parse::<BackendKind>().unwrap(), BackendKind::S3);
        assert_eq!("memory".parse::<BackendKind>().unwrap(), BackendKind::Memory);
        assert!("nfs".parse::<BackendKind>().is_err());
    }
}
