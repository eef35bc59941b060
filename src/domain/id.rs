//! Domain ID Types with NewType Pattern
//!
//! Type-safe wrappers for entity identifiers to prevent ID mixing errors at
//! compile time. Each ID type implements Display, FromStr, Debug, Serialize,
//! and Deserialize, plus the sqlx traits needed to bind them directly.

use serde::{Deserialize, Serialize};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::{Decode, Encode, Sqlite, Type};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Macro to generate NewType ID wrappers with all required traits
macro_rules! domain_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Create an ID from an existing string (for database retrieval)
            pub fn from_string(s: String) -> Self {
                Self(s)
            }

            /// Create an ID from a string slice
            pub fn from_str_unchecked(s: &str) -> Self {
                Self(s.to_string())
            }

            /// Get the inner string value
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Convert to inner string value
            pub fn into_string(self) -> String {
                self.0
            }

            /// Parse and validate a UUID string
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Uuid::parse_str(s)?;
                Ok(Self(s.to_string()))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        // SQLx trait implementations for database compatibility
        impl Type<Sqlite> for $name {
            fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
                <String as Type<Sqlite>>::type_info()
            }
        }

        impl<'q> Encode<'q, Sqlite> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
            ) -> Result<IsNull, BoxDynError> {
                <String as Encode<'q, Sqlite>>::encode_by_ref(&self.0, buf)
            }
        }

        impl<'r> Decode<'r, Sqlite> for $name {
            fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
                let s = <String as Decode<'r, Sqlite>>::decode(value)?;
                Ok(Self(s))
            }
        }
    };
}

// Define all domain ID types
domain_id!(
    /// Unique identifier for a user account
    UserId
);

domain_id!(
    /// Unique identifier for a company
    CompanyId
);

domain_id!(
    /// Unique identifier for a job posting
    JobId
);

domain_id!(
    /// Unique identifier for a job application
    ApplicationId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_creation() {
        let id = UserId::new();
        assert!(!id.as_str().is_empty());
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn company_id_from_string() {
        let uuid_str = Uuid::new_v4().to_string();
        let id = CompanyId::from_string(uuid_str.clone());
        assert_eq!(id.as_str(), uuid_str);
    }

    #[test]
    fn job_id_display() {
        let id = JobId::new();
        let display_str = format!("{}", id);
        assert_eq!(display_str, id.as_str());
    }

    #[test]
    fn application_id_from_str() {
        let uuid_str = Uuid::new_v4().to_string();
        let id: ApplicationId = uuid_str.parse().expect("Failed to parse UUID");
        assert_eq!(id.as_str(), uuid_str);
    }

    #[test]
    fn job_id_invalid_uuid_fails() {
        let result = JobId::parse("not-a-uuid");
        assert!(result.is_err());
    }

    #[test]
    fn user_id_serialization() {
        let id = UserId::new();
        let json = serde_json::to_string(&id).expect("Failed to serialize");

        // Should serialize as a simple string, not as object
        assert!(json.starts_with('"'));
        assert!(json.ends_with('"'));

        let deserialized: UserId = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(id, deserialized);
    }

    #[test]
    fn company_id_equality() {
        let id1 = CompanyId::from_string("test-id".to_string());
        let id2 = CompanyId::from_string("test-id".to_string());
        let id3 = CompanyId::from_string("different-id".to_string());

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn job_id_hash() {
        use std::collections::HashMap;

        let id = JobId::new();
        let mut map = HashMap::new();
        map.insert(id.clone(), "job-data");

        assert_eq!(map.get(&id), Some(&"job-data"));
    }

    #[test]
    fn compile_time_type_safety() {
        // This test verifies that IDs of different types cannot be mixed
        let user_id = UserId::new();
        let job_id = JobId::new();

        fn takes_user_id(_id: UserId) {}
        fn takes_job_id(_id: JobId) {}

        takes_user_id(user_id);
        takes_job_id(job_id);

        // The following would fail at compile time (uncomment to verify):
        // takes_user_id(job_id); // ERROR: mismatched types
        // takes_job_id(user_id); // ERROR: mismatched types
    }

    #[test]
    fn default_creates_new_id() {
        let id1 = ApplicationId::default();
        let id2 = ApplicationId::default();

        assert_ne!(id1, id2);
        assert!(Uuid::parse_str(id1.as_str()).is_ok());
    }
}
