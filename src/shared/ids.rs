use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

pub fn validate_identifier_value(kind: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{kind} must be non-empty"));
    }
    if value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Ok(());
    }
    Err(format!(
        "{kind} must use only ASCII letters, digits, '-' or '_'"
    ))
}

macro_rules! define_id_type {
    ($name:ident, $kind:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn parse(raw: &str) -> Result<Self, String> {
                validate_identifier_value($kind, raw.trim())?;
                Ok(Self(raw.trim().to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                // API payloads carry numeric ids; YAML fixtures may carry either form.
                let raw = match serde_json::Value::deserialize(deserializer)? {
                    serde_json::Value::String(value) => value,
                    serde_json::Value::Number(value) => value.to_string(),
                    other => {
                        return Err(D::Error::custom(format!(
                            "invalid {}: expected string or number, got {}",
                            $kind, other
                        )))
                    }
                };
                Self::parse(&raw).map_err(|err| {
                    D::Error::custom(format!("invalid {} `{}`: {}", $kind, raw, err))
                })
            }
        }
    };
}

define_id_type!(ProjectId, "project id");
define_id_type!(PrincipalId, "principal id");
define_id_type!(RoleId, "role id");
define_id_type!(MemberId, "member id");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_accept_numeric_and_slug_values() {
        assert_eq!(ProjectId::parse("demo-project").expect("slug").as_str(), "demo-project");
        assert_eq!(PrincipalId::parse(" 42 ").expect("numeric").as_str(), "42");
    }

    #[test]
    fn ids_reject_empty_and_path_like_values() {
        assert!(RoleId::parse("").is_err());
        let err = PrincipalId::parse("../etc").expect_err("path rejected");
        assert!(err.contains("principal id"));
    }

    #[test]
    fn ids_deserialize_from_json_numbers() {
        let id: MemberId = serde_json::from_str("17").expect("number id");
        assert_eq!(id.as_str(), "17");
        let id: RoleId = serde_json::from_str("\"3\"").expect("string id");
        assert_eq!(id.as_str(), "3");
        assert!(serde_json::from_str::<RoleId>("true").is_err());
    }
}
