//! User DTOs for create and update.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::persistence::UserFields;

/// Request body for `POST /users` and `PUT /users/{id}`.
///
/// Both keys are required but may be `null`, which stores SQL `NULL`.
/// Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UserPayload {
    /// Display name.
    #[serde(deserialize_with = "Option::deserialize")]
    #[schema(required = true)]
    pub name: Option<String>,
    /// Contact address.
    #[serde(deserialize_with = "Option::deserialize")]
    #[schema(required = true)]
    pub email: Option<String>,
}

impl From<UserPayload> for UserFields {
    fn from(payload: UserPayload) -> Self {
        Self {
            name: payload.name,
            email: payload.email,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn explicit_null_is_accepted() {
        let Ok(payload) =
            serde_json::from_str::<UserPayload>(r#"{"name":null,"email":"n@x.com"}"#)
        else {
            panic!("explicit null must deserialize");
        };
        assert_eq!(payload.name, None);
        assert_eq!(payload.email.as_deref(), Some("n@x.com"));
    }

    #[test]
    fn absent_key_is_rejected() {
        let Err(err) = serde_json::from_str::<UserPayload>(r#"{"email":"n@x.com"}"#) else {
            panic!("a missing key must not deserialize");
        };
        assert!(err.to_string().contains("missing field `name`"));
    }
}
