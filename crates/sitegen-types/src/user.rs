//! Signed-in user identity

use serde::{Deserialize, Serialize};

/// Identity returned by the sign-in verification endpoint.
///
/// Persisted verbatim (JSON) under the `user` storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

impl UserProfile {
    /// Name to show in headers, falling back to the email address
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picture_is_optional() {
        let user: UserProfile =
            serde_json::from_str(r#"{"id":"u1","name":"Ada","email":"ada@example.com"}"#).unwrap();
        assert_eq!(user.picture, None);
        assert_eq!(user.display_name(), "Ada");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let user = UserProfile {
            id: "u1".to_string(),
            name: "  ".to_string(),
            email: "ada@example.com".to_string(),
            picture: None,
        };
        assert_eq!(user.display_name(), "ada@example.com");
    }
}
