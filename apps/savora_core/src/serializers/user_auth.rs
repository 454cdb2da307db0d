use serde::{Deserialize, Serialize};

// Absent fields deserialize to their empty defaults so validation can answer
// with a 400 body instead of a serde-level rejection.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateUserReq {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateTokenReq {
    pub email: String,
    pub password: String,
}

/// Partial update of the caller's own record. Email is not updatable here.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateMeReq {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// The only user representation that ever leaves the service; the password
/// hash stays server-side.
#[derive(Debug, Serialize)]
pub struct UserOut {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct TokenOut {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_become_empty_strings() {
        let req: CreateUserReq = serde_json::from_str("{}").unwrap();
        assert!(req.email.is_empty());
        assert!(req.name.is_empty());
        assert!(req.password.is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let req: UpdateMeReq =
            serde_json::from_str(r#"{"name": "New", "is_superuser": true}"#).unwrap();
        assert_eq!(req.name.as_deref(), Some("New"));
        assert!(req.password.is_none());
    }
}
