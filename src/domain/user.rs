use serde::{Deserialize, Serialize};

/// Profile of the signed-in user, as supplied by the identity provider.
///
/// The gateway never creates or mutates these fields; they are decoded from
/// the session for the duration of a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub picture: String,
}
