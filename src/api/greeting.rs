//! The landing page: a personalized greeting for signed-in users.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};

use super::state::AppState;
use crate::domain::UserProfile;

/// GET /
///
/// Authentication is optional here: with a valid session the page embeds the
/// user's profile, without one it degrades to a plain "Logged out".
pub async fn greeting(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match state.authenticator.current_user(&headers) {
        Some(user) => Html(render_greeting(&user)).into_response(),
        None => "Logged out".into_response(),
    }
}

fn render_greeting(user: &UserProfile) -> String {
    format!(
        "<h1>Welcome, {name}</h1>\n\
         <ul>\n\
         <li>Nickname: {nickname}</li>\n\
         <li>Email: {email}</li>\n\
         </ul>\n\
         <img src=\"{picture}\" alt=\"{name}\">\n",
        name = escape_html(&user.name),
        nickname = escape_html(&user.nickname),
        email = escape_html(&user.email),
        picture = escape_html(&user.picture),
    )
}

/// Minimal HTML escaping for profile values interpolated into markup.
fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> UserProfile {
        UserProfile {
            name: "Ada Lovelace".to_string(),
            nickname: "ada".to_string(),
            email: "ada@example.com".to_string(),
            picture: "http://x/p.png".to_string(),
        }
    }

    #[test]
    fn test_greeting_embeds_profile() {
        let html = render_greeting(&ada());

        assert!(html.contains("Welcome, Ada Lovelace"));
        assert!(html.contains("ada"));
        assert!(html.contains("ada@example.com"));
        assert!(html.contains("http://x/p.png"));
        assert!(!html.contains("Logged out"));
    }

    #[test]
    fn test_profile_values_are_escaped() {
        let mut user = ada();
        user.name = "<script>alert(1)</script>".to_string();
        let html = render_greeting(&user);

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_escape_html_passthrough() {
        assert_eq!(escape_html("Ada Lovelace"), "Ada Lovelace");
        assert_eq!(escape_html("a&b"), "a&amp;b");
    }
}
