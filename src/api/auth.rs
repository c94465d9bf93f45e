//! Authentication

use serde::{Deserialize, Serialize};

use super::client::ApiClient;
use super::error::ApiError;
use super::transport::{Method, Transport};

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub username: String,
    pub real_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub is_active: bool,
}

/// Token issued by a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: Option<AuthUser>,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

impl<T: Transport> ApiClient<T> {
    /// Exchanges email and password for an access token
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.send(
            Method::Post,
            "/auth/login",
            Some(&Credentials { email, password }),
            None,
        )
        .await
    }

    /// Fetches the user the token belongs to
    pub async fn get_me(&self, token: &str) -> Result<AuthUser, ApiError> {
        self.send::<_, ()>(Method::Get, "/auth/me", None, Some(token))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::tests::create_test_client;
    use serde_json::json;

    #[tokio::test]
    async fn test_login_posts_credentials_without_token() {
        let (client, _clock) = create_test_client();
        client.transport().respond(
            Method::Post,
            "/auth/login",
            json!({"access_token": "abc", "token_type": "bearer"}),
        );

        let response = client.login("ayu@example.com", "hunter2").await.unwrap();

        assert_eq!(response.access_token, "abc");
        assert!(response.user.is_none());
        let call = &client.transport().calls()[0];
        assert_eq!(
            call.body,
            Some(json!({"email": "ayu@example.com", "password": "hunter2"}))
        );
        assert!(call.token.is_none());
    }
}
