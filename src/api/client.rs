use crate::core::error::DirectoryError;
use crate::models::user::{CheckedUpdate, LoginRequest, LoginResponse, UserRecord};
use crate::stores::session::{decode_token, SessionStore};
use anyhow::{Context, Result};
use reqwest::RequestBuilder;
use std::sync::Arc;
use std::time::Duration;

/// HTTP client for the user directory API.
///
/// Every call except `login` carries an authorization header derived from
/// the injected session store: the encoded token as a Basic credential plus
/// the decoded username and password as plain header fields. The plain
/// fields are what the API actually expects today; both are sent until the
/// contract is clarified.
pub struct DirectoryClient {
    client: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl DirectoryClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Authenticate the operator. Does not persist anything; the caller
    /// saves the credentials on success.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<String>, DirectoryError> {
        let response = self
            .client
            .post(format!("{}/admin/login", self.base_url))
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DirectoryError::Rejected {
                status: response.status().as_u16(),
            });
        }

        let body: LoginResponse = response.json().await?;
        if body.success {
            Ok(body.message)
        } else {
            // empty when the server sent no message; the shell substitutes
            // its own copy in that case
            Err(DirectoryError::LoginRejected {
                message: body.message.unwrap_or_default(),
            })
        }
    }

    /// Fetch the full user collection, in the order the API returns it.
    pub async fn list_users(&self) -> Result<Vec<UserRecord>, DirectoryError> {
        let response = self
            .authorized(self.client.get(format!("{}/users", self.base_url)))?
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DirectoryError::Rejected {
                status: response.status().as_u16(),
            });
        }

        Ok(response.json().await?)
    }

    /// Mark one user as checked. The caller patches its local copy on
    /// success; there is no follow-up refetch.
    pub async fn set_checked(&self, user_id: &str) -> Result<(), DirectoryError> {
        let response = self
            .authorized(
                self.client
                    .put(format!("{}/users/{}", self.base_url, user_id)),
            )?
            .json(&CheckedUpdate { checked: true })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DirectoryError::Rejected {
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }

    /// Delete one user. The caller removes its local copy on success.
    pub async fn delete_user(&self, user_id: &str) -> Result<(), DirectoryError> {
        let response = self
            .authorized(
                self.client
                    .delete(format!("{}/users/{}", self.base_url, user_id)),
            )?
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DirectoryError::Rejected {
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }

    /// Attach the authorization headers derived from the current session
    /// token. The token is validated defensively before every use.
    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, DirectoryError> {
        let token = self.session.load().ok_or(DirectoryError::NoSession)?;
        let credentials = decode_token(&token).map_err(|_| DirectoryError::NoSession)?;

        Ok(request
            .header(reqwest::header::AUTHORIZATION, format!("Basic {token}"))
            .header("username", credentials.username)
            .header("password", credentials.password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::session::{Credentials, MemorySessionStore};

    fn client_with_store(store: Arc<dyn SessionStore>) -> DirectoryClient {
        DirectoryClient::new(
            "http://localhost:5000/api/",
            Duration::from_secs(5),
            store,
        )
        .expect("client should build")
    }

    #[test]
    fn test_client_creation_trims_trailing_slash() {
        let client = client_with_store(Arc::new(MemorySessionStore::new()));
        assert_eq!(client.base_url, "http://localhost:5000/api");
    }

    #[test]
    fn test_authorized_without_session() {
        let client = client_with_store(Arc::new(MemorySessionStore::new()));
        let request = client.client.get("http://localhost:5000/api/users");

        let result = client.authorized(request);
        assert!(matches!(result, Err(DirectoryError::NoSession)));
    }

    #[test]
    fn test_authorized_with_invalid_token() {
        let store = Arc::new(MemorySessionStore::with_token("not a token"));
        let client = client_with_store(store);
        let request = client.client.get("http://localhost:5000/api/users");

        let result = client.authorized(request);
        assert!(matches!(result, Err(DirectoryError::NoSession)));
    }

    #[test]
    fn test_authorized_headers_present() {
        let store = Arc::new(MemorySessionStore::new());
        store
            .save(&Credentials {
                username: "admin".to_string(),
                password: "pw".to_string(),
            })
            .unwrap();
        let token = store.load().unwrap();
        let client = client_with_store(store);

        let request = client
            .authorized(client.client.get("http://localhost:5000/api/users"))
            .unwrap()
            .build()
            .unwrap();

        let headers = request.headers();
        assert_eq!(
            headers
                .get(reqwest::header::AUTHORIZATION)
                .unwrap()
                .to_str()
                .unwrap(),
            format!("Basic {token}")
        );
        assert_eq!(headers.get("username").unwrap(), "admin");
        assert_eq!(headers.get("password").unwrap(), "pw");
    }
}
