//! REST client for the content backend.
//!
//! Every entity lives under `/{entity}`: `GET /{entity}/{id}` to load,
//! `POST /{entity}` to create, `PATCH /{entity}/{id}` to update. Entities
//! with an image send multipart bodies; the rest send JSON.

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::entities::{EntityKind, RequestBody};

/// Shown when the server gives no usable message
pub const FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Server {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Text to show the user: the server's message when there is one.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Server {
                message: Some(message),
                ..
            } => message.clone(),
            _ => FALLBACK_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct ForgotPasswordRequest<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

/// Error body shape used by the backend; `message` may be a list.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<serde_json::Value>,
}

fn extract_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.message? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Array(items) => items
            .into_iter()
            .find_map(|v| v.as_str().map(str::to_string)),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Attach a bearer token to every request.
    pub fn with_token(mut self, token: Option<&str>) -> Self {
        self.token = token.map(str::to_string);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = extract_message(&body);
            warn!("API error ({}): {}", status, body);
            return Err(ApiError::Server { status, message });
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(builder).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn with_body(builder: RequestBuilder, body: RequestBody) -> Result<RequestBuilder, ApiError> {
        match body {
            // reqwest sets `multipart/form-data; boundary=...` itself
            RequestBody::Multipart(payload) => Ok(builder.multipart(payload.into_multipart()?)),
            RequestBody::Json(json) => Ok(builder.json(&json)),
        }
    }

    // ==================== Entity Resources ====================

    /// `GET /{entity}/{id}`
    pub async fn fetch<T: DeserializeOwned>(&self, kind: EntityKind, id: &str) -> Result<T, ApiError> {
        let builder = self.request(Method::GET, &format!("/{}/{}", kind.resource(), id));
        self.send_json(builder).await
    }

    /// `GET /{entity}`
    pub async fn list(&self, kind: EntityKind) -> Result<serde_json::Value, ApiError> {
        let builder = self.request(Method::GET, &format!("/{}", kind.resource()));
        self.send_json(builder).await
    }

    /// `POST /{entity}`
    pub async fn create(&self, kind: EntityKind, body: RequestBody) -> Result<(), ApiError> {
        info!("Creating {}", kind);
        let builder = self.request(Method::POST, &format!("/{}", kind.resource()));
        self.send(Self::with_body(builder, body)?).await?;
        Ok(())
    }

    /// `PATCH /{entity}/{id}`
    pub async fn update(&self, kind: EntityKind, id: &str, body: RequestBody) -> Result<(), ApiError> {
        info!("Updating {} {}", kind, id);
        let builder = self.request(Method::PATCH, &format!("/{}/{}", kind.resource(), id));
        self.send(Self::with_body(builder, body)?).await?;
        Ok(())
    }

    /// `DELETE /{entity}/{id}`
    pub async fn delete(&self, kind: EntityKind, id: &str) -> Result<(), ApiError> {
        info!("Deleting {} {}", kind, id);
        let builder = self.request(Method::DELETE, &format!("/{}/{}", kind.resource(), id));
        self.send(builder).await?;
        Ok(())
    }

    // ==================== Auth ====================

    pub async fn create_admin(&self, request: &CreateAdminRequest) -> Result<(), ApiError> {
        info!("Creating admin account for {}", request.email);
        let builder = self.request(Method::POST, "/auth/create-admin").json(request);
        self.send(builder).await?;
        Ok(())
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        info!("Requesting password reset code for {}", email);
        let builder = self
            .request(Method::POST, "/auth/forgot-password")
            .json(&ForgotPasswordRequest { email });
        self.send(builder).await?;
        Ok(())
    }

    pub async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<(), ApiError> {
        info!("Submitting reset code for {}", request.email);
        let builder = self.request(Method::POST, "/auth/verify-otp").json(request);
        self.send(builder).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form_data::{encode, FormValue};
    use wiremock::{
        matchers::{body_json, body_string_contains, header, header_regex, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(&Config::for_api(&server.uri()))
    }

    // ==================== Message Extraction Tests ====================

    #[test]
    fn test_extract_message_string() {
        assert_eq!(
            extract_message(r#"{"message":"Title already exists"}"#),
            Some("Title already exists".to_string())
        );
    }

    #[test]
    fn test_extract_message_array() {
        assert_eq!(
            extract_message(r#"{"message":["title.uz should not be empty"],"statusCode":400}"#),
            Some("title.uz should not be empty".to_string())
        );
    }

    #[test]
    fn test_extract_message_missing_or_invalid() {
        assert_eq!(extract_message(r#"{"error":"x"}"#), None);
        assert_eq!(extract_message("<html>502</html>"), None);
        assert_eq!(extract_message(r#"{"message":""}"#), None);
    }

    #[test]
    fn test_user_message_fallback() {
        let err = ApiError::Server {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };
        assert_eq!(err.user_message(), FALLBACK_MESSAGE);

        let err = ApiError::Server {
            status: StatusCode::BAD_REQUEST,
            message: Some("Bad title".to_string()),
        };
        assert_eq!(err.user_message(), "Bad title");
    }

    // ==================== Resource Tests ====================

    #[tokio::test]
    async fn test_fetch_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/faq/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "_id": "42",
                "question": {"uz": "Savol"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let record: crate::entities::FaqRecord =
            client(&server).fetch(EntityKind::Faq, "42").await.expect("fetch");
        assert_eq!(record.id.as_deref(), Some("42"));
        assert_eq!(record.question.unwrap().uz, "Savol");
    }

    #[tokio::test]
    async fn test_create_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/faq"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({"question": {"uz": "Q"}})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let body = RequestBody::Json(serde_json::json!({"question": {"uz": "Q"}}));
        client(&server)
            .create(EntityKind::Faq, body)
            .await
            .expect("create");
    }

    #[tokio::test]
    async fn test_update_multipart_body() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/news/7"))
            .and(header_regex("content-type", "^multipart/form-data; boundary="))
            .and(body_string_contains("name=\"title[uz]\""))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let payload = encode(&FormValue::mapping(vec![(
            "title",
            FormValue::mapping(vec![("uz", FormValue::text("Yangilik"))]),
        )]));
        client(&server)
            .update(EntityKind::News, "7", RequestBody::Multipart(payload))
            .await
            .expect("update");
    }

    #[tokio::test]
    async fn test_server_error_carries_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gallery"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"message": "Image too large"})),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .create(EntityKind::Gallery, RequestBody::Json(serde_json::json!({})))
            .await
            .unwrap_err();

        match &err {
            ApiError::Server { status, message } => {
                assert_eq!(*status, StatusCode::BAD_REQUEST);
                assert_eq!(message.as_deref(), Some("Image too large"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.user_message(), "Image too large");
    }

    #[tokio::test]
    async fn test_bearer_token_sent() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/hero/3"))
            .and(header("authorization", "Bearer demo-token-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .with_token(Some("demo-token-1"))
            .delete(EntityKind::Hero, "3")
            .await
            .expect("delete");
    }

    #[tokio::test]
    async fn test_list_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server).list(EntityKind::News).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        assert_eq!(err.user_message(), FALLBACK_MESSAGE);
    }

    // ==================== Auth Tests ====================

    #[tokio::test]
    async fn test_auth_endpoints_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/create-admin"))
            .and(body_json(serde_json::json!({
                "firstName": "Ali",
                "lastName": "Valiyev",
                "email": "ali@example.uz",
                "password": "secret1"
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/forgot-password"))
            .and(body_json(serde_json::json!({"email": "ali@example.uz"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/verify-otp"))
            .and(body_json(serde_json::json!({
                "email": "ali@example.uz",
                "otp": "1234",
                "newPassword": "newpass"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server);
        api.create_admin(&CreateAdminRequest {
            first_name: "Ali".to_string(),
            last_name: "Valiyev".to_string(),
            email: "ali@example.uz".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .expect("create admin");
        api.forgot_password("ali@example.uz").await.expect("forgot");
        api.verify_otp(&VerifyOtpRequest {
            email: "ali@example.uz".to_string(),
            otp: "1234".to_string(),
            new_password: "newpass".to_string(),
        })
        .await
        .expect("verify");
    }
}
