//! Client layer: orchestrates transport calls and maps transport ↔ domain.

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::BoxFuture;
use crate::domain::{
    AccessToken, CreateTemplateResponse, ProviderTemplate, Template, TemplateName,
    ValidationError, WabaId,
};

const DEFAULT_GRAPH_ENDPOINT: &str = "https://graph.facebook.com/v19.0";

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync {
    fn get<'a>(
        &'a self,
        url: &'a str,
        bearer: &'a str,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;

    fn post_json<'a>(
        &'a self,
        url: &'a str,
        bearer: &'a str,
        body: serde_json::Value,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;

    fn delete<'a>(
        &'a self,
        url: &'a str,
        bearer: &'a str,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    async fn run(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<HttpResponse, Box<dyn StdError + Send + Sync>> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get<'a>(
        &'a self,
        url: &'a str,
        bearer: &'a str,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move { self.run(self.client.get(url).bearer_auth(bearer)).await })
    }

    fn post_json<'a>(
        &'a self,
        url: &'a str,
        bearer: &'a str,
        body: serde_json::Value,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            self.run(self.client.post(url).bearer_auth(bearer).json(&body))
                .await
        })
    }

    fn delete<'a>(
        &'a self,
        url: &'a str,
        bearer: &'a str,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move { self.run(self.client.delete(url).bearer_auth(bearer)).await })
    }
}

#[derive(Debug, Clone)]
/// Bearer-token credentials for the provider API.
pub struct Auth {
    token: AccessToken,
}

impl Auth {
    /// Create bearer credentials and validate that the token is non-empty
    /// after trimming.
    pub fn bearer(value: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            token: AccessToken::new(value)?,
        })
    }

    fn token(&self) -> &str {
        self.token.as_str()
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`WabaClient`].
///
/// This error preserves:
/// - HTTP-level failures (non-2xx status or transport failures),
/// - API-level failures (the provider's error envelope, message verbatim),
/// - decode and validation failures.
pub enum WabaError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-successful HTTP status without a decodable error envelope.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// The provider returned an error envelope.
    #[error("provider error: {message}")]
    Api {
        message: String,
        kind: Option<String>,
        code: Option<i64>,
    },

    /// Response body did not match the provider's documented shape.
    #[error("malformed provider response: {0}")]
    MalformedResponse(#[source] Box<dyn StdError + Send + Sync>),

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone)]
/// Builder for [`WabaClient`].
///
/// Use this when you need to customize the endpoint, timeout, or user-agent.
pub struct WabaClientBuilder {
    auth: Auth,
    waba_id: WabaId,
    endpoint: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl WabaClientBuilder {
    /// Create a builder with the default endpoint and no timeout/user-agent
    /// override.
    pub fn new(auth: Auth, waba_id: WabaId) -> Self {
        Self {
            auth,
            waba_id,
            endpoint: DEFAULT_GRAPH_ENDPOINT.to_owned(),
            timeout: None,
            user_agent: None,
        }
    }

    /// Override the Graph API base endpoint (scheme, host, and version
    /// segment).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    ///
    /// Without one, a provider call that never returns will hang its caller
    /// indefinitely.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`WabaClient`].
    pub fn build(self) -> Result<WabaClient, WabaError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| WabaError::Transport(Box::new(err)))?;

        Ok(WabaClient {
            auth: self.auth,
            waba_id: self.waba_id,
            endpoint: self.endpoint,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// High-level client for the provider's message-template endpoints.
///
/// This type orchestrates request encoding, bearer auth, and response
/// decoding against `/{waba_id}/message_templates`.
pub struct WabaClient {
    auth: Auth,
    waba_id: WabaId,
    endpoint: String,
    http: Arc<dyn HttpTransport>,
}

impl WabaClient {
    /// Create a client using the default endpoint.
    ///
    /// For more customization, use [`WabaClient::builder`].
    pub fn new(auth: Auth, waba_id: WabaId) -> Self {
        Self {
            auth,
            waba_id,
            endpoint: DEFAULT_GRAPH_ENDPOINT.to_owned(),
            http: Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
            }),
        }
    }

    /// Start building a client with custom settings.
    pub fn builder(auth: Auth, waba_id: WabaId) -> WabaClientBuilder {
        WabaClientBuilder::new(auth, waba_id)
    }

    /// Submit a template for approval.
    ///
    /// Errors:
    /// - [`WabaError::Api`] when the provider rejects the template (its
    ///   message is preserved verbatim),
    /// - [`WabaError::HttpStatus`] for non-2xx responses without an error
    ///   envelope,
    /// - [`WabaError::MalformedResponse`] when the response body cannot be
    ///   decoded.
    pub async fn create_template(
        &self,
        template: &Template,
    ) -> Result<CreateTemplateResponse, WabaError> {
        let url = self.templates_url(&[])?;
        let body = crate::transport::encode_create_template_body(template);

        let response = self
            .http
            .post_json(&url, self.auth.token(), body)
            .await
            .map_err(WabaError::Transport)?;
        let body = check_http(response)?;

        let parsed = crate::transport::decode_create_template_response(&body)
            .map_err(|err| WabaError::MalformedResponse(Box::new(err)))?;
        debug!(
            name = template.name().as_str(),
            provider_id = parsed.id.as_str(),
            "template submitted to provider"
        );
        Ok(parsed)
    }

    /// Fetch the full provider-side template list, following pagination
    /// cursors until exhausted.
    pub async fn list_templates(&self) -> Result<Vec<ProviderTemplate>, WabaError> {
        let mut templates = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let url = match &after {
                Some(cursor) => self.templates_url(&[("after", cursor.as_str())])?,
                None => self.templates_url(&[])?,
            };

            let response = self
                .http
                .get(&url, self.auth.token())
                .await
                .map_err(WabaError::Transport)?;
            let body = check_http(response)?;

            let page = crate::transport::decode_list_templates_response(&body)
                .map_err(|err| WabaError::MalformedResponse(Box::new(err)))?;
            templates.extend(page.templates);

            match page.next_cursor {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }

        debug!(count = templates.len(), "fetched provider template list");
        Ok(templates)
    }

    /// Delete a provider-side template by name.
    pub async fn delete_template(&self, name: &TemplateName) -> Result<(), WabaError> {
        let url = self.templates_url(&[("name", name.as_str())])?;

        let response = self
            .http
            .delete(&url, self.auth.token())
            .await
            .map_err(WabaError::Transport)?;
        let body = check_http(response)?;

        crate::transport::decode_delete_template_response(&body)
            .map_err(|err| WabaError::MalformedResponse(Box::new(err)))
    }

    fn templates_url(&self, query: &[(&str, &str)]) -> Result<String, WabaError> {
        let base = format!(
            "{}/{}/message_templates",
            self.endpoint.trim_end_matches('/'),
            self.waba_id.as_str()
        );
        let mut url = url::Url::parse(&base).map_err(|err| WabaError::Transport(Box::new(err)))?;
        for (key, value) in query {
            url.query_pairs_mut().append_pair(key, value);
        }
        Ok(url.into())
    }
}

fn check_http(response: HttpResponse) -> Result<String, WabaError> {
    if (200..=299).contains(&response.status) {
        return Ok(response.body);
    }
    if let Some(api) = crate::transport::decode_error_envelope(&response.body) {
        return Err(WabaError::Api {
            message: api.message,
            kind: api.kind,
            code: api.code,
        });
    }
    let body = if response.body.trim().is_empty() {
        None
    } else {
        Some(response.body)
    };
    Err(WabaError::HttpStatus {
        status: response.status,
        body,
    })
}

/// Object-safe view of the provider operations the workflow and the
/// synchronizer depend on.
///
/// [`WabaClient`] implements this; tests substitute doubles.
pub trait ProviderApi: Send + Sync {
    fn create_template<'a>(
        &'a self,
        template: &'a Template,
    ) -> BoxFuture<'a, Result<CreateTemplateResponse, WabaError>>;

    fn list_templates<'a>(&'a self) -> BoxFuture<'a, Result<Vec<ProviderTemplate>, WabaError>>;

    fn delete_template<'a>(
        &'a self,
        name: &'a TemplateName,
    ) -> BoxFuture<'a, Result<(), WabaError>>;
}

impl ProviderApi for WabaClient {
    fn create_template<'a>(
        &'a self,
        template: &'a Template,
    ) -> BoxFuture<'a, Result<CreateTemplateResponse, WabaError>> {
        Box::pin(WabaClient::create_template(self, template))
    }

    fn list_templates<'a>(&'a self) -> BoxFuture<'a, Result<Vec<ProviderTemplate>, WabaError>> {
        Box::pin(WabaClient::list_templates(self))
    }

    fn delete_template<'a>(
        &'a self,
        name: &'a TemplateName,
    ) -> BoxFuture<'a, Result<(), WabaError>> {
        Box::pin(WabaClient::delete_template(self, name))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::domain::{
        BodyText, Category, Component, ComponentSet, LanguageCode, TemplateStatus,
    };

    use super::*;

    #[derive(Debug, Clone)]
    struct RecordedRequest {
        method: &'static str,
        url: String,
        bearer: String,
        body: Option<serde_json::Value>,
    }

    #[derive(Debug, Clone)]
    struct FakeTransport {
        state: Arc<Mutex<FakeTransportState>>,
    }

    #[derive(Debug)]
    struct FakeTransportState {
        requests: Vec<RecordedRequest>,
        responses: VecDeque<HttpResponse>,
    }

    impl FakeTransport {
        fn new(responses: Vec<(u16, &str)>) -> Self {
            Self {
                state: Arc::new(Mutex::new(FakeTransportState {
                    requests: Vec::new(),
                    responses: responses
                        .into_iter()
                        .map(|(status, body)| HttpResponse {
                            status,
                            body: body.to_owned(),
                        })
                        .collect(),
                })),
            }
        }

        fn record(
            &self,
            method: &'static str,
            url: &str,
            bearer: &str,
            body: Option<serde_json::Value>,
        ) -> HttpResponse {
            let mut state = self.state.lock().unwrap();
            state.requests.push(RecordedRequest {
                method,
                url: url.to_owned(),
                bearer: bearer.to_owned(),
                body,
            });
            state.responses.pop_front().unwrap_or(HttpResponse {
                status: 500,
                body: "fake transport exhausted".to_owned(),
            })
        }

        fn requests(&self) -> Vec<RecordedRequest> {
            self.state.lock().unwrap().requests.clone()
        }
    }

    impl HttpTransport for FakeTransport {
        fn get<'a>(
            &'a self,
            url: &'a str,
            bearer: &'a str,
        ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
            Box::pin(async move { Ok(self.record("GET", url, bearer, None)) })
        }

        fn post_json<'a>(
            &'a self,
            url: &'a str,
            bearer: &'a str,
            body: serde_json::Value,
        ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
            Box::pin(async move { Ok(self.record("POST", url, bearer, Some(body))) })
        }

        fn delete<'a>(
            &'a self,
            url: &'a str,
            bearer: &'a str,
        ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
            Box::pin(async move { Ok(self.record("DELETE", url, bearer, None)) })
        }
    }

    fn make_client(transport: FakeTransport) -> WabaClient {
        WabaClient {
            auth: Auth::bearer("test_token").unwrap(),
            waba_id: WabaId::new("1098765").unwrap(),
            endpoint: "https://graph.example.invalid/v19.0".to_owned(),
            http: Arc::new(transport),
        }
    }

    fn minimal_template() -> Template {
        let mut components = ComponentSet::new();
        components
            .add(Component::Body(
                BodyText::new("Hello {{1}}, welcome aboard").unwrap(),
            ))
            .unwrap();
        Template::new(
            TemplateName::new("welcome_message").unwrap(),
            Category::Marketing,
            LanguageCode::new("en").unwrap(),
            components,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn create_template_posts_json_with_bearer_auth() {
        let transport = FakeTransport::new(vec![(
            200,
            r#"{"id":"1407680676729941","status":"PENDING"}"#,
        )]);
        let client = make_client(transport.clone());

        let response = client.create_template(&minimal_template()).await.unwrap();
        assert_eq!(response.id.as_str(), "1407680676729941");
        assert_eq!(response.status, Some(TemplateStatus::Pending));

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(
            requests[0].url,
            "https://graph.example.invalid/v19.0/1098765/message_templates"
        );
        assert_eq!(requests[0].bearer, "test_token");

        let body = requests[0].body.as_ref().unwrap();
        assert_eq!(body["name"], "welcome_message");
        assert_eq!(body["category"], "MARKETING");
        assert_eq!(body["components"][0]["type"], "BODY");
    }

    #[tokio::test]
    async fn create_template_surfaces_provider_error_verbatim() {
        let transport = FakeTransport::new(vec![(
            400,
            r#"{"error":{"message":"Template name already exists","type":"OAuthException","code":100}}"#,
        )]);
        let client = make_client(transport);

        let err = client.create_template(&minimal_template()).await.unwrap_err();
        match err {
            WabaError::Api {
                message,
                kind,
                code,
            } => {
                assert_eq!(message, "Template name already exists");
                assert_eq!(kind.as_deref(), Some("OAuthException"));
                assert_eq!(code, Some(100));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_template_maps_non_success_without_envelope() {
        let transport = FakeTransport::new(vec![(502, "bad gateway")]);
        let client = make_client(transport);

        let err = client.create_template(&minimal_template()).await.unwrap_err();
        assert!(matches!(
            err,
            WabaError::HttpStatus {
                status: 502,
                body: Some(_)
            }
        ));
    }

    #[tokio::test]
    async fn create_template_maps_undecodable_body_to_malformed() {
        let transport = FakeTransport::new(vec![(200, "{ not json }")]);
        let client = make_client(transport);

        let err = client.create_template(&minimal_template()).await.unwrap_err();
        assert!(matches!(err, WabaError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn list_templates_follows_pagination_cursors() {
        let page_one = r#"
        {
          "data": [ { "name": "first", "status": "APPROVED" } ],
          "paging": {
            "cursors": { "after": "CURSOR1" },
            "next": "https://graph.example.invalid/page2"
          }
        }
        "#;
        let page_two = r#"{ "data": [ { "name": "second", "status": "PENDING" } ] }"#;

        let transport = FakeTransport::new(vec![(200, page_one), (200, page_two)]);
        let client = make_client(transport.clone());

        let templates = client.list_templates().await.unwrap();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].name, "first");
        assert_eq!(templates[1].name, "second");

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert!(!requests[0].url.contains("after="));
        assert!(requests[1].url.contains("after=CURSOR1"));
    }

    #[tokio::test]
    async fn list_templates_aborts_on_api_error() {
        let transport = FakeTransport::new(vec![(
            401,
            r#"{"error":{"message":"Invalid OAuth access token"}}"#,
        )]);
        let client = make_client(transport);

        let err = client.list_templates().await.unwrap_err();
        assert!(matches!(err, WabaError::Api { .. }));
    }

    #[tokio::test]
    async fn delete_template_targets_name_query() {
        let transport = FakeTransport::new(vec![(200, r#"{"success":true}"#)]);
        let client = make_client(transport.clone());

        let name = TemplateName::new("welcome_message").unwrap();
        client.delete_template(&name).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].method, "DELETE");
        assert!(requests[0].url.ends_with("message_templates?name=welcome_message"));
    }

    #[test]
    fn auth_constructor_validates_token() {
        assert!(Auth::bearer("   ").is_err());
        assert!(Auth::bearer("token").is_ok());
    }

    #[test]
    fn builder_overrides_are_applied() {
        let client = WabaClient::builder(
            Auth::bearer("token").unwrap(),
            WabaId::new("123").unwrap(),
        )
        .endpoint("https://graph.example.invalid/v20.0/")
        .timeout(Duration::from_secs(10))
        .user_agent("waba-templates-tests")
        .build()
        .unwrap();

        assert_eq!(client.endpoint, "https://graph.example.invalid/v20.0/");
        let url = client.templates_url(&[]).unwrap();
        assert_eq!(
            url,
            "https://graph.example.invalid/v20.0/123/message_templates"
        );
    }
}
