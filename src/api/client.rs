use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{AppError, AppResult};

use super::batch;
use super::labels;
use super::messages;
use super::models::{
    AttachmentBody, BatchItem, Label, ListParams, MessageList, NewLabel, OptionalParameters,
    OutboundMessage, RawMessage,
};
use super::transport::MailTransport;

pub const GMAIL_API_BASE_URL: &str = "https://gmail.googleapis.com";
pub const DEFAULT_USER_ID: &str = "me";

#[derive(Debug, Clone)]
pub struct GmailClient {
    http: Client,
    base_url: String,
    user_id: String,
    access_token: String,
}

impl GmailClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: GMAIL_API_BASE_URL.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            access_token: access_token.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    async fn batch_chunk(&self, ids: &[String]) -> AppResult<Vec<BatchItem>> {
        let request = batch::build_request(&self.user_id, ids);
        let url = self.endpoint_url(messages::batch_endpoint())?;
        debug!(count = ids.len(), "sending batch message fetch");

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, request.content_type())
            .body(request.body)
            .send()
            .await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);
        let body = response.text().await?;
        if !status.is_success() {
            return Err(map_api_error(status, &body));
        }

        batch::parse_response(content_type.as_deref(), &body)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: Option<&[(String, String)]>,
    ) -> AppResult<T> {
        let url = self.endpoint_url(endpoint)?;
        debug!(%url, "GET");
        let mut request = self.http.get(url).bearer_auth(&self.access_token);
        if let Some(query) = query {
            request = request.query(query);
        }

        let response = request.send().await?;
        self.parse_json_response(response).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        query: Option<&[(String, String)]>,
        body: &B,
    ) -> AppResult<T> {
        let url = self.endpoint_url(endpoint)?;
        debug!(%url, "POST");
        let mut request = self.http.post(url).bearer_auth(&self.access_token).json(body);
        if let Some(query) = query {
            request = request.query(query);
        }

        let response = request.send().await?;
        self.parse_json_response(response).await
    }

    fn endpoint_url(&self, endpoint: &str) -> AppResult<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.set_path(endpoint.trim_start_matches('/'));
        Ok(url)
    }

    async fn parse_json_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(map_api_error(status, &body))
    }
}

#[async_trait]
impl MailTransport for GmailClient {
    async fn fetch_message(&self, id: &str) -> AppResult<RawMessage> {
        let endpoint = messages::message_endpoint(&self.user_id, id);
        let query = messages::get_query();
        self.get_json(&endpoint, Some(&query)).await
    }

    async fn list_messages(&self, params: &ListParams) -> AppResult<MessageList> {
        let endpoint = messages::list_endpoint(&self.user_id);
        let query = messages::list_query(params);
        self.get_json(&endpoint, Some(&query)).await
    }

    async fn send_raw_message(
        &self,
        message: &OutboundMessage,
        parameters: &OptionalParameters,
    ) -> AppResult<RawMessage> {
        let endpoint = messages::send_endpoint(&self.user_id);
        let query = parameters
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect::<Vec<_>>();
        self.post_json(&endpoint, Some(&query), message).await
    }

    async fn fetch_messages_batch(&self, ids: &[String]) -> AppResult<Vec<BatchItem>> {
        let mut items = Vec::with_capacity(ids.len());
        for (chunk_index, chunk) in ids.chunks(batch::MAX_BATCH_SIZE).enumerate() {
            let offset = chunk_index * batch::MAX_BATCH_SIZE;
            for mut item in self.batch_chunk(chunk).await? {
                item.key += offset;
                items.push(item);
            }
        }
        Ok(items)
    }

    async fn fetch_attachment(
        &self,
        message_id: &str,
        attachment_id: &str,
    ) -> AppResult<AttachmentBody> {
        let endpoint = messages::attachment_endpoint(&self.user_id, message_id, attachment_id);
        self.get_json(&endpoint, None).await
    }

    async fn modify_labels(
        &self,
        id: &str,
        add: &[String],
        remove: &[String],
    ) -> AppResult<RawMessage> {
        let endpoint = labels::modify_labels_endpoint(&self.user_id, id);
        let body = GmailModifyLabelsRequest {
            add_label_ids: add.to_vec(),
            remove_label_ids: remove.to_vec(),
        };
        self.post_json(&endpoint, None, &body).await
    }

    async fn trash_message(&self, id: &str) -> AppResult<RawMessage> {
        let endpoint = messages::trash_endpoint(&self.user_id, id);
        self.post_json(&endpoint, None, &serde_json::json!({})).await
    }

    async fn untrash_message(&self, id: &str) -> AppResult<RawMessage> {
        let endpoint = messages::untrash_endpoint(&self.user_id, id);
        self.post_json(&endpoint, None, &serde_json::json!({})).await
    }

    async fn list_labels(&self) -> AppResult<Vec<Label>> {
        let endpoint = labels::list_labels_endpoint(&self.user_id);
        let response: GmailLabelListResponse = self.get_json(&endpoint, None).await?;
        Ok(response.labels.unwrap_or_default())
    }

    async fn create_label(&self, name: &str) -> AppResult<Label> {
        let endpoint = labels::list_labels_endpoint(&self.user_id);
        self.post_json(&endpoint, None, &NewLabel::named(name)).await
    }
}

#[derive(Debug, Deserialize)]
struct GmailLabelListResponse {
    labels: Option<Vec<Label>>,
}

#[derive(Debug, Serialize)]
struct GmailModifyLabelsRequest {
    #[serde(rename = "addLabelIds")]
    add_label_ids: Vec<String>,
    #[serde(rename = "removeLabelIds")]
    remove_label_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GmailApiErrorEnvelope {
    error: GmailApiError,
}

#[derive(Debug, Deserialize)]
struct GmailApiError {
    code: Option<u16>,
    status: Option<String>,
    message: Option<String>,
    errors: Option<Vec<GmailApiErrorDetail>>,
}

#[derive(Debug, Deserialize)]
struct GmailApiErrorDetail {
    reason: Option<String>,
}

pub(crate) fn map_api_error(status: StatusCode, body: &str) -> AppError {
    let message = parse_api_error_message(body).unwrap_or_else(|| {
        let body = body.trim();
        if body.is_empty() {
            "no error details in response body".to_string()
        } else {
            body.to_string()
        }
    });

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return AppError::Auth(format!(
            "gmail api authorization failed ({status}): {message}"
        ));
    }

    if status == StatusCode::NOT_FOUND {
        return AppError::NotFound(message);
    }

    AppError::Api(format!("gmail api request failed ({status}): {message}"))
}

fn parse_api_error_message(body: &str) -> Option<String> {
    let envelope = serde_json::from_str::<GmailApiErrorEnvelope>(body).ok()?;
    let mut parts = Vec::new();

    if let Some(message) = envelope.error.message {
        parts.push(message);
    }

    if let Some(status) = envelope.error.status {
        parts.push(format!("status={status}"));
    }

    if let Some(code) = envelope.error.code {
        parts.push(format!("code={code}"));
    }

    if let Some(reason) = envelope
        .error
        .errors
        .and_then(|errors| errors.into_iter().find_map(|detail| detail.reason))
    {
        parts.push(format!("reason={reason}"));
    }

    if parts.is_empty() {
        return None;
    }

    Some(parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_unauthorized_as_auth_error() {
        let error = map_api_error(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"code":401,"message":"Request had invalid authentication credentials.","status":"UNAUTHENTICATED"}}"#,
        );

        match error {
            AppError::Auth(message) => {
                assert!(message.contains("invalid authentication credentials"));
            }
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[test]
    fn maps_missing_entity_as_not_found() {
        let error = map_api_error(
            StatusCode::NOT_FOUND,
            r#"{"error":{"code":404,"message":"Requested entity was not found.","status":"NOT_FOUND"}}"#,
        );

        match error {
            AppError::NotFound(message) => {
                assert!(message.contains("Requested entity was not found"));
            }
            other => panic!("expected not found error, got {other:?}"),
        }
    }

    #[test]
    fn maps_server_failure_with_raw_body() {
        let error = map_api_error(StatusCode::BAD_GATEWAY, "upstream unavailable");

        match error {
            AppError::Api(message) => {
                assert!(message.contains("502"));
                assert!(message.contains("upstream unavailable"));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn joins_base_url_and_endpoint() {
        let client = GmailClient::new("token").with_base_url("http://127.0.0.1:9000");
        let url = client
            .endpoint_url(&messages::message_endpoint(client.user_id(), "abc"))
            .expect("url");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9000/gmail/v1/users/me/messages/abc"
        );
    }
}
