use rand::Rng;
use rand::distributions::Alphanumeric;
use reqwest::StatusCode;
use tracing::warn;

use crate::error::{AppError, AppResult};

use super::client::map_api_error;
use super::messages;
use super::models::{BatchItem, RawMessage};

/// Gmail refuses batches larger than this.
pub const MAX_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub boundary: String,
    pub body: String,
}

impl BatchRequest {
    pub fn content_type(&self) -> String {
        format!("multipart/mixed; boundary={}", self.boundary)
    }
}

pub fn build_request(user_id: &str, ids: &[String]) -> BatchRequest {
    let boundary = random_boundary();
    let mut body = String::new();

    for (key, id) in ids.iter().enumerate() {
        body.push_str(&format!("--{boundary}\r\n"));
        body.push_str("Content-Type: application/http\r\n");
        body.push_str(&format!("Content-ID: <item-{key}>\r\n\r\n"));
        body.push_str(&format!(
            "GET {}?format=full\r\n\r\n",
            messages::message_endpoint(user_id, id)
        ));
    }

    body.push_str(&format!("--{boundary}--\r\n"));
    BatchRequest { boundary, body }
}

/// Splits a multipart/mixed batch response into items keyed by request position.
pub fn parse_response(content_type: Option<&str>, body: &str) -> AppResult<Vec<BatchItem>> {
    let boundary = content_type
        .and_then(boundary_param)
        .or_else(|| sniff_boundary(body))
        .ok_or_else(|| AppError::Api("batch response carries no multipart boundary".to_string()))?;
    let delimiter = format!("--{boundary}");

    let mut items = Vec::new();
    for section in body.split(delimiter.as_str()).skip(1) {
        if section.starts_with("--") {
            break;
        }

        let section = section.trim_start_matches(['\r', '\n']);
        let Some((outer_headers, http)) = split_head(section) else {
            warn!("skipping batch part without headers");
            continue;
        };
        let Some(key) = content_id_key(outer_headers) else {
            warn!("skipping batch part without a usable Content-ID");
            continue;
        };
        let Some((status_block, payload)) = split_head(http) else {
            warn!(key, "skipping batch part without an http response");
            continue;
        };

        let status = parse_status(status_block)?;
        let payload = payload.trim();
        let result = if status.is_success() {
            serde_json::from_str::<RawMessage>(payload).map_err(AppError::from)
        } else {
            Err(map_api_error(status, payload))
        };

        items.push(BatchItem { key, result });
    }

    Ok(items)
}

fn random_boundary() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect();
    format!("batch_{token}")
}

fn boundary_param(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|param| {
        let (name, value) = param.trim().split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("boundary") {
            return None;
        }
        let value = value.trim().trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}

fn sniff_boundary(body: &str) -> Option<String> {
    body.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.strip_prefix("--"))
        .map(ToOwned::to_owned)
}

fn split_head(text: &str) -> Option<(&str, &str)> {
    let crlf = text.find("\r\n\r\n").map(|index| (index, 4));
    let lf = text.find("\n\n").map(|index| (index, 2));
    let (index, len) = match (crlf, lf) {
        (Some(a), Some(b)) => {
            if a.0 <= b.0 {
                a
            } else {
                b
            }
        }
        (a, b) => a.or(b)?,
    };
    Some((&text[..index], &text[index + len..]))
}

fn content_id_key(headers: &str) -> Option<usize> {
    let value = headers.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case("content-id")
            .then(|| value.trim())
    })?;

    let value = value.trim_start_matches('<').trim_end_matches('>');
    let value = value.strip_prefix("response-").unwrap_or(value);
    value.strip_prefix("item-")?.parse().ok()
}

fn parse_status(block: &str) -> AppResult<StatusCode> {
    let line = block.lines().next().unwrap_or_default();
    line.split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or_else(|| AppError::Api(format!("malformed status line in batch response: `{line}`")))
}
