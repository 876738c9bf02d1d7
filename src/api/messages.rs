use super::models::ListParams;

pub fn message_endpoint(user_id: &str, id: &str) -> String {
    format!("/gmail/v1/users/{user_id}/messages/{id}")
}

pub fn list_endpoint(user_id: &str) -> String {
    format!("/gmail/v1/users/{user_id}/messages")
}

pub fn send_endpoint(user_id: &str) -> String {
    format!("/gmail/v1/users/{user_id}/messages/send")
}

pub fn attachment_endpoint(user_id: &str, message_id: &str, attachment_id: &str) -> String {
    format!("/gmail/v1/users/{user_id}/messages/{message_id}/attachments/{attachment_id}")
}

pub fn trash_endpoint(user_id: &str, id: &str) -> String {
    format!("/gmail/v1/users/{user_id}/messages/{id}/trash")
}

pub fn untrash_endpoint(user_id: &str, id: &str) -> String {
    format!("/gmail/v1/users/{user_id}/messages/{id}/untrash")
}

pub fn batch_endpoint() -> &'static str {
    "/batch/gmail/v1"
}

pub fn get_query() -> Vec<(String, String)> {
    vec![("format".to_string(), "full".to_string())]
}

pub fn list_query(params: &ListParams) -> Vec<(String, String)> {
    let mut query = Vec::new();
    if let Some(max_results) = params.max_results {
        query.push(("maxResults".to_string(), max_results.to_string()));
    }
    if let Some(page_token) = params.page_token.as_deref() {
        query.push(("pageToken".to_string(), page_token.to_string()));
    }
    if let Some(q) = params.q.as_deref() {
        query.push(("q".to_string(), q.to_string()));
    }
    for label_id in &params.label_ids {
        query.push(("labelIds".to_string(), label_id.clone()));
    }
    if params.include_spam_trash {
        query.push(("includeSpamTrash".to_string(), "true".to_string()));
    }
    query
}
