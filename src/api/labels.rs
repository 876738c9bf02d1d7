pub fn list_labels_endpoint(user_id: &str) -> String {
    format!("/gmail/v1/users/{user_id}/labels")
}

pub fn modify_labels_endpoint(user_id: &str, id: &str) -> String {
    format!("/gmail/v1/users/{user_id}/messages/{id}/modify")
}
