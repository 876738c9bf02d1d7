use std::fs;
use std::io;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::Rng;

use crate::api::models::OutboundMessage;
use crate::error::{AppError, AppResult};

use super::builder::OutboundDraft;
use super::codec;

/// Longest run of raw bytes packed into one RFC 2047 encoded word.
const ENCODED_WORD_CHUNK: usize = 45;

/// Serializes the draft and wraps it for the send call.
pub fn build_wire_message(draft: &OutboundDraft) -> AppResult<OutboundMessage> {
    let bytes = render_message(draft)?;
    Ok(OutboundMessage {
        raw: codec::encode(&bytes),
        thread_id: draft.thread_id().map(ToOwned::to_owned),
    })
}

/// The RFC 2822 byte stream for a draft, before transport encoding.
pub fn render_message(draft: &OutboundDraft) -> AppResult<Vec<u8>> {
    let mut headers = build_base_headers(draft);
    let body = draft.body_html().unwrap_or_default();

    let payload = if draft.attachments().is_empty() {
        headers.push("Content-Type: text/html; charset=utf-8".to_string());
        headers.push("Content-Transfer-Encoding: 8bit".to_string());
        format!("{}\r\n\r\n{}", headers.join("\r\n"), body)
    } else {
        let boundary = random_boundary();
        headers.push(format!(
            "Content-Type: multipart/mixed; boundary=\"{boundary}\""
        ));
        format!(
            "{}\r\n\r\n{}",
            headers.join("\r\n"),
            multipart_body(draft, body, &boundary)?
        )
    };

    Ok(payload.into_bytes())
}

fn build_base_headers(draft: &OutboundDraft) -> Vec<String> {
    let mut headers = Vec::new();

    for (name, list) in [
        ("From", draft.from()),
        ("To", draft.to()),
        ("Cc", draft.cc()),
        ("Bcc", draft.bcc()),
        ("Reply-To", draft.reply_to()),
    ] {
        if let Some(value) = list.to_header_value() {
            headers.push(format!("{name}: {value}"));
        }
    }

    if let Some(subject) = draft.subject() {
        headers.push(format!("Subject: {}", encode_header_text(subject)));
    }
    headers.push(format!("Date: {}", chrono::Utc::now().to_rfc2822()));

    for header in draft.headers() {
        headers.push(format!(
            "{}: {}",
            strip_line_breaks(&header.name),
            strip_line_breaks(&header.value)
        ));
    }

    let priority = draft.priority();
    headers.push(format!(
        "X-Priority: {} ({})",
        priority.value(),
        priority.label()
    ));
    headers.push("MIME-Version: 1.0".to_string());
    headers
}

fn multipart_body(draft: &OutboundDraft, body: &str, boundary: &str) -> AppResult<String> {
    let mut out = String::new();
    out.push_str(&format!("--{boundary}\r\n"));
    out.push_str("Content-Type: text/html; charset=utf-8\r\n");
    out.push_str("Content-Transfer-Encoding: 8bit\r\n\r\n");
    out.push_str(body);
    out.push_str("\r\n");

    for path in draft.attachments() {
        let data = read_attachment(path)?;
        let filename = path
            .file_name()
            .map(|value| escape_header_value(&value.to_string_lossy()))
            .unwrap_or_else(|| "attachment".to_string());
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        out.push_str(&format!("--{boundary}\r\n"));
        out.push_str(&format!("Content-Type: {mime_type}; name=\"{filename}\"\r\n"));
        out.push_str("Content-Transfer-Encoding: base64\r\n");
        out.push_str(&format!(
            "Content-Disposition: attachment; filename=\"{filename}\"\r\n\r\n"
        ));

        let encoded = STANDARD.encode(&data);
        out.push_str(&fold_base64_lines(&encoded));
    }

    out.push_str(&format!("--{boundary}--\r\n"));
    Ok(out)
}

fn read_attachment(path: &Path) -> AppResult<Vec<u8>> {
    fs::read(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => AppError::AttachmentNotFound(path.to_path_buf()),
        _ => AppError::Io(err),
    })
}

fn fold_base64_lines(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 76 + 8);
    let mut start = 0;
    while start < input.len() {
        let end = (start + 76).min(input.len());
        out.push_str(&input[start..end]);
        out.push_str("\r\n");
        start = end;
    }
    out
}

fn random_boundary() -> String {
    let mut bytes = [0_u8; 12];
    rand::thread_rng().fill(&mut bytes);
    let token = STANDARD.encode(bytes);
    format!("gmailbox-{token}")
}

fn escape_header_value(value: &str) -> String {
    strip_line_breaks(value).replace('"', "")
}

/// Header text, as an encoded word when it is not plain ASCII.
fn encode_header_text(value: &str) -> String {
    let value = strip_line_breaks(value);
    if value.is_ascii() {
        value
    } else {
        encode_header_word(&value)
    }
}

/// RFC 2047 `B` encoding, split into folded words that stay under the line limit.
pub(crate) fn encode_header_word(text: &str) -> String {
    let mut words = Vec::new();
    let mut chunk = String::new();

    for ch in text.chars() {
        if !chunk.is_empty() && chunk.len() + ch.len_utf8() > ENCODED_WORD_CHUNK {
            words.push(format!("=?utf-8?B?{}?=", STANDARD.encode(&chunk)));
            chunk.clear();
        }
        chunk.push(ch);
    }

    if !chunk.is_empty() {
        words.push(format!("=?utf-8?B?{}?=", STANDARD.encode(&chunk)));
    }

    words.join("\r\n ")
}

pub(crate) fn strip_line_breaks(value: &str) -> String {
    value
        .chars()
        .filter(|ch| *ch != '\r' && *ch != '\n')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::address::Address;
    use crate::mail::builder::MessageBuilder;

    fn rendered(draft: &OutboundDraft) -> String {
        String::from_utf8(render_message(draft).expect("render")).expect("utf8 payload")
    }

    #[test]
    fn includes_threading_headers() {
        let draft = MessageBuilder::new()
            .to(Address::new("dev@example.com"))
            .subject("Test")
            .html("<p>Hello</p>")
            .header("In-Reply-To", "<id@example.com>")
            .header("References", "<ref@example.com>")
            .build();

        let text = rendered(&draft);
        assert!(text.contains("In-Reply-To: <id@example.com>"));
        assert!(text.contains("References: <ref@example.com>"));
        assert!(text.contains("MIME-Version: 1.0"));
        assert!(text.contains("Content-Type: text/html; charset=utf-8"));
        assert!(text.ends_with("\r\n\r\n<p>Hello</p>"));
    }

    #[test]
    fn strips_line_breaks_from_header_values() {
        let draft = MessageBuilder::new()
            .to(Address::new("dev@example.com"))
            .subject("hi\r\nBcc: victim@example.com")
            .build();

        let text = rendered(&draft);
        assert!(text.contains("Subject: hiBcc: victim@example.com\r\n"));
        assert!(!text.contains("\r\nBcc:"));
    }

    #[test]
    fn encodes_non_ascii_subject() {
        let draft = MessageBuilder::new()
            .to(Address::new("dev@example.com"))
            .subject("Café")
            .build();

        assert!(rendered(&draft).contains("Subject: =?utf-8?B?Q2Fmw6k=?="));
    }

    #[test]
    fn splits_long_encoded_words() {
        let encoded = encode_header_word(&"é".repeat(40));
        let words = encoded.split("\r\n ").collect::<Vec<_>>();

        assert_eq!(words.len(), 2);
        assert!(words.iter().all(|word| word.starts_with("=?utf-8?B?")));
    }

    #[test]
    fn wire_message_is_url_safe_and_carries_thread() {
        let draft = MessageBuilder::new()
            .to(Address::new("dev@example.com"))
            .subject("???>>>")
            .thread_id("T1")
            .build();

        let outbound = build_wire_message(&draft).expect("wire");
        assert_eq!(outbound.thread_id.as_deref(), Some("T1"));
        assert!(!outbound.raw.contains(['+', '/', '=']));

        let decoded = codec::decode_text(&outbound.raw).expect("decode");
        assert!(decoded.contains("Subject: ???>>>"));
    }

    #[test]
    fn missing_attachment_at_assembly_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gone.txt");
        fs::write(&path, b"soon gone").expect("write");

        let draft = MessageBuilder::new()
            .to(Address::new("dev@example.com"))
            .attach(&path)
            .expect("attach existing file")
            .build();
        fs::remove_file(&path).expect("remove");

        match render_message(&draft) {
            Err(AppError::AttachmentNotFound(missing)) => assert_eq!(missing, path),
            other => panic!("expected attachment not found, got {other:?}"),
        }
    }
}
