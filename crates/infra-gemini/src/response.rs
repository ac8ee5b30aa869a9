// generateContent response scanning.
// The model may hand the edited image back in several shapes; probing order
// is fixed: inline binary part, then a data URI inside a text part, then a
// long bare base64 token. The bare-token scan has no strong delimiter and
// stays best-effort.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::Value;

/// Minimum length for a bare token to be considered a base64 image.
const BARE_BASE64_MIN_LEN: usize = 1024;

/// Where (and whether) the edited image was found in the model response.
#[derive(Debug)]
pub enum ExtractedPayload {
    /// `candidates[].content.parts[].inlineData` blob.
    InlineData {
        bytes: Vec<u8>,
        mime: Option<String>,
    },
    /// `data:image/...;base64,` URI embedded in a text part.
    DataUriText { bytes: Vec<u8>, mime: String },
    /// Long base64-looking token in a text part (best-effort heuristic).
    BareBase64 { bytes: Vec<u8> },
    /// Nothing usable; the attempt counts as failed.
    Nothing,
}

/// Scan a full generateContent response body for an image payload.
pub fn extract_image_payload(response: &Value) -> ExtractedPayload {
    if let Some(found) = scan_inline_parts(response) {
        return found;
    }

    let texts = collect_text_parts(response);
    for text in &texts {
        if let Some(found) = scan_data_uri(text) {
            return found;
        }
    }
    for text in &texts {
        if let Some(found) = scan_bare_base64(text) {
            return found;
        }
    }

    ExtractedPayload::Nothing
}

/// All `parts` objects across all candidates.
fn parts(response: &Value) -> Vec<&Value> {
    let mut out = Vec::new();
    let candidates = response
        .get("candidates")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for candidate in candidates {
        if let Some(list) = candidate
            .get("content")
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)
        {
            out.extend(list.iter());
        }
    }
    out
}

fn scan_inline_parts(response: &Value) -> Option<ExtractedPayload> {
    for part in parts(response) {
        let Some(inline) = part
            .get("inlineData")
            .or_else(|| part.get("inline_data"))
            .and_then(Value::as_object)
        else {
            continue;
        };
        let data = inline.get("data").and_then(Value::as_str).unwrap_or("");
        if data.is_empty() {
            continue;
        }
        // An undecodable blob is treated as absent, not as a hard error
        let Ok(bytes) = BASE64.decode(data.as_bytes()) else {
            continue;
        };
        let mime = inline
            .get("mimeType")
            .or_else(|| inline.get("mime_type"))
            .and_then(Value::as_str)
            .map(str::to_string);
        return Some(ExtractedPayload::InlineData { bytes, mime });
    }
    None
}

fn collect_text_parts(response: &Value) -> Vec<String> {
    parts(response)
        .into_iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

fn scan_data_uri(text: &str) -> Option<ExtractedPayload> {
    let start = text.find("data:image/")?;
    let rest = &text[start + "data:".len()..];
    let marker = rest.find(";base64,")?;
    let mime = rest[..marker].to_string();
    let payload = &rest[marker + ";base64,".len()..];
    let token = leading_base64_run(payload);
    let bytes = BASE64.decode(token.as_bytes()).ok()?;
    Some(ExtractedPayload::DataUriText { bytes, mime })
}

fn scan_bare_base64(text: &str) -> Option<ExtractedPayload> {
    let mut run_start = None;
    let mut best: Option<&str> = None;

    let bytes = text.as_bytes();
    for (idx, b) in bytes.iter().enumerate() {
        if is_base64_char(*b) {
            run_start.get_or_insert(idx);
        } else if let Some(start) = run_start.take() {
            let run = &text[start..idx];
            if run.len() > best.map_or(0, str::len) {
                best = Some(run);
            }
        }
    }
    if let Some(start) = run_start {
        let run = &text[start..];
        if run.len() > best.map_or(0, str::len) {
            best = Some(run);
        }
    }

    let token = best.filter(|run| run.len() >= BARE_BASE64_MIN_LEN)?;
    let bytes = BASE64.decode(token.as_bytes()).ok()?;
    Some(ExtractedPayload::BareBase64 { bytes })
}

fn leading_base64_run(text: &str) -> &str {
    let end = text
        .bytes()
        .position(|b| !is_base64_char(b))
        .unwrap_or(text.len());
    &text[..end]
}

fn is_base64_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'='
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inline_response(data: &str, mime_key: &str, data_key: &str) -> Value {
        json!({
            "candidates": [{
                "content": {
                    "parts": [{
                        data_key: { "data": data, mime_key: "image/png" }
                    }]
                }
            }]
        })
    }

    fn text_response(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }] }
            }]
        })
    }

    #[test]
    fn finds_inline_data_camel_case() {
        let data = BASE64.encode(b"fake image bytes");
        let payload = extract_image_payload(&inline_response(&data, "mimeType", "inlineData"));
        match payload {
            ExtractedPayload::InlineData { bytes, mime } => {
                assert_eq!(bytes, b"fake image bytes");
                assert_eq!(mime.as_deref(), Some("image/png"));
            }
            other => panic!("expected inline data, got {other:?}"),
        }
    }

    #[test]
    fn finds_inline_data_snake_case() {
        let data = BASE64.encode(b"snake");
        let payload = extract_image_payload(&inline_response(&data, "mime_type", "inline_data"));
        assert!(matches!(payload, ExtractedPayload::InlineData { .. }));
    }

    #[test]
    fn finds_data_uri_in_text_part() {
        let data = BASE64.encode(b"uri bytes");
        let text = format!("Here you go: data:image/jpeg;base64,{data} enjoy");
        match extract_image_payload(&text_response(&text)) {
            ExtractedPayload::DataUriText { bytes, mime } => {
                assert_eq!(bytes, b"uri bytes");
                assert_eq!(mime, "image/jpeg");
            }
            other => panic!("expected data uri, got {other:?}"),
        }
    }

    #[test]
    fn finds_long_bare_base64_token() {
        // 1200 source bytes → 1600 base64 chars, above the threshold
        let data = BASE64.encode(vec![7u8; 1200]);
        match extract_image_payload(&text_response(&data)) {
            ExtractedPayload::BareBase64 { bytes } => assert_eq!(bytes.len(), 1200),
            other => panic!("expected bare base64, got {other:?}"),
        }
    }

    #[test]
    fn short_tokens_are_not_mistaken_for_images() {
        let payload = extract_image_payload(&text_response("Sorry, I cannot help with that"));
        assert!(matches!(payload, ExtractedPayload::Nothing));
    }

    #[test]
    fn inline_data_wins_over_text_payloads() {
        let inline = BASE64.encode(b"inline wins");
        let uri = BASE64.encode(b"uri loses");
        let response = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": format!("data:image/png;base64,{uri}") },
                        { "inlineData": { "data": inline, "mimeType": "image/png" } }
                    ]
                }
            }]
        });
        match extract_image_payload(&response) {
            ExtractedPayload::InlineData { bytes, .. } => assert_eq!(bytes, b"inline wins"),
            other => panic!("expected inline data, got {other:?}"),
        }
    }

    #[test]
    fn empty_or_malformed_responses_yield_nothing() {
        assert!(matches!(
            extract_image_payload(&json!({})),
            ExtractedPayload::Nothing
        ));
        assert!(matches!(
            extract_image_payload(&json!({"candidates": []})),
            ExtractedPayload::Nothing
        ));
        // inlineData present but not valid base64
        let response = inline_response("!!!not-base64!!!", "mimeType", "inlineData");
        assert!(matches!(
            extract_image_payload(&response),
            ExtractedPayload::Nothing
        ));
    }
}
