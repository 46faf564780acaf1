//! Reply extraction — turns a gateway response body into display text
//!
//! Gateways answer in several shapes depending on which backend served the
//! call, so extraction is an ordered list of probes, first non-empty match
//! wins. An RPC `error` object is rendered inline as reply text rather than
//! escalated: chat UIs show it in the conversation instead of breaking the
//! request.

use serde_json::Value;
use tracing::warn;

/// Returned when no probe finds text. Never the empty string.
pub const EMPTY_REPLY_PLACEHOLDER: &str = "Could not extract reply text from gateway response.";

/// One way of locating reply text inside a response body
type Probe = fn(&Value) -> Option<String>;

fn result_reply(body: &Value) -> Option<String> {
    body.get("result")?
        .get("reply")?
        .as_str()
        .map(str::to_string)
}

fn result_content_text(body: &Value) -> Option<String> {
    first_content_text(body.get("result")?)
}

fn top_level_content_text(body: &Value) -> Option<String> {
    first_content_text(body)
}

fn first_content_text(value: &Value) -> Option<String> {
    value
        .get("content")?
        .as_array()?
        .first()?
        .get("text")?
        .as_str()
        .map(str::to_string)
}

/// Probes in strict precedence order
const PROBES: &[Probe] = &[result_reply, result_content_text, top_level_content_text];

/// Render an RPC error object as inline reply text
fn render_rpc_error(error: &Value) -> String {
    let message = error
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("Unknown Error");
    let data = match error.get("data") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "N/A".to_string(),
    };
    format!("Agent Error: {}. Details: {}", message, data)
}

/// The gateway occasionally prepends a stray `?` token to replies. Strip at
/// most one occurrence at the very start (with any following blank lines),
/// so question marks inside legitimate content survive.
pub fn strip_stray_question_mark(text: &str) -> String {
    match regex::Regex::new(r"^\s*\?\s*\n*") {
        // `replace` rewrites the first match only
        Ok(re) => re.replace(text, "").trim().to_string(),
        Err(_) => text.trim().to_string(),
    }
}

/// Extract the user-facing reply from a parsed gateway response body.
/// Always yields a non-empty string.
pub fn extract_reply(body: &Value) -> String {
    if let Some(error) = body.get("error") {
        warn!("Gateway returned an error object: {}", error);
        return render_rpc_error(error);
    }

    let text = PROBES
        .iter()
        .find_map(|probe| probe(body).filter(|t| !t.is_empty()))
        .unwrap_or_default();

    let text = strip_stray_question_mark(&text);
    if text.is_empty() {
        warn!("No reply text in gateway response: {}", body);
        return EMPTY_REPLY_PLACEHOLDER.to_string();
    }
    text
}
