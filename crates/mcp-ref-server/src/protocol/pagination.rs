//! Opaque pagination cursors (spec.md §4.10).
//!
//! A cursor is a base64url-encoded `{offset, v}` JSON object. Cursors are
//! opaque to clients; malformed or out-of-range cursors are rejected.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use crate::config::protocol::{MAX_PAGE_SIZE, MIN_PAGE_SIZE};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CursorPayload {
    offset: i64,
    v: u8,
}

/// The current cursor payload version.
const CURSOR_VERSION: u8 = 1;

/// Create an opaque cursor encoding `offset`.
#[must_use]
pub fn create_cursor(offset: usize) -> String {
    let payload = CursorPayload { offset: offset as i64, v: CURSOR_VERSION };
    let json = serde_json::to_vec(&payload).expect("cursor payload always serializes");
    URL_SAFE_NO_PAD.encode(json)
}

/// The result of parsing a cursor string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCursor {
    pub valid: bool,
    pub offset: usize,
    pub error: Option<String>,
}

/// Parse an opaque cursor, rejecting anything malformed.
#[must_use]
pub fn parse_cursor(cursor: &str) -> ParsedCursor {
    let invalid = |msg: &str| ParsedCursor { valid: false, offset: 0, error: Some(msg.to_string()) };

    let Ok(bytes) = URL_SAFE_NO_PAD.decode(cursor) else {
        return invalid("cursor is not valid base64url");
    };
    let Ok(payload) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
        return invalid("cursor does not decode to JSON");
    };
    let Some(obj) = payload.as_object() else {
        return invalid("cursor payload is not a JSON object");
    };
    let Some(offset_value) = obj.get("offset") else {
        return invalid("cursor is missing 'offset'");
    };
    let Some(offset) = offset_value.as_i64() else {
        return invalid("cursor 'offset' is not an integer");
    };
    if offset < 0 {
        return invalid("cursor 'offset' is negative");
    }

    ParsedCursor { valid: true, offset: offset as usize, error: None }
}

/// A single page of results plus the cursor for the next page, if any.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(rename = "nextCursor", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Paginate `items`, clamping `page_size` to `[MIN_PAGE_SIZE, MAX_PAGE_SIZE]`.
///
/// Returns `Err` if `cursor` is present and malformed or out of range.
pub fn paginate<T: Clone>(
    items: &[T],
    cursor: Option<&str>,
    page_size: usize,
) -> Result<Page<T>, String> {
    let offset = match cursor {
        None => 0,
        Some(c) => {
            let parsed = parse_cursor(c);
            if !parsed.valid {
                return Err(parsed.error.unwrap_or_else(|| "invalid cursor".to_string()));
            }
            if parsed.offset > items.len() {
                return Err("cursor offset is out of range".to_string());
            }
            parsed.offset
        }
    };

    let clamped = page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);
    let end = (offset + clamped).min(items.len());
    let page_items = items[offset..end].to_vec();

    let next_cursor = if end < items.len() { Some(create_cursor(end)) } else { None };

    Ok(Page { items: page_items, next_cursor })
}
