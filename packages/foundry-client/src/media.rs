//! Recovering the media item identifier from an upload response.
//!
//! Tenants disagree on where the created item's rid is reported. Sources are
//! checked in a fixed order and the first hit wins:
//!
//! 1. JSON body field (`rid`, `mediaItemRid`, `media_item_rid`, nested `item|data|result.rid`)
//! 2. `Location` header
//! 3. any rid-shaped text in the body

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

pub const MEDIA_ITEM_RID_PREFIX: &str = "ri.mio.main.media-item.";

static RE_MEDIA_ITEM_RID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)ri\.mio\.main\.media-item\.[A-Za-z0-9\-]+")
        .expect("media item rid pattern is valid")
});

/// Where the identifier was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RidSource {
    JsonBody,
    LocationHeader,
    BodyText,
}

/// Extract the media item rid from the response parts.
pub fn extract_media_item_rid(
    body: &str,
    location: Option<&str>,
) -> Option<(String, RidSource)> {
    if let Some(rid) = rid_from_json(body) {
        return Some((rid, RidSource::JsonBody));
    }

    if let Some(found) = location.and_then(|loc| RE_MEDIA_ITEM_RID.find(loc)) {
        return Some((found.as_str().to_string(), RidSource::LocationHeader));
    }

    RE_MEDIA_ITEM_RID
        .find(body)
        .map(|m| (m.as_str().to_string(), RidSource::BodyText))
}

fn rid_from_json(body: &str) -> Option<String> {
    let Value::Object(obj) = serde_json::from_str::<Value>(body).ok()? else {
        return None;
    };

    let is_media_rid = |v: &Value| {
        v.as_str()
            .filter(|s| s.starts_with(MEDIA_ITEM_RID_PREFIX))
            .map(str::to_string)
    };

    for key in ["rid", "mediaItemRid", "media_item_rid"] {
        if let Some(rid) = obj.get(key).and_then(is_media_rid) {
            return Some(rid);
        }
    }

    // Only the first present wrapper is inspected.
    let nested = ["item", "data", "result"]
        .iter()
        .find_map(|key| obj.get(*key).filter(|v| !v.is_null()))?;

    nested.get("rid").and_then(is_media_rid)
}
