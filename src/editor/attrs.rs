use crate::models::{ImageAlign, ImageAttributes};
use crate::util::parse_px;
use serde_json::Value;
use std::str::FromStr;

/// Turns a loosely-typed attribute bag into fully-populated attributes.
///
/// Never fails: missing or malformed fields fall back to their defaults.
pub fn normalize_image_attrs(raw: &Value) -> ImageAttributes {
    let Some(obj) = raw.as_object() else {
        return ImageAttributes::default();
    };

    let text = |key: &str| -> String {
        obj.get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_default()
    };

    let align = obj
        .get("align")
        .and_then(Value::as_str)
        .and_then(|s| ImageAlign::from_str(s.trim()).ok())
        .unwrap_or_default();

    ImageAttributes {
        src: text("src"),
        alt: text("alt"),
        title: text("title"),
        align,
        width: obj.get("width").and_then(normalize_width),
    }
}

fn normalize_width(v: &Value) -> Option<u32> {
    let px = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_px(s)?,
        _ => return None,
    };
    if !px.is_finite() {
        return None;
    }
    let rounded = px.round();
    if rounded < 1.0 || rounded > f64::from(u32::MAX) {
        return None;
    }
    Some(rounded as u32)
}
