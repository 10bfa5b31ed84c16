pub(crate) fn px(width: u32) -> String {
    format!("{width}px")
}

/// Parses `"140"`, `"140px"` or `"140.6px"` into a pixel count.
pub(crate) fn parse_px(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let s = s.strip_suffix("px").unwrap_or(s).trim();
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}
