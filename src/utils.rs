pub const DEFAULT_CDX_URL: &str = "http://web.archive.org/cdx/search/cdx";
pub const ARCHIVE_VIEW_PREFIX: &str = "https://web.archive.org/web/";
pub const SNAPSHOT_FIELDS: &str = "timestamp,original,statuscode,mimetype";
pub const SNAPSHOT_LIMIT: u32 = 1000;
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

lazy_static! {
    pub static ref CDX_URL: String = {
        match std::env::var("CDX_URL") {
            Ok(url) if !url.is_empty() => url,
            _ => DEFAULT_CDX_URL.into(),
        }
    };
}

// Equivalent address forms must map to the same archive query: one leading
// scheme and one trailing slash are dropped, nothing else is touched.
pub fn normalize_target(target: &str) -> String {
    let target = target.trim();
    let target = target
        .strip_prefix("https://")
        .or_else(|| target.strip_prefix("http://"))
        .unwrap_or(target);
    target.strip_suffix('/').unwrap_or(target).to_string()
}
