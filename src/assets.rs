use rust_embed::RustEmbed;

/// Page, styles, script and marker icons, embedded into the binary.
#[derive(RustEmbed)]
#[folder = "frontend/"]
pub struct Asset;

/// Simple MIME type detection based on file extension
pub fn mime_type(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

pub fn exists(path: &str) -> bool {
    Asset::get(path).is_some()
}
