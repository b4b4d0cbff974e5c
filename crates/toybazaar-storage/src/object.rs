use std::path::Path;

use uuid::Uuid;

/// Object name for an image uploaded for `toy_id`: `<id>-<millis>.<ext>`.
///
/// The extension is taken from `file_name`, lowercased and reduced to ASCII
/// alphanumerics; files without one are stored as `.bin`.
#[must_use]
pub fn object_name_for(toy_id: Uuid, file_name: &str, unix_millis: i64) -> String {
    format!("{toy_id}-{unix_millis}.{}", extension_of(file_name))
}

/// MIME type for an object name, by extension.
#[must_use]
pub fn content_type_for(object_name: &str) -> &'static str {
    match extension_of(object_name).as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

fn extension_of(file_name: &str) -> String {
    let ext: String = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase();
    if ext.is_empty() {
        "bin".to_string()
    } else {
        ext
    }
}
