use anyhow::{Result, anyhow, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Label stored when the caller does not name a platform
pub const DEFAULT_PLATFORM: &str = "unknown";

/// Upper bound for a platform label, counted in characters
pub const MAX_PLATFORM_LEN: usize = 64;

/// Returns the platform label to store. The caller's label is kept as sent;
/// a missing or empty one becomes `unknown`.
pub fn normalize_platform(platform: Option<&str>) -> Result<String> {
    let platform = match platform {
        None | Some("") => return Ok(DEFAULT_PLATFORM.to_string()),
        Some(p) => p,
    };

    if platform.chars().count() > MAX_PLATFORM_LEN {
        bail!("platform must be at most {} characters", MAX_PLATFORM_LEN);
    }

    Ok(platform.to_string())
}

/// Decodes the standard-alphabet base64 image payload.
pub fn decode_image_data(image_data: Option<&str>) -> Result<Vec<u8>> {
    let encoded = image_data
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("image_data is required"))?;

    let bytes = STANDARD.decode(encoded)?;
    if bytes.is_empty() {
        bail!("image_data decoded to zero bytes");
    }
    Ok(bytes)
}

/// Blob name for an ingested image: `{platform}_{image_id}.jpg`.
/// Path separators and control characters in the label become `-`.
pub fn blob_name(platform: &str, image_id: &str) -> String {
    let component: String = platform
        .chars()
        .map(|c| {
            if matches!(c, '/' | '\\') || c.is_control() {
                '-'
            } else {
                c
            }
        })
        .collect();
    format!("{}_{}.jpg", component, image_id)
}
