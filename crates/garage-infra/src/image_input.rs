//! Image files to embeddable data URIs

use std::fs;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use garage_types::{Result, VehicleKind};
use tracing::warn;

/// Read an image file as `data:<mime>;base64,<payload>`.
///
/// The format is detected from the file's bytes, not its extension.
pub fn image_data_uri(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    let format = image::guess_format(&bytes)?;
    Ok(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        STANDARD.encode(&bytes)
    ))
}

/// Image reference for a vehicle: the file's data URI, or the kind's
/// placeholder when no file is given or it cannot be read as an image
pub fn resolve_image(path: Option<&Path>, kind: &VehicleKind) -> String {
    let Some(path) = path else {
        return kind.placeholder_image().to_string();
    };
    match image_data_uri(path) {
        Ok(uri) => uri,
        Err(e) => {
            warn!("Cannot use image {}: {}; using placeholder", path.display(), e);
            kind.placeholder_image().to_string()
        }
    }
}
