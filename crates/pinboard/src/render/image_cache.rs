use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Cursor;

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use eframe::egui;
use tracing::warn;

use crate::board::graph::NodeId;

const PNG_PREFIX: &str = "data:image/png;base64,";

/// Textures for image cards, keyed by card id. A payload that fails to decode is
/// remembered as `None` so it is only attempted once.
#[derive(Default)]
pub struct ImageCache {
    textures: RefCell<HashMap<NodeId, Option<egui::TextureHandle>>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(
        &self,
        ctx: &egui::Context,
        node_id: &str,
        data_url: &str,
    ) -> Option<egui::TextureHandle> {
        if let Some(cached) = self.textures.borrow().get(node_id) {
            return cached.clone();
        }

        let texture = match decode_data_url(data_url) {
            Ok(image) => {
                let size = [image.width() as usize, image.height() as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
                Some(ctx.load_texture(
                    format!("card-{node_id}"),
                    color_image,
                    egui::TextureOptions::LINEAR,
                ))
            }
            Err(e) => {
                warn!(node = node_id, error = %e, "Failed to decode card image");
                None
            }
        };
        self.textures
            .borrow_mut()
            .insert(node_id.to_string(), texture.clone());
        texture
    }

    /// Drop textures for cards that no longer exist.
    pub fn retain(&self, keep: impl Fn(&str) -> bool) {
        self.textures.borrow_mut().retain(|id, _| keep(id));
    }

    pub fn clear(&self) {
        self.textures.borrow_mut().clear();
    }
}

/// Decode a `data:image/...;base64,` payload into RGBA pixels.
pub fn decode_data_url(data_url: &str) -> Result<image::RgbaImage> {
    let (header, payload) = data_url
        .split_once(',')
        .context("Not a data URL")?;
    if !header.starts_with("data:image/") || !header.ends_with(";base64") {
        anyhow::bail!("Unsupported data URL header: {header}");
    }
    let bytes = STANDARD
        .decode(payload.trim())
        .context("Invalid base64 payload")?;
    let image = image::load_from_memory(&bytes).context("Unreadable image data")?;
    Ok(image.into_rgba8())
}

/// Encode clipboard pixels (RGBA, row-major) as a PNG data URL.
pub fn png_data_url(width: u32, height: u32, rgba: Vec<u8>) -> Result<String> {
    let image = image::RgbaImage::from_raw(width, height, rgba)
        .context("Clipboard image has an unexpected buffer size")?;
    let mut png = Cursor::new(Vec::new());
    image
        .write_to(&mut png, image::ImageFormat::Png)
        .context("Failed to encode pasted image")?;
    Ok(format!("{PNG_PREFIX}{}", STANDARD.encode(png.into_inner())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pasted_pixels_survive_encoding() {
        let pixels = vec![
            255, 0, 0, 255, //
            0, 255, 0, 255, //
            0, 0, 255, 255, //
            255, 255, 255, 0,
        ];
        let url = png_data_url(2, 2, pixels.clone()).unwrap();
        assert!(url.starts_with(PNG_PREFIX));

        let decoded = decode_data_url(&url).unwrap();
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.into_raw(), pixels);
    }

    #[test]
    fn short_buffer_is_rejected() {
        assert!(png_data_url(4, 4, vec![0; 3]).is_err());
    }

    #[test]
    fn non_image_urls_are_rejected() {
        assert!(decode_data_url("https://example.com/a.png").is_err());
        assert!(decode_data_url("data:text/plain;base64,aGVsbG8=").is_err());
        assert!(decode_data_url("data:image/png;base64,!!!").is_err());
        // Valid base64, but not an image.
        assert!(decode_data_url("data:image/png;base64,aGVsbG8=").is_err());
    }
}
