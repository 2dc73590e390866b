use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;

use crate::error::SceneError;

/// One promotional tile in the helix. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct CarouselItem {
    pub index: usize,
    pub title: String,
    /// sRGB components in `[0, 1]`.
    pub color: [f32; 3],
    /// Poster / video reference relative to the asset root.
    pub video: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CarouselFile {
    items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    title: String,
    color: String,
    #[serde(default)]
    video: Option<String>,
}

pub fn load_carousel(path: impl AsRef<Path>) -> Result<Vec<CarouselItem>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).with_context(|| format!("reading {:?}", path))?;
    load_carousel_from_bytes(&bytes).with_context(|| format!("parsing {:?}", path))
}

pub fn load_carousel_from_bytes(bytes: &[u8]) -> Result<Vec<CarouselItem>> {
    let file: CarouselFile = serde_json::from_slice(bytes).context("parsing carousel json")?;
    if file.items.is_empty() {
        bail!(SceneError::EmptyCarousel);
    }
    file.items
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let color = parse_hex_color(&raw.color)
                .with_context(|| format!("item {index} ({:?})", raw.title))?;
            Ok(CarouselItem {
                index,
                title: raw.title,
                color,
                video: raw.video,
            })
        })
        .collect()
}

/// Parse `#rrggbb` (leading `#` optional) into `[0, 1]` components.
pub fn parse_hex_color(s: &str) -> Result<[f32; 3]> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        bail!("expected #rrggbb colour, got {s:?}");
    }
    let mut out = [0.0f32; 3];
    for (i, slot) in out.iter_mut().enumerate() {
        let byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .with_context(|| format!("invalid hex digits in {s:?}"))?;
        *slot = byte as f32 / 255.0;
    }
    Ok(out)
}

/// The eight tiles shipped with the scene.
pub fn default_carousel() -> Vec<CarouselItem> {
    const ITEMS: [(&str, u32, Option<&str>); 8] = [
        ("Brand Films", 0xE4572E, Some("posters/brand_films.png")),
        ("Music Videos", 0x17BEBB, Some("posters/music_videos.png")),
        ("Commercials", 0xFFC914, None),
        ("Documentary", 0x76B041, Some("posters/documentary.png")),
        ("Live Sessions", 0x2E86AB, None),
        ("Motion Design", 0xA23B72, None),
        ("Color Grading", 0xF18F01, None),
        ("Contact", 0xC5D86D, None),
    ];
    ITEMS
        .into_iter()
        .enumerate()
        .map(|(index, (title, rgb, video))| CarouselItem {
            index,
            title: title.to_string(),
            color: [
                ((rgb >> 16) & 0xff) as f32 / 255.0,
                ((rgb >> 8) & 0xff) as f32 / 255.0,
                (rgb & 0xff) as f32 / 255.0,
            ],
            video: video.map(str::to_string),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse_with_or_without_hash() -> Result<()> {
        assert_eq!(parse_hex_color("#ff0000")?, [1.0, 0.0, 0.0]);
        assert_eq!(parse_hex_color("00ff00")?, [0.0, 1.0, 0.0]);
        assert!(parse_hex_color("#fff").is_err());
        assert!(parse_hex_color("#gg0000").is_err());
        Ok(())
    }

    #[test]
    fn indices_follow_file_order() -> Result<()> {
        let items = load_carousel_from_bytes(
            br##"{ "items": [
                { "title": "A", "color": "#101010" },
                { "title": "B", "color": "#202020", "video": "b.png" }
            ] }"##,
        )?;
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].index, 1);
        assert_eq!(items[1].video.as_deref(), Some("b.png"));
        Ok(())
    }

    #[test]
    fn empty_carousel_is_classified() {
        let err = load_carousel_from_bytes(br#"{ "items": [] }"#).unwrap_err();
        assert_eq!(err.downcast_ref::<SceneError>(), Some(&SceneError::EmptyCarousel));
    }

    #[test]
    fn defaults_have_eight_ordered_items() {
        let items = default_carousel();
        assert_eq!(items.len(), 8);
        assert!(items.iter().enumerate().all(|(i, item)| item.index == i));
    }
}
