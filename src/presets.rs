//! Built-in catalog of common output sizes.
//!
//! Print sizes are stored in their native unit (inches for photo and US paper,
//! centimetres for ISO paper, millimetres for ID photos) so they convert
//! through the active DPI like any user-supplied size. Screen, video and
//! social media sizes are in pixels.
//!
//! Each preset has a short `id` for the command line (`--preset a4`) and a
//! display name; [`find_preset`] accepts either.

use crate::units::Unit;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizePreset {
    pub id: &'static str,
    pub name: &'static str,
    pub width: f64,
    pub height: f64,
    pub unit: Unit,
    pub category: &'static str,
    pub keywords: &'static [&'static str],
}

const fn preset(
    id: &'static str,
    name: &'static str,
    width: f64,
    height: f64,
    unit: Unit,
    category: &'static str,
    keywords: &'static [&'static str],
) -> SizePreset {
    SizePreset {
        id,
        name,
        width,
        height,
        unit,
        category,
        keywords,
    }
}

const PHOTO: &str = "Photo";
const ISO: &str = "ISO";
const DOCUMENT: &str = "Document";
const ID: &str = "ID";
const SCREEN: &str = "Screen";
const VIDEO: &str = "Video";
const SOCIAL: &str = "Social";

#[rustfmt::skip]
pub static SIZE_PRESETS: &[SizePreset] = &[
    preset("photo-4x6", "4 × 6\" (10×15 cm)", 4.0, 6.0, Unit::In, PHOTO, &["4x6", "10x15", "photo", "polaroid"]),
    preset("photo-5x7", "5 × 7\" (13×18 cm)", 5.0, 7.0, Unit::In, PHOTO, &["5x7", "13x18", "portrait"]),
    preset("photo-6x8", "6 × 8\" (15×20 cm)", 6.0, 8.0, Unit::In, PHOTO, &["6x8", "15x20", "frame"]),
    preset("photo-8x10", "8 × 10\" (20×25 cm)", 8.0, 10.0, Unit::In, PHOTO, &["8x10", "20x25", "professional"]),
    preset("photo-11x14", "11 × 14\" (28×36 cm)", 11.0, 14.0, Unit::In, PHOTO, &["11x14", "28x36", "gallery"]),
    preset("photo-12x16", "12 × 16\" (30×40 cm)", 12.0, 16.0, Unit::In, PHOTO, &["12x16", "30x40", "art"]),
    preset("photo-16x20", "16 × 20\" (40×50 cm)", 16.0, 20.0, Unit::In, PHOTO, &["16x20", "40x50", "poster"]),
    preset("photo-24x36", "24 × 36\" (60×90 cm)", 24.0, 36.0, Unit::In, PHOTO, &["24x36", "60x90", "large format"]),
    preset("a3", "A3 (29.7×42 cm)", 29.7, 42.0, Unit::Cm, ISO, &["a3", "iso", "drawing"]),
    preset("a4", "A4 (21×29.7 cm)", 21.0, 29.7, Unit::Cm, ISO, &["a4", "iso", "document", "office"]),
    preset("a5", "A5 (14.8×21 cm)", 14.8, 21.0, Unit::Cm, ISO, &["a5", "iso", "card", "flyer"]),
    preset("letter", "Letter (8.5×11\")", 8.5, 11.0, Unit::In, DOCUMENT, &["letter", "us", "office"]),
    preset("legal", "Legal (8.5×14\")", 8.5, 14.0, Unit::In, DOCUMENT, &["legal", "contract"]),
    preset("tabloid", "Tabloid (11×17\")", 11.0, 17.0, Unit::In, DOCUMENT, &["tabloid", "ledger", "newspaper"]),
    preset("id-card", "ID card (32×43 mm)", 32.0, 43.0, Unit::Mm, ID, &["id", "card", "identity"]),
    preset("passport", "Passport (51×51 mm)", 51.0, 51.0, Unit::Mm, ID, &["passport", "visa", "2x2"]),
    preset("visa", "Visa (50×50 mm)", 50.0, 50.0, Unit::Mm, ID, &["visa"]),
    preset("screen-720p", "HD 720p (1280×720)", 1280.0, 720.0, Unit::Px, SCREEN, &["720p", "hd", "screen", "laptop"]),
    preset("screen-1080p", "Full HD 1080p (1920×1080)", 1920.0, 1080.0, Unit::Px, SCREEN, &["1080p", "full hd", "fhd", "desktop", "monitor"]),
    preset("screen-1440p", "WQHD 1440p (2560×1440)", 2560.0, 1440.0, Unit::Px, SCREEN, &["1440p", "wqhd", "qhd", "2k"]),
    preset("screen-4k", "4K UHD (3840×2160)", 3840.0, 2160.0, Unit::Px, SCREEN, &["4k", "uhd", "3840", "2160"]),
    preset("video-480p", "SD 480p (854×480)", 854.0, 480.0, Unit::Px, VIDEO, &["480p", "sd", "streaming"]),
    preset("video-720p", "HD 720p (1280×720)", 1280.0, 720.0, Unit::Px, VIDEO, &["720p", "hd", "broadcast"]),
    preset("video-1080p", "Full HD 1080p (1920×1080)", 1920.0, 1080.0, Unit::Px, VIDEO, &["1080p", "full hd", "youtube"]),
    preset("video-2k-dci", "2K DCI (2048×1080)", 2048.0, 1080.0, Unit::Px, VIDEO, &["2k", "dci", "cinema"]),
    preset("video-1440p", "QHD 1440p (2560×1440)", 2560.0, 1440.0, Unit::Px, VIDEO, &["1440p", "qhd", "gaming"]),
    preset("video-4k", "4K UHD (3840×2160)", 3840.0, 2160.0, Unit::Px, VIDEO, &["4k", "uhd", "streaming"]),
    preset("video-4k-dci", "4K DCI (4096×2160)", 4096.0, 2160.0, Unit::Px, VIDEO, &["4k", "dci", "digital cinema"]),
    preset("video-8k", "8K UHD (7680×4320)", 7680.0, 4320.0, Unit::Px, VIDEO, &["8k", "uhd"]),
    preset("instagram-square", "Instagram square (1080×1080)", 1080.0, 1080.0, Unit::Px, SOCIAL, &["instagram", "feed", "1:1"]),
    preset("instagram-landscape", "Instagram landscape (1080×566)", 1080.0, 566.0, Unit::Px, SOCIAL, &["instagram", "landscape"]),
    preset("instagram-portrait", "Instagram portrait (1080×1350)", 1080.0, 1350.0, Unit::Px, SOCIAL, &["instagram", "portrait", "4:5"]),
    preset("instagram-story", "Instagram story (1080×1920)", 1080.0, 1920.0, Unit::Px, SOCIAL, &["instagram", "stories", "reels", "9:16"]),
    preset("instagram-profile", "Instagram profile (320×320)", 320.0, 320.0, Unit::Px, SOCIAL, &["profile", "avatar"]),
    preset("facebook-feed", "Facebook feed (1200×630)", 1200.0, 630.0, Unit::Px, SOCIAL, &["facebook", "feed", "post"]),
    preset("facebook-cover", "Facebook cover (820×312)", 820.0, 312.0, Unit::Px, SOCIAL, &["facebook", "cover", "banner"]),
    preset("facebook-story", "Facebook story (1080×1920)", 1080.0, 1920.0, Unit::Px, SOCIAL, &["facebook", "stories"]),
    preset("youtube-thumbnail", "YouTube thumbnail (1280×720)", 1280.0, 720.0, Unit::Px, SOCIAL, &["youtube", "thumbnail"]),
    preset("youtube-banner", "YouTube channel banner (2560×1440)", 2560.0, 1440.0, Unit::Px, SOCIAL, &["youtube", "banner", "channel"]),
    preset("youtube-shorts", "YouTube Shorts (1080×1920)", 1080.0, 1920.0, Unit::Px, SOCIAL, &["youtube", "shorts", "vertical"]),
    preset("tiktok", "TikTok / Reels (1080×1920)", 1080.0, 1920.0, Unit::Px, SOCIAL, &["tiktok", "reels", "shorts", "vertical"]),
    preset("x-post", "X / Twitter post (1600×900)", 1600.0, 900.0, Unit::Px, SOCIAL, &["twitter", "x", "post"]),
    preset("linkedin", "LinkedIn post (1200×627)", 1200.0, 627.0, Unit::Px, SOCIAL, &["linkedin", "professional"]),
    preset("pinterest", "Pinterest pin (1000×1500)", 1000.0, 1500.0, Unit::Px, SOCIAL, &["pinterest", "pin", "2:3"]),
];

/// Distinct categories, sorted.
pub fn categories() -> Vec<&'static str> {
    let mut cats: Vec<&'static str> = SIZE_PRESETS.iter().map(|p| p.category).collect();
    cats.sort_unstable();
    cats.dedup();
    cats
}

/// Presets in a category (case-insensitive), in catalog order.
pub fn presets_in_category(category: &str) -> Vec<&'static SizePreset> {
    SIZE_PRESETS
        .iter()
        .filter(|p| p.category.eq_ignore_ascii_case(category.trim()))
        .collect()
}

/// Look a preset up by id or display name, ignoring case.
pub fn find_preset(name: &str) -> Option<&'static SizePreset> {
    let name = name.trim();
    SIZE_PRESETS
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(name) || p.name.to_lowercase() == name.to_lowercase())
}

/// Case-insensitive substring search over id, name and keywords.
///
/// An empty query, or one that matches nothing, returns the whole catalog.
pub fn search_presets(query: &str) -> Vec<&'static SizePreset> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return SIZE_PRESETS.iter().collect();
    }

    let matches: Vec<&'static SizePreset> = SIZE_PRESETS
        .iter()
        .filter(|p| {
            p.id.contains(&query)
                || p.name.to_lowercase().contains(&query)
                || p.keywords.iter().any(|kw| kw.contains(&query))
        })
        .collect();

    if matches.is_empty() {
        SIZE_PRESETS.iter().collect()
    } else {
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::to_pixels;

    #[test]
    fn ids_are_unique_and_lowercase() {
        let mut ids: Vec<_> = SIZE_PRESETS.iter().map(|p| p.id).collect();
        assert!(ids.iter().all(|id| id.chars().all(|c| !c.is_uppercase() && !c.is_whitespace())));
        let before = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn every_preset_has_positive_size() {
        for p in SIZE_PRESETS {
            assert!(p.width > 0.0 && p.height > 0.0, "{}", p.id);
        }
    }

    #[test]
    fn categories_sorted_and_distinct() {
        assert_eq!(
            categories(),
            ["Document", "ID", "ISO", "Photo", "Screen", "Social", "Video"]
        );
    }

    #[test]
    fn presets_in_category_ignores_case() {
        let iso = presets_in_category("iso");
        let ids: Vec<_> = iso.iter().map(|p| p.id).collect();
        assert_eq!(ids, ["a3", "a4", "a5"]);
        assert!(presets_in_category("Holograms").is_empty());
    }

    #[test]
    fn find_by_id_or_name() {
        let a4 = find_preset("A4").unwrap();
        assert_eq!((a4.width, a4.height, a4.unit), (21.0, 29.7, Unit::Cm));
        assert_eq!(find_preset("ID card (32×43 mm)").unwrap().id, "id-card");
        assert!(find_preset("A2").is_none());
    }

    #[test]
    fn id_card_converts_at_300_dpi() {
        let p = find_preset("id-card").unwrap();
        assert_eq!(to_pixels(p.width, p.unit, 300).unwrap(), 377);
        assert_eq!(to_pixels(p.height, p.unit, 300).unwrap(), 507);
    }

    #[test]
    fn search_matches_keywords_and_names() {
        let hits = search_presets("Passport");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "passport");

        let visa: Vec<_> = search_presets("visa").iter().map(|p| p.id).collect();
        assert_eq!(visa, ["passport", "visa"]);

        assert!(search_presets("instagram").iter().all(|p| p.category == SOCIAL));
    }

    #[test]
    fn search_without_match_returns_everything() {
        assert_eq!(search_presets("").len(), SIZE_PRESETS.len());
        assert_eq!(search_presets("   ").len(), SIZE_PRESETS.len());
        assert_eq!(search_presets("zzzz").len(), SIZE_PRESETS.len());
    }
}
