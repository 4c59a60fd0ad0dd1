//! Target format catalog.
//!
//! The built-in table covers common social and display placements, in a fixed
//! order. Custom catalogs are JSON arrays of `{ "id", "width", "height", "label" }`.
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::TargetSpec;

const DEFAULT_TARGETS: &[(&str, u32, u32, &str)] = &[
    ("instagram_feed", 1080, 1080, "Instagram Feed (Square)"),
    ("instagram_story", 1080, 1920, "Instagram Story"),
    ("instagram_reel", 1080, 1920, "Instagram Reel"),
    ("facebook_feed", 1200, 630, "Facebook Feed"),
    ("facebook_story", 1080, 1920, "Facebook Story"),
    ("twitter_post", 1200, 675, "Twitter Post"),
    ("twitter_header", 1500, 500, "Twitter Header"),
    ("linkedin_post", 1200, 627, "LinkedIn Post"),
    ("youtube_thumbnail", 1280, 720, "YouTube Thumbnail"),
    ("tiktok_video", 1080, 1920, "TikTok Video"),
    ("google_display_banner", 728, 90, "Google Display Banner"),
    ("google_display_medium", 300, 250, "Google Display Medium Rectangle"),
    ("google_display_leaderboard", 970, 250, "Google Display Leaderboard"),
    ("google_display_skyscraper", 160, 600, "Google Display Skyscraper"),
];

pub fn default_catalog() -> Vec<TargetSpec> {
    DEFAULT_TARGETS
        .iter()
        .map(|&(id, w, h, label)| TargetSpec::new(id, w, h, label))
        .collect()
}

pub fn parse_catalog(text: &str) -> Result<Vec<TargetSpec>> {
    Ok(serde_json::from_str(text)?)
}

/// Load an ordered catalog from a JSON file. Entries are not validated here;
/// zero-sized targets fail individually when processed.
pub fn load_catalog(path: &Path) -> Result<Vec<TargetSpec>> {
    let text = std::fs::read_to_string(path)?;
    parse_catalog(&text)
}

/// Keep the catalog entries named in `ids`, in catalog order.
pub fn select_targets(catalog: &[TargetSpec], ids: &[String]) -> Result<Vec<TargetSpec>> {
    if let Some(unknown) = ids.iter().find(|id| !catalog.iter().any(|t| &t.id == *id)) {
        return Err(Error::InvalidArgument {
            arg: "formats",
            value: unknown.clone(),
        });
    }
    Ok(catalog
        .iter()
        .filter(|t| ids.contains(&t.id))
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_is_ordered() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 14);
        assert_eq!(catalog[0].id, "instagram_feed");
        assert_eq!(catalog[3].size().width, 1200);
        assert_eq!(catalog[13].id, "google_display_skyscraper");
        assert!(catalog.iter().all(|t| !t.size().is_empty()));
    }

    #[test]
    fn selection_keeps_catalog_order() {
        let catalog = default_catalog();
        let ids = vec!["youtube_thumbnail".to_string(), "instagram_feed".to_string()];
        let picked = select_targets(&catalog, &ids).unwrap();
        let names: Vec<_> = picked.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(names, ["instagram_feed", "youtube_thumbnail"]);
    }

    #[test]
    fn unknown_id_is_rejected() {
        let err = select_targets(&default_catalog(), &["myspace".to_string()]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { arg: "formats", .. }));
    }

    #[test]
    fn json_catalog_loads_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[
                {"id": "poster", "width": 600, "height": 900, "label": "Poster"},
                {"id": "strip", "width": 900, "height": 100, "label": "Strip"}
            ]"#,
        )
        .unwrap();
        let catalog = load_catalog(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[1], TargetSpec::new("strip", 900, 100, "Strip"));
    }

    #[test]
    fn malformed_catalog_is_config_error() {
        assert!(matches!(parse_catalog("[{\"id\": 1}]"), Err(Error::Config(_))));
    }
}
