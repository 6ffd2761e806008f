// crates/folio-ui/src/helpers/assets.rs
//
// Which URLs the UI needs as images, and which of them to preload.
//
// The desktop build has no video decoder, so a preview that is "playing" is
// shown as its poster. Anything that is not a still image is never handed to
// egui's image loaders.

use std::collections::HashSet;

use folio_core::media::Phase;
use folio_core::{FolioConfig, MediaSource};
use folio_media::is_image_url;

/// The still to show for `source` in `phase`: the progressive choice when it
/// is an image, otherwise the poster.
pub fn still_url(source: &MediaSource, phase: Phase) -> Option<&str> {
    source.display_url(phase)
        .filter(|u| is_image_url(u))
        .or(source.poster_url.as_deref())
}

/// Configured preload URLs, followed by every project poster, placeholder and
/// tech logo. Order is kept, duplicates dropped.
pub fn startup_assets(config: &FolioConfig) -> Vec<String> {
    let mut seen = HashSet::new();
    let project_stills = config.projects.iter().flat_map(|p| {
        p.video.poster_url.iter()
            .chain(p.video.low_res_url.iter())
            .chain(p.tech_stack.iter().map(|t| &t.logo))
    });
    config.preload.urls.iter()
        .chain(project_stills)
        .filter(|u| !u.trim().is_empty())
        .filter(|u| seen.insert(u.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use folio_core::media_types::{Project, TechItem};

    use super::*;

    #[test]
    fn playing_preview_falls_back_to_poster() {
        let src = MediaSource::new("/v/demo.mp4")
            .with_low_res("/v/demo-lo.jpg")
            .with_poster("/v/demo.jpg");
        assert_eq!(still_url(&src, Phase::Loading), Some("/v/demo-lo.jpg"));
        assert_eq!(still_url(&src, Phase::Playing), Some("/v/demo.jpg"));
        assert_eq!(still_url(&src, Phase::Error),   Some("/v/demo.jpg"));
        assert_eq!(still_url(&MediaSource::new("/v/x.mp4"), Phase::Ready), None);
    }

    #[test]
    fn startup_assets_dedup_in_order() {
        let mut config = FolioConfig::default();
        config.preload.urls = vec!["/img/hero.png".into(), "/logos/rust.svg".into()];
        config.projects = vec![Project {
            name:       "Demo".into(),
            year:       2024,
            video:      MediaSource::new("/v/demo.mp4").with_poster("/v/demo.jpg"),
            tech_stack: vec![
                TechItem { name: "Rust".into(), logo: "/logos/rust.svg".into(), url: String::new() },
                TechItem { name: "Wasm".into(), logo: "/logos/wasm.svg".into(), url: String::new() },
            ],
        }];
        assert_eq!(startup_assets(&config), vec![
            "/img/hero.png".to_string(),
            "/logos/rust.svg".to_string(),
            "/v/demo.jpg".to_string(),
            "/logos/wasm.svg".to_string(),
        ]);
    }
}
