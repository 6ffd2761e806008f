// crates/folio-media/src/fetch.rs
//
// AssetFetcher: turns an asset URL into bytes.
//
//   http:// and https://  → ureq GET (HEAD for `verify`)
//   anything else         → file under the asset root ("/img/a.png" and
//                           "img/a.png" both resolve to <root>/img/a.png)
//
// Two stores, shared by every clone:
//
//   cache   — still images only, handed to egui as `bytes://` URIs. Bounded
//             by the configured image set.
//   staged  — one non-image asset fetched ahead of time (the next music
//             track). Staging another replaces it; taking it empties it.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use parking_lot::Mutex;

use folio_core::error::LoadFailure;
use folio_core::preload::AssetLoader;

const IMAGE_EXTS: [&str; 6] = ["png", "jpg", "jpeg", "webp", "gif", "svg"];

/// Still-image URL by extension, ignoring query, fragment and case.
pub fn is_image_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetLocation {
    Remote(String),
    Local(PathBuf),
}

type Staged = Option<(String, Arc<[u8]>)>;

#[derive(Clone, Default)]
pub struct AssetFetcher {
    asset_root: Option<PathBuf>,
    cache:      Arc<Mutex<HashMap<String, Arc<[u8]>>>>,
    staged:     Arc<Mutex<Staged>>,
}

impl std::fmt::Debug for AssetFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetFetcher")
            .field("asset_root", &self.asset_root)
            .field("cached", &self.cache.lock().len())
            .field("staged", &self.staged.lock().as_ref().map(|(url, _)| url.clone()))
            .finish()
    }
}

impl AssetFetcher {
    pub fn new(asset_root: Option<PathBuf>) -> Self {
        Self { asset_root, cache: Arc::default(), staged: Arc::default() }
    }

    pub fn asset_root(&self) -> Option<&Path> {
        self.asset_root.as_deref()
    }

    pub fn locate(&self, url: &str) -> AssetLocation {
        if url.starts_with("http://") || url.starts_with("https://") {
            return AssetLocation::Remote(url.to_string());
        }
        let rel = url.trim_start_matches("file://").trim_start_matches('/');
        match &self.asset_root {
            Some(root) => AssetLocation::Local(root.join(rel)),
            None       => AssetLocation::Local(PathBuf::from(rel)),
        }
    }

    /// Bytes of `url`. Images are served from and kept in the cache; anything
    /// else is fetched fresh and not retained.
    pub fn fetch(&self, url: &str) -> Result<Arc<[u8]>, LoadFailure> {
        if let Some(bytes) = self.cached(url) {
            return Ok(bytes);
        }
        let bytes: Arc<[u8]> = self.fetch_uncached(url)?.into();
        if is_image_url(url) {
            self.cache.lock().insert(url.to_string(), Arc::clone(&bytes));
        }
        Ok(bytes)
    }

    /// Fetch without touching either store.
    pub fn fetch_uncached(&self, url: &str) -> Result<Vec<u8>, LoadFailure> {
        let bytes = match self.locate(url) {
            AssetLocation::Remote(u)   => fetch_remote(&u).map_err(|e| classify(url, e))?,
            AssetLocation::Local(path) => std::fs::read(&path).map_err(|e| io_failure(&path, e))?,
        };
        if bytes.is_empty() {
            return Err(LoadFailure::Decode(format!("{url}: empty body")));
        }
        Ok(bytes)
    }

    /// Check that `url` exists and is non-empty without reading its body.
    /// Returns the size when the backend reports one.
    pub fn verify(&self, url: &str) -> Result<Option<u64>, LoadFailure> {
        let size = match self.locate(url) {
            AssetLocation::Remote(u) => head_remote(&u).map_err(|e| classify(url, e))?,
            AssetLocation::Local(path) => {
                let meta = std::fs::metadata(&path).map_err(|e| io_failure(&path, e))?;
                if !meta.is_file() {
                    return Err(LoadFailure::Unsupported(format!("{}: not a file", path.display())));
                }
                Some(meta.len())
            }
        };
        if size == Some(0) {
            return Err(LoadFailure::Decode(format!("{url}: empty body")));
        }
        Ok(size)
    }

    /// Fetch `url` into the staging slot, replacing whatever was staged.
    pub fn stage(&self, url: &str) -> Result<usize, LoadFailure> {
        let bytes: Arc<[u8]> = self.fetch_uncached(url)?.into();
        let len = bytes.len();
        *self.staged.lock() = Some((url.to_string(), bytes));
        Ok(len)
    }

    pub fn is_staged(&self, url: &str) -> bool {
        self.staged.lock().as_ref().is_some_and(|(staged, _)| staged == url)
    }

    /// Staged bytes for `url`, emptying the slot. None if something else
    /// (or nothing) is staged.
    pub fn take_staged(&self, url: &str) -> Option<Arc<[u8]>> {
        let mut slot = self.staged.lock();
        match slot.take() {
            Some((staged, bytes)) if staged == url => Some(bytes),
            other => {
                *slot = other;
                None
            }
        }
    }

    pub fn cached(&self, url: &str) -> Option<Arc<[u8]>> {
        self.cache.lock().get(url).cloned()
    }

    /// Every cached (url, bytes) pair; all of them are images.
    pub fn cached_entries(&self) -> Vec<(String, Arc<[u8]>)> {
        self.cache.lock().iter().map(|(k, v)| (k.clone(), Arc::clone(v))).collect()
    }
}

impl AssetLoader for AssetFetcher {
    fn load(&self, url: &str) -> Result<(), LoadFailure> {
        self.fetch(url).map(|_| ())
    }
}

fn fetch_remote(url: &str) -> anyhow::Result<Vec<u8>> {
    let resp = ureq::get(url).call().with_context(|| format!("GET {url}"))?;
    let mut body  = resp.into_body();
    let mut bytes = Vec::new();
    body.as_reader()
        .read_to_end(&mut bytes)
        .with_context(|| format!("reading body of {url}"))?;
    Ok(bytes)
}

fn head_remote(url: &str) -> anyhow::Result<Option<u64>> {
    let resp = ureq::head(url).call().with_context(|| format!("HEAD {url}"))?;
    Ok(resp.headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok()))
}

fn io_failure(path: &Path, err: std::io::Error) -> LoadFailure {
    match err.kind() {
        std::io::ErrorKind::NotFound => LoadFailure::NotFound(path.display().to_string()),
        _ => LoadFailure::Network(format!("{}: {err}", path.display())),
    }
}

fn classify(url: &str, err: anyhow::Error) -> LoadFailure {
    match err.downcast_ref::<ureq::Error>() {
        Some(ureq::Error::StatusCode(404 | 410)) => LoadFailure::NotFound(url.to_string()),
        _ => LoadFailure::Network(format!("{err:#}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_with(files: &[(&str, &[u8])]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, bytes) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(path, bytes).unwrap();
        }
        dir
    }

    #[test]
    fn locate_splits_remote_and_local() {
        let f = AssetFetcher::new(Some(PathBuf::from("/srv/assets")));
        assert_eq!(
            f.locate("https://cdn.example.com/a.png"),
            AssetLocation::Remote("https://cdn.example.com/a.png".into()),
        );
        assert_eq!(f.locate("/img/a.png"), AssetLocation::Local("/srv/assets/img/a.png".into()));
        assert_eq!(f.locate("img/a.png"),  AssetLocation::Local("/srv/assets/img/a.png".into()));
    }

    #[test]
    fn local_fetch_is_cached() {
        let dir = root_with(&[("img/logo.png", b"\x89PNG")]);
        let f = AssetFetcher::new(Some(dir.path().to_path_buf()));
        assert!(f.cached("/img/logo.png").is_none());
        let bytes = f.fetch("/img/logo.png").unwrap();
        assert_eq!(&bytes[..], b"\x89PNG");
        assert!(f.clone().cached("/img/logo.png").is_some());
        assert_eq!(f.cached_entries().len(), 1);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = root_with(&[]);
        let f = AssetFetcher::new(Some(dir.path().to_path_buf()));
        assert!(matches!(f.load("nope.png"), Err(LoadFailure::NotFound(_))));
        assert!(f.cached("nope.png").is_none());
    }

    #[test]
    fn empty_file_is_a_decode_failure() {
        let dir = root_with(&[("empty.png", b"")]);
        let f = AssetFetcher::new(Some(dir.path().to_path_buf()));
        assert!(matches!(f.load("empty.png"), Err(LoadFailure::Decode(_))));
    }

    #[test]
    fn uncached_fetch_leaves_cache_alone() {
        let dir = root_with(&[("v.webm", b"webm")]);
        let f = AssetFetcher::new(Some(dir.path().to_path_buf()));
        assert_eq!(f.fetch_uncached("v.webm").unwrap(), b"webm".to_vec());
        assert!(f.cached("v.webm").is_none());
    }

    #[test]
    fn image_detection_ignores_query_and_case() {
        assert!(is_image_url("/img/logo.PNG"));
        assert!(is_image_url("https://cdn.example.com/a.webp?v=3"));
        assert!(!is_image_url("/video/demo.webm"));
        assert!(!is_image_url("no-extension"));
    }

    #[test]
    fn only_images_are_cached() {
        let dir = root_with(&[("logo.svg", b"<svg/>"), ("music/t.mp3", b"ID3")]);
        let f = AssetFetcher::new(Some(dir.path().to_path_buf()));
        assert_eq!(&f.fetch("music/t.mp3").unwrap()[..], b"ID3");
        f.fetch("logo.svg").unwrap();
        let urls: Vec<String> = f.cached_entries().into_iter().map(|(u, _)| u).collect();
        assert_eq!(urls, vec!["logo.svg".to_string()]);
    }

    #[test]
    fn staging_holds_a_single_asset() {
        let dir = root_with(&[("t1.mp3", b"one"), ("t2.mp3", b"two")]);
        let f = AssetFetcher::new(Some(dir.path().to_path_buf()));
        assert_eq!(f.stage("t1.mp3").unwrap(), 3);
        f.clone().stage("t2.mp3").unwrap();
        assert!(!f.is_staged("t1.mp3"));
        assert!(f.take_staged("t1.mp3").is_none());

        // A miss leaves the slot alone; a hit empties it.
        assert_eq!(&f.take_staged("t2.mp3").unwrap()[..], b"two");
        assert!(f.take_staged("t2.mp3").is_none());
        assert!(f.cached_entries().is_empty());
    }

    #[test]
    fn verify_checks_without_caching() {
        let dir = root_with(&[("v.webm", b"webm"), ("empty.webm", b"")]);
        std::fs::create_dir(dir.path().join("clips")).unwrap();
        let f = AssetFetcher::new(Some(dir.path().to_path_buf()));
        assert_eq!(f.verify("/v.webm").unwrap(), Some(4));
        assert!(matches!(f.verify("missing.webm"), Err(LoadFailure::NotFound(_))));
        assert!(matches!(f.verify("empty.webm"),   Err(LoadFailure::Decode(_))));
        assert!(matches!(f.verify("clips"),        Err(LoadFailure::Unsupported(_))));
        assert!(f.cached("v.webm").is_none());
    }
}
