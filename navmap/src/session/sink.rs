//! Where displayed map images go.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::debug;

use crate::fetch::MapImage;

/// Errors from an [`ImageSink`].
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write map image to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Receives every image the session decides to display.
pub trait ImageSink: Send + 'static {
    fn show(&mut self, image: &MapImage) -> impl Future<Output = Result<(), SinkError>> + Send;
}

/// Writes the current image to a file, replacing it atomically.
///
/// Viewers polling the file never observe a partially written image.
#[derive(Debug, Clone)]
pub struct FileImageSink {
    path: PathBuf,
}

impl FileImageSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "map".into());
        name.push(".part");
        self.path.with_file_name(name)
    }
}

impl ImageSink for FileImageSink {
    async fn show(&mut self, image: &MapImage) -> Result<(), SinkError> {
        let staging = self.staging_path();
        let write_err = |source| SinkError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        fs::write(&staging, &image.data).await.map_err(write_err)?;
        fs::rename(&staging, &self.path).await.map_err(write_err)?;

        debug!(path = %self.path.display(), bytes = image.data.len(), "Map image written");
        Ok(())
    }
}

/// Keeps only the latest image in memory.
#[derive(Debug, Clone, Default)]
pub struct LatestImageSink {
    latest: Option<MapImage>,
    shown: u64,
}

impl LatestImageSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<&MapImage> {
        self.latest.as_ref()
    }

    pub fn shown(&self) -> u64 {
        self.shown
    }
}

impl ImageSink for LatestImageSink {
    async fn show(&mut self, image: &MapImage) -> Result<(), SinkError> {
        self.latest = Some(image.clone());
        self.shown += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MapRequest;
    use crate::geo::Position;
    use crate::view::{ImageType, MapType, Viewport};

    fn image(data: &[u8]) -> MapImage {
        let viewport = Viewport {
            width: 480,
            height: 320,
            flipped: false,
            flip_locked: false,
        };
        MapImage {
            data: data.to_vec(),
            request: MapRequest::new(
                Position::new(54.0, 10.0),
                0.0,
                15,
                MapType::default(),
                ImageType::default(),
                &viewport,
            ),
        }
    }

    #[tokio::test]
    async fn test_file_sink_replaces_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("map.png");
        let mut sink = FileImageSink::new(&path);

        sink.show(&image(b"first")).await.unwrap();
        sink.show(&image(b"second")).await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert!(!path.with_file_name("map.png.part").exists());
    }

    #[tokio::test]
    async fn test_file_sink_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file, not a directory").unwrap();
        let mut sink = FileImageSink::new(blocker.join("map.png"));

        let err = sink.show(&image(b"data")).await.unwrap_err();
        assert!(err.to_string().contains("map.png"));
    }

    #[tokio::test]
    async fn test_latest_sink_keeps_last() {
        let mut sink = LatestImageSink::new();
        sink.show(&image(b"a")).await.unwrap();
        sink.show(&image(b"b")).await.unwrap();
        assert_eq!(sink.shown(), 2);
        assert_eq!(sink.latest().map(|i| i.data.as_slice()), Some(&b"b"[..]));
    }
}
