use image::{DynamicImage, ImageReader, RgbImage};
use std::path::Path;

use crate::error::MediaError;

mod video;

pub use video::{middle_frame_index, FfmpegDecoder, VideoDecoder};

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Case-insensitive match of the file extension against the allow-list.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, MediaError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        Self::from_extension(ext).ok_or_else(|| MediaError::UnsupportedExtension(ext.to_string()))
    }
}

/// Decoded 8-bit RGB pixels (height x width x 3, interleaved).
#[derive(Debug, Clone)]
pub struct RawFrame {
    pixels: RgbImage,
}

impl RawFrame {
    /// Grayscale and alpha images are converted to 3-channel RGB.
    pub fn from_image(image: DynamicImage) -> Self {
        let pixels = match image {
            DynamicImage::ImageRgb8(rgb) => rgb,
            other => other.to_rgb8(),
        };
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }
}

/// Turns a still image or a video container into a single frame.
pub struct MediaLoader {
    video: Box<dyn VideoDecoder>,
}

impl MediaLoader {
    pub fn new(video: Box<dyn VideoDecoder>) -> Self {
        Self { video }
    }

    pub fn load(&self, path: &Path) -> Result<RawFrame, MediaError> {
        match MediaKind::from_path(path)? {
            MediaKind::Image => load_image(path),
            MediaKind::Video => self.load_video(path),
        }
    }

    fn load_video(&self, path: &Path) -> Result<RawFrame, MediaError> {
        let total = self.video.frame_count(path)?;
        let index = middle_frame_index(total).ok_or(MediaError::NoFrames)?;
        log::debug!("Video {} has {} frames, decoding frame {}", path.display(), total, index);
        let image = self.video.decode_frame(path, index)?;
        Ok(RawFrame::from_image(image))
    }
}

fn load_image(path: &Path) -> Result<RawFrame, MediaError> {
    let io_err = |source| MediaError::Io {
        path: path.to_path_buf(),
        source,
    };
    // Sniff the content rather than trusting the extension.
    let image = ImageReader::open(path)
        .map_err(io_err)?
        .with_guessed_format()
        .map_err(io_err)?
        .decode()
        .map_err(|e| MediaError::Decode(format!("{}: {}", path.display(), e)))?;
    Ok(RawFrame::from_image(image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, Rgba, RgbaImage};
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct FakeVideo {
        frames: u64,
        requested: Mutex<Vec<u64>>,
    }

    impl FakeVideo {
        fn with_frames(frames: u64) -> Self {
            Self {
                frames,
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    impl VideoDecoder for FakeVideo {
        fn frame_count(&self, _path: &Path) -> Result<u64, MediaError> {
            Ok(self.frames)
        }

        fn decode_frame(&self, _path: &Path, index: u64) -> Result<DynamicImage, MediaError> {
            self.requested.lock().unwrap().push(index);
            Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
                4,
                2,
                Rgb([index as u8, 0, 0]),
            )))
        }
    }

    impl VideoDecoder for std::sync::Arc<FakeVideo> {
        fn frame_count(&self, path: &Path) -> Result<u64, MediaError> {
            self.as_ref().frame_count(path)
        }

        fn decode_frame(&self, path: &Path, index: u64) -> Result<DynamicImage, MediaError> {
            self.as_ref().decode_frame(path, index)
        }
    }

    fn temp_path(ext: &str) -> PathBuf {
        std::env::temp_dir().join(format!("dfscan-media-{}.{}", uuid::Uuid::new_v4(), ext))
    }

    #[test]
    fn test_media_kind_is_case_insensitive() {
        assert_eq!(MediaKind::from_extension("JPG"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_extension("jpeg"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_extension("Mov"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_extension("gif"), None);
        assert!(matches!(
            MediaKind::from_path(Path::new("noext")),
            Err(MediaError::UnsupportedExtension(_))
        ));
    }

    #[test]
    fn test_video_selects_middle_frame() {
        for (frames, expected) in [(10, 5), (1, 0), (7, 3)] {
            let fake = std::sync::Arc::new(FakeVideo::with_frames(frames));
            let loader = MediaLoader::new(Box::new(fake.clone()));
            let frame = loader.load(Path::new("clip.mp4")).unwrap();
            assert_eq!(*fake.requested.lock().unwrap(), vec![expected]);
            assert_eq!(frame.pixels().get_pixel(0, 0)[0], expected as u8);
        }
    }

    #[test]
    fn test_empty_video_is_not_found() {
        let loader = MediaLoader::new(Box::new(FakeVideo::with_frames(0)));
        assert!(matches!(
            loader.load(Path::new("empty.avi")),
            Err(MediaError::NoFrames)
        ));
    }

    #[test]
    fn test_loads_still_image() {
        let path = temp_path("png");
        RgbImage::from_pixel(31, 17, Rgb([10, 20, 30])).save(&path).unwrap();

        let loader = MediaLoader::new(Box::new(FakeVideo::with_frames(0)));
        let frame = loader.load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!((frame.width(), frame.height()), (31, 17));
        assert_eq!(frame.pixels().get_pixel(5, 5), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_corrupt_image_is_not_found() {
        let path = temp_path("jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        let loader = MediaLoader::new(Box::new(FakeVideo::with_frames(0)));
        let result = loader.load(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(MediaError::Decode(_))));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let loader = MediaLoader::new(Box::new(FakeVideo::with_frames(0)));
        assert!(matches!(
            loader.load(&temp_path("png")),
            Err(MediaError::Io { .. })
        ));
    }

    #[test]
    fn test_gray_and_alpha_become_rgb() {
        let gray = RawFrame::from_image(DynamicImage::ImageLuma8(GrayImage::from_pixel(
            2,
            2,
            Luma([128]),
        )));
        assert_eq!(gray.pixels().get_pixel(1, 1), &Rgb([128, 128, 128]));

        let rgba = RawFrame::from_image(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            3,
            1,
            Rgba([1, 2, 3, 0]),
        )));
        assert_eq!(rgba.pixels().get_pixel(2, 0), &Rgb([1, 2, 3]));
    }
}
