use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::imageops::FilterType;
use image::{AnimationDecoder, DynamicImage, Frame, GenericImageView, ImageReader};
use std::io::Cursor;
use thiserror::Error;

pub const MAX_DIMENSION: u32 = 800;
pub const LARGE_SOURCE_DIMENSION: u32 = 2000;
pub const DEFAULT_QUALITY: f32 = 70.0;
pub const LARGE_SOURCE_QUALITY: f32 = 60.0;

const WEBP_MIME: &str = "image/webp";
const GIF_MIME: &str = "image/gif";

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of normalizing one uploaded image.
#[derive(Debug, Clone)]
pub struct TranscodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
    pub quality: f32,
    /// True when the payload was re-encoded to WebP.
    pub reencoded: bool,
}

/// Scales `(width, height)` so the larger side is at most `max`, keeping the
/// aspect ratio. Never upscales; each side is at least 1px.
#[must_use]
pub fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width <= max && height <= max {
        return (width, height);
    }

    let ratio = f64::from(max) / f64::from(width.max(height));
    let scale = |side: u32| {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let scaled = (f64::from(side) * ratio).round() as u32;
        scaled.clamp(1, max)
    };
    (scale(width), scale(height))
}

#[must_use]
pub fn quality_for(width: u32, height: u32) -> f32 {
    if width > LARGE_SOURCE_DIMENSION || height > LARGE_SOURCE_DIMENSION {
        LARGE_SOURCE_QUALITY
    } else {
        DEFAULT_QUALITY
    }
}

/// Resizes and re-encodes an image payload. Blocking; call through
/// [`transcode_blocking`] from async code.
///
/// # Errors
/// Returns `TranscodeError` if the bytes cannot be decoded as an image.
pub fn transcode(bytes: &[u8], mime_type: &str) -> Result<TranscodedImage, TranscodeError> {
    let (width, height) = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?.into_dimensions()?;
    let (target_w, target_h) = fit_within(width, height, MAX_DIMENSION);
    let quality = quality_for(width, height);
    let needs_resize = (target_w, target_h) != (width, height);

    if mime_type == GIF_MIME {
        let bytes = if needs_resize { resize_gif(bytes, target_w, target_h)? } else { bytes.to_vec() };
        return Ok(TranscodedImage {
            bytes,
            width: target_w,
            height: target_h,
            mime_type: GIF_MIME.to_string(),
            quality,
            reencoded: false,
        });
    }

    let mut img = image::load_from_memory(bytes)?;
    if needs_resize {
        img = img.resize_exact(target_w, target_h, FilterType::Lanczos3);
    }

    let encoded = encode_webp(&img, quality);
    tracing::debug!(
        original_width = width,
        original_height = height,
        width = target_w,
        height = target_h,
        quality,
        size = encoded.len(),
        "Image transcoded"
    );

    Ok(TranscodedImage {
        bytes: encoded,
        width: target_w,
        height: target_h,
        mime_type: WEBP_MIME.to_string(),
        quality,
        reencoded: true,
    })
}

/// Runs [`transcode`] on the blocking pool.
///
/// # Errors
/// Returns `TranscodeError` if decoding fails or the task is cancelled.
pub async fn transcode_blocking(bytes: bytes::Bytes, mime_type: String) -> Result<TranscodedImage, TranscodeError> {
    tokio::task::spawn_blocking(move || transcode(&bytes, &mime_type))
        .await
        .map_err(|e| TranscodeError::Io(std::io::Error::other(e)))?
}

fn encode_webp(img: &DynamicImage, quality: f32) -> Vec<u8> {
    let (width, height) = img.dimensions();
    let rgba = img.to_rgba8();
    let encoder = webp::Encoder::from_rgba(&rgba, width, height);
    encoder.encode(quality).to_vec()
}

fn resize_gif(bytes: &[u8], width: u32, height: u32) -> Result<Vec<u8>, TranscodeError> {
    let decoder = GifDecoder::new(Cursor::new(bytes))?;
    let frames = decoder.into_frames().collect_frames()?;

    let resized = frames.into_iter().map(|frame| {
        let delay = frame.delay();
        let buffer = image::imageops::resize(frame.buffer(), width, height, FilterType::Triangle);
        Frame::from_parts(buffer, 0, 0, delay)
    });

    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut out);
        encoder.set_repeat(Repeat::Infinite)?;
        encoder.encode_frames(resized)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255])));
        let img = if format == ImageFormat::Jpeg { DynamicImage::ImageRgb8(img.to_rgb8()) } else { img };
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_fit_within() {
        assert_eq!(fit_within(3000, 1500, 800), (800, 400));
        assert_eq!(fit_within(1500, 3000, 800), (400, 800));
        assert_eq!(fit_within(640, 480, 800), (640, 480));
        assert_eq!(fit_within(800, 800, 800), (800, 800));
        assert_eq!(fit_within(10_000, 3, 800), (800, 1));
    }

    #[test]
    fn test_quality_threshold() {
        assert!((quality_for(2000, 2000) - DEFAULT_QUALITY).abs() < f32::EPSILON);
        assert!((quality_for(2001, 10) - LARGE_SOURCE_QUALITY).abs() < f32::EPSILON);
        assert!((quality_for(10, 2500) - LARGE_SOURCE_QUALITY).abs() < f32::EPSILON);
    }

    #[test]
    fn test_large_jpeg_is_downscaled_to_webp() {
        let jpeg = encode(3000, 1500, ImageFormat::Jpeg);
        let out = transcode(&jpeg, "image/jpeg").unwrap();

        assert_eq!((out.width, out.height), (800, 400));
        assert_eq!(out.mime_type, "image/webp");
        assert!(out.reencoded);
        assert!((out.quality - LARGE_SOURCE_QUALITY).abs() < f32::EPSILON);

        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (800, 400));
    }

    #[test]
    fn test_small_png_keeps_size() {
        let png = encode(120, 90, ImageFormat::Png);
        let out = transcode(&png, "image/png").unwrap();

        assert_eq!((out.width, out.height), (120, 90));
        assert_eq!(out.mime_type, "image/webp");
        assert!((out.quality - DEFAULT_QUALITY).abs() < f32::EPSILON);
    }

    #[test]
    fn test_small_gif_is_untouched() {
        let gif = encode(40, 30, ImageFormat::Gif);
        let out = transcode(&gif, "image/gif").unwrap();

        assert_eq!(out.bytes, gif);
        assert_eq!(out.mime_type, "image/gif");
        assert!(!out.reencoded);
    }

    #[test]
    fn test_large_gif_frames_are_resized() {
        let gif = encode(1600, 400, ImageFormat::Gif);
        let out = transcode(&gif, "image/gif").unwrap();

        assert_eq!((out.width, out.height), (800, 200));
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (800, 200));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(transcode(b"definitely not an image", "image/png").is_err());
    }
}
