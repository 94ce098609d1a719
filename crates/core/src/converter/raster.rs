//! Real raster image conversion backed by the `image` crate.

use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tokio::sync::mpsc;
use tracing::debug;

use super::error::ConverterError;
use super::traits::Converter;
use super::types::{mime_type_for, ConversionJob, ConversionOutput, ConversionProgress};
use crate::formats::QualitySetting;

/// Largest edge an ICO entry may have.
const ICO_MAX_EDGE: u32 = 256;

/// Converts between common raster image formats.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterConverter;

impl RasterConverter {
    pub fn new() -> Self {
        Self
    }

    /// Maps an extension to the codec that handles it.
    pub fn image_format(extension: &str) -> Option<ImageFormat> {
        match extension {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "gif" => Some(ImageFormat::Gif),
            "bmp" => Some(ImageFormat::Bmp),
            "tif" | "tiff" => Some(ImageFormat::Tiff),
            "webp" => Some(ImageFormat::WebP),
            "ico" => Some(ImageFormat::Ico),
            _ => None,
        }
    }

    /// Whether both sides of the pair are raster formats this converter handles.
    pub fn can_convert(from: &str, to: &str) -> bool {
        Self::image_format(from).is_some() && Self::image_format(to).is_some()
    }

    fn transcode(
        data: &[u8],
        source: &str,
        target: ImageFormat,
        quality: Option<QualitySetting>,
    ) -> Result<Vec<u8>, ConverterError> {
        let decoded = image::load_from_memory(data).map_err(|e| ConverterError::DecodeFailed {
            format: source.to_string(),
            reason: e.to_string(),
        })?;

        let prepared = match target {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(decoded.to_rgb8()),
            ImageFormat::Png | ImageFormat::Tiff => decoded,
            ImageFormat::Ico
                if decoded.width() > ICO_MAX_EDGE || decoded.height() > ICO_MAX_EDGE =>
            {
                DynamicImage::ImageRgba8(decoded.thumbnail(ICO_MAX_EDGE, ICO_MAX_EDGE).to_rgba8())
            }
            _ => DynamicImage::ImageRgba8(decoded.to_rgba8()),
        };

        let mut out = Cursor::new(Vec::new());
        let written = match (target, quality) {
            (ImageFormat::Jpeg, Some(QualitySetting::Quality(q))) => {
                let encoder = JpegEncoder::new_with_quality(&mut out, q.clamp(1, 100));
                prepared.write_with_encoder(encoder)
            }
            _ => prepared.write_to(&mut out, target),
        };
        written.map_err(|e| ConverterError::EncodeFailed {
            format: format!("{:?}", target),
            reason: e.to_string(),
        })?;

        Ok(out.into_inner())
    }
}

#[async_trait]
impl Converter for RasterConverter {
    fn name(&self) -> &str {
        "raster"
    }

    async fn convert(
        &self,
        job: ConversionJob,
        progress_tx: mpsc::Sender<ConversionProgress>,
    ) -> Result<ConversionOutput, ConverterError> {
        let target = Self::image_format(&job.target_format)
            .filter(|_| Self::image_format(&job.source_format).is_some())
            .ok_or_else(|| ConverterError::unsupported(&job.source_format, &job.target_format))?;

        let _ = progress_tx
            .send(ConversionProgress::new(&job.file_id, 0.0))
            .await;

        let data = job.content.clone();
        let source = job.source_format.clone();
        let quality = job.quality;
        let encoded = tokio::task::spawn_blocking(move || {
            Self::transcode(&data, &source, target, quality)
        })
        .await??;

        debug!(
            file_id = %job.file_id,
            input_bytes = job.content.len(),
            output_bytes = encoded.len(),
            quality = ?job.quality,
            "Raster conversion finished"
        );

        let _ = progress_tx
            .send(ConversionProgress::new(&job.file_id, 100.0))
            .await;

        Ok(ConversionOutput {
            content: Bytes::from(encoded),
            mime_type: mime_type_for(&job.target_format).to_string(),
            authoritative: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Bytes {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        Bytes::from(out.into_inner())
    }

    fn job(content: Bytes, from: &str, to: &str) -> ConversionJob {
        ConversionJob {
            file_id: "img-1".to_string(),
            file_name: format!("picture.{}", from),
            source_format: from.to_string(),
            target_format: to.to_string(),
            quality: None,
            content,
        }
    }

    #[test]
    fn test_can_convert() {
        assert!(RasterConverter::can_convert("jpg", "png"));
        assert!(RasterConverter::can_convert("tif", "webp"));
        assert!(!RasterConverter::can_convert("svg", "png"));
        assert!(!RasterConverter::can_convert("png", "psd"));
    }

    #[tokio::test]
    async fn test_png_to_jpeg() {
        let (tx, mut rx) = mpsc::channel(8);
        let output = RasterConverter
            .convert(job(png_bytes(16, 8), "png", "jpg"), tx)
            .await
            .unwrap();

        assert!(output.authoritative);
        assert_eq!(output.mime_type, "image/jpeg");
        assert_eq!(image::guess_format(&output.content).unwrap(), ImageFormat::Jpeg);

        let decoded = image::load_from_memory(&output.content).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));

        assert_eq!(rx.recv().await.unwrap().percent, 0.0);
        assert_eq!(rx.recv().await.unwrap().percent, 100.0);
    }

    fn gradient_png(width: u32, height: u32) -> Bytes {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            let noise = ((x * 7919 + y * 104_729) % 61) as u8;
            Rgba([(x % 256) as u8, (y % 256) as u8, noise.wrapping_mul(4), 255])
        });
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        Bytes::from(out.into_inner())
    }

    async fn jpeg_at(content: Bytes, quality: u8) -> Bytes {
        let (tx, _rx) = mpsc::channel(8);
        let mut job = job(content, "png", "jpg");
        job.quality = Some(QualitySetting::Quality(quality));
        RasterConverter.convert(job, tx).await.unwrap().content
    }

    #[tokio::test]
    async fn test_lower_jpeg_quality_is_smaller() {
        let source = gradient_png(128, 128);
        let low = jpeg_at(source.clone(), 30).await;
        let high = jpeg_at(source, 95).await;

        assert_eq!(image::guess_format(&low).unwrap(), ImageFormat::Jpeg);
        assert!(low.len() < high.len(), "{} >= {}", low.len(), high.len());
    }

    #[tokio::test]
    async fn test_quality_ignored_for_lossless_target() {
        let (tx, _rx) = mpsc::channel(8);
        let mut job = job(png_bytes(8, 8), "png", "gif");
        job.quality = Some(QualitySetting::Quality(10));
        let output = RasterConverter.convert(job, tx).await.unwrap();
        assert_eq!(image::guess_format(&output.content).unwrap(), ImageFormat::Gif);
    }

    #[tokio::test]
    async fn test_large_image_to_ico_is_downscaled() {
        let (tx, _rx) = mpsc::channel(8);
        let output = RasterConverter
            .convert(job(png_bytes(512, 300), "png", "ico"), tx)
            .await
            .unwrap();

        let decoded = image::load_from_memory_with_format(&output.content, ImageFormat::Ico).unwrap();
        assert!(decoded.width() <= ICO_MAX_EDGE);
        assert!(decoded.height() <= ICO_MAX_EDGE);
    }

    #[tokio::test]
    async fn test_garbage_input_fails_to_decode() {
        let (tx, _rx) = mpsc::channel(8);
        let result = RasterConverter
            .convert(job(Bytes::from_static(b"not an image"), "png", "gif"), tx)
            .await;
        assert!(matches!(result, Err(ConverterError::DecodeFailed { .. })));
    }

    #[tokio::test]
    async fn test_non_raster_pair_is_rejected() {
        let (tx, _rx) = mpsc::channel(8);
        let result = RasterConverter
            .convert(job(png_bytes(2, 2), "png", "svg"), tx)
            .await;
        assert!(matches!(result, Err(ConverterError::UnsupportedPair { .. })));
    }
}
