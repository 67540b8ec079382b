//! # Image Processing Module
//!
//! Questo modulo ricodifica le immagini JPEG e PNG con il crate `image`.
//!
//! ## Pipeline:
//! 1. **Formato di output**: dedotto dal nome del file di destinazione
//! 2. **Decodifica**: per contenuto (sniffing), non per estensione
//! 3. **Codifica**:
//!    - JPEG: qualità lossy configurata (default 20); immagini in scala di grigi
//!      restano grigie, tutto il resto viene convertito in RGB
//!    - PNG: lossless, compressione massima e filtro adattivo quando `optimize`
//!      è attivo; la qualità non si applica
//! 4. I metadati (EXIF, chunk testuali) non vengono copiati
//!
//! ## Error handling:
//! Input illeggibile, corrotto, formato non supportato o destinazione non
//! scrivibile producono `CompressError::Image` / `UnsupportedFormat`, entrambi
//! isolati al singolo file.
//!
//! La codifica è CPU-bound: `optimize()` la esegue sul blocking pool di tokio,
//! ma il chiamante attende il risultato prima di passare al file successivo.

use crate::config::ImageSettings;
use crate::error::CompressError;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageEncoder, ImageError, ImageFormat};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Re-encodes still images at reduced quality
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    settings: ImageSettings,
}

impl ImageProcessor {
    pub fn new(settings: ImageSettings) -> Self {
        Self { settings }
    }

    /// Re-encode `input_path` into `output_path` without blocking the runtime
    pub async fn optimize(&self, input_path: &Path, output_path: &Path) -> Result<(), CompressError> {
        let processor = self.clone();
        let input = input_path.to_path_buf();
        let output = output_path.to_path_buf();

        tokio::task::spawn_blocking(move || processor.encode(&input, &output))
            .await
            .map_err(|e| {
                CompressError::Image(ImageError::IoError(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("encoder task failed: {}", e),
                )))
            })?
    }

    /// Re-encode `input_path` into `output_path`, format taken from the output name
    pub fn encode(&self, input_path: &Path, output_path: &Path) -> Result<(), CompressError> {
        let format = ImageFormat::from_path(output_path)
            .map_err(|_| CompressError::UnsupportedFormat(output_path.display().to_string()))?;
        if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
            return Err(CompressError::UnsupportedFormat(format!(
                "{:?} ({})",
                format,
                output_path.display()
            )));
        }

        let img = image::io::Reader::open(input_path)
            .map_err(ImageError::IoError)?
            .with_guessed_format()
            .map_err(ImageError::IoError)?
            .decode()?;

        debug!(
            "Decoded {} ({}x{}, {:?}), encoding as {:?}",
            input_path.display(),
            img.width(),
            img.height(),
            img.color(),
            format
        );

        let file = std::fs::File::create(output_path).map_err(ImageError::IoError)?;
        let mut writer = BufWriter::new(file);

        match format {
            ImageFormat::Jpeg => self.write_jpeg(&img, &mut writer)?,
            _ => self.write_png(&img, &mut writer)?,
        }

        writer.flush().map_err(ImageError::IoError)?;
        Ok(())
    }

    fn write_jpeg<W: Write>(&self, img: &DynamicImage, writer: W) -> Result<(), ImageError> {
        // The encoder accepts 1-100; quality 0 maps to the lowest setting
        let quality = self.settings.quality.clamp(1, 100);
        let mut encoder = JpegEncoder::new_with_quality(writer, quality);

        match img {
            DynamicImage::ImageLuma8(gray) => encoder.encode_image(gray),
            _ => encoder.encode_image(&img.to_rgb8()),
        }
    }

    fn write_png<W: Write>(&self, img: &DynamicImage, writer: W) -> Result<(), ImageError> {
        let compression = if self.settings.optimize {
            CompressionType::Best
        } else {
            CompressionType::Default
        };

        PngEncoder::new_with_quality(writer, compression, FilterType::Adaptive).write_image(
            img.as_bytes(),
            img.width(),
            img.height(),
            img.color(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::TempDir;

    fn noisy_rgb(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            let v = x.wrapping_mul(7919) ^ y.wrapping_mul(104_729) ^ (x * y);
            Rgb([(v % 251) as u8, (v / 3 % 241) as u8, (v / 7 % 239) as u8])
        })
    }

    fn write_jpeg_fixture(path: &Path, quality: u8) {
        let file = std::fs::File::create(path).unwrap();
        let mut encoder = JpegEncoder::new_with_quality(file, quality);
        encoder.encode_image(&noisy_rgb(96, 96)).unwrap();
    }

    #[test]
    fn test_jpeg_is_reencoded_smaller() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("photo.JPG");
        let output = temp_dir.path().join("out.JPG");
        write_jpeg_fixture(&input, 95);

        ImageProcessor::new(ImageSettings::default()).encode(&input, &output).unwrap();

        let original = std::fs::metadata(&input).unwrap().len();
        let compressed = std::fs::metadata(&output).unwrap().len();
        assert!(compressed > 0);
        assert!(compressed < original, "{} >= {}", compressed, original);

        let decoded = image::open(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (96, 96));
    }

    #[test]
    fn test_png_is_repacked_losslessly() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("photo.png");
        let output = temp_dir.path().join("out.png");
        let original = RgbaImage::from_fn(40, 30, |x, y| Rgba([x as u8 * 6, y as u8 * 8, 128, 200]));
        original.save(&input).unwrap();

        ImageProcessor::new(ImageSettings::default()).encode(&input, &output).unwrap();

        let decoded = image::open(&output).unwrap().to_rgba8();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_grayscale_jpeg_stays_grayscale() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("gray.jpg");
        let output = temp_dir.path().join("gray_out.jpg");
        let gray = GrayImage::from_fn(32, 32, |x, y| Luma([((x + y) * 4) as u8]));
        JpegEncoder::new_with_quality(std::fs::File::create(&input).unwrap(), 90)
            .encode_image(&gray)
            .unwrap();

        ImageProcessor::new(ImageSettings::default()).encode(&input, &output).unwrap();

        assert_eq!(image::open(&output).unwrap().color(), image::ColorType::L8);
    }

    #[test]
    fn test_format_follows_output_name_not_content() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("really_png.jpg");
        let output = temp_dir.path().join("really_png_out.jpg");
        noisy_rgb(16, 16).save_with_format(&input, ImageFormat::Png).unwrap();

        ImageProcessor::new(ImageSettings::default()).encode(&input, &output).unwrap();

        let sniffed = image::io::Reader::open(&output)
            .unwrap()
            .with_guessed_format()
            .unwrap()
            .format();
        assert_eq!(sniffed, Some(ImageFormat::Jpeg));
    }

    #[test]
    fn test_corrupted_input_is_isolated_error() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("broken.png");
        let output = temp_dir.path().join("broken_out.png");
        std::fs::write(&input, b"\x89PNG\r\n\x1a\nthis is not a png body").unwrap();

        let err = ImageProcessor::new(ImageSettings::default())
            .encode(&input, &output)
            .unwrap_err();

        assert!(matches!(err, CompressError::Image(_)));
        assert!(err.is_isolated());
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_input_is_isolated_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = ImageProcessor::new(ImageSettings::default())
            .encode(&temp_dir.path().join("nope.jpg"), &temp_dir.path().join("out.jpg"))
            .unwrap_err();

        assert!(err.is_isolated());
    }

    #[test]
    fn test_unsupported_output_format() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("photo.png");
        noisy_rgb(8, 8).save(&input).unwrap();

        let processor = ImageProcessor::new(ImageSettings::default());
        let gif = processor.encode(&input, &temp_dir.path().join("photo.gif")).unwrap_err();
        let unknown = processor.encode(&input, &temp_dir.path().join("photo.xyz")).unwrap_err();

        assert!(matches!(gif, CompressError::UnsupportedFormat(_)));
        assert!(matches!(unknown, CompressError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_optimize_runs_off_the_runtime() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("photo.jpeg");
        let output = temp_dir.path().join("photo_out.jpeg");
        write_jpeg_fixture(&input, 90);

        ImageProcessor::new(ImageSettings::default())
            .optimize(&input, &output)
            .await
            .unwrap();

        assert!(std::fs::metadata(&output).unwrap().len() > 0);
    }
}
