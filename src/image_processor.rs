//! # Image Processing Module
//!
//! Questo modulo implementa la trasformazione di una singola immagine:
//! decodifica, normalizzazione orientamento, resize percentuale, codifica
//! con policy per-formato e scrittura nel tree speculare.
//!
//! ## Pipeline di trasformazione:
//! 1. **Decodifica**: `image` crate con rilevamento formato dai magic bytes
//! 2. **Orientamento**: rotazione EXIF applicata ai pixel prima del resize,
//!    tag azzerato nel payload conservato
//! 3. **Resize**: `max(1, floor(dim * percent / 100))`, filtro Lanczos3;
//!    dimensioni invariate saltano il resample
//! 4. **Formato di output**: WebP se richiesta la conversione, altrimenti il
//!    formato rilevato con fallback sull'estensione sorgente
//! 5. **Codifica per formato**:
//!
//! | Formato | Encoder | Parametri |
//! |---------|---------|-----------|
//! | JPEG    | mozjpeg | quality, progressive sempre attivo, optimize dal flag |
//! | PNG     | image + oxipng | ricompressione solo con il flag optimize |
//! | WebP    | libwebp | quality o lossless, method 6 |
//! | Altri   | image   | passthrough senza parametri |
//!
//! 6. **Metadata**: EXIF/ICC reinseriti tali e quali se non viene richiesto
//!    lo strip
//!
//! Ogni errore della pipeline viene degradato a `TaskOutcome::Failed`: il
//! fallimento di un file non attraversa mai il confine del worker.

use crate::config::Config;
use crate::error::ScaleError;
use crate::metadata::{self, SourceMetadata};
use crate::optimizer::path_resolver::PathResolver;
use crate::task::{ImageTask, TaskOutcome};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Parametri di salvataggio, chiusi per formato di destinazione
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveFormat {
    Jpeg { quality: u8, optimize: bool },
    Png { optimize: bool },
    WebP { quality: u8, lossless: bool },
    Other(ImageFormat),
}

impl SaveFormat {
    /// Decide formato e parametri dal formato rilevato in decodifica,
    /// dall'estensione sorgente e dalla configurazione
    pub fn resolve(
        detected: Option<ImageFormat>,
        source: &Path,
        config: &Config,
    ) -> Result<Self, ScaleError> {
        if config.convert_to_webp {
            return Ok(Self::WebP {
                quality: config.quality,
                lossless: config.webp_lossless,
            });
        }

        let format = detected.or_else(|| {
            source
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(ImageFormat::from_extension)
        });

        match format {
            Some(ImageFormat::Jpeg) => Ok(Self::Jpeg {
                quality: config.quality,
                optimize: config.optimize,
            }),
            Some(ImageFormat::Png) => Ok(Self::Png {
                optimize: config.optimize,
            }),
            Some(ImageFormat::WebP) => Ok(Self::WebP {
                quality: config.quality,
                lossless: config.webp_lossless,
            }),
            Some(other) => Ok(Self::Other(other)),
            None => Err(ScaleError::Encode(format!(
                "unsupported output format: {}",
                source
                    .extension()
                    .map(|ext| ext.to_string_lossy().to_uppercase())
                    .unwrap_or_default()
            ))),
        }
    }

    /// Container di destinazione per il reinserimento dei metadata
    fn container(&self) -> Option<ImageFormat> {
        match self {
            Self::Jpeg { .. } => Some(ImageFormat::Jpeg),
            Self::Png { .. } => Some(ImageFormat::Png),
            Self::WebP { .. } => Some(ImageFormat::WebP),
            Self::Other(_) => None,
        }
    }
}

/// Trasforma singole immagini secondo la configurazione della run
pub struct ImageProcessor;

impl ImageProcessor {
    /// Elabora un task dall'inizio alla fine. Produce sempre un esito:
    /// qualsiasi errore viene catturato e convertito in `Failed`.
    pub fn transform(task: &ImageTask) -> TaskOutcome {
        let config = &task.config;

        let destination = match PathResolver::map(
            &task.source,
            &config.input_dir,
            &config.output_dir,
            config.convert_to_webp,
        ) {
            Ok(destination) => destination,
            Err(e) => return TaskOutcome::failed(task.source.clone(), e.to_string()),
        };

        match Self::process(task, &destination) {
            Ok(()) => TaskOutcome::ok(destination),
            Err(e) => TaskOutcome::failed(destination, e.to_string()),
        }
    }

    fn process(task: &ImageTask, destination: &Path) -> Result<(), ScaleError> {
        let config = &task.config;

        let bytes = std::fs::read(&task.source)?;
        let reader = ImageReader::new(Cursor::new(bytes.as_slice())).with_guessed_format()?;
        let detected = reader.format();
        let mut image = reader.decode()?;

        // L'orientamento va applicato prima del resize, così le dimensioni
        // fisiche corrispondono a quelle percepite
        let mut source_metadata = SourceMetadata::extract(&bytes, detected);
        if let Some(orientation) = source_metadata.orientation() {
            if orientation != 1 {
                image = metadata::apply_orientation(image, orientation);
                source_metadata.clear_orientation();
            }
        }

        let (width, height) = (image.width(), image.height());
        let (new_width, new_height) = Self::scaled_dimensions(width, height, config.percent);
        if (new_width, new_height) != (width, height) {
            image = image.resize_exact(new_width, new_height, FilterType::Lanczos3);
        }

        let format = SaveFormat::resolve(detected, &task.source, config)?;
        let image = Self::coerce_color(image, &format);

        let mut encoded = Self::encode(&image, &format)?;
        if !config.strip_metadata {
            if let Some(container) = format.container() {
                encoded = metadata::embed(encoded, container, &source_metadata)?;
            }
        }

        PathResolver::ensure_parent_dirs(destination)?;
        std::fs::write(destination, encoded)?;
        debug!("Wrote {}", destination.display());

        Ok(())
    }

    /// Nuove dimensioni: `max(1, floor(dim * percent / 100))`
    pub fn scaled_dimensions(width: u32, height: u32, percent: u32) -> (u32, u32) {
        let scale = |dim: u32| ((dim as u64 * percent as u64) / 100).max(1) as u32;
        (scale(width), scale(height))
    }

    /// Coercizione colore: JPEG accetta grayscale o RGB, libwebp solo
    /// RGB/RGBA; tutto il resto viene convertito a RGB
    fn coerce_color(image: DynamicImage, format: &SaveFormat) -> DynamicImage {
        match format {
            SaveFormat::Jpeg { .. } => match image {
                DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image,
                other => DynamicImage::ImageRgb8(other.to_rgb8()),
            },
            SaveFormat::WebP { .. } => match image {
                DynamicImage::ImageRgb8(_) => image,
                other => DynamicImage::ImageRgb8(other.to_rgb8()),
            },
            _ => image,
        }
    }

    fn encode(image: &DynamicImage, format: &SaveFormat) -> Result<Vec<u8>, ScaleError> {
        match format {
            SaveFormat::Jpeg { quality, optimize } => {
                Self::encode_jpeg(image, *quality, *optimize)
            }
            SaveFormat::Png { optimize } => Self::encode_png(image, *optimize),
            SaveFormat::WebP { quality, lossless } => {
                Self::encode_webp(image, *quality, *lossless)
            }
            SaveFormat::Other(fmt) => {
                let mut buf = Cursor::new(Vec::new());
                image.write_to(&mut buf, *fmt)?;
                Ok(buf.into_inner())
            }
        }
    }

    /// JPEG con mozjpeg: encoding progressive sempre attivo,
    /// optimize_coding dal flag
    fn encode_jpeg(
        image: &DynamicImage,
        quality: u8,
        optimize: bool,
    ) -> Result<Vec<u8>, ScaleError> {
        let (width, height) = (image.width(), image.height());

        let fallback;
        let (color_space, data): (mozjpeg::ColorSpace, &[u8]) = match image {
            DynamicImage::ImageLuma8(gray) => {
                (mozjpeg::ColorSpace::JCS_GRAYSCALE, gray.as_raw().as_slice())
            }
            DynamicImage::ImageRgb8(rgb) => {
                (mozjpeg::ColorSpace::JCS_RGB, rgb.as_raw().as_slice())
            }
            other => {
                fallback = other.to_rgb8();
                (mozjpeg::ColorSpace::JCS_RGB, fallback.as_raw().as_slice())
            }
        };

        let mut comp = mozjpeg::Compress::new(color_space);
        comp.set_size(width as usize, height as usize);
        comp.set_quality(quality as f32);
        comp.set_progressive_mode();
        comp.set_optimize_coding(optimize);

        let mut started = comp.start_compress(Vec::new())?;
        started.write_scanlines(data)?;
        Ok(started.finish()?)
    }

    /// PNG: codifica base con `image`, poi ricompressione oxipng quando
    /// richiesta (quality non si applica al PNG)
    fn encode_png(image: &DynamicImage, optimize: bool) -> Result<Vec<u8>, ScaleError> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, ImageFormat::Png)?;
        let bytes = buf.into_inner();

        if !optimize {
            return Ok(bytes);
        }

        oxipng::optimize_from_memory(&bytes, &oxipng::Options::from_preset(2))
            .map_err(|e| ScaleError::Encode(e.to_string()))
    }

    /// WebP con libwebp: method 6 (massimo sforzo di compressione);
    /// quality viene ignorata dal ramo lossless
    fn encode_webp(
        image: &DynamicImage,
        quality: u8,
        lossless: bool,
    ) -> Result<Vec<u8>, ScaleError> {
        let encoder = webp::Encoder::from_image(image)
            .map_err(|e| ScaleError::Encode(format!("WebP input rejected: {e}")))?;

        let mut config = webp::WebPConfig::new()
            .map_err(|_| ScaleError::Encode("WebP config initialization failed".to_string()))?;
        config.lossless = if lossless { 1 } else { 0 };
        config.quality = quality as f32;
        config.method = 6;

        let encoded = encoder
            .encode_advanced(&config)
            .map_err(|e| ScaleError::Encode(format!("WebP encoding failed: {e:?}")))?;
        Ok(encoded.to_vec())
    }
}
