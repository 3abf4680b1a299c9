//! # Metadata Module
//!
//! Estrazione e reinserimento dei payload EXIF/ICC e normalizzazione
//! dell'orientamento.
//!
//! I payload vengono letti dal container sorgente (JPEG/PNG/WebP) come byte
//! grezzi e reinseriti tali e quali nell'output, così la policy di
//! conservazione non dipende dal contenuto dei tag. L'unico tag che viene
//! riscritto è Orientation: dopo aver ruotato i pixel il valore conservato
//! deve tornare a 1, altrimenti i viewer applicherebbero la rotazione due
//! volte.

use crate::error::ScaleError;
use image::{DynamicImage, ImageFormat};
use img_parts::jpeg::Jpeg;
use img_parts::png::Png;
use img_parts::webp::WebP;
use img_parts::{Bytes, ImageEXIF, ImageICC};

/// Alcuni container includono l'identificatore APP1 davanti al blocco TIFF
const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Tag TIFF Orientation
const ORIENTATION_TAG: u16 = 0x0112;

/// Payload metadata grezzi estratti dal file sorgente
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceMetadata {
    /// Blocco EXIF in forma TIFF (senza identificatore APP1)
    pub exif: Option<Vec<u8>>,
    /// Profilo colore ICC
    pub icc_profile: Option<Vec<u8>>,
}

impl SourceMetadata {
    /// Estrae EXIF e ICC dal container sorgente, se il formato li supporta.
    /// Un container malformato produce metadata vuoti, mai un errore: la
    /// decodifica pixel resta l'unica autorità sulla validità del file.
    pub fn extract(bytes: &[u8], format: Option<ImageFormat>) -> Self {
        let data = Bytes::copy_from_slice(bytes);
        let (exif, icc_profile) = match format {
            Some(ImageFormat::Jpeg) => match Jpeg::from_bytes(data) {
                Ok(jpeg) => (jpeg.exif(), jpeg.icc_profile()),
                Err(_) => (None, None),
            },
            Some(ImageFormat::Png) => match Png::from_bytes(data) {
                Ok(png) => (png.exif(), png.icc_profile()),
                Err(_) => (None, None),
            },
            Some(ImageFormat::WebP) => match WebP::from_bytes(data) {
                Ok(webp) => (webp.exif(), webp.icc_profile()),
                Err(_) => (None, None),
            },
            _ => (None, None),
        };

        Self {
            exif: exif.map(|b| strip_exif_header(b.to_vec())),
            icc_profile: icc_profile.map(|b| b.to_vec()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exif.is_none() && self.icc_profile.is_none()
    }

    /// Legge il tag Orientation dal payload EXIF (valori validi 1..=8)
    pub fn orientation(&self) -> Option<u32> {
        let raw = self.exif.as_ref()?;
        let parsed = exif::Reader::new().read_raw(raw.clone()).ok()?;
        let field = parsed.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
        field.value.get_uint(0).filter(|v| (1..=8).contains(v))
    }

    /// Riscrive il valore del tag Orientation a 1 direttamente nel buffer
    /// TIFF conservato. Da chiamare dopo aver applicato la rotazione ai
    /// pixel. Buffer non riconosciuti vengono lasciati intatti.
    pub fn clear_orientation(&mut self) {
        let Some(buf) = self.exif.as_mut() else {
            return;
        };
        if buf.len() < 8 {
            return;
        }
        let le = match &buf[0..2] {
            b"II" => true,
            b"MM" => false,
            _ => return,
        };
        let ifd_offset = read_u32(&buf[4..8], le) as usize;
        let mut pos = ifd_offset;
        if pos + 2 > buf.len() {
            return;
        }
        let entries = read_u16(&buf[pos..pos + 2], le) as usize;
        pos += 2;
        for _ in 0..entries {
            if pos + 12 > buf.len() {
                return;
            }
            let tag = read_u16(&buf[pos..pos + 2], le);
            if tag == ORIENTATION_TAG {
                // Valore SHORT inline: i primi due byte del campo value
                let value_offset = pos + 8;
                if value_offset + 2 > buf.len() {
                    return;
                }
                if le {
                    buf[value_offset] = 1;
                    buf[value_offset + 1] = 0;
                } else {
                    buf[value_offset] = 0;
                    buf[value_offset + 1] = 1;
                }
                return;
            }
            pos += 12;
        }
    }
}

/// Applica l'orientamento EXIF ai pixel (2..=8; 1 e valori fuori range
/// lasciano l'immagine invariata)
pub fn apply_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}

/// Reinserisce i payload conservati nel container di destinazione
pub fn embed(
    encoded: Vec<u8>,
    format: ImageFormat,
    metadata: &SourceMetadata,
) -> Result<Vec<u8>, ScaleError> {
    if metadata.is_empty() {
        return Ok(encoded);
    }

    let exif = metadata
        .exif
        .as_ref()
        .map(|b| Bytes::copy_from_slice(b));
    let icc_profile = metadata
        .icc_profile
        .as_ref()
        .map(|b| Bytes::copy_from_slice(b));
    let data = Bytes::from(encoded);

    let out = match format {
        ImageFormat::Jpeg => {
            let mut jpeg =
                Jpeg::from_bytes(data).map_err(|e| ScaleError::Metadata(e.to_string()))?;
            jpeg.set_exif(exif);
            jpeg.set_icc_profile(icc_profile);
            jpeg.encoder().bytes()
        }
        ImageFormat::Png => {
            let mut png =
                Png::from_bytes(data).map_err(|e| ScaleError::Metadata(e.to_string()))?;
            png.set_exif(exif);
            png.set_icc_profile(icc_profile);
            png.encoder().bytes()
        }
        ImageFormat::WebP => {
            let mut webp =
                WebP::from_bytes(data).map_err(|e| ScaleError::Metadata(e.to_string()))?;
            webp.set_exif(exif);
            webp.set_icc_profile(icc_profile);
            webp.encoder().bytes()
        }
        _ => data,
    };

    Ok(out.to_vec())
}

fn strip_exif_header(bytes: Vec<u8>) -> Vec<u8> {
    if bytes.starts_with(EXIF_HEADER) {
        bytes[EXIF_HEADER.len()..].to_vec()
    } else {
        bytes
    }
}

fn read_u16(slice: &[u8], le: bool) -> u16 {
    if le {
        u16::from_le_bytes([slice[0], slice[1]])
    } else {
        u16::from_be_bytes([slice[0], slice[1]])
    }
}

fn read_u32(slice: &[u8], le: bool) -> u32 {
    if le {
        u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]])
    } else {
        u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]])
    }
}

/// Blocco TIFF minimale (little-endian) con il solo tag Orientation
#[cfg(test)]
pub(crate) fn exif_with_orientation(value: u8) -> Vec<u8> {
    vec![
        b'I', b'I', 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00, // header, IFD a offset 8
        0x01, 0x00, // una entry
        0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, value, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, // next IFD
    ]
}
