//! Image ingestion
//!
//! An upload moves through four stages, each a distinct type so a stage can
//! only be reached from the one before it:
//!
//! * [`ReceivedUpload`]: filename sanitized, extension allowed, tenant exists.
//! * [`BufferedUpload`]: payload streamed into a quarantined temp file beside
//!   the final asset, capped at `max_bytes`.
//! * [`ValidatedUpload`]: the buffered bytes decode as a supported raster image.
//! * [`IngestResult`]: temp file renamed onto `asset/<filename>`.
//!
//! The quarantine file is an [`AtomicFile`]; every early return drops it, which
//! deletes it, so rejected uploads never leave anything behind.

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageError, ImageFormat, ImageReader};
use log::{info, warn};
use std::fmt;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;

use crate::error::StoreError;
use crate::images::ImagePolicy;
use crate::images::results::IngestResult;
use crate::storage::filesystem::directory_exists;
use crate::storage::{ASSET_DIR, AtomicFile, PathResolver, sanitize_filename};

/// Stage at which an upload currently sits (or was rejected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Received,
    Buffered,
    Validated,
    Promoted,
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IngestStage::Received => "received",
            IngestStage::Buffered => "buffered",
            IngestStage::Validated => "validated",
            IngestStage::Promoted => "promoted",
        };
        f.write_str(name)
    }
}

/// Raster formats the decoder accepts
pub fn is_supported_format(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png | ImageFormat::WebP | ImageFormat::Jpeg | ImageFormat::Gif
    )
}

#[derive(Debug)]
pub struct ReceivedUpload {
    tenant_id: String,
    filename: String,
    target: PathBuf,
}

#[derive(Debug)]
pub struct BufferedUpload {
    tenant_id: String,
    filename: String,
    file: AtomicFile,
    size_bytes: u64,
}

#[derive(Debug)]
pub struct ValidatedUpload {
    tenant_id: String,
    filename: String,
    file: AtomicFile,
    size_bytes: u64,
    format: ImageFormat,
}

impl ReceivedUpload {
    /// Sanitize the client filename and check it against the allowed extensions
    pub fn accept(
        resolver: &PathResolver,
        policy: &ImagePolicy,
        tenant_id: &str,
        raw_filename: &str,
    ) -> Result<Self, StoreError> {
        resolver.validate_tenant_id(tenant_id)?;

        let filename = sanitize_filename(raw_filename);
        if !policy.allows(&filename) {
            return Err(StoreError::UnsupportedType(format!(
                "{} (allowed: {})",
                if filename.is_empty() { raw_filename } else { filename.as_str() },
                policy.extensions().join(", ")
            )));
        }

        if !directory_exists(&resolver.tenant_dir(tenant_id)?) {
            return Err(StoreError::TenantNotFound(tenant_id.to_string()));
        }

        let target = resolver.asset_path(tenant_id, &filename)?;

        Ok(Self {
            tenant_id: tenant_id.to_string(),
            filename,
            target,
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Stream the payload into the quarantine file, aborting past `max_bytes`
    pub fn buffer<R: Read>(self, reader: R, max_bytes: u64) -> Result<BufferedUpload, StoreError> {
        let mut file = AtomicFile::create(&self.target)?;

        // One byte past the cap is enough to detect an oversized payload
        let mut limited = reader.take(max_bytes.saturating_add(1));
        let size_bytes = io::copy(&mut limited, &mut file)?;

        if size_bytes > max_bytes {
            return Err(StoreError::PayloadTooLarge { limit: max_bytes });
        }
        if size_bytes == 0 {
            return Err(StoreError::InvalidImage("empty payload".into()));
        }

        Ok(BufferedUpload {
            tenant_id: self.tenant_id,
            filename: self.filename,
            file,
            size_bytes,
        })
    }
}

impl BufferedUpload {
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Decode the buffered bytes; the extension is never taken as evidence
    pub fn validate(self) -> Result<ValidatedUpload, StoreError> {
        let handle = BufReader::new(self.file.reopen()?);
        let reader = ImageReader::new(handle).with_guessed_format()?;

        let format = reader
            .format()
            .ok_or_else(|| StoreError::InvalidImage("unrecognized image format".into()))?;
        if !is_supported_format(format) {
            return Err(StoreError::InvalidImage(format!(
                "unsupported image format {:?}",
                format
            )));
        }

        // Every frame of an animated GIF must decode, not just the first
        let (width, height) = if format == ImageFormat::Gif {
            let decoder =
                GifDecoder::new(BufReader::new(self.file.reopen()?)).map_err(decode_error)?;
            let frames = decoder.into_frames().collect_frames().map_err(decode_error)?;
            let first = frames
                .first()
                .ok_or_else(|| StoreError::InvalidImage("GIF has no frames".into()))?;
            first.buffer().dimensions()
        } else {
            let decoded = reader.decode().map_err(decode_error)?;
            (decoded.width(), decoded.height())
        };

        info!(
            "Validated {} for store {}: {:?} {}x{}",
            self.filename, self.tenant_id, format, width, height
        );

        Ok(ValidatedUpload {
            tenant_id: self.tenant_id,
            filename: self.filename,
            file: self.file,
            size_bytes: self.size_bytes,
            format,
        })
    }
}

fn decode_error(e: ImageError) -> StoreError {
    StoreError::InvalidImage(format!("failed to decode image: {}", e))
}

impl ValidatedUpload {
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Rename the quarantine file onto `asset/<filename>`, replacing any prior asset
    pub fn promote(self) -> Result<IngestResult, StoreError> {
        let stored_path = self.file.target().to_path_buf();
        self.file.commit()?;

        Ok(IngestResult {
            relative_path: format!("{}/{}/{}", self.tenant_id, ASSET_DIR, self.filename),
            tenant_id: self.tenant_id,
            filename: self.filename,
            stored_path,
            size_bytes: self.size_bytes,
            format: format!("{:?}", self.format).to_ascii_lowercase(),
        })
    }
}

/// Run an upload through every stage
pub fn ingest_image<R: Read>(
    resolver: &PathResolver,
    policy: &ImagePolicy,
    tenant_id: &str,
    filename: &str,
    reader: R,
    max_bytes: u64,
) -> Result<IngestResult, StoreError> {
    let reject = |stage: IngestStage| {
        move |e: &StoreError| {
            warn!(
                "Rejected upload {} for store {} at {} stage: {}",
                filename, tenant_id, stage, e
            )
        }
    };

    let received = ReceivedUpload::accept(resolver, policy, tenant_id, filename)
        .inspect_err(reject(IngestStage::Received))?;
    let buffered = received
        .buffer(reader, max_bytes)
        .inspect_err(reject(IngestStage::Buffered))?;
    let validated = buffered
        .validate()
        .inspect_err(reject(IngestStage::Validated))?;
    let result = validated
        .promote()
        .inspect_err(reject(IngestStage::Promoted))?;

    info!(
        "Image uploaded successfully for store {}: {} ({} bytes)",
        tenant_id, result.filename, result.size_bytes
    );

    Ok(result)
}
