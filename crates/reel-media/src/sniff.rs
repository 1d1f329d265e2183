//! Content sniffing for fetched assets.
//!
//! Remote hosts happily answer with a login page or an error document and a
//! 200 status. The first bytes of every asset are checked against known
//! container signatures before the file is handed to the encoder.

use reel_models::{MediaAsset, MediaKind};
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Bytes read from the head of a file for sniffing.
const SNIFF_LEN: usize = 512;

const MPEG_TS_PACKET: usize = 188;

/// Container detected from leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    Id3,
    MpegAudio,
    IsoBmff,
    Wave,
    Ogg,
    Flac,
    Matroska,
    MpegTs,
}

impl Signature {
    pub fn name(&self) -> &'static str {
        match self {
            Signature::Id3 => "mp3 (id3)",
            Signature::MpegAudio => "mpeg audio",
            Signature::IsoBmff => "iso-bmff",
            Signature::Wave => "wav",
            Signature::Ogg => "ogg",
            Signature::Flac => "flac",
            Signature::Matroska => "matroska/webm",
            Signature::MpegTs => "mpeg-ts",
        }
    }

    fn accepted_for(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Audio => matches!(
                self,
                Signature::Id3
                    | Signature::MpegAudio
                    | Signature::IsoBmff
                    | Signature::Wave
                    | Signature::Ogg
                    | Signature::Flac
            ),
            MediaKind::Video => matches!(
                self,
                Signature::IsoBmff | Signature::Matroska | Signature::MpegTs
            ),
        }
    }
}

/// Identify a container from the first bytes of a file.
pub fn detect(head: &[u8]) -> Option<Signature> {
    if head.starts_with(b"ID3") {
        return Some(Signature::Id3);
    }
    if head.len() >= 8 && &head[4..8] == b"ftyp" {
        return Some(Signature::IsoBmff);
    }
    if head.len() >= 12 && head.starts_with(b"RIFF") && &head[8..12] == b"WAVE" {
        return Some(Signature::Wave);
    }
    if head.starts_with(b"OggS") {
        return Some(Signature::Ogg);
    }
    if head.starts_with(b"fLaC") {
        return Some(Signature::Flac);
    }
    if head.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return Some(Signature::Matroska);
    }
    if head.first() == Some(&0x47) && head.get(MPEG_TS_PACKET).map_or(true, |b| *b == 0x47) {
        return Some(Signature::MpegTs);
    }
    // 11-bit frame sync (MP3 and ADTS AAC)
    if head.len() >= 2 && head[0] == 0xFF && head[1] & 0xE0 == 0xE0 {
        return Some(Signature::MpegAudio);
    }
    None
}

/// Name the kind of text document a failed download returned, if any.
fn describe_text_payload(head: &[u8]) -> Option<&'static str> {
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start().to_ascii_lowercase();
    if text.starts_with("<!doctype html") || text.starts_with("<html") || text.starts_with("<head") {
        Some("an HTML page")
    } else if text.starts_with("<?xml") {
        Some("an XML document")
    } else if text.starts_with('{') || text.starts_with('[') {
        Some("a JSON document")
    } else {
        None
    }
}

/// Check a fetched asset's size and signature; returns the verified asset.
///
/// Files smaller than `min_bytes` are rejected even when the signature looks
/// plausible.
pub async fn verify_asset(asset: MediaAsset, min_bytes: u64) -> MediaResult<MediaAsset> {
    let path = asset.local_path().to_path_buf();
    let on_disk = tokio::fs::metadata(&path)
        .await
        .map_err(|e| MediaError::verification_failed(&path, format!("cannot stat file: {e}")))?
        .len();

    if on_disk < min_bytes {
        return Err(MediaError::verification_failed(
            &path,
            format!("{on_disk} bytes is below the {min_bytes} byte minimum for {}", asset.kind()),
        ));
    }

    let mut head = Vec::with_capacity(SNIFF_LEN);
    let file = tokio::fs::File::open(&path).await?;
    file.take(SNIFF_LEN as u64).read_to_end(&mut head).await?;

    match detect(&head) {
        Some(signature) if signature.accepted_for(asset.kind()) => {
            debug!(
                path = %path.display(),
                format = signature.name(),
                bytes = on_disk,
                "asset verified"
            );
            Ok(asset.with_byte_size(on_disk).into_verified())
        }
        Some(signature) => Err(MediaError::verification_failed(
            &path,
            format!("{} container is not usable as {}", signature.name(), asset.kind()),
        )),
        None => {
            let message = match describe_text_payload(&head) {
                Some(doc) => format!("expected {} but received {doc}", asset.kind()),
                None => format!("unrecognized {} signature", asset.kind()),
            };
            Err(MediaError::verification_failed(&path, message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn mp4_head() -> Vec<u8> {
        let mut bytes = vec![0x00, 0x00, 0x00, 0x20];
        bytes.extend_from_slice(b"ftypisom");
        bytes
    }

    #[test]
    fn test_detect_signatures() {
        assert_eq!(detect(b"ID3\x04\x00"), Some(Signature::Id3));
        assert_eq!(detect(&[0xFF, 0xFB, 0x90, 0x64]), Some(Signature::MpegAudio));
        assert_eq!(detect(&mp4_head()), Some(Signature::IsoBmff));
        assert_eq!(detect(b"RIFF\x24\x00\x00\x00WAVEfmt "), Some(Signature::Wave));
        assert_eq!(detect(&[0x1A, 0x45, 0xDF, 0xA3, 0x01]), Some(Signature::Matroska));
        assert_eq!(detect(b"<!DOCTYPE html>"), None);
    }

    #[test]
    fn test_kind_acceptance() {
        assert!(Signature::Id3.accepted_for(MediaKind::Audio));
        assert!(!Signature::Id3.accepted_for(MediaKind::Video));
        assert!(Signature::IsoBmff.accepted_for(MediaKind::Video));
        assert!(Signature::IsoBmff.accepted_for(MediaKind::Audio));
    }

    async fn asset_with(dir: &TempDir, kind: MediaKind, bytes: &[u8]) -> MediaAsset {
        let path = dir.path().join("asset.bin");
        tokio::fs::write(&path, bytes).await.unwrap();
        MediaAsset::new(kind, "https://x.test/asset", path).with_byte_size(bytes.len() as u64)
    }

    #[tokio::test]
    async fn test_verify_accepts_mp3() {
        let dir = TempDir::new().unwrap();
        let mut bytes = b"ID3\x04\x00\x00\x00\x00\x00\x00".to_vec();
        bytes.resize(4096, 0);
        let asset = asset_with(&dir, MediaKind::Audio, &bytes).await;

        let verified = verify_asset(asset, 1024).await.unwrap();
        assert!(verified.is_verified());
        assert_eq!(verified.byte_size(), 4096);
    }

    #[tokio::test]
    async fn test_verify_names_html_payload() {
        let dir = TempDir::new().unwrap();
        let mut bytes = b"<!DOCTYPE html><html><body>Sign in</body></html>".to_vec();
        bytes.resize(32 * 1024, b' ');
        let asset = asset_with(&dir, MediaKind::Video, &bytes).await;

        let err = verify_asset(asset, 16 * 1024).await.unwrap_err();
        assert_eq!(err.code(), "verification_error");
        assert!(err.to_string().contains("HTML page"));
    }

    #[tokio::test]
    async fn test_verify_rejects_small_file_with_valid_signature() {
        let dir = TempDir::new().unwrap();
        let asset = asset_with(&dir, MediaKind::Video, &mp4_head()).await;

        let err = verify_asset(asset, 16 * 1024).await.unwrap_err();
        assert!(matches!(err, MediaError::VerificationFailed { .. }));
    }
}
