use std::path::Path;

use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::{MetadataOptions, MetadataRevision, StandardTagKey};
use symphonia::core::probe::Hint;

use crate::{DedupError, Result, TagResult};

/// Reads artist and title from one audio file.
///
/// `Ok(None)` means the file parsed but lacks a usable artist or title.
/// An `Err` is always a `DedupError::Extraction` and is recoverable.
pub trait TagReader: Send + Sync {
    fn read_tags(&self, path: &Path) -> Result<Option<TagResult>>;
}

/// Tag reader backed by symphonia's container probe.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaTagReader;

#[derive(Default)]
struct Fields {
    artist: Option<String>,
    title: Option<String>,
}

impl Fields {
    fn absorb(&mut self, revision: &MetadataRevision) {
        for tag in revision.tags() {
            match tag.std_key {
                Some(StandardTagKey::Artist) if self.artist.is_none() => {
                    self.artist = non_blank(tag.value.to_string());
                }
                Some(StandardTagKey::TrackTitle) if self.title.is_none() => {
                    self.title = non_blank(tag.value.to_string());
                }
                _ => {}
            }
        }
    }

    fn into_result(self) -> Option<TagResult> {
        match (self.artist, self.title) {
            (Some(artist), Some(title)) => Some(TagResult { artist, title }),
            _ => None,
        }
    }
}

/// Whitespace-only values count as missing; anything else is kept verbatim
/// apart from the NUL padding some containers (RIFF INFO) leave behind.
fn non_blank(value: String) -> Option<String> {
    let value = value.trim_end_matches('\0');
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl SymphoniaTagReader {
    pub fn new() -> Self {
        Self
    }
}

impl TagReader for SymphoniaTagReader {
    fn read_tags(&self, path: &Path) -> Result<Option<TagResult>> {
        let extraction_error = |reason: String| DedupError::Extraction {
            path: path.to_path_buf(),
            reason,
        };

        let file = std::fs::File::open(path).map_err(|e| extraction_error(e.to_string()))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(extension);
        }

        let mut probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| extraction_error(e.to_string()))?;

        let mut fields = Fields::default();

        // Tags found ahead of the container (ID3v2 on MP3s) live on the probe result.
        if let Some(metadata) = probed.metadata.get() {
            if let Some(revision) = metadata.current() {
                fields.absorb(revision);
            }
        }

        if let Some(revision) = probed.format.metadata().current() {
            fields.absorb(revision);
        }

        Ok(fields.into_result())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn garbage_file_is_an_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.mp3");
        fs::write(&path, b"definitely not an mpeg stream").unwrap();

        let err = SymphoniaTagReader::new().read_tags(&path).unwrap_err();
        assert!(err.is_recoverable());
        match err {
            DedupError::Extraction { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_an_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SymphoniaTagReader::new()
            .read_tags(&dir.path().join("gone.flac"))
            .unwrap_err();
        assert!(matches!(err, DedupError::Extraction { .. }));
    }

    /// Minimal 16-bit mono PCM WAV with a LIST/INFO chunk ahead of the data.
    fn wav_with_info(artist: &str, title: &str) -> Vec<u8> {
        fn chunk(id: &[u8; 4], body: &[u8]) -> Vec<u8> {
            let mut out = Vec::with_capacity(body.len() + 9);
            out.extend_from_slice(id);
            out.extend_from_slice(&(body.len() as u32).to_le_bytes());
            out.extend_from_slice(body);
            if body.len() % 2 == 1 {
                out.push(0);
            }
            out
        }

        let mut fmt = Vec::new();
        fmt.extend_from_slice(&1u16.to_le_bytes()); // PCM
        fmt.extend_from_slice(&1u16.to_le_bytes()); // mono
        fmt.extend_from_slice(&8000u32.to_le_bytes());
        fmt.extend_from_slice(&16000u32.to_le_bytes());
        fmt.extend_from_slice(&2u16.to_le_bytes());
        fmt.extend_from_slice(&16u16.to_le_bytes());

        let mut info = b"INFO".to_vec();
        info.extend(chunk(b"IART", artist.as_bytes()));
        info.extend(chunk(b"INAM", title.as_bytes()));

        let mut body = b"WAVE".to_vec();
        body.extend(chunk(b"fmt ", &fmt));
        body.extend(chunk(b"LIST", &info));
        body.extend(chunk(b"data", &[0u8; 800]));

        chunk(b"RIFF", &body)
    }

    #[test]
    fn reads_artist_and_title_from_wav_info() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teardrop.wav");
        fs::write(&path, wav_with_info("Massive Attack", "Teardrop")).unwrap();

        let tags = SymphoniaTagReader::new().read_tags(&path).unwrap();
        assert_eq!(
            tags,
            Some(TagResult {
                artist: "Massive Attack".into(),
                title: "Teardrop".into()
            })
        );
    }

    #[test]
    fn tagged_wavs_are_grouped_by_tags_not_names() {
        let dir = tempfile::tempdir().unwrap();
        let music = dir.path().join("music");
        fs::create_dir_all(&music).unwrap();
        fs::write(music.join("01.wav"), wav_with_info("Massive Attack", "Teardrop")).unwrap();
        fs::write(music.join("copy.WAV"), wav_with_info("MASSIVE ATTACK", "Teardrop")).unwrap();
        fs::write(music.join("other.wav"), wav_with_info("Massive Attack", "Angels")).unwrap();

        let config = crate::PipelineConfig {
            output: dir.path().join("duplicates.csv"),
            delimiter: ';',
            jobs: 2,
        };
        let outcome = crate::Pipeline::new(config)
            .run(&music, &crate::NoProgress)
            .unwrap();

        let summary = outcome.summary();
        assert_eq!(summary.extraction_failures, 0);
        assert_eq!(summary.groups.len(), 1);
        assert_eq!(summary.groups[0].key, "massive attack - teardrop");
        assert_eq!(summary.groups[0].paths.len(), 2);
    }

    #[test]
    fn blank_values_are_absent() {
        assert_eq!(non_blank("   ".to_string()), None);
        assert_eq!(non_blank("\0\0".to_string()), None);
    }

    #[test]
    fn values_are_not_trimmed() {
        assert_eq!(non_blank(" Daft Punk ".to_string()), Some(" Daft Punk ".to_string()));
        assert_eq!(non_blank("Café\0".to_string()), Some("Café".to_string()));
    }

    #[test]
    fn both_fields_required() {
        let only_artist = Fields {
            artist: Some("Air".into()),
            title: None,
        };
        assert_eq!(only_artist.into_result(), None);

        let both = Fields {
            artist: Some("Air".into()),
            title: Some("La femme d'argent".into()),
        };
        assert_eq!(
            both.into_result(),
            Some(TagResult {
                artist: "Air".into(),
                title: "La femme d'argent".into()
            })
        );
    }
}
