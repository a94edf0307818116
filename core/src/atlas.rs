//! Texture loading and lookup
//!
//! A [`TextureAtlas`] maps string names to decoded RGBA textures, loaded
//! from a ZIP archive of PNG files. The widget addresses the atlas through
//! enumerated [`TextureKey`]s; a key whose name is absent from the atlas
//! resolves to a compiled-in default texture instead of failing.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use thiserror::Error;
use zip::ZipArchive;

/// Decoded RGBA texture data
#[derive(Clone, Debug)]
pub struct Texture {
    /// RGBA pixel data (width * height * 4 bytes)
    pub rgba: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Texture {
    /// Create a single-color texture
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let mut rgba = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            rgba.extend_from_slice(&color);
        }
        Self { rgba, width, height }
    }
}

/// Errors during atlas loading
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("failed to open atlas archive {path}")]
    OpenArchive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read atlas archive {path}")]
    ReadArchive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to read atlas entry {name}")]
    ReadEntry {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Resource keys the progress bar looks up at construction time.
///
/// Each key has a fixed atlas name and a built-in default texture, so
/// resolution always succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKey {
    /// Background track (the unfilled portion)
    Track,
    /// Foreground fill indicator
    Fill,
}

impl TextureKey {
    /// Atlas name this key resolves against
    pub fn name(self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::Fill => "fill",
        }
    }

    /// The compiled-in default texture for this key
    pub fn default_texture(self) -> Arc<Texture> {
        let (track, fill) = default_pair();
        match self {
            Self::Track => track.clone(),
            Self::Fill => fill.clone(),
        }
    }
}

// Embed the default texture pair at compile time
static TRACK_PNG: &[u8] = include_bytes!("../assets/track.png");
static FILL_PNG: &[u8] = include_bytes!("../assets/fill.png");

static DEFAULT_TEXTURES: OnceLock<(Arc<Texture>, Arc<Texture>)> = OnceLock::new();

/// Decode the embedded defaults (lazily, once)
fn default_pair() -> &'static (Arc<Texture>, Arc<Texture>) {
    DEFAULT_TEXTURES.get_or_init(|| {
        let track = decode_png(TRACK_PNG).unwrap_or_else(|| Texture::solid(1, 1, [52, 56, 62, 255]));
        let fill = decode_png(FILL_PNG).unwrap_or_else(|| Texture::solid(1, 1, [64, 190, 82, 255]));
        (Arc::new(track), Arc::new(fill))
    })
}

/// A named collection of textures addressable by string key
#[derive(Default, Debug)]
pub struct TextureAtlas {
    textures: HashMap<String, Arc<Texture>>,
}

impl TextureAtlas {
    /// Create an empty atlas
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an atlas from a ZIP archive of PNG files.
    ///
    /// Entries are keyed by file stem (`textures/track.png` becomes
    /// `track`). Entries that fail to decode are skipped with a warning
    /// rather than failing the whole load.
    pub fn load_zip(path: &Path) -> Result<Self, AtlasError> {
        let file = File::open(path).map_err(|source| AtlasError::OpenArchive {
            path: path.to_path_buf(),
            source,
        })?;
        let mut archive =
            ZipArchive::new(BufReader::new(file)).map_err(|source| AtlasError::ReadArchive {
                path: path.to_path_buf(),
                source,
            })?;

        let mut textures = HashMap::new();
        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .map_err(|source| AtlasError::ReadArchive {
                    path: path.to_path_buf(),
                    source,
                })?;
            let entry_name = entry.name().to_string();

            let entry_path = Path::new(&entry_name);
            if entry_path.extension().and_then(|e| e.to_str()) != Some("png") {
                continue;
            }
            let Some(stem) = entry_path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let stem = stem.to_string();

            let mut data = Vec::new();
            entry
                .read_to_end(&mut data)
                .map_err(|source| AtlasError::ReadEntry {
                    name: entry_name.clone(),
                    source,
                })?;

            match decode_png(&data) {
                Some(texture) => {
                    textures.insert(stem, Arc::new(texture));
                }
                None => tracing::warn!(entry = %entry_name, "skipping undecodable atlas texture"),
            }
        }

        tracing::debug!(path = %path.display(), count = textures.len(), "loaded texture atlas");
        Ok(Self { textures })
    }

    /// Insert a texture under a name
    pub fn insert(&mut self, name: impl Into<String>, texture: Arc<Texture>) {
        self.textures.insert(name.into(), texture);
    }

    /// Get a texture by name
    pub fn get(&self, name: &str) -> Option<Arc<Texture>> {
        self.textures.get(name).cloned()
    }

    /// Resolve a key to a texture handle, falling back to the key's
    /// built-in default when the atlas has no entry under its name.
    pub fn resolve(&self, key: TextureKey) -> Arc<Texture> {
        match self.textures.get(key.name()) {
            Some(texture) => texture.clone(),
            None => {
                tracing::warn!(texture = key.name(), "atlas missing texture, using built-in default");
                key.default_texture()
            }
        }
    }

    /// Number of textures in the atlas
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Whether the atlas holds no textures
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// Decode PNG data to an RGBA texture
fn decode_png(data: &[u8]) -> Option<Texture> {
    let decoder = png::Decoder::new(data);
    let mut reader = decoder.read_info().ok()?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).ok()?;

    let pixels = &buf[..info.buffer_size()];
    let rgba: Vec<u8> = match info.color_type {
        png::ColorType::Rgba => pixels.to_vec(),
        png::ColorType::Rgb => pixels.chunks(3).flat_map(|px| [px[0], px[1], px[2], 255]).collect(),
        png::ColorType::GrayscaleAlpha => {
            pixels.chunks(2).flat_map(|px| [px[0], px[0], px[0], px[1]]).collect()
        }
        png::ColorType::Grayscale => pixels.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        // Indexed PNGs would need palette expansion - skip them
        png::ColorType::Indexed => return None,
    };

    Some(Texture {
        rgba,
        width: info.width,
        height: info.height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Encode a solid-color PNG in memory
    fn encode_png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let mut data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut data, width, height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            let pixels: Vec<u8> = (0..width * height).flat_map(|_| color).collect();
            writer.write_image_data(&pixels).unwrap();
        }
        data
    }

    #[test]
    fn test_default_textures_decode() {
        let track = TextureKey::Track.default_texture();
        let fill = TextureKey::Fill.default_texture();
        assert_eq!(track.width, 200);
        assert_eq!(track.height, 20);
        assert_eq!(track.rgba.len(), (track.width * track.height * 4) as usize);
        assert_eq!(fill.rgba.len(), (fill.width * fill.height * 4) as usize);
    }

    #[test]
    fn test_missing_archive_is_an_error() {
        let err = TextureAtlas::load_zip(Path::new("/nonexistent/atlas.zip")).unwrap_err();
        assert!(matches!(err, AtlasError::OpenArchive { .. }));
    }

    #[test]
    fn test_zip_atlas_roundtrip() {
        let path = std::env::temp_dir().join("fillbar-atlas-test.zip");
        {
            let file = File::create(&path).unwrap();
            let mut zip = zip::ZipWriter::new(file);
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            zip.start_file("track.png", options).unwrap();
            zip.write_all(&encode_png(4, 2, [255, 0, 0, 255])).unwrap();
            zip.start_file("notes.txt", options).unwrap();
            zip.write_all(b"not a texture").unwrap();
            zip.finish().unwrap();
        }

        let atlas = TextureAtlas::load_zip(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(atlas.len(), 1);
        let track = atlas.get("track").unwrap();
        assert_eq!((track.width, track.height), (4, 2));
        assert_eq!(&track.rgba[0..4], &[255, 0, 0, 255]);

        // Present key resolves from the atlas, absent key falls back
        assert!(!Arc::ptr_eq(
            &atlas.resolve(TextureKey::Track),
            &TextureKey::Track.default_texture()
        ));
        assert!(Arc::ptr_eq(
            &atlas.resolve(TextureKey::Fill),
            &TextureKey::Fill.default_texture()
        ));
    }

    #[test]
    fn test_empty_atlas_resolves_defaults() {
        let atlas = TextureAtlas::new();
        assert!(atlas.is_empty());
        assert!(Arc::ptr_eq(
            &atlas.resolve(TextureKey::Track),
            &TextureKey::Track.default_texture()
        ));
    }
}
