//! Image descriptors and the decoded textures the rasterizer samples.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Longest edge of a decoded texture. Terminal canvases are small; keeping
/// textures bounded keeps sampling cheap.
pub const MAX_TEXTURE_EDGE: u32 = 256;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageItem {
    pub src: String,
    pub alt: String,
}

impl ImageItem {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: String::new(),
        }
    }

    /// Accepts `path` or `path|label`.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('|') {
            Some((src, alt)) => Self {
                src: src.trim().to_string(),
                alt: alt.trim().to_string(),
            },
            None => Self::new(raw.trim()),
        }
    }

    /// Label if set, otherwise the file name of `src`.
    pub fn display_name(&self) -> &str {
        if !self.alt.is_empty() {
            return &self.alt;
        }
        Path::new(&self.src)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.src)
    }
}

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("cannot read image directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Expands CLI arguments into items. Directories contribute their image files
/// in name order; anything else is taken as given.
pub fn collect_items(args: &[String]) -> Result<Vec<ImageItem>, GalleryError> {
    let mut items = Vec::new();
    for raw in args {
        let item = ImageItem::parse(raw);
        let path = Path::new(&item.src);
        if !path.is_dir() {
            items.push(item);
            continue;
        }

        let entries = std::fs::read_dir(path).map_err(|source| GalleryError::ReadDir {
            path: path.to_path_buf(),
            source,
        })?;
        let mut files = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && has_image_extension(p))
            .collect::<Vec<_>>();
        files.sort();
        items.extend(files.iter().map(|p| ImageItem::new(p.to_string_lossy())));
    }
    Ok(items)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

pub fn shuffle_items(items: &mut [ImageItem]) {
    fastrand::shuffle(items);
}

/// Straight-alpha RGBA texture.
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
    pub placeholder: bool,
}

impl Texture {
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }

    /// True when `rgba` holds every pixel of a non-empty `width x height`.
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self
                .width
                .checked_mul(self.height)
                .and_then(|n| n.checked_mul(4))
                .is_some_and(|n| self.rgba.len() >= n)
    }

    /// Nearest-neighbour sample at normalized `(u, v)`; clamps to the edge.
    /// Pixels missing from a short buffer read as transparent.
    pub fn sample(&self, u: f32, v: f32) -> [u8; 4] {
        if self.width == 0 || self.height == 0 {
            return [0, 0, 0, 0];
        }
        let x = ((u.clamp(0.0, 1.0) * self.width as f32) as usize).min(self.width - 1);
        let y = ((v.clamp(0.0, 1.0) * self.height as f32) as usize).min(self.height - 1);
        let i = (y * self.width + x) * 4;
        match self.rgba.get(i..i + 4) {
            Some(p) => [p[0], p[1], p[2], p[3]],
            None => [0, 0, 0, 0],
        }
    }

    /// Checkerboard stand-in for images that failed to load.
    pub fn placeholder(tint: (u8, u8, u8)) -> Self {
        const EDGE: usize = 32;
        const CELL: usize = 8;
        let mut rgba = vec![0u8; EDGE * EDGE * 4];
        for y in 0..EDGE {
            for x in 0..EDGE {
                let i = (y * EDGE + x) * 4;
                let light = ((x / CELL) + (y / CELL)) % 2 == 0;
                let (r, g, b) = if light {
                    tint
                } else {
                    (tint.0 / 3, tint.1 / 3, tint.2 / 3)
                };
                rgba[i] = r;
                rgba[i + 1] = g;
                rgba[i + 2] = b;
                rgba[i + 3] = 255;
            }
        }
        Self {
            width: EDGE,
            height: EDGE,
            rgba,
            placeholder: true,
        }
    }

    pub fn decode(path: &str) -> Result<Self, GalleryError> {
        let img = image::open(path).map_err(|source| GalleryError::Decode {
            path: path.to_string(),
            source,
        })?;
        let img = if img.width() > MAX_TEXTURE_EDGE || img.height() > MAX_TEXTURE_EDGE {
            img.thumbnail(MAX_TEXTURE_EDGE, MAX_TEXTURE_EDGE)
        } else {
            img
        };
        let rgba = img.to_rgba8();
        Ok(Self {
            width: rgba.width() as usize,
            height: rgba.height() as usize,
            rgba: rgba.into_raw(),
            placeholder: false,
        })
    }
}

/// The ordered image list together with one texture per item.
#[derive(Debug, Clone, Default)]
pub struct ImageLibrary {
    items: Vec<ImageItem>,
    textures: Vec<Texture>,
}

impl ImageLibrary {
    /// Decodes every item. Failures are logged and replaced by a placeholder.
    pub fn load(items: Vec<ImageItem>) -> Self {
        let textures = items
            .iter()
            .map(|item| match Texture::decode(&item.src) {
                Ok(t) => t,
                Err(err) => {
                    log::warn!("{err}; using placeholder");
                    Texture::placeholder(placeholder_tint())
                }
            })
            .collect();
        Self { items, textures }
    }

    /// Pairs items with prebuilt textures. Missing or malformed textures are
    /// replaced by placeholders; extra textures are dropped.
    pub fn from_parts(items: Vec<ImageItem>, textures: Vec<Texture>) -> Self {
        if textures.len() != items.len() {
            log::warn!("{} textures for {} items", textures.len(), items.len());
        }
        let mut textures = textures.into_iter();
        let textures = items
            .iter()
            .map(|item| match textures.next() {
                Some(t) if t.is_valid() => t,
                Some(t) => {
                    log::warn!(
                        "{}: {}x{} texture with {} bytes; using placeholder",
                        item.src,
                        t.width,
                        t.height,
                        t.rgba.len()
                    );
                    Texture::placeholder(placeholder_tint())
                }
                None => Texture::placeholder(placeholder_tint()),
            })
            .collect();
        Self { items, textures }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[ImageItem] {
        &self.items
    }

    pub fn texture(&self, index: usize) -> Option<&Texture> {
        self.textures.get(index)
    }

    pub fn placeholder_count(&self) -> usize {
        self.textures.iter().filter(|t| t.placeholder).count()
    }
}

fn placeholder_tint() -> (u8, u8, u8) {
    (
        fastrand::u8(120..=220),
        fastrand::u8(120..=220),
        fastrand::u8(120..=220),
    )
}
