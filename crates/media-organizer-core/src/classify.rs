use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Camera RAW extensions (lowercase, no dot)
const RAW_EXTENSIONS: &[&str] = &[
    "raw", "cr2", "cr3", "nef", "arw", "orf", "rw2", "pef", "srw", "x3f", "dng", "raf", "3fr",
    "fff", "dcr", "kdc", "srf", "mrw", "nrw", "rwl",
];

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v", "3gp", "3g2", "mts", "m2ts", "ts",
    "mxf", "asf", "rm", "rmvb", "vob", "ogv", "drc", "gif", "gifv", "mng", "qt", "yuv", "amv",
    "mp2", "mpe", "mpg", "mpeg", "m2v", "svi", "f4v", "f4p", "f4a", "f4b",
];

// "gif" also appears in VIDEO_EXTENSIONS and classifies as video.
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "ico", "svg", "heic", "heif",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Raw,
    Video,
    Image,
}

impl Category {
    /// Subfolder inside the date folder, `None` for plain images.
    pub fn folder_name(self) -> Option<&'static str> {
        match self {
            Category::Raw => Some("RAW"),
            Category::Video => Some("VIDEO"),
            Category::Image => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Raw => "RAW",
            Category::Video => "VIDEO",
            Category::Image => "date folder",
        }
    }
}

/// The three extension sets a [`Classifier`] matches against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSets {
    pub raw: HashSet<String>,
    pub video: HashSet<String>,
    pub image: HashSet<String>,
}

impl FormatSets {
    pub fn new<R, V, I>(raw: R, video: V, image: I) -> Self
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
        V: IntoIterator,
        V::Item: AsRef<str>,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self {
            raw: normalize_all(raw),
            video: normalize_all(video),
            image: normalize_all(image),
        }
    }
}

impl Default for FormatSets {
    fn default() -> Self {
        Self::new(RAW_EXTENSIONS, VIDEO_EXTENSIONS, IMAGE_EXTENSIONS)
    }
}

fn normalize_all<T>(items: T) -> HashSet<String>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    items.into_iter().map(|e| normalize(e.as_ref())).collect()
}

fn normalize(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}

/// Maps file extensions to a [`Category`].
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    sets: FormatSets,
}

impl Classifier {
    pub fn new(sets: FormatSets) -> Self {
        Self { sets }
    }

    pub fn sets(&self) -> &FormatSets {
        &self.sets
    }

    /// Classify an extension. Priority is raw, then video, then image.
    pub fn classify(&self, ext: &str) -> Option<Category> {
        let ext = normalize(ext);
        if self.sets.raw.contains(&ext) {
            Some(Category::Raw)
        } else if self.sets.video.contains(&ext) {
            Some(Category::Video)
        } else if self.sets.image.contains(&ext) {
            Some(Category::Image)
        } else {
            None
        }
    }

    pub fn classify_path(&self, path: &Path) -> Option<Category> {
        let ext = path.extension()?.to_str()?;
        self.classify(ext)
    }
}
