//! File collaborator.
//!
//! Files arrive either directly (dropped onto the canvas) or through a
//! dialog request. Each is classified by extension:
//!
//! | Kind | Extensions | Result |
//! |------|------------|--------|
//! | text | `.json .yaml .yml .txt` | contents read to a string |
//! | image | `.jpg .bmp .webp .png .svg` | `file://` URL plus natural size |
//!
//! Anything else is skipped. Results are pushed on `FileSource::stats`.

use crate::stream::Stream;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const TEXT_EXTENSIONS: &[&str] = &["json", "yaml", "yml", "txt"];
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "bmp", "webp", "png", "svg"];

#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("svg {0} has no usable width/height or viewBox")]
    SvgSize(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Image,
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

pub fn classify(path: &Path) -> Option<FileKind> {
    let ext = extension(path)?;
    if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        Some(FileKind::Text)
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(FileKind::Image)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FileStat {
    Text {
        file: PathBuf,
        content: String,
    },
    Image {
        file: PathBuf,
        url: String,
        natural_width: u32,
        natural_height: u32,
    },
}

impl FileStat {
    pub fn file(&self) -> &Path {
        match self {
            FileStat::Text { file, .. } | FileStat::Image { file, .. } => file,
        }
    }
}

/// Ask the host to let the user choose files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogRequest {
    /// Comma-separated extensions (`.png,.svg`) or MIME wildcards
    /// (`image/*`, `text/*`). Empty accepts everything.
    pub accept: Option<String>,
    pub multiple: bool,
}

impl DialogRequest {
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(accept) = self.accept.as_deref().filter(|a| !a.trim().is_empty()) else {
            return true;
        };
        let ext = extension(path);
        accept.split(',').map(str::trim).any(|filter| match filter {
            "image/*" => classify(path) == Some(FileKind::Image),
            "text/*" => classify(path) == Some(FileKind::Text),
            "*" | "*/*" => true,
            f => f
                .strip_prefix('.')
                .is_some_and(|want| ext.as_deref() == Some(&want.to_ascii_lowercase())),
        })
    }
}

/// Host side of a dialog: returns the chosen paths, possibly none.
pub trait FilePicker {
    fn pick(&mut self, request: &DialogRequest) -> Vec<PathBuf>;
}

/// Natural size of an SVG from its root element: `width`/`height`, else
/// the `viewBox` extent.
pub fn svg_size(text: &str) -> Option<(u32, u32)> {
    let attrs = root_attributes(text)?;
    let find = |name: &str| attrs.iter().find(|(n, _)| *n == name).map(|(_, v)| *v);

    let number = |s: &str| -> Option<f64> {
        let s = s.trim().trim_end_matches("px");
        s.parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
    };
    let width = find("width").and_then(number);
    let height = find("height").and_then(number);
    if let (Some(w), Some(h)) = (width, height) {
        return Some((w.round() as u32, h.round() as u32));
    }
    let parts: Vec<f64> = find("viewBox")?
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .filter_map(|p| p.parse().ok())
        .collect();
    match parts.as_slice() {
        [_, _, w, h] if *w > 0.0 && *h > 0.0 => Some((w.round() as u32, h.round() as u32)),
        _ => None,
    }
}

/// Attributes of the first element, if it is `<svg>`. The XML declaration,
/// processing instructions, comments and the doctype before it are skipped.
fn root_attributes(text: &str) -> Option<Vec<(&str, &str)>> {
    let mut rest = text.trim_start_matches('\u{feff}');
    loop {
        rest = rest.trim_start();
        if let Some(body) = rest.strip_prefix("<?") {
            rest = &body[body.find("?>")? + 2..];
        } else if let Some(body) = rest.strip_prefix("<!--") {
            rest = &body[body.find("-->")? + 3..];
        } else if let Some(body) = rest.strip_prefix("<!") {
            rest = &body[body.find('>')? + 1..];
        } else {
            break;
        }
    }
    let mut rest = rest.strip_prefix("<svg")?;
    if !rest.starts_with(|c: char| c.is_whitespace() || c == '>' || c == '/') {
        return None;
    }

    let mut attrs = Vec::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() || rest.starts_with('>') || rest.starts_with('/') {
            return Some(attrs);
        }
        let name_end = rest.find(|c: char| c == '=' || c == '>' || c == '/' || c.is_whitespace())?;
        let name = &rest[..name_end];
        if name.is_empty() {
            return None;
        }
        rest = rest[name_end..].trim_start();
        let Some(value) = rest.strip_prefix('=') else {
            // Valueless attribute.
            continue;
        };
        let value = value.trim_start();
        let quote = value.chars().next().filter(|q| *q == '"' || *q == '\'')?;
        let body = &value[1..];
        let close = body.find(quote)?;
        attrs.push((name, &body[..close]));
        rest = &body[close + 1..];
    }
}

fn file_url(path: &Path) -> String {
    let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let text = absolute.to_string_lossy().replace('\\', "/");
    if text.starts_with('/') {
        format!("file://{text}")
    } else {
        format!("file:///{text}")
    }
}

/// Reads files from the local filesystem.
pub struct FileSource<P> {
    picker: P,
    pub stats: Stream<FileStat>,
}

impl<P: FilePicker> FileSource<P> {
    pub fn new(picker: P) -> Self {
        Self {
            picker,
            stats: Stream::new(),
        }
    }

    /// Read one file. Unsupported extensions yield `Ok(None)`.
    pub fn open(&self, path: &Path) -> Result<Option<FileStat>, FileError> {
        let io = |source| FileError::Io {
            path: path.to_path_buf(),
            source,
        };
        let stat = match classify(path) {
            None => {
                log::debug!("files: skipping {}", path.display());
                return Ok(None);
            }
            Some(FileKind::Text) => FileStat::Text {
                file: path.to_path_buf(),
                content: std::fs::read_to_string(path).map_err(io)?,
            },
            Some(FileKind::Image) => {
                let (natural_width, natural_height) = if extension(path).as_deref() == Some("svg") {
                    let text = std::fs::read_to_string(path).map_err(io)?;
                    svg_size(&text).ok_or_else(|| FileError::SvgSize(path.to_path_buf()))?
                } else {
                    image::image_dimensions(path).map_err(|source| FileError::Image {
                        path: path.to_path_buf(),
                        source,
                    })?
                };
                FileStat::Image {
                    file: path.to_path_buf(),
                    url: file_url(path),
                    natural_width,
                    natural_height,
                }
            }
        };
        log::debug!("files: opened {}", path.display());
        self.stats.emit(stat.clone());
        Ok(Some(stat))
    }

    /// Run a dialog and open what the user picked. Without `multiple`
    /// only the first accepted file is kept.
    pub fn request(&mut self, request: &DialogRequest) -> Result<Vec<FileStat>, FileError> {
        let picked: Vec<PathBuf> = self
            .picker
            .pick(request)
            .into_iter()
            .filter(|path| request.accepts(path))
            .take(if request.multiple { usize::MAX } else { 1 })
            .collect();
        let mut stats = Vec::with_capacity(picked.len());
        for path in picked {
            if let Some(stat) = self.open(&path)? {
                stats.push(stat);
            }
        }
        Ok(stats)
    }
}
