//! Structured payload of the Cloudinary video custom element.
//!
//! The custom element stores a JSON array of selected assets as a string. Only
//! the first asset is used. A payload that does not parse falls back to "no
//! value" unless the raw string is itself a URL.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

pub const DEFAULT_VIDEO_WIDTH: &str = "100%";
pub const DEFAULT_VIDEO_HEIGHT: &str = "590";
const DEFAULT_TITLE: &str = "Cloudinary Video";
const CLOUDINARY_HOST: &str = "res.cloudinary.com/";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct RawVideo {
    title: Option<String>,
    alt: Option<String>,
    width: Option<Value>,
    height: Option<Value>,
    autoplay: Option<bool>,
    mute: Option<bool>,
    #[serde(rename = "loop")]
    looped: Option<bool>,
    secure_url: Option<String>,
    url: Option<String>,
    public_id: Option<String>,
    caption: Option<String>,
}

/// A video selected through the Cloudinary custom element.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudinaryVideo {
    pub title: String,
    pub width: String,
    pub height: String,
    pub autoplay: Option<bool>,
    pub mute: Option<bool>,
    pub looped: Option<bool>,
    pub secure_url: Option<String>,
    pub url: Option<String>,
    pub public_id: Option<String>,
    pub caption: Option<String>,
    /// The raw value, kept when it is a bare URL rather than JSON.
    direct_url: Option<String>,
}

/// Resolved playback flags for a rendered video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playback {
    pub autoplay: bool,
    pub mute: bool,
    pub looped: bool,
}

impl CloudinaryVideo {
    /// Parses the raw custom element value.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => {
                let first = match value {
                    Value::Array(mut entries) if !entries.is_empty() => entries.swap_remove(0),
                    Value::Object(_) => value,
                    _ => return Self::direct(trimmed),
                };
                match serde_json::from_value::<RawVideo>(first) {
                    Ok(raw_video) => Some(Self::from_raw(raw_video)),
                    Err(e) => {
                        warn!("Failed to parse Cloudinary video data: {}", e);
                        Self::direct(trimmed)
                    }
                }
            }
            Err(e) => {
                warn!("Failed to parse Cloudinary video data: {}", e);
                Self::direct(trimmed)
            }
        }
    }

    fn direct(raw: &str) -> Option<Self> {
        raw.starts_with("http").then(|| Self {
            direct_url: Some(raw.to_string()),
            ..Self::from_raw(RawVideo::default())
        })
    }

    fn from_raw(raw: RawVideo) -> Self {
        Self {
            title: raw
                .title
                .or(raw.alt)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            width: dimension(raw.width).unwrap_or_else(|| DEFAULT_VIDEO_WIDTH.to_string()),
            height: dimension(raw.height).unwrap_or_else(|| DEFAULT_VIDEO_HEIGHT.to_string()),
            autoplay: raw.autoplay,
            mute: raw.mute,
            looped: raw.looped,
            secure_url: raw.secure_url.filter(|u| !u.is_empty()),
            url: raw.url.filter(|u| !u.is_empty()),
            public_id: raw.public_id.filter(|p| !p.is_empty()),
            caption: raw.caption.filter(|c| !c.is_empty()),
            direct_url: None,
        }
    }

    /// Resolves playback flags. An explicit caller choice wins over the
    /// payload; absent flags are off, except that autoplaying video is muted.
    pub fn playback(&self, autoplay_override: Option<bool>) -> Playback {
        let autoplay = autoplay_override.or(self.autoplay).unwrap_or(false);
        Playback {
            autoplay,
            mute: self.mute.unwrap_or(autoplay),
            looped: self.looped.unwrap_or(false),
        }
    }

    /// The URL to play, in order of preference: secure URL, plain URL, a URL
    /// built from the public id, or the raw value when it was a bare URL.
    pub fn source_url(&self, playback: Playback, fallback_cloud: Option<&str>) -> Option<String> {
        if let Some(url) = self.secure_url.as_ref().or(self.url.as_ref()) {
            return Some(url.clone());
        }

        if let Some(public_id) = &self.public_id {
            let cloud = self
                .url
                .as_deref()
                .and_then(cloud_name)
                .or(fallback_cloud.filter(|c| !c.is_empty()));
            if let Some(cloud) = cloud {
                let mut transformations = Vec::new();
                if is_pixels(&self.width) {
                    transformations.push(format!("w_{}", self.width));
                }
                if is_pixels(&self.height) {
                    transformations.push(format!("h_{}", self.height));
                }
                if playback.autoplay {
                    transformations.push("so_auto".to_string());
                }
                if playback.mute {
                    transformations.push("so_mute".to_string());
                }
                if playback.looped {
                    transformations.push("so_loop".to_string());
                }
                let transform = if transformations.is_empty() {
                    String::new()
                } else {
                    format!("{}/", transformations.join(","))
                };
                return Some(format!(
                    "https://res.cloudinary.com/{cloud}/video/upload/{transform}{public_id}"
                ));
            }
        }

        self.direct_url.clone()
    }
}

fn dimension(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

fn is_pixels(dimension: &str) -> bool {
    !dimension.is_empty() && dimension.chars().all(|c| c.is_ascii_digit())
}

fn cloud_name(url: &str) -> Option<&str> {
    let start = url.find(CLOUDINARY_HOST)? + CLOUDINARY_HOST.len();
    let rest = &url[start..];
    let name = rest.split('/').next()?;
    (!name.is_empty()).then_some(name)
}
