//! Mapping of loosely-typed upstream items onto [`ImageResult`].

use crate::classifier::Classifier;
use crate::types::{file_ext, strip_query, ImageResult};

/// Provider-native fields after an adapter has picked them out of its
/// payload. Everything is optional; [`RawImage::normalize`] decides whether
/// the item is usable.
#[derive(Debug, Clone, Default)]
pub struct RawImage {
    pub id: Option<String>,
    pub url: Option<String>,
    pub link: Option<String>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub desc: Option<String>,
    pub width: Option<u64>,
    pub height: Option<u64>,
}

impl RawImage {
    /// `None` when the item has no direct asset URL or no usable identifier.
    pub fn normalize(self, provider_id: &str, classifier: &dyn Classifier) -> Option<ImageResult> {
        let id = non_empty(self.id)?;
        let url = non_empty(self.url).map(|u| strip_query(&u).to_string())?;
        if url.is_empty() {
            return None;
        }

        let width = clamp_dimension(self.width);
        let height = clamp_dimension(self.height);

        Some(ImageResult {
            provider_id: provider_id.to_string(),
            file_name: format!("{}_{}", provider_id, id),
            file_ext: file_ext(&url),
            link: self.link.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            desc: self.desc.unwrap_or_default(),
            url,
            quality: classifier.quality(width, height),
            width,
            height,
            is_landscape: classifier.orientation(width, height),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clamp_dimension(value: Option<u64>) -> u32 {
    value
        .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
        .unwrap_or(0)
}
