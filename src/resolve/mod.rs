//! Image prefetch: every image in the tree is resolved before conversion.

use crate::ast::{Node, Root};
use crate::error::{ResolutionError, Result};
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use tracing::debug;

/// Raw image bytes with their pixel dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub image: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Resolved images keyed by URL.
pub type ImageDataMap = HashMap<String, ImageData>;

/// Fetches the data behind an image URL.
#[async_trait]
pub trait ImageResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> Result<ImageData>;
}

#[async_trait]
impl<F> ImageResolver for F
where
    F: Fn(&str) -> Result<ImageData> + Send + Sync,
{
    async fn resolve(&self, url: &str) -> Result<ImageData> {
        self(url)
    }
}

/// Image URLs in tree order, one entry per occurrence.
pub fn collect_image_urls(root: &Root) -> Vec<&str> {
    let mut urls = Vec::new();
    root.walk(&mut |node| {
        if let Node::Image(image) = node {
            urls.push(image.url.as_str());
        }
    });
    urls
}

/// Resolve every image in the tree concurrently.
///
/// A tree without images never touches the resolver, so `None` is accepted.
/// When a URL occurs more than once, the last resolution wins.
pub async fn resolve_images(
    root: &Root,
    resolver: Option<&dyn ImageResolver>,
) -> Result<ImageDataMap> {
    let urls = collect_image_urls(root);
    if urls.is_empty() {
        return Ok(ImageDataMap::new());
    }

    let resolver = resolver.ok_or(ResolutionError::MissingResolver)?;
    debug!(count = urls.len(), "resolving images");

    let results = join_all(urls.iter().map(|url| resolver.resolve(url))).await;

    let mut images = ImageDataMap::with_capacity(urls.len());
    for (url, result) in urls.into_iter().zip(results) {
        let data = result.map_err(|e| ResolutionError::ImageFetch {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        images.insert(url.to_string(), data);
    }
    Ok(images)
}
