// SPDX-License-Identifier: MIT
//
// Avatars over HTTP.
//
// Fetch with a blocking client, decode with `image`, shrink to fit the
// requested bound without ever enlarging, hand back straight-alpha RGBA.

use std::time::Duration;

use anyhow::{Context, Result};
use image::imageops::FilterType;
use kiosk_feed::bitmap::fit_within;
use kiosk_feed::{Bitmap, BoxError, ImageSource};
use reqwest::blocking::Client;
use tracing::debug;

const TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpImages {
    client: Client,
}

impl HttpImages {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(TIMEOUT)
            .build()
            .context("build image HTTP client")?;
        Ok(Self { client })
    }
}

impl ImageSource for HttpImages {
    fn thumbnail(&self, url: &str, max_width: u32, max_height: u32) -> Result<Bitmap, BoxError> {
        let bytes = self.client.get(url).send()?.error_for_status()?.bytes()?;
        debug!(url, bytes = bytes.len(), "fetched image");
        thumbnail(&bytes, max_width, max_height)
    }
}

/// Decode `bytes` and scale to fit within `max_width` x `max_height`.
pub fn thumbnail(bytes: &[u8], max_width: u32, max_height: u32) -> Result<Bitmap, BoxError> {
    let image = image::load_from_memory(bytes)?;
    let (width, height) = fit_within(image.width(), image.height(), max_width, max_height);
    let image = if (width, height) == (image.width(), image.height()) {
        image
    } else {
        image.resize_exact(width, height, FilterType::CatmullRom)
    };
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    Bitmap::from_rgba(width, height, rgba.into_raw())
        .ok_or_else(|| BoxError::from("decoded image buffer does not match its size"))
}
