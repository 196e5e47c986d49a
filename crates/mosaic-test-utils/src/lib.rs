//! Testing utilities for the mosaic workspace
//!
//! Canned fetchers, encoded test images and results-page builders.

#![allow(missing_docs)]

use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};
use mosaic_fetch::{FetchError, FetchResponse, Fetcher};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Cursor;
use std::time::Duration;

#[derive(Debug, Clone)]
struct Canned {
    status: u16,
    body: Vec<u8>,
    delay: Duration,
}

/// Fetcher answering from a fixed URL table
///
/// Unknown URLs fail with a transport error. Every request is recorded.
#[derive(Debug, Default)]
pub struct StubFetcher {
    routes: HashMap<String, Canned>,
    requests: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to `url` with `status` and `body`
    #[must_use]
    pub fn route(self, url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.route_delayed(url, status, body, Duration::ZERO)
    }

    /// Respond after `delay`
    #[must_use]
    pub fn route_delayed(
        mut self,
        url: impl Into<String>,
        status: u16,
        body: impl Into<Vec<u8>>,
        delay: Duration,
    ) -> Self {
        self.routes.insert(
            url.into(),
            Canned {
                status,
                body: body.into(),
                delay,
            },
        );
        self
    }

    /// Serve a solid PNG of `shade` at `url`
    #[must_use]
    pub fn image(self, url: impl Into<String>, shade: u8) -> Self {
        self.route(url, 200, solid_png(16, 16, shade))
    }

    /// Serve a solid PNG of `shade` at `url` after `delay`
    #[must_use]
    pub fn image_delayed(self, url: impl Into<String>, shade: u8, delay: Duration) -> Self {
        self.route_delayed(url, 200, solid_png(16, 16, shade), delay)
    }

    /// URLs requested so far, in request order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.requests.lock().push(url.to_string());
        let Some(canned) = self.routes.get(url).cloned() else {
            return Err(FetchError::Transport(format!("no route for {url}")));
        };
        if !canned.delay.is_zero() {
            tokio::time::sleep(canned.delay).await;
        }
        Ok(FetchResponse::new(canned.status, canned.body))
    }
}

/// Encode `image` as PNG bytes
pub fn png_bytes(image: &RgbImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .expect("png encoding");
    buf.into_inner()
}

/// PNG bytes of a single-colour gray image
pub fn solid_png(width: u32, height: u32, shade: u8) -> Vec<u8> {
    png_bytes(&RgbImage::from_pixel(width, height, Rgb([shade, shade, shade])))
}

/// Minimal results page with one `<img>` tag per source
pub fn results_page(sources: &[&str]) -> String {
    let mut html = String::from("<html><body>\n");
    for src in sources {
        html.push_str(&format!("  <div><img class=\"thumb\" src=\"{src}\" alt=\"\"></div>\n"));
    }
    html.push_str("</body></html>\n");
    html
}

/// `n` distinct image URLs under `host`
pub fn image_urls(host: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("http://{host}/img/{i}.png")).collect()
}
