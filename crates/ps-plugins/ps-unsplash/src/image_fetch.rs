use crate::classify;
use async_trait::async_trait;
use ps_core::error::FetchError;
use ps_core::traits::ImageFetcher;

/// Downloads image payloads over plain HTTP(S).
///
/// Bodies that do not sniff as a known image format are rejected, so a
/// record never ends up holding an error page as its photo.
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await.map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(classify)?;
        if let Err(e) = image::guess_format(&bytes) {
            log::warn!("{url} did not return an image: {e}");
            return Err(FetchError::Decode(format!("{url} is not an image")));
        }
        Ok(bytes.to_vec())
    }
}
