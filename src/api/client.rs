use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::remote::RemoteApi;
use crate::config::ApiConfig;

/// reqwest-backed client for the scheduling API
#[derive(Clone)]
pub struct HttpRemote {
  client: Client,
  base_url: Url,
}

impl HttpRemote {
  pub fn new(config: &ApiConfig) -> Result<Self> {
    let base_url = Url::parse(&config.url)
      .map_err(|e| eyre!("Invalid API URL '{}': {}", config.url, e))?;
    if base_url.cannot_be_a_base() {
      return Err(eyre!("API URL cannot be used as a base: {}", config.url));
    }

    let mut builder = Client::builder();
    if let Some(secs) = config.timeout_secs {
      builder = builder.timeout(std::time::Duration::from_secs(secs));
    }
    let client = builder
      .build()
      .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

    Ok(Self { client, base_url })
  }

  /// Join percent-encoded path segments onto the base URL
  fn url_for(&self, segments: &[&str]) -> Result<Url> {
    let mut url = self.base_url.clone();
    {
      let mut path = url
        .path_segments_mut()
        .map_err(|_| eyre!("API URL cannot be used as a base: {}", self.base_url))?;
      path.pop_if_empty().extend(segments);
    }
    Ok(url)
  }

  /// Send a request and turn non-2xx statuses into errors
  async fn send(&self, method: &str, url: &Url, request: RequestBuilder) -> Result<Response> {
    debug!("{} {}", method, url);

    let response = request
      .send()
      .await
      .map_err(|e| eyre!("{} {} failed: {}", method, url, e))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(eyre!("{} {} returned {}: {}", method, url, status, body));
    }

    Ok(response)
  }

  /// Parse a JSON body, treating an empty body as null
  async fn json_body(method: &str, url: &Url, response: Response) -> Result<Value> {
    let text = response
      .text()
      .await
      .map_err(|e| eyre!("Failed to read {} {} response: {}", method, url, e))?;
    if text.trim().is_empty() {
      return Ok(Value::Null);
    }
    serde_json::from_str(&text)
      .map_err(|e| eyre!("Failed to parse {} {} response: {}", method, url, e))
  }
}

#[async_trait]
impl RemoteApi for HttpRemote {
  async fn ping(&self) -> Result<()> {
    let url = self.url_for(&["test"])?;
    self.send("GET", &url, self.client.get(url.clone())).await?;
    Ok(())
  }

  async fn get(&self, path: &[&str]) -> Result<Value> {
    let url = self.url_for(path)?;
    let response = self.send("GET", &url, self.client.get(url.clone())).await?;
    Self::json_body("GET", &url, response).await
  }

  async fn post(&self, path: &[&str], body: Value) -> Result<Value> {
    let url = self.url_for(path)?;
    let request = self.client.post(url.clone()).json(&body);
    let response = self.send("POST", &url, request).await?;
    Self::json_body("POST", &url, response).await
  }

  async fn put(&self, path: &[&str], body: Value) -> Result<Value> {
    let url = self.url_for(path)?;
    let request = self.client.put(url.clone()).json(&body);
    let response = self.send("PUT", &url, request).await?;
    Self::json_body("PUT", &url, response).await
  }

  async fn delete(&self, path: &[&str]) -> Result<()> {
    let url = self.url_for(path)?;
    self
      .send("DELETE", &url, self.client.delete(url.clone()))
      .await?;
    Ok(())
  }
}
