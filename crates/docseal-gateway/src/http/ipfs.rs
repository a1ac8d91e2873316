//! IPFS HTTP API content store.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use docseal_core::ContentId;

use super::{build_client, check_status};
use crate::content::ContentStore;
use crate::error::{GatewayError, Result};

/// Content store backed by an IPFS node's HTTP API.
pub struct IpfsContentStore {
    client: reqwest::Client,
    api_url: String,
}

#[derive(Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

impl IpfsContentStore {
    /// `api_url` is the node's API root, e.g. `http://127.0.0.1:5001`.
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ContentStore for IpfsContentStore {
    async fn put(&self, data: Bytes) -> Result<ContentId> {
        let len = data.len();
        let part = Part::bytes(data.to_vec())
            .file_name("payload")
            .mime_str("application/octet-stream")?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/api/v0/add", self.api_url))
            .query(&[("pin", "true")])
            .multipart(form)
            .send()
            .await?;
        let added: AddResponse = check_status(response).await?.json().await?;

        if added.hash.is_empty() {
            return Err(GatewayError::InvalidResponse("add returned an empty hash".into()));
        }
        tracing::debug!(content_id = %added.hash, bytes = len, "added content to IPFS");
        Ok(ContentId::new(added.hash))
    }

    async fn get(&self, id: &ContentId) -> Result<Bytes> {
        let response = self
            .client
            .post(format!("{}/api/v0/cat", self.api_url))
            .query(&[("arg", id.as_str())])
            .send()
            .await?;
        Ok(check_status(response).await?.bytes().await?)
    }
}
