//! Retrieval of articles and their relationship graphs.

mod types;

pub use types::{ArticleRecord, EdgeDescriptor, GraphPayload, NodeDescriptor};

use log::error;

use crate::config::BrowserConfig;
use crate::error::{BrowserError, Result};

/// Read-only source of article payloads, addressed by article id.
#[allow(async_fn_in_trait)]
pub trait ArticleSource {
	/// Article content and metadata.
	async fn fetch_article(&self, id: &str) -> Result<ArticleRecord>;
	/// Relationship graph of the article.
	async fn fetch_graph(&self, id: &str) -> Result<GraphPayload>;
}

/// Fetches from the article server's JSON endpoints.
pub struct HttpSource {
	client: reqwest::Client,
	config: BrowserConfig,
}

impl HttpSource {
	/// A source for the server named in `config`.
	pub fn new(config: BrowserConfig) -> Self {
		Self {
			client: reqwest::Client::new(),
			config,
		}
	}

	async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, String> {
		let response = self
			.client
			.get(url)
			.send()
			.await
			.map_err(|e| format!("request failed: {}", e))?;
		if !response.status().is_success() {
			return Err(format!("status {}", response.status()));
		}
		response
			.json::<T>()
			.await
			.map_err(|e| format!("invalid response: {}", e))
	}
}

impl ArticleSource for HttpSource {
	async fn fetch_article(&self, id: &str) -> Result<ArticleRecord> {
		let url = self.config.article_url(id);
		self.get(&url).await.map_err(|reason| {
			error!("GET {} failed: {}", url, reason);
			BrowserError::not_found(id, reason)
		})
	}

	async fn fetch_graph(&self, id: &str) -> Result<GraphPayload> {
		let url = self.config.graph_url(id);
		self.get(&url).await.map_err(|reason| {
			error!("GET {} failed: {}", url, reason);
			BrowserError::unavailable(id, reason)
		})
	}
}
