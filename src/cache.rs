//! Per-article memoization of fetched payloads.
//!
//! Entries live for the whole page session: server data for a given id is
//! assumed immutable, so nothing is ever evicted. Failures are not cached, so
//! the next `open` of the same id retries the network.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::api::{ArticleRecord, ArticleSource, GraphPayload};
use crate::error::Result;

/// The two payloads fetched per article.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadKind {
	/// `/api/article/{id}`
	Article,
	/// `/api/graph/{id}`
	Graph,
}

impl fmt::Display for PayloadKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Article => f.write_str("article"),
			Self::Graph => f.write_str("graph"),
		}
	}
}

/// Memoizes successful fetches from an [`ArticleSource`].
pub struct FetchCache<S> {
	source: S,
	articles: RefCell<HashMap<String, Rc<ArticleRecord>>>,
	graphs: RefCell<HashMap<String, Rc<GraphPayload>>>,
}

impl<S: ArticleSource> FetchCache<S> {
	/// An empty cache in front of `source`.
	pub fn new(source: S) -> Self {
		Self {
			source,
			articles: RefCell::default(),
			graphs: RefCell::default(),
		}
	}

	/// The underlying source.
	pub fn source(&self) -> &S {
		&self.source
	}

	pub fn contains(&self, kind: PayloadKind, id: &str) -> bool {
		match kind {
			PayloadKind::Article => self.articles.borrow().contains_key(id),
			PayloadKind::Graph => self.graphs.borrow().contains_key(id),
		}
	}

	pub async fn article(&self, id: &str) -> Result<Rc<ArticleRecord>> {
		if let Some(hit) = self.articles.borrow().get(id) {
			debug!("{} {} served from cache", PayloadKind::Article, id);
			return Ok(hit.clone());
		}
		let fetched = Rc::new(self.source.fetch_article(id).await?);
		// A concurrent fetch of the same id may have landed first; keep the first.
		let mut articles = self.articles.borrow_mut();
		Ok(articles.entry(id.to_string()).or_insert(fetched).clone())
	}

	pub async fn graph(&self, id: &str) -> Result<Rc<GraphPayload>> {
		if let Some(hit) = self.graphs.borrow().get(id) {
			debug!("{} {} served from cache", PayloadKind::Graph, id);
			return Ok(hit.clone());
		}
		let fetched = Rc::new(self.source.fetch_graph(id).await?);
		let mut graphs = self.graphs.borrow_mut();
		Ok(graphs.entry(id.to_string()).or_insert(fetched).clone())
	}
}
