//! Error taxonomy surfaced to the article panel.

use thiserror::Error;

/// Failures that can interrupt opening an article.
///
/// All of them are recoverable: the controller reports them inline and stays
/// usable for the next `open`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrowserError {
	/// The article could not be retrieved.
	#[error("Article {id} not found: {reason}")]
	NotFound {
		/// Requested article id.
		id: String,
		/// Transport, status or decode failure.
		reason: String,
	},

	/// The relationship graph could not be retrieved or decoded.
	#[error("Graph data for {id} not available: {reason}")]
	Unavailable {
		/// Article id the graph belongs to.
		id: String,
		/// Transport, status or decode failure.
		reason: String,
	},

	/// The rendering engine could not be constructed.
	#[error("Error rendering graph: {0}")]
	RenderFailure(String),
}

impl BrowserError {
	/// Shorthand for [`BrowserError::NotFound`].
	pub fn not_found(id: &str, reason: impl ToString) -> Self {
		Self::NotFound {
			id: id.to_string(),
			reason: reason.to_string(),
		}
	}

	/// Shorthand for [`BrowserError::Unavailable`].
	pub fn unavailable(id: &str, reason: impl ToString) -> Self {
		Self::Unavailable {
			id: id.to_string(),
			reason: reason.to_string(),
		}
	}
}

/// Result defaulting to [`BrowserError`].
pub type Result<T, E = BrowserError> = std::result::Result<T, E>;
