use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// An article as returned by `/api/article/{id}`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArticleRecord {
	/// Server id, as a string.
	#[serde(deserialize_with = "opt_id")]
	pub id: Option<String>,
	/// Headline.
	pub title: String,
	/// Publisher name.
	pub source: String,
	/// Link to the original article.
	pub url: String,
	/// Publication date as sent.
	pub date: String,
	/// Estimated reading time as sent.
	pub read_time: String,
	/// Body markup, unsanitized.
	pub content: String,
	/// Bias rating as sent.
	pub bias: String,
}

impl ArticleRecord {
	/// Body markup with scripts, handlers and other unsafe content removed.
	pub fn sanitized_content(&self) -> String {
		ammonia::clean(&self.content)
	}
}

/// A graph node as sent by the server.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NodeDescriptor {
	/// Node id, as a string.
	#[serde(deserialize_with = "id")]
	pub id: String,
	/// Display label.
	#[serde(default)]
	pub label: Option<String>,
	/// Category tag, also accepted as `group`.
	#[serde(default, alias = "group")]
	pub category: Option<String>,
	/// Free-form attributes.
	#[serde(default)]
	pub properties: Map<String, Value>,
}

/// A directed relationship between two node ids.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EdgeDescriptor {
	/// Source node id, also accepted as `from`.
	#[serde(alias = "from", deserialize_with = "id")]
	pub source: String,
	/// Target node id, also accepted as `to`.
	#[serde(alias = "to", deserialize_with = "id")]
	pub target: String,
	/// Relationship label.
	#[serde(default)]
	pub label: Option<String>,
}

/// Relationship graph as returned by `/api/graph/{id}`.
///
/// Entries that fail to decode are dropped one by one, so a single malformed
/// node or edge never loses the rest of the graph.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphPayload {
	/// Graph nodes.
	#[serde(deserialize_with = "lenient")]
	pub nodes: Vec<NodeDescriptor>,
	/// Graph edges.
	#[serde(deserialize_with = "lenient")]
	pub edges: Vec<EdgeDescriptor>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
	Text(String),
	Number(serde_json::Number),
}

impl From<RawId> for String {
	fn from(raw: RawId) -> Self {
		match raw {
			RawId::Text(s) => s,
			RawId::Number(n) => n.to_string(),
		}
	}
}

fn id<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
	RawId::deserialize(de).map(String::from)
}

fn lenient<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
	D: Deserializer<'de>,
	T: DeserializeOwned,
{
	let raw = Option::<Vec<Value>>::deserialize(de)?.unwrap_or_default();
	Ok(raw
		.into_iter()
		.filter_map(|value| match serde_json::from_value(value) {
			Ok(item) => Some(item),
			Err(err) => {
				warn!("skipping malformed graph entry: {}", err);
				None
			}
		})
		.collect())
}

fn opt_id<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
	Option::<RawId>::deserialize(de).map(|raw| raw.map(String::from))
}
