//! Category tags and their display colors.
//!
//! The table is plain data: each category lists the tags it answers to (the
//! server's entity labels plus English aliases) and a fixed color. Anything
//! unrecognised is [`Category::Unknown`], drawn in [`DEFAULT_COLOR`].

/// Color for nodes of unknown category.
pub const DEFAULT_COLOR: &str = "#97c2fc";

/// Entity kind of a graph node, named after its English tag.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
	Article,
	Person,
	Organization,
	Location,
	Time,
	Activity,
	ActivityEvent,
	Event,
	Group,
	Vehicle,
	Product,
	Artwork,
	Document,
	Plant,
	Number,
	Food,
	Drink,
	Institution,
	Symbol,
	FoodDrink,
	Animal,
	Technology,
	Entity,
	/// Any tag not in the table, including a missing one.
	Unknown,
}

struct Entry {
	category: Category,
	tags: &'static [&'static str],
	color: &'static str,
}

const TABLE: &[Entry] = &[
	Entry { category: Category::Article, tags: &["članak", "article"], color: "#ff6b6b" },
	Entry { category: Category::Person, tags: &["osoba", "person"], color: "#4ecdc4" },
	Entry { category: Category::Organization, tags: &["organizacija", "organization"], color: "#45b7d1" },
	Entry { category: Category::Location, tags: &["lokacija", "location"], color: "#96ceb4" },
	Entry { category: Category::Time, tags: &["vreme", "time"], color: "#ffeead" },
	Entry { category: Category::Activity, tags: &["aktivnost", "activity"], color: "#d4a5a5" },
	Entry { category: Category::ActivityEvent, tags: &["aktivnostdogađaj", "activityevent"], color: "#9b59b6" },
	Entry { category: Category::Event, tags: &["događaj", "event"], color: "#e67e22" },
	Entry { category: Category::Group, tags: &["grupa", "group"], color: "#3498db" },
	Entry { category: Category::Vehicle, tags: &["vozilo", "vehicle"], color: "#95a5a6" },
	Entry { category: Category::Product, tags: &["proizvod", "product"], color: "#f1c40f" },
	Entry { category: Category::Artwork, tags: &["umetničko delo", "artwork"], color: "#e84393" },
	Entry { category: Category::Document, tags: &["dokument", "document"], color: "#a29bfe" },
	Entry { category: Category::Plant, tags: &["biljka", "plant"], color: "#2ecc71" },
	Entry { category: Category::Number, tags: &["broj", "number"], color: "#bdc3c7" },
	Entry { category: Category::Food, tags: &["hrana", "food"], color: "#fab1a0" },
	Entry { category: Category::Drink, tags: &["piće", "drink"], color: "#74b9ff" },
	Entry { category: Category::Institution, tags: &["institucija", "institution"], color: "#0984e3" },
	Entry { category: Category::Symbol, tags: &["simbol", "symbol"], color: "#fdcb6e" },
	Entry { category: Category::FoodDrink, tags: &["hranapiće", "fooddrink"], color: "#e17055" },
	Entry { category: Category::Animal, tags: &["životinja", "animal"], color: "#00b894" },
	Entry { category: Category::Technology, tags: &["tehnologija", "technology"], color: "#6c5ce7" },
	Entry { category: Category::Entity, tags: &["entitet", "entity"], color: "#b2bec3" },
];

impl Category {
	/// Looks a tag up case-insensitively; unknown or missing tags map to `Unknown`.
	pub fn from_tag(tag: Option<&str>) -> Self {
		let Some(tag) = tag else {
			return Self::Unknown;
		};
		let tag = tag.trim().to_lowercase();
		TABLE
			.iter()
			.find(|entry| entry.tags.contains(&tag.as_str()))
			.map(|entry| entry.category)
			.unwrap_or(Self::Unknown)
	}

	/// Fill color for nodes of this category.
	pub fn color(self) -> &'static str {
		TABLE
			.iter()
			.find(|entry| entry.category == self)
			.map(|entry| entry.color)
			.unwrap_or(DEFAULT_COLOR)
	}

	/// English name of the category, used in tooltips.
	pub fn name(self) -> &'static str {
		TABLE
			.iter()
			.find(|entry| entry.category == self)
			.and_then(|entry| entry.tags.last().copied())
			.unwrap_or("unknown")
	}
}
