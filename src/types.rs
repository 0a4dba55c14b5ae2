use geo::Point;
use serde::Serialize;
use std::collections::HashMap;

/// One row of the feed, keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    pub fields: HashMap<String, String>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Field value, or `""` when the column is absent.
    pub fn field(&self, field: &str) -> &str {
        self.get(field).unwrap_or("")
    }

    pub fn place(&self) -> &str {
        self.field("Place")
    }

    pub fn county(&self) -> &str {
        self.field("County")
    }

    pub fn category(&self) -> &str {
        self.field("Category")
    }

    pub fn date(&self) -> &str {
        self.field("Date")
    }

    pub fn blog(&self) -> &str {
        self.field("Blog")
    }

    pub fn is_visited(&self) -> bool {
        self.field("Visited").trim().to_lowercase() == "yes"
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// The full feed as loaded once at start-up.
pub type Dataset = Vec<Record>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VocabularyEntry {
    pub value: String,
    // Visited records only
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Badge {
    pub letter: char,
    pub color: &'static str,
    pub html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Label {
    pub text: String,
    pub offset: [i32; 2],
    pub permanent: bool,
    pub interactive: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    #[serde(serialize_with = "serialize_point")]
    pub position: Point<f64>,
    pub place: String,
    pub category: String,
    pub date: String,
    // None when the record has no blog post
    pub blog: Option<String>,
    pub badge: Badge,
    pub popup: String,
    pub label: Option<Label>,
}

// [lat, lon] as Leaflet expects it.
fn serialize_point<S: serde::Serializer>(point: &Point<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    [point.y(), point.x()].serialize(serializer)
}
