//! Update tags and listener-side tag filters.

use std::collections::{BTreeMap, HashMap};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Tags attached to an emitted update.
///
/// Whatever shape the caller used (one tag, a list, or a map), tags are
/// stored as a map from tag name to flag. Filters match on tag names; the
/// flags are only delivered to listeners.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, bool>);

impl Tags {
    /// Create an empty tag map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `tag` is present and set.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.get(tag).copied().unwrap_or(false)
    }

    /// Whether `tag` is a key of the map, whatever its flag.
    #[must_use]
    pub fn has_key(&self, tag: &str) -> bool {
        self.0.contains_key(tag)
    }

    /// Number of entries, including unset ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(tag, flag)` pairs in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(tag, flag)| (tag.as_str(), *flag))
    }

    /// The map as a JSON object, as appended to listener arguments.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(tag, flag)| (tag.clone(), Value::Bool(*flag)))
                .collect(),
        )
    }
}

impl From<&str> for Tags {
    fn from(tag: &str) -> Self {
        std::iter::once(tag).collect()
    }
}

impl From<String> for Tags {
    fn from(tag: String) -> Self {
        std::iter::once(tag).collect()
    }
}

impl From<Vec<&str>> for Tags {
    fn from(tags: Vec<&str>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<Vec<String>> for Tags {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

impl<const N: usize> From<[&str; N]> for Tags {
    fn from(tags: [&str; N]) -> Self {
        tags.into_iter().collect()
    }
}

impl From<BTreeMap<String, bool>> for Tags {
    fn from(tags: BTreeMap<String, bool>) -> Self {
        Self(tags)
    }
}

impl From<HashMap<String, bool>> for Tags {
    fn from(tags: HashMap<String, bool>) -> Self {
        Self(tags.into_iter().collect())
    }
}

impl<S: Into<String>> FromIterator<S> for Tags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(|tag| (tag.into(), true)).collect())
    }
}

/// A listener's tag filter.
///
/// With `all` unset the listener matches updates carrying at least one of
/// the filter tags; with `all` set every filter tag must be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagFilter {
    tags: Vec<String>,
    all: bool,
}

impl TagFilter {
    /// Match updates carrying any of `tags`.
    pub fn any<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            all: false,
        }
    }

    /// Match updates carrying every one of `tags`.
    pub fn all<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            all: true,
        }
    }

    /// The filter tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Whether every filter tag is required.
    #[must_use]
    pub fn requires_all(&self) -> bool {
        self.all
    }

    /// Decide whether an update carrying `tags` passes the filter.
    #[must_use]
    pub fn matches(&self, tags: Option<&Tags>) -> bool {
        let Some(tags) = tags else {
            return false;
        };

        let present = self.tags.iter().filter(|tag| tags.has_key(tag)).count();
        if self.all {
            present > 0 && present == self.tags.len()
        } else {
            present > 0
        }
    }
}

impl From<&str> for TagFilter {
    fn from(tag: &str) -> Self {
        Self::any([tag])
    }
}

impl From<Vec<&str>> for TagFilter {
    fn from(tags: Vec<&str>) -> Self {
        Self::any(tags)
    }
}

impl From<Vec<String>> for TagFilter {
    fn from(tags: Vec<String>) -> Self {
        Self::any(tags)
    }
}

impl<const N: usize> From<[&str; N]> for TagFilter {
    fn from(tags: [&str; N]) -> Self {
        Self::any(tags)
    }
}

impl<'de> Deserialize<'de> for TagFilter {
    /// Accepts one tag, a list of tags, or `{ tags, all }`. Errors name the
    /// nested field as `filter.<field>`.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(tag) => Ok(Self::any([tag])),
            value @ Value::Array(_) => filter_tags::<D::Error>(value).map(Self::any),
            Value::Object(fields) => {
                let mut tags = None;
                let mut all = false;
                for (key, value) in fields {
                    match key.as_str() {
                        "tags" => tags = Some(filter_tags::<D::Error>(value)?),
                        "all" => {
                            all = value.as_bool().ok_or_else(|| {
                                D::Error::custom(
                                    "invalid type for `filter.all`, expected a boolean",
                                )
                            })?;
                        },
                        other => {
                            return Err(D::Error::custom(format!(
                                "unknown field `filter.{other}`, expected `tags` or `all`"
                            )));
                        },
                    }
                }
                let tags = tags.ok_or_else(|| D::Error::missing_field("filter.tags"))?;
                Ok(Self { tags, all })
            },
            other => Err(D::Error::custom(format!(
                "invalid type for `filter`: {other}, expected a tag, a list of tags or {{ tags, all }}"
            ))),
        }
    }
}

fn filter_tags<E: DeError>(value: Value) -> Result<Vec<String>, E> {
    match value {
        Value::String(tag) => Ok(vec![tag]),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(tag) => Ok(tag),
                other => Err(E::custom(format!(
                    "invalid tag {other} in `filter.tags`, expected a string"
                ))),
            })
            .collect(),
        other => Err(E::custom(format!(
            "invalid type for `filter.tags`: {other}, expected a string or a list of strings"
        ))),
    }
}

/// Accept either a single string or a list of strings.
pub(crate) fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

/// Optional variant of [`one_or_many`].
pub(crate) fn maybe_one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "one_or_many")] Vec<String>);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(values)| values))
}
