// src/types/analysis.rs
//! Analysis record as produced by the external analysis service.
//!
//! Every field is optional on the wire. Readers degrade instead of failing:
//! a missing map is empty, a non-numeric score is `Score(None)`, a list entry
//! with the wrong shape is skipped.

use serde::de::{DeserializeOwned, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// Key of the course list inside the recommendations mapping
pub const COURSE_RECOMMENDATIONS_KEY: &str = "course_recommendations";

/// String-keyed mapping that keeps the key order of the payload
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace, keeping the position of an existing key
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: DeserializeOwned> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = OrderedMap::new();
        while let Some((key, raw)) = access.next_entry::<String, Value>()? {
            match V::deserialize(raw) {
                Ok(value) => map.insert(key, value),
                Err(e) => tracing::debug!("Skipping entry '{}': {}", key, e),
            }
        }
        Ok(map)
    }

    // Some producers emit `[]` or `null` for an empty mapping
    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        while access.next_element::<serde::de::IgnoredAny>()?.is_some() {}
        Ok(OrderedMap::new())
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(OrderedMap::new())
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(OrderedMap::new())
    }
}

impl<'de, V: DeserializeOwned> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OrderedMapVisitor(PhantomData))
    }
}

/// List that drops elements of the wrong shape; anything but an array reads as empty
#[derive(Debug, Clone, PartialEq)]
pub struct Items<T>(pub Vec<T>);

impl<T> Default for Items<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Items<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: DeserializeOwned> Items<T> {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(elements) => Self(
                elements
                    .into_iter()
                    .filter_map(|element| T::deserialize(element).ok())
                    .collect(),
            ),
            _ => Self::default(),
        }
    }
}

impl<T> From<Vec<T>> for Items<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T: Serialize> Serialize for Items<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for item in &self.0 {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Items<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_value(Value::deserialize(deserializer)?))
    }
}

/// Score in [0, 100]; `None` when absent or not a finite number
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Score(Option<f64>);

impl Score {
    pub fn new(value: f64) -> Self {
        Self(Some(value).filter(|v| v.is_finite()))
    }

    pub fn missing() -> Self {
        Self(None)
    }

    pub fn value(&self) -> Option<f64> {
        self.0
    }

    fn from_json(value: &Value) -> Self {
        Self(value.as_f64().filter(|v| v.is_finite()))
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_json(&Value::deserialize(deserializer)?))
    }
}

/// Accepts strings and numbers as text, everything else as absent
pub(crate) fn lenient_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Accepts a section only when it is an object that reads cleanly
pub(crate) fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BestFit {
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub score: Score,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleFit {
    #[serde(deserialize_with = "lenient_object")]
    pub best_fit: Option<BestFit>,
    pub all_roles: OrderedMap<Score>,
}

/// Per-category entry of `detailed_analysis`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryScore {
    pub score: Score,
}

impl Serialize for CategoryScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("score", &self.score)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let score = match &raw {
            Value::Object(fields) => fields.get("score").map(Score::from_json).unwrap_or_default(),
            other => Score::from_json(other),
        };
        Ok(Self { score })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillRelevance {
    #[serde(deserialize_with = "lenient_text")]
    pub skill: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Course {
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Older payloads name the course `title`
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Course {
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.title.as_deref())
            .filter(|n| !n.trim().is_empty())
    }
}

/// Free-text recommendations per category plus the dedicated course list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recommendations {
    pub categories: OrderedMap<Items<String>>,
    pub courses: Items<Course>,
}

impl Serialize for Recommendations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len() + 1))?;
        for (category, items) in self.categories.iter() {
            map.serialize_entry(category, items)?;
        }
        map.serialize_entry(COURSE_RECOMMENDATIONS_KEY, &self.courses)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Recommendations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = OrderedMap::<Value>::deserialize(deserializer)?;
        let mut recommendations = Recommendations::default();
        for (key, value) in raw.0 {
            if key == COURSE_RECOMMENDATIONS_KEY {
                recommendations.courses = Items::from_value(value);
            } else {
                recommendations
                    .categories
                    .insert(key, Items::from_value(value));
            }
        }
        Ok(recommendations)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalData {
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationSummary {
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    /// Study period as free text, e.g. "2015-2019"
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub years: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
    pub score: Score,
}

/// Full result of analyzing one resume
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisRecord {
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<String>,
    pub base_score: Score,
    #[serde(deserialize_with = "lenient_object")]
    pub role_fit: Option<RoleFit>,
    pub role_matches: OrderedMap<Score>,
    pub detailed_analysis: OrderedMap<CategoryScore>,
    pub industry_relevance: OrderedMap<Items<SkillRelevance>>,
    pub recommendations: Recommendations,
    pub learning_recommendations: Items<Course>,
    pub missing_skills: OrderedMap<Items<String>>,
    #[serde(deserialize_with = "lenient_object")]
    pub personal_data: Option<PersonalData>,
    #[serde(deserialize_with = "lenient_object")]
    pub education: Option<EducationSummary>,
}

impl AnalysisRecord {
    /// Identifier used to re-fetch this record
    pub fn identifier(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or(self.resume_id.as_deref())
            .filter(|id| !id.is_empty())
    }

    /// Role scores to rank: `role_fit.all_roles`, else `role_matches`
    pub fn role_scores(&self) -> &OrderedMap<Score> {
        match &self.role_fit {
            Some(fit) if !fit.all_roles.is_empty() => &fit.all_roles,
            _ => &self.role_matches,
        }
    }
}
