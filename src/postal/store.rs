//! Compact grouped store / 郵便データの圧縮ストア
//!
//! The persisted shape of the postal master: towns nested under city under
//! prefecture, plus one shared kana lookup for prefecture and city names.
//! Every level keeps insertion order, which later decides query result order.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Insertion-ordered string-keyed map / 挿入順を保持するマップ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
    positions: HashMap<String, usize>,
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.positions.get(key).map(|&i| &self.entries[i].1)
    }

    /// Insert only if absent; returns true when the value was stored / 未登録時のみ追加
    pub fn insert_if_absent(&mut self, key: &str, value: V) -> bool {
        if self.positions.contains_key(key) {
            return false;
        }
        self.push_new(key.to_string(), value);
        true
    }

    /// Insert or overwrite, keeping the original position of an existing key
    pub fn insert(&mut self, key: String, value: V) {
        match self.positions.get(&key) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.push_new(key, value);
            }
        }
    }

    /// Mutable access, creating a default entry at the end on first use
    pub fn entry_or_default(&mut self, key: &str) -> &mut V
    where
        V: Default,
    {
        let index = match self.positions.get(key) {
            Some(&i) => i,
            None => self.push_new(key.to_string(), V::default()),
        };
        &mut self.entries[index].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    fn push_new(&mut self, key: String, value: V) -> usize {
        let index = self.entries.len();
        self.positions.insert(key.clone(), index);
        self.entries.push((key, value));
        index
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map with string keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = OrderedMap::new();
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

/// One town row under a city, persisted as `[town, townKana, zipCode]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownEntry(pub String, pub String, pub String);

impl TownEntry {
    pub fn new(town: impl Into<String>, town_kana: impl Into<String>, zip_code: impl Into<String>) -> Self {
        Self(town.into(), town_kana.into(), zip_code.into())
    }

    pub fn town(&self) -> &str {
        &self.0
    }

    pub fn town_kana(&self) -> &str {
        &self.1
    }

    pub fn zip_code(&self) -> &str {
        &self.2
    }
}

/// Name → first-observed kana reading / 地名 → 最初に出現した読み仮名
pub type KanaMap = OrderedMap<String>;

/// Prefecture → city → towns in file order / 都道府県 → 市区町村 → 町域
pub type GroupedStore = OrderedMap<OrderedMap<Vec<TownEntry>>>;

/// The single persisted artifact / 永続化される成果物
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalArtifact {
    pub kana_map: KanaMap,
    pub grouped_store: GroupedStore,
}
