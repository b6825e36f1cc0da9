//! In-memory search index / 検索インデックス
//!
//! Built once from the artifact and never mutated. A refresh builds a new
//! index and swaps the whole `Arc` in [`SharedIndex`]; queries hold their own
//! snapshot so they never observe a half-built index.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

use super::codec::load_artifact;
use super::error::ArtifactError;
use super::store::PostalArtifact;

/// One expanded postal row / 郵便番号レコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalRecord {
    pub zip_code: String,
    pub prefecture: String,
    pub city: String,
    pub town: String,
    pub prefecture_kana: String,
    pub city_kana: String,
    pub town_kana: String,
}

/// Flat record list plus exact-zip lookup / レコード一覧と郵便番号の完全一致表
#[derive(Debug, Default)]
pub struct SearchIndex {
    records: Vec<Arc<PostalRecord>>,
    exact_zip: HashMap<String, Vec<Arc<PostalRecord>>>,
}

impl SearchIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Expand the grouped artifact in stored order / 成果物を展開
    pub fn build(artifact: &PostalArtifact) -> Self {
        let mut index = Self::empty();
        let kana_of = |name: &str| artifact.kana_map.get(name).cloned().unwrap_or_default();

        for (prefecture, cities) in artifact.grouped_store.iter() {
            let prefecture_kana = kana_of(prefecture);
            for (city, towns) in cities.iter() {
                let city_kana = kana_of(city);
                for entry in towns {
                    let record = Arc::new(PostalRecord {
                        zip_code: entry.zip_code().to_string(),
                        prefecture: prefecture.to_string(),
                        city: city.to_string(),
                        town: entry.town().to_string(),
                        prefecture_kana: prefecture_kana.clone(),
                        city_kana: city_kana.clone(),
                        town_kana: entry.town_kana().to_string(),
                    });
                    index
                        .exact_zip
                        .entry(record.zip_code.clone())
                        .or_default()
                        .push(Arc::clone(&record));
                    index.records.push(record);
                }
            }
        }
        index
    }

    /// Load the artifact from disk; any failure yields an empty index
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(index) => {
                tracing::info!("Loaded {} postal records from {:?}", index.len(), path);
                index
            }
            Err(ArtifactError::Missing(p)) => {
                tracing::warn!("Postal data not found at {:?}, run `setup` first", p);
                Self::empty()
            }
            Err(e) => {
                tracing::warn!("Failed to load postal data: {}", e);
                Self::empty()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let artifact = load_artifact(path)?;
        Ok(Self::build(&artifact))
    }

    pub fn records(&self) -> &[Arc<PostalRecord>] {
        &self.records
    }

    /// Records sharing one full 7-digit code, in insertion order
    pub fn exact(&self, zip_code: &str) -> Option<&[Arc<PostalRecord>]> {
        self.exact_zip.get(zip_code).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Atomically swappable handle to the current index / 差し替え可能なインデックス
pub struct SharedIndex {
    current: RwLock<Arc<SearchIndex>>,
}

impl SharedIndex {
    pub fn new(index: SearchIndex) -> Self {
        Self {
            current: RwLock::new(Arc::new(index)),
        }
    }

    /// Consistent view for one query; the lock is released immediately
    pub fn snapshot(&self) -> Arc<SearchIndex> {
        Arc::clone(&*self.current.read())
    }

    /// Swap in a freshly built index, returning the previous one
    pub fn replace(&self, index: SearchIndex) -> Arc<SearchIndex> {
        let next = Arc::new(index);
        std::mem::replace(&mut *self.current.write(), next)
    }
}

impl Default for SharedIndex {
    fn default() -> Self {
        Self::new(SearchIndex::empty())
    }
}
