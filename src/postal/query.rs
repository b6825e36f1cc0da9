//! Query engine / 検索処理
//!
//! Pure functions over a fixed [`SearchIndex`]: same index and same input
//! always give the same output. Validation failures come back as data in
//! [`LookupResponse`], never as a propagated error.

use serde::Serialize;

use super::error::QueryError;
use super::index::{PostalRecord, SearchIndex};
use super::kana::to_katakana;

pub const MIN_ZIP_DIGITS: usize = 3;
pub const MAX_ZIP_DIGITS: usize = 7;
pub const MIN_ADDRESS_CHARS: usize = 2;
/// Result cap for prefix and address scans / 最大件数
pub const MAX_RESULTS: usize = 100;

/// Record as returned to callers; kana never leaves the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedRecord {
    pub zip: String,
    pub pref: String,
    pub city: String,
    pub town: String,
}

impl PostalRecord {
    pub fn project(&self) -> ProjectedRecord {
        ProjectedRecord {
            zip: self.zip_code.clone(),
            pref: self.prefecture.clone(),
            city: self.city.clone(),
            town: self.town.clone(),
        }
    }
}

/// Response body for both lookups / 検索レスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupResponse {
    pub results: Vec<ProjectedRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<Vec<ProjectedRecord>, QueryError>> for LookupResponse {
    fn from(result: Result<Vec<ProjectedRecord>, QueryError>) -> Self {
        match result {
            Ok(results) => Self { results, error: None },
            Err(e) => Self {
                results: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }
}

/// Readiness report / データ状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStatus {
    pub ready: bool,
    pub count: usize,
}

/// Keep only ASCII digits: "100-0005" → "1000005"
pub fn normalize_zip(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Zip prefix / exact lookup / 郵便番号 → 住所
pub fn query_by_zip(index: &SearchIndex, raw: &str) -> Result<Vec<ProjectedRecord>, QueryError> {
    let code = normalize_zip(raw);
    let digits = code.len();
    if digits < MIN_ZIP_DIGITS {
        return Err(QueryError::ZipTooShort { digits });
    }
    if digits > MAX_ZIP_DIGITS {
        return Err(QueryError::ZipTooLong { digits });
    }

    if digits == MAX_ZIP_DIGITS {
        if let Some(bucket) = index.exact(&code) {
            return Ok(bucket.iter().map(|r| r.project()).collect());
        }
    }

    Ok(index
        .records()
        .iter()
        .filter(|r| r.zip_code.starts_with(&code))
        .take(MAX_RESULTS)
        .map(|r| r.project())
        .collect())
}

/// Address / kana substring lookup / 住所 → 郵便番号
///
/// Hiragana in the query is folded to katakana for the kana comparison only;
/// the plain address is matched against the query as typed.
pub fn query_by_address(index: &SearchIndex, raw: &str) -> Result<Vec<ProjectedRecord>, QueryError> {
    let q = raw.trim();
    let chars = q.chars().count();
    if chars < MIN_ADDRESS_CHARS {
        return Err(QueryError::AddressTooShort { chars });
    }
    let q_kata = to_katakana(q);

    // Reused across records to avoid an allocation per comparison
    let mut address = String::new();
    let mut address_kana = String::new();

    let mut results = Vec::new();
    for r in index.records() {
        address.clear();
        address.push_str(&r.prefecture);
        address.push_str(&r.city);
        address.push_str(&r.town);

        address_kana.clear();
        address_kana.push_str(&r.prefecture_kana);
        address_kana.push_str(&r.city_kana);
        address_kana.push_str(&r.town_kana);

        if address.contains(q) || address_kana.contains(q_kata.as_str()) {
            results.push(r.project());
            if results.len() == MAX_RESULTS {
                break;
            }
        }
    }
    Ok(results)
}

pub fn lookup_by_zip(index: &SearchIndex, code: &str) -> LookupResponse {
    query_by_zip(index, code).into()
}

pub fn lookup_by_address(index: &SearchIndex, query: &str) -> LookupResponse {
    query_by_address(index, query).into()
}

pub fn status(index: &SearchIndex) -> IndexStatus {
    IndexStatus {
        ready: !index.is_empty(),
        count: index.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postal::ingest::{ingest, tests::row, LINE_SEPARATOR};

    fn index_from_rows(rows: &[String]) -> SearchIndex {
        SearchIndex::build(&ingest(&rows.join(LINE_SEPARATOR)).artifact)
    }

    fn chiyoda() -> SearchIndex {
        index_from_rows(&[
            row("1000005", "トウキョウト", "チヨダク", "マルノウチ", "東京都", "千代田区", "丸の内"),
            row("1000006", "トウキョウト", "チヨダク", "オオテマチ", "東京都", "千代田区", "大手町"),
        ])
    }

    fn zips(results: &[ProjectedRecord]) -> Vec<&str> {
        results.iter().map(|r| r.zip.as_str()).collect()
    }

    #[test]
    fn test_end_to_end_chiyoda() {
        let index = chiyoda();

        let prefix = query_by_zip(&index, "100").unwrap();
        assert_eq!(zips(&prefix), vec!["1000005", "1000006"]);

        let exact = query_by_zip(&index, "1000005").unwrap();
        assert_eq!(
            exact,
            vec![ProjectedRecord {
                zip: "1000005".to_string(),
                pref: "東京都".to_string(),
                city: "千代田区".to_string(),
                town: "丸の内".to_string(),
            }]
        );

        let by_town = query_by_address(&index, "丸の内").unwrap();
        assert_eq!(zips(&by_town), vec!["1000005"]);
    }

    #[test]
    fn test_zip_length_bounds() {
        let index = chiyoda();
        assert_eq!(query_by_zip(&index, "12"), Err(QueryError::ZipTooShort { digits: 2 }));
        assert_eq!(query_by_zip(&index, ""), Err(QueryError::ZipTooShort { digits: 0 }));
        assert_eq!(query_by_zip(&index, "12345678"), Err(QueryError::ZipTooLong { digits: 8 }));
        assert_eq!(query_by_zip(&index, "123"), Ok(Vec::new()));
    }

    #[test]
    fn test_zip_normalization_strips_non_digits() {
        let index = chiyoda();
        assert_eq!(zips(&query_by_zip(&index, "100-0006").unwrap()), vec!["1000006"]);
        assert_eq!(zips(&query_by_zip(&index, " 〒100 ").unwrap()).len(), 2);
        assert_eq!(normalize_zip("a1b2c3"), "123");
    }

    #[test]
    fn test_exact_bucket_returns_all_sharing_towns() {
        let index = index_from_rows(&[
            row("5300001", "オオサカフ", "オオサカシキタク", "ウメダ", "大阪府", "大阪市北区", "梅田"),
            row("5300002", "オオサカフ", "オオサカシキタク", "ソネザキシンチ", "大阪府", "大阪市北区", "曽根崎新地"),
            row("5300001", "オオサカフ", "オオサカシキタク", "カクダチョウ", "大阪府", "大阪市北区", "角田町"),
        ]);
        let results = query_by_zip(&index, "5300001").unwrap();
        let towns: Vec<_> = results.iter().map(|r| r.town.as_str()).collect();
        assert_eq!(towns, vec!["梅田", "角田町"]);
    }

    #[test]
    fn test_unknown_seven_digits_falls_back_to_prefix_scan() {
        let index = chiyoda();
        assert_eq!(query_by_zip(&index, "1000009"), Ok(Vec::new()));
    }

    #[test]
    fn test_prefix_truncated_to_first_hundred() {
        let rows: Vec<String> = (0..150)
            .map(|i| {
                let zip = format!("1{:06}", i);
                let town = format!("町{}", i);
                row(&zip, "トウキョウト", "チヨダク", "チョウ", "東京都", "千代田区", &town)
            })
            .collect();
        let index = index_from_rows(&rows);
        let results = query_by_zip(&index, "100").unwrap();
        assert_eq!(results.len(), MAX_RESULTS);
        assert_eq!(results[0].zip, "1000000");
        assert_eq!(results[99].zip, "1000099");
    }

    #[test]
    fn test_address_kana_asymmetry() {
        let index = index_from_rows(&[
            row("1000001", "トウキョウト", "チヨダク", "トウキョウ", "東京都", "千代田区", "千代田"),
            row("5300001", "オオサカフ", "オオサカシキタク", "ウメダ", "大阪府", "大阪市北区", "梅田"),
        ]);

        assert_eq!(zips(&query_by_address(&index, "とうきょう").unwrap()), vec!["1000001"]);
        assert_eq!(zips(&query_by_address(&index, "トウキョウ").unwrap()), vec!["1000001"]);
        assert_eq!(zips(&query_by_address(&index, "東京").unwrap()), vec!["1000001"]);
        assert_eq!(zips(&query_by_address(&index, "うめだ").unwrap()), vec!["5300001"]);
    }

    #[test]
    fn test_kanji_query_never_matches_kana_fields() {
        // Only the second record spells 東京 in its address; the first carries its reading in kana
        let index = index_from_rows(&[
            row("1000001", "トウキョウト", "チヨダク", "トウキョウ", "北海道", "札幌市", "中央"),
            row("1000002", "ホッカイドウ", "サッポロシ", "チュウオウ", "東京都", "千代田区", "丸の内"),
        ]);
        assert_eq!(zips(&query_by_address(&index, "東京").unwrap()), vec!["1000002"]);
        assert_eq!(zips(&query_by_address(&index, "とうきょう").unwrap()), vec!["1000001"]);
        assert_eq!(zips(&query_by_address(&index, "トウキョウ").unwrap()), vec!["1000001"]);
    }

    #[test]
    fn test_address_matches_across_field_boundaries() {
        let index = chiyoda();
        assert_eq!(zips(&query_by_address(&index, "都千代田").unwrap()).len(), 2);
        assert_eq!(zips(&query_by_address(&index, "ちよだくまる").unwrap()), vec!["1000005"]);
    }

    #[test]
    fn test_address_length_bounds() {
        let index = chiyoda();
        assert_eq!(query_by_address(&index, "a"), Err(QueryError::AddressTooShort { chars: 1 }));
        assert_eq!(query_by_address(&index, "  丸  "), Err(QueryError::AddressTooShort { chars: 1 }));
        assert_eq!(query_by_address(&index, "ab"), Ok(Vec::new()));
        assert_eq!(zips(&query_by_address(&index, "\u{3000}大手\u{3000}").unwrap()), vec!["1000006"]);
    }

    #[test]
    fn test_address_truncated_to_first_hundred() {
        let rows: Vec<String> = (0..120)
            .map(|i| row(&format!("2{:06}", i), "カナガワケン", "ヨコハマシ", "", "神奈川県", "横浜市", &format!("町{}", i)))
            .collect();
        let index = index_from_rows(&rows);
        let results = query_by_address(&index, "横浜").unwrap();
        assert_eq!(results.len(), MAX_RESULTS);
        assert_eq!(results[99].town, "町99");
    }

    #[test]
    fn test_lookup_wraps_errors_as_data() {
        let index = chiyoda();
        let resp = lookup_by_zip(&index, "12");
        assert!(resp.results.is_empty());
        assert_eq!(resp.error.as_deref(), Some("郵便番号は3桁以上で入力してください"));

        let resp = lookup_by_address(&index, "a");
        assert_eq!(resp.error.as_deref(), Some("2文字以上入力してください"));

        let ok = lookup_by_address(&index, "大手町");
        assert!(ok.error.is_none());
        let json = serde_json::to_value(&ok).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["results"][0]["zip"], "1000006");
        assert!(json["results"][0].get("town_kana").is_none());
    }

    #[test]
    fn test_empty_index_status_and_queries() {
        let index = SearchIndex::empty();
        assert_eq!(status(&index), IndexStatus { ready: false, count: 0 });
        assert_eq!(query_by_zip(&index, "100"), Ok(Vec::new()));
        assert_eq!(query_by_address(&index, "東京"), Ok(Vec::new()));
        assert_eq!(status(&chiyoda()), IndexStatus { ready: true, count: 2 });
    }
}
