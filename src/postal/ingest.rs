//! Ingestion normalizer / 取り込み・正規化
//!
//! Turns decoded postal master text into the compact artifact:
//! - rows with fewer than 9 columns are skipped
//! - sentinel town names are blanked together with their kana
//! - duplicate (zip, prefecture, city, town) rows keep the first occurrence
//! - prefecture/city kana go to the shared lookup, first observation wins

use std::collections::HashSet;

use super::csv::parse_csv_line;
use super::store::{PostalArtifact, TownEntry};

/// Line separator of the source file / 元ファイルの改行コード
pub const LINE_SEPARATOR: &str = "\r\n";

/// Minimum column count for a usable row
pub const MIN_COLUMNS: usize = 9;

/// "No town listed below this level" / 町域の記載がない場合
pub const NO_TOWN_SENTINEL: &str = "以下に掲載がない場合";

/// "Address continues directly with a house number" / 番地が直接続く場合
pub const HOUSE_NUMBER_SENTINEL: &str = "の次に番地がくる場合";

const COL_ZIP: usize = 2;
const COL_PREF_KANA: usize = 3;
const COL_CITY_KANA: usize = 4;
const COL_TOWN_KANA: usize = 5;
const COL_PREF: usize = 6;
const COL_CITY: usize = 7;
const COL_TOWN: usize = 8;

/// Ingestion result / 取り込み結果
#[derive(Debug, Clone, Default)]
pub struct IngestOutput {
    pub artifact: PostalArtifact,
    /// Rows that survived dedup
    pub count: usize,
    /// Rows dropped for having too few columns
    pub skipped: usize,
    /// Rows dropped as duplicates
    pub duplicates: usize,
}

/// True when the town column carries a placeholder rather than a real town
pub fn is_sentinel_town(town: &str) -> bool {
    town == NO_TOWN_SENTINEL || town.contains(HOUSE_NUMBER_SENTINEL)
}

/// Run the whole normalization over decoded source text / 全行を正規化
pub fn ingest(text: &str) -> IngestOutput {
    let mut output = IngestOutput::default();
    let mut seen: HashSet<String> = HashSet::new();

    for line in text.split(LINE_SEPARATOR) {
        if line.trim().is_empty() {
            continue;
        }

        let cols = parse_csv_line(line);
        if cols.len() < MIN_COLUMNS {
            output.skipped += 1;
            continue;
        }

        let zip = &cols[COL_ZIP];
        let pref = &cols[COL_PREF];
        let city = &cols[COL_CITY];
        let (town, town_kana) = if is_sentinel_town(&cols[COL_TOWN]) {
            ("", "")
        } else {
            (cols[COL_TOWN].as_str(), cols[COL_TOWN_KANA].as_str())
        };

        let key = format!("{}-{}-{}-{}", zip, pref, city, town);
        if !seen.insert(key) {
            output.duplicates += 1;
            continue;
        }

        let artifact = &mut output.artifact;
        artifact.kana_map.insert_if_absent(pref, cols[COL_PREF_KANA].clone());
        artifact.kana_map.insert_if_absent(city, cols[COL_CITY_KANA].clone());
        artifact
            .grouped_store
            .entry_or_default(pref)
            .entry_or_default(city)
            .push(TownEntry::new(town, town_kana, zip.as_str()));

        output.count += 1;
    }

    tracing::debug!(
        "Ingested {} rows ({} short rows skipped, {} duplicates)",
        output.count,
        output.skipped,
        output.duplicates
    );
    output
}
