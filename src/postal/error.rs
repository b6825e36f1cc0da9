//! Postal error types / エラー型

use std::path::PathBuf;

use thiserror::Error;

use super::query::{MAX_ZIP_DIGITS, MIN_ADDRESS_CHARS, MIN_ZIP_DIGITS};

/// Persisted artifact could not be produced or read
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact not found: {0}")]
    Missing(PathBuf),

    #[error("artifact I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Query input rejected before any scan / 検索条件の検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("郵便番号は{}桁以上で入力してください", MIN_ZIP_DIGITS)]
    ZipTooShort { digits: usize },

    #[error("郵便番号は{}桁以内で入力してください", MAX_ZIP_DIGITS)]
    ZipTooLong { digits: usize },

    #[error("{}文字以上入力してください", MIN_ADDRESS_CHARS)]
    AddressTooShort { chars: usize },
}
