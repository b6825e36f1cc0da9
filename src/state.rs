use crate::postal::{SearchIndex, SharedIndex};
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

/// Outcome of the most recent reload / 直近の再読み込み結果
#[derive(Debug, Clone, Default)]
struct ReloadOutcome {
    error: Option<String>,
    last_done_time: Option<i64>,
}

/// Index reload progress / インデックス再読み込みの状態
#[derive(Debug, Clone, Default)]
pub struct ReloadProgress {
    pub is_running: bool,
    pub error: Option<String>,
    pub last_done_time: Option<i64>,
}

/// Guards against overlapping reloads / 再読み込みの多重実行を防ぐ
pub struct ReloadState {
    running: AtomicBool,
    outcome: RwLock<ReloadOutcome>,
}

impl ReloadState {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            outcome: RwLock::new(ReloadOutcome::default()),
        }
    }

    /// Claim the reload slot; false when another reload is in flight
    pub fn try_start(&self) -> bool {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }
        self.outcome.write().error = None;
        true
    }

    pub fn finish(&self, error: Option<String>) {
        {
            let mut outcome = self.outcome.write();
            outcome.error = error;
            outcome.last_done_time = Some(chrono::Utc::now().timestamp());
        }
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn get_progress(&self) -> ReloadProgress {
        let outcome = self.outcome.read().clone();
        ReloadProgress {
            is_running: self.is_running(),
            error: outcome.error,
            last_done_time: outcome.last_done_time,
        }
    }
}

impl Default for ReloadState {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared application state / アプリケーション共有状態
pub struct AppState {
    pub index: SharedIndex,
    pub artifact_path: PathBuf,
    pub reload: ReloadState,
}

impl AppState {
    /// Build the startup index from the artifact; missing data gives an empty index
    pub fn load(artifact_path: PathBuf) -> Self {
        let index = SearchIndex::load_or_empty(&artifact_path);
        Self::with_index(index, artifact_path)
    }

    pub fn with_index(index: SearchIndex, artifact_path: PathBuf) -> Self {
        Self {
            index: SharedIndex::new(index),
            artifact_path,
            reload: ReloadState::new(),
        }
    }
}
