//! 植物判定パイプライン
//!
//! Idle → Loading → {Success | Failed} の一方向遷移。新しい実行は
//! 必ず前回の状態を捨てて始まる。
//!
//! 状態は実行番号（run）と一緒に watch チャネルで保持する。`reset()` と
//! `start()` は run を進めるので、古い実行の結果が遅れて届いても
//! run が一致しない限り反映されない。

use crate::capture::{CaptureError, CapturedImage};
use crate::classifier::{ClassificationClient, ClassifyError};
use crate::error::{EcopotError, Result};
use ecopot_common::{excluded_keys, normalize_entries, CandidateResult, FieldRecord, DEFAULT_EXCLUDED_KEYS};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// 失敗の種類（利用者向けの文言を分けるための粗い分類）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 正常応答だが候補なし
    NotRecognized,
    /// 通信・パース失敗
    IdentificationFailed,
}

impl FailureKind {
    pub fn message(&self) -> &'static str {
        match self {
            FailureKind::NotRecognized => "Plant not recognized.",
            FailureKind::IdentificationFailed => "Failed to identify plant.",
        }
    }
}

impl From<&ClassifyError> for FailureKind {
    fn from(err: &ClassifyError) -> Self {
        match err {
            ClassifyError::EmptyResult => FailureKind::NotRecognized,
            ClassifyError::Transport(_) | ClassifyError::MalformedResponse(_) => {
                FailureKind::IdentificationFailed
            }
        }
    }
}

/// 判定成功時の表示データ
#[derive(Debug, Clone, PartialEq)]
pub struct Identification {
    pub name: Option<String>,
    pub confidence: f64,
    pub records: Vec<FieldRecord>,
}

impl Identification {
    pub fn from_candidate(candidate: &CandidateResult, excluded: &HashSet<String>) -> Self {
        Self {
            name: candidate.display_name(),
            confidence: candidate.confidence,
            records: normalize_entries(&candidate.attributes, excluded, 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum IdentificationState {
    #[default]
    Idle,
    Loading,
    Success(Identification),
    Failed(FailureKind),
}

impl IdentificationState {
    pub fn is_loading(&self) -> bool {
        matches!(self, IdentificationState::Loading)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, IdentificationState::Success(_) | IdentificationState::Failed(_))
    }
}

/// 状態と実行番号の組
#[derive(Debug, Clone, Default)]
pub struct PipelineSnapshot {
    pub run: u64,
    pub state: IdentificationState,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("判定中のため新しいリクエストを開始できません")]
    Busy,
}

pub struct IdentificationPipeline {
    client: Arc<dyn ClassificationClient>,
    slot: Arc<watch::Sender<PipelineSnapshot>>,
    excluded: Arc<HashSet<String>>,
}

impl IdentificationPipeline {
    pub fn new(client: Arc<dyn ClassificationClient>) -> Self {
        Self::with_excluded_keys(client, DEFAULT_EXCLUDED_KEYS)
    }

    pub fn with_excluded_keys(client: Arc<dyn ClassificationClient>, keys: &[&str]) -> Self {
        let (slot, _) = watch::channel(PipelineSnapshot::default());
        Self {
            client,
            slot: Arc::new(slot),
            excluded: Arc::new(excluded_keys(keys)),
        }
    }

    pub fn state(&self) -> IdentificationState {
        self.slot.borrow().state.clone()
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        self.slot.borrow().clone()
    }

    /// 状態変化の購読
    pub fn subscribe(&self) -> watch::Receiver<PipelineSnapshot> {
        self.slot.subscribe()
    }

    /// 判定を開始する
    ///
    /// Loading中なら `PipelineError::Busy`（状態は変えず、呼び出しもしない）。
    /// 戻り値のハンドルは結果の反映まで完了しない。
    pub fn start(&self, image_base64: impl Into<String>) -> std::result::Result<JoinHandle<()>, PipelineError> {
        let mut run = 0;
        let accepted = self.slot.send_if_modified(|snap| {
            if snap.state.is_loading() {
                return false;
            }
            snap.run += 1;
            snap.state = IdentificationState::Loading;
            run = snap.run;
            true
        });

        if !accepted {
            tracing::debug!("判定中のため start を拒否");
            return Err(PipelineError::Busy);
        }
        tracing::info!(run, "判定開始");

        let image = image_base64.into();
        let client = Arc::clone(&self.client);
        let slot = Arc::clone(&self.slot);
        let excluded = Arc::clone(&self.excluded);

        Ok(tokio::spawn(async move {
            // クライアントのパニックで Loading のまま残らないよう別タスクで呼ぶ
            let call = tokio::spawn(async move { client.classify(&image).await });
            let next = match call.await {
                Ok(outcome) => resolve(outcome, &excluded),
                Err(e) => {
                    tracing::error!(run, error = %e, "判定クライアントが異常終了しました");
                    IdentificationState::Failed(FailureKind::IdentificationFailed)
                }
            };

            let applied = slot.send_if_modified(|snap| {
                if snap.run != run || !snap.state.is_loading() {
                    return false;
                }
                snap.state = next;
                true
            });

            if applied {
                tracing::info!(run, "判定結果を反映");
            } else {
                tracing::debug!(run, "破棄済みの実行結果を無視");
            }
        }))
    }

    /// 判定を開始し、結果の反映を待って状態を返す
    pub async fn identify(&self, image_base64: impl Into<String>) -> std::result::Result<IdentificationState, PipelineError> {
        let handle = self.start(image_base64)?;
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "判定タスクが異常終了しました");
        }
        Ok(self.state())
    }

    /// 画像取得の結果から判定を開始する
    ///
    /// キャンセルは何もせず `Ok(None)`。取得失敗は状態を変えずにエラーを返す。
    pub fn start_from_capture(
        &self,
        captured: std::result::Result<CapturedImage, CaptureError>,
    ) -> Result<Option<JoinHandle<()>>> {
        match captured {
            Ok(image) => Ok(Some(self.start(image.base64)?)),
            Err(CaptureError::Cancelled) => {
                tracing::debug!("画像選択キャンセル");
                Ok(None)
            }
            Err(e) => Err(EcopotError::Capture(e)),
        }
    }

    /// どの状態からでも Idle に戻す（実行中の結果は捨てる）
    pub fn reset(&self) {
        self.slot.send_modify(|snap| {
            snap.run += 1;
            snap.state = IdentificationState::Idle;
        });
        tracing::debug!("判定状態をリセット");
    }
}

/// 判定結果から次の状態を決める（先頭候補のみ採用、並べ替えなし）
fn resolve(
    outcome: std::result::Result<Vec<CandidateResult>, ClassifyError>,
    excluded: &HashSet<String>,
) -> IdentificationState {
    match outcome {
        Ok(candidates) => match candidates.first() {
            Some(best) => IdentificationState::Success(Identification::from_candidate(best, excluded)),
            None => IdentificationState::Failed(FailureKind::NotRecognized),
        },
        Err(e) => {
            tracing::warn!(error = %e, "判定失敗");
            IdentificationState::Failed(FailureKind::from(&e))
        }
    }
}
