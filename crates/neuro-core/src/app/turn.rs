//! TurnToken - ワーカー間の排他ターン
//!
//! 容量 1 のセマフォです。パイプライン全体で同時に走るサイクルは常に高々 1 つ。
//!
//! # 解放の契約
//! `acquire()` が返す [`TurnPermit`] は RAII ガードで、drop した時点でターンを返します。
//! エラー分岐、panic による unwind、task の abort のどれでも drop は走るので、
//! 解放し忘れによるデッドロックは起こりません（タイムアウトは持たない）。
//!
//! # 順序
//! 次にターンを得るワーカーは待ち行列の実装次第です。
//! tokio のセマフォは到着順に起こしますが、バックエンド間のラウンドロビンや
//! 公平性はこの型の保証には含めません。

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("turn token is closed")]
pub struct TurnClosed;

/// Single-slot exclusivity permit shared by all pipeline workers.
///
/// Cloning shares the same slot.
#[derive(Debug, Clone)]
pub struct TurnToken {
    slot: Arc<Semaphore>,
}

/// Possession of the turn. Dropping it hands the turn to the next waiter.
#[derive(Debug)]
#[must_use = "the turn is released as soon as the permit is dropped"]
pub struct TurnPermit {
    _permit: OwnedSemaphorePermit,
}

impl TurnPermit {
    /// Give the turn back explicitly. Same as dropping the permit.
    pub fn release(self) {}
}

impl TurnToken {
    /// The permit starts unclaimed, so the first `acquire()` succeeds immediately.
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Semaphore::new(1)),
        }
    }

    /// Wait until the turn is free and take it.
    pub async fn acquire(&self) -> Result<TurnPermit, TurnClosed> {
        let permit = Arc::clone(&self.slot)
            .acquire_owned()
            .await
            .map_err(|_| TurnClosed)?;
        Ok(TurnPermit { _permit: permit })
    }

    /// Take the turn only if nobody holds it.
    pub fn try_acquire(&self) -> Option<TurnPermit> {
        match Arc::clone(&self.slot).try_acquire_owned() {
            Ok(permit) => Some(TurnPermit { _permit: permit }),
            Err(TryAcquireError::NoPermits | TryAcquireError::Closed) => None,
        }
    }

    pub fn is_held(&self) -> bool {
        self.slot.available_permits() == 0
    }
}

impl Default for TurnToken {
    fn default() -> Self {
        Self::new()
    }
}
