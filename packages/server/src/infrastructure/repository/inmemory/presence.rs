//! InMemory Presence Repository 実装
//!
//! プロセス内でのみ有効な「ユーザー → 接続ハンドル」の対応表。
//! 複数の接続が別々のタスクから同時に登録・削除・参照するため、
//! 内部の HashMap は RwLock で保護します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{ConnectionHandle, ConnectionId, OnlineSet, PresenceRepository, UserId};

#[derive(Default)]
struct PresenceState {
    entries: HashMap<UserId, ConnectionHandle>,
    /// 変更のたびに増加するバージョン
    version: u64,
}

impl PresenceState {
    fn online_set(&self) -> OnlineSet {
        OnlineSet::new(self.version, self.entries.keys().cloned().collect())
    }

    fn bump(&mut self) -> OnlineSet {
        self.version += 1;
        self.online_set()
    }
}

/// インメモリ Presence Repository 実装
///
/// テストごとに独立したインスタンスを作成できるよう、グローバル変数ではなく
/// 明示的に所有・注入されるコンポーネントとして実装しています。
#[derive(Default)]
pub struct InMemoryPresenceRepository {
    state: RwLock<PresenceState>,
}

impl InMemoryPresenceRepository {
    /// 新しい InMemoryPresenceRepository を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録中のユーザー数
    pub async fn count_online(&self) -> usize {
        self.state.read().await.entries.len()
    }
}

#[async_trait]
impl PresenceRepository for InMemoryPresenceRepository {
    async fn register(&self, user_id: UserId, handle: ConnectionHandle) -> OnlineSet {
        let mut state = self.state.write().await;
        let connection_id = handle.id;
        if let Some(previous) = state.entries.insert(user_id.clone(), handle)
            && previous.id != connection_id
        {
            tracing::info!(
                "User '{}' opened a new session; connection '{}' replaced by '{}'",
                user_id,
                previous.id,
                connection_id
            );
        }
        state.bump()
    }

    async fn unregister(&self, user_id: &UserId) -> Option<OnlineSet> {
        let mut state = self.state.write().await;
        state.entries.remove(user_id)?;
        Some(state.bump())
    }

    async fn unregister_connection(
        &self,
        connection_id: &ConnectionId,
    ) -> Option<(UserId, OnlineSet)> {
        let mut state = self.state.write().await;
        let owner = state
            .entries
            .iter()
            .find(|(_, handle)| &handle.id == connection_id)
            .map(|(user_id, _)| user_id.clone())?;
        state.entries.remove(&owner);
        let online = state.bump();
        Some((owner, online))
    }

    async fn lookup(&self, user_id: &UserId) -> Option<ConnectionHandle> {
        let state = self.state.read().await;
        state.entries.get(user_id).cloned()
    }

    async fn snapshot(&self) -> OnlineSet {
        self.state.read().await.online_set()
    }
}
