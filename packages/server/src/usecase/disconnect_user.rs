//! UseCase: ユーザー切断処理
//!
//! 切断した接続をゲートウェイから外し、その接続が Presence Registry の
//! エントリを所有していれば削除してオンライン集合を再ブロードキャストします。

use std::sync::Arc;

use crate::domain::{ConnectionGateway, ConnectionId, PresenceRepository, UserId};

/// ユーザー切断のユースケース
pub struct DisconnectUserUseCase {
    presence: Arc<dyn PresenceRepository>,
    gateway: Arc<dyn ConnectionGateway>,
}

impl DisconnectUserUseCase {
    /// 新しい DisconnectUserUseCase を作成
    pub fn new(presence: Arc<dyn PresenceRepository>, gateway: Arc<dyn ConnectionGateway>) -> Self {
        Self { presence, gateway }
    }

    /// ユーザー切断を実行
    ///
    /// # Returns
    ///
    /// * `Some(UserId)` - 登録を削除したユーザー
    /// * `None` - 匿名接続、または新しい接続に置き換え済みだった
    pub async fn execute(&self, connection_id: ConnectionId) -> Option<UserId> {
        self.gateway.detach(&connection_id).await;

        let Some((user_id, online)) = self.presence.unregister_connection(&connection_id).await
        else {
            tracing::debug!("Connection '{}' owned no presence entry", connection_id);
            return None;
        };
        tracing::info!("User '{}' went offline ({} online)", user_id, online.len());
        self.gateway.broadcast_online_users(&online).await;

        Some(user_id)
    }
}
