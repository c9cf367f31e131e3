//! UseCase: ユーザー接続処理
//!
//! ハンドシェイクで渡されたユーザー ID を Presence Registry に登録し、
//! 更新後のオンライン集合を全接続にブロードキャストします。
//! ユーザー ID がない接続も切断はせず、ブロードキャストのみ受け取れる
//! 状態で維持します（直接のプッシュは届かない）。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectUserUseCase::execute() メソッド
//!
//! ### どのような状況を想定しているか
//! - 正常系：登録とブロードキャスト
//! - 異常系：ユーザー ID なし／不正なユーザー ID（登録されない）
//! - エッジケース：同一ユーザーの再接続（後勝ち）、並行した接続・切断

use std::sync::Arc;

use crate::domain::{ConnectionGateway, ConnectionHandle, PresenceRepository, UserId};

use super::error::ConnectError;

/// ユーザー接続のユースケース
pub struct ConnectUserUseCase {
    presence: Arc<dyn PresenceRepository>,
    gateway: Arc<dyn ConnectionGateway>,
}

impl ConnectUserUseCase {
    /// 新しい ConnectUserUseCase を作成
    pub fn new(presence: Arc<dyn PresenceRepository>, gateway: Arc<dyn ConnectionGateway>) -> Self {
        Self { presence, gateway }
    }

    /// ユーザー接続を実行
    ///
    /// 接続はユーザー ID の有無にかかわらずゲートウェイに接続されます。
    ///
    /// # Arguments
    ///
    /// * `user_id` - ハンドシェイクで主張されたユーザー ID（再認証はしない）
    /// * `handle` - 接続ハンドル
    ///
    /// # Returns
    ///
    /// * `Ok(UserId)` - 登録されたユーザー
    /// * `Err(ConnectError)` - 登録されなかった（接続は維持される）
    pub async fn execute(
        &self,
        user_id: Option<String>,
        handle: ConnectionHandle,
    ) -> Result<UserId, ConnectError> {
        self.gateway.attach(handle.clone()).await;

        let Some(raw_user_id) = user_id.filter(|id| !id.trim().is_empty()) else {
            tracing::warn!(
                "Connection '{}' has no user id in handshake; presence disabled",
                handle.id
            );
            return Err(ConnectError::IdentityMissing);
        };
        let user_id = UserId::new(raw_user_id).map_err(|e| {
            tracing::warn!("Connection '{}' has an invalid user id: {}", handle.id, e);
            ConnectError::InvalidIdentity(e)
        })?;

        let online = self.presence.register(user_id.clone(), handle).await;
        tracing::info!("User '{}' is online ({} online)", user_id, online.len());
        self.gateway.broadcast_online_users(&online).await;

        Ok(user_id)
    }
}
