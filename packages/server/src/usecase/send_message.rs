//! UseCase: メッセージ送信処理（Delivery Coordinator）
//!
//! 検証 → 会話の find-or-create → 永続化 → 受信者へのプッシュ、の順に処理します。
//! 永続化が成功した時点でメッセージは確定し、プッシュの成否は送信者への
//! 応答に影響しません。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 受信者がオンラインならプッシュされ、オフラインなら保存のみ
//!
//! ### なぜこのテストが必要か
//! - 「送信者への応答 ⇒ 永続化済み」という契約を保証する
//! - 永続化失敗時にプッシュが行われないことを確認する
//!
//! ### どのような状況を想定しているか
//! - 正常系：受信者オンライン（Delivered）／オフライン（NotDelivered）
//! - 異常系：入力不備（ValidationError）、ストア障害（Persistence）
//! - エッジケース：送信直前に受信者が切断（古いハンドル）

use std::sync::Arc;

use crate::domain::{ConnectionGateway, Message, MessageBody, MessageRepository, UserId};

use super::error::SendMessageError;

/// プッシュの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// 受信者の接続にプッシュした
    Delivered,
    /// 受信者がオフライン、または接続が古くなっていた（保存のみ）
    NotDelivered,
}

/// 送信処理の終端状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    /// 永続化されたメッセージ
    pub message: Message,
    pub delivery: DeliveryStatus,
}

impl SendOutcome {
    pub fn is_delivered(&self) -> bool {
        self.delivery == DeliveryStatus::Delivered
    }
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    messages: Arc<dyn MessageRepository>,
    gateway: Arc<dyn ConnectionGateway>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(messages: Arc<dyn MessageRepository>, gateway: Arc<dyn ConnectionGateway>) -> Self {
        Self { messages, gateway }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `sender_id` - 送信者（認証済みのユーザー ID）
    /// * `receiver_id` - 受信者のユーザー ID
    /// * `body` - メッセージ本文
    ///
    /// # Errors
    ///
    /// * `SendMessageError::Validation` - 入力が欠けている、または不正
    /// * `SendMessageError::Persistence` - 保存に失敗した（プッシュは行われない）
    pub async fn execute(
        &self,
        sender_id: String,
        receiver_id: String,
        body: String,
    ) -> Result<SendOutcome, SendMessageError> {
        // 1. 検証
        let sender_id = UserId::new(sender_id)?;
        let receiver_id = UserId::new(receiver_id)?;
        let body = MessageBody::new(body)?;

        // 2. 会話の find-or-create
        let conversation = self
            .messages
            .find_or_create_conversation(&sender_id, &receiver_id)
            .await?;

        // 3. 永続化
        let message = self
            .messages
            .persist_message(&conversation.id, sender_id, receiver_id, body)
            .await?;
        tracing::info!(
            "Persisted message '{}' from '{}' to '{}'",
            message.id,
            message.sender_id,
            message.receiver_id
        );

        // 4. プッシュ（結果は応答に影響しない）
        let delivery = if self
            .gateway
            .send_to_user(&message.receiver_id, &message)
            .await
        {
            tracing::debug!("Pushed message '{}' to '{}'", message.id, message.receiver_id);
            DeliveryStatus::Delivered
        } else {
            tracing::info!(
                "Recipient '{}' unreachable; message '{}' stored without push",
                message.receiver_id,
                message.id
            );
            DeliveryStatus::NotDelivered
        };

        Ok(SendOutcome { message, delivery })
    }
}
