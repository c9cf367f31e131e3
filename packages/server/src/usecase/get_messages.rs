//! UseCase: 会話履歴の取得
//!
//! 閲覧者と相手のペアの会話を作成順で返します。
//! まだやり取りのないペアはエラーではなく空の履歴になります。

use std::sync::Arc;

use crate::domain::{Message, MessageRepository, UserId};

use super::error::GetMessagesError;

/// 履歴取得のユースケース
pub struct GetMessagesUseCase {
    messages: Arc<dyn MessageRepository>,
}

impl GetMessagesUseCase {
    /// 新しい GetMessagesUseCase を作成
    pub fn new(messages: Arc<dyn MessageRepository>) -> Self {
        Self { messages }
    }

    /// 履歴取得を実行
    ///
    /// # Arguments
    ///
    /// * `viewer_id` - 閲覧者（認証済みのユーザー ID）
    /// * `other_user_id` - 会話の相手
    pub async fn execute(
        &self,
        viewer_id: String,
        other_user_id: String,
    ) -> Result<Vec<Message>, GetMessagesError> {
        let viewer_id = UserId::new(viewer_id)?;
        let other_user_id = UserId::new(other_user_id)?;

        let messages = self
            .messages
            .get_messages_for_conversation(&viewer_id, &other_user_id)
            .await?;
        tracing::debug!(
            "Loaded {} messages between '{}' and '{}'",
            messages.len(),
            viewer_id,
            other_user_id
        );
        Ok(messages)
    }
}
