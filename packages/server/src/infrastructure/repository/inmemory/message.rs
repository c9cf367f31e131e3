//! InMemory Message Repository 実装
//!
//! ドメイン層が定義する MessageRepository trait のインメモリ実装。
//! 会話は正規化した参加者ペア（ParticipantPair）をキーに索引付けされ、
//! find-or-create は単一のロック区間で行われるため、同じペアへの
//! 同時の初回送信でも会話が重複して作られることはありません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Conversation, ConversationId, ConversationIdFactory, Message, MessageBody, MessageId,
    MessageIdFactory, MessageRepository, ParticipantPair, RepositoryError, Timestamp, UserId,
};

#[derive(Default)]
struct MessageStore {
    messages: HashMap<MessageId, Message>,
    conversations: HashMap<ConversationId, Conversation>,
    /// 参加者ペア → 会話 ID の索引
    by_participants: HashMap<ParticipantPair, ConversationId>,
}

impl MessageStore {
    fn find(&self, pair: &ParticipantPair) -> Option<&Conversation> {
        self.by_participants
            .get(pair)
            .and_then(|id| self.conversations.get(id))
    }

    fn find_or_insert(&mut self, pair: ParticipantPair) -> Conversation {
        if let Some(conversation) = self.find(&pair) {
            return conversation.clone();
        }

        let conversation = Conversation::new(
            ConversationIdFactory::generate(),
            pair.clone(),
            Timestamp::now(),
        );
        self.by_participants.insert(pair, conversation.id);
        self.conversations
            .insert(conversation.id, conversation.clone());
        tracing::debug!("Created conversation '{}'", conversation.id);
        conversation
    }

    fn insert_message(
        &mut self,
        sender_id: UserId,
        receiver_id: UserId,
        body: MessageBody,
    ) -> Message {
        let message = Message::new(
            MessageIdFactory::generate(),
            sender_id,
            receiver_id,
            body,
            Timestamp::now(),
        );
        self.messages.insert(message.id, message.clone());
        message
    }

    fn append(
        &mut self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
    ) -> Result<(), RepositoryError> {
        if !self.messages.contains_key(message_id) {
            return Err(RepositoryError::MessageNotFound(message_id.to_string()));
        }
        let conversation = self
            .conversations
            .get_mut(conversation_id)
            .ok_or_else(|| RepositoryError::ConversationNotFound(conversation_id.to_string()))?;
        conversation.append(*message_id);
        Ok(())
    }
}

/// インメモリ Message Repository 実装
#[derive(Default)]
pub struct InMemoryMessageRepository {
    store: Mutex<MessageStore>,
}

impl InMemoryMessageRepository {
    /// 新しい InMemoryMessageRepository を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存されているメッセージ数（テスト・デバッグ用）
    pub async fn count_messages(&self) -> usize {
        self.store.lock().await.messages.len()
    }

    /// 保存されている会話数（テスト・デバッグ用）
    pub async fn count_conversations(&self) -> usize {
        self.store.lock().await.conversations.len()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn find_conversation(
        &self,
        user_a: &UserId,
        user_b: &UserId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let pair = ParticipantPair::new(user_a.clone(), user_b.clone());
        let store = self.store.lock().await;
        Ok(store.find(&pair).cloned())
    }

    async fn create_conversation(
        &self,
        user_a: &UserId,
        user_b: &UserId,
    ) -> Result<Conversation, RepositoryError> {
        // The pair index makes creation idempotent: a racing creator gets the
        // conversation that won.
        self.find_or_create_conversation(user_a, user_b).await
    }

    async fn find_or_create_conversation(
        &self,
        user_a: &UserId,
        user_b: &UserId,
    ) -> Result<Conversation, RepositoryError> {
        let pair = ParticipantPair::new(user_a.clone(), user_b.clone());
        let mut store = self.store.lock().await;
        Ok(store.find_or_insert(pair))
    }

    async fn create_message(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        body: MessageBody,
    ) -> Result<Message, RepositoryError> {
        let mut store = self.store.lock().await;
        Ok(store.insert_message(sender_id, receiver_id, body))
    }

    async fn append_message_to_conversation(
        &self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
    ) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().await;
        store.append(conversation_id, message_id)
    }

    async fn persist_message(
        &self,
        conversation_id: &ConversationId,
        sender_id: UserId,
        receiver_id: UserId,
        body: MessageBody,
    ) -> Result<Message, RepositoryError> {
        let mut store = self.store.lock().await;
        if !store.conversations.contains_key(conversation_id) {
            return Err(RepositoryError::ConversationNotFound(
                conversation_id.to_string(),
            ));
        }
        let message = store.insert_message(sender_id, receiver_id, body);
        store.append(conversation_id, &message.id)?;
        Ok(message)
    }

    async fn get_messages_for_conversation(
        &self,
        user_a: &UserId,
        user_b: &UserId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let pair = ParticipantPair::new(user_a.clone(), user_b.clone());
        let store = self.store.lock().await;
        let Some(conversation) = store.find(&pair) else {
            return Ok(Vec::new());
        };

        conversation
            .message_ids
            .iter()
            .map(|id| {
                store
                    .messages
                    .get(id)
                    .cloned()
                    .ok_or_else(|| RepositoryError::MessageNotFound(id.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryMessageRepository の会話・メッセージの作成と取得
    // - 参加者ペアの対称性（{A,B} と {B,A} が同じ会話になる）
    // - 同時の初回送信でも会話が一つしか作られないこと
    //
    // 【どのようなシナリオをテストするか】
    // 1. 会話の find-or-create の対称性
    // 2. 存在しない会話の検索（None / 空の履歴）
    // 3. メッセージの追加順の保持
    // 4. 同時 find-or-create
    // 5. 存在しない会話・メッセージへの追加（エラーケース）
    // ========================================

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn body(text: &str) -> MessageBody {
        MessageBody::new(text.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_find_or_create_conversation_is_symmetric() {
        // テスト項目: (A,B) と (B,A) で同じ会話が返される
        // given (前提条件):
        let repo = InMemoryMessageRepository::new();
        let alice = user("1");
        let bob = user("2");

        // when (操作):
        let first = repo.find_or_create_conversation(&alice, &bob).await.unwrap();
        let second = repo.find_or_create_conversation(&bob, &alice).await.unwrap();
        let third = repo.create_conversation(&alice, &bob).await.unwrap();

        // then (期待する結果):
        assert_eq!(first.id, second.id);
        assert_eq!(first.id, third.id);
        assert_eq!(repo.count_conversations().await, 1);
    }

    #[tokio::test]
    async fn test_find_conversation_absent() {
        // テスト項目: 会話がないペアでは None と空の履歴が返される
        // given (前提条件):
        let repo = InMemoryMessageRepository::new();

        // when (操作):
        let found = repo.find_conversation(&user("1"), &user("2")).await.unwrap();
        let messages = repo
            .get_messages_for_conversation(&user("1"), &user("2"))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(found.is_none());
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_messages_are_returned_in_creation_order() {
        // テスト項目: 会話のメッセージが作成順に返される
        // given (前提条件):
        let repo = InMemoryMessageRepository::new();
        let alice = user("1");
        let bob = user("2");
        let conversation = repo.find_or_create_conversation(&alice, &bob).await.unwrap();

        // when (操作):
        for (sender, receiver, text) in [
            (&alice, &bob, "hi"),
            (&bob, &alice, "hello"),
            (&alice, &bob, "how are you?"),
        ] {
            let message = repo
                .create_message(sender.clone(), receiver.clone(), body(text))
                .await
                .unwrap();
            repo.append_message_to_conversation(&conversation.id, &message.id)
                .await
                .unwrap();
        }

        // then (期待する結果):
        let messages = repo
            .get_messages_for_conversation(&bob, &alice)
            .await
            .unwrap();
        let bodies: Vec<&str> = messages.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["hi", "hello", "how are you?"]);
        assert_eq!(messages[1].sender_id, bob);

        let conversation = repo.find_conversation(&alice, &bob).await.unwrap().unwrap();
        assert_eq!(conversation.message_ids.len(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_find_or_create_yields_single_conversation() {
        // テスト項目: 同じペアへの同時 find-or-create で会話が一つだけ作られる
        // given (前提条件):
        let repo = Arc::new(InMemoryMessageRepository::new());

        // when (操作): (A,B) と (B,A) を交互に並行実行
        let mut handles = Vec::new();
        for i in 0..32 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                let (a, b) = if i % 2 == 0 { ("1", "2") } else { ("2", "1") };
                repo.find_or_create_conversation(&user(a), &user(b))
                    .await
                    .unwrap()
                    .id
            }));
        }
        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }

        // then (期待する結果):
        assert!(ids.iter().all(|id| *id == ids[0]));
        assert_eq!(repo.count_conversations().await, 1);
    }

    #[tokio::test]
    async fn test_persist_message_appends_to_conversation() {
        // テスト項目: 作成と追加が一度に行われ、履歴に現れる
        // given (前提条件):
        let repo = InMemoryMessageRepository::new();
        let conversation = repo
            .find_or_create_conversation(&user("1"), &user("2"))
            .await
            .unwrap();

        // when (操作):
        let message = repo
            .persist_message(&conversation.id, user("1"), user("2"), body("hi"))
            .await
            .unwrap();

        // then (期待する結果):
        let history = repo
            .get_messages_for_conversation(&user("2"), &user("1"))
            .await
            .unwrap();
        assert_eq!(history, vec![message]);
    }

    #[tokio::test]
    async fn test_persist_message_to_unknown_conversation_leaves_no_message() {
        // テスト項目: 追加先の会話がない場合、メッセージも保存されない
        // given (前提条件):
        let repo = InMemoryMessageRepository::new();
        let unknown = ConversationIdFactory::generate();

        // when (操作):
        let result = repo
            .persist_message(&unknown, user("1"), user("2"), body("hi"))
            .await;

        // then (期待する結果):
        assert!(matches!(
            result.unwrap_err(),
            RepositoryError::ConversationNotFound(_)
        ));
        assert_eq!(repo.count_messages().await, 0);
    }

    #[tokio::test]
    async fn test_append_to_unknown_conversation_fails() {
        // テスト項目: 存在しない会話への追加はエラーになる
        // given (前提条件):
        let repo = InMemoryMessageRepository::new();
        let message = repo
            .create_message(user("1"), user("2"), body("hi"))
            .await
            .unwrap();
        let unknown = ConversationIdFactory::generate();

        // when (操作):
        let result = repo
            .append_message_to_conversation(&unknown, &message.id)
            .await;

        // then (期待する結果):
        assert!(matches!(
            result.unwrap_err(),
            RepositoryError::ConversationNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_append_unknown_message_fails() {
        // テスト項目: 存在しないメッセージの追加はエラーになる
        let repo = InMemoryMessageRepository::new();
        let conversation = repo
            .find_or_create_conversation(&user("1"), &user("2"))
            .await
            .unwrap();

        let result = repo
            .append_message_to_conversation(&conversation.id, &MessageIdFactory::generate())
            .await;

        assert!(matches!(
            result.unwrap_err(),
            RepositoryError::MessageNotFound(_)
        ));
    }
}
