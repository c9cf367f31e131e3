//! SQLite Message Repository 実装
//!
//! `sqlx` を使った永続化実装。会話は正規化した参加者ペア
//! `(user_low, user_high)` に UNIQUE 制約を持ち、find-or-create は
//! `INSERT ... ON CONFLICT DO NOTHING` の後に SELECT する形で原子的に行います。

use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use sqlx::{
    SqliteConnection, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::domain::{
    Conversation, ConversationId, ConversationIdFactory, Message, MessageBody, MessageId,
    MessageIdFactory, MessageRepository, ParticipantPair, RepositoryError, Timestamp, UserId,
};

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS conversations (
        id TEXT PRIMARY KEY,
        user_low TEXT NOT NULL,
        user_high TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        UNIQUE(user_low, user_high)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS messages (
        id TEXT PRIMARY KEY,
        sender_id TEXT NOT NULL,
        receiver_id TEXT NOT NULL,
        body TEXT NOT NULL,
        created_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS conversation_messages (
        position INTEGER PRIMARY KEY AUTOINCREMENT,
        conversation_id TEXT NOT NULL REFERENCES conversations(id),
        message_id TEXT NOT NULL REFERENCES messages(id),
        UNIQUE(conversation_id, message_id)
    )
    "#,
];

type MessageRow = (String, String, String, String, i64);

fn unavailable(err: sqlx::Error) -> RepositoryError {
    tracing::error!("SQLite error: {}", err);
    RepositoryError::Unavailable(err.to_string())
}

fn invalid(err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::InvalidRecord(err.to_string())
}

fn message_from_row(
    (id, sender_id, receiver_id, body, created_at): MessageRow,
) -> Result<Message, RepositoryError> {
    Ok(Message::new(
        MessageId::parse(&id).map_err(invalid)?,
        UserId::new(sender_id).map_err(invalid)?,
        UserId::new(receiver_id).map_err(invalid)?,
        MessageBody::new(body).map_err(invalid)?,
        Timestamp::new(created_at),
    ))
}

async fn row_exists(
    conn: &mut SqliteConnection,
    sql: &str,
    id: String,
) -> Result<bool, RepositoryError> {
    let row: Option<(i64,)> = sqlx::query_as(sql)
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(unavailable)?;
    Ok(row.is_some())
}

async fn insert_message(conn: &mut SqliteConnection, message: &Message) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO messages (id, sender_id, receiver_id, body, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(message.id.to_string())
    .bind(message.sender_id.as_str())
    .bind(message.receiver_id.as_str())
    .bind(message.body.as_str())
    .bind(message.created_at.value())
    .execute(conn)
    .await
    .map_err(unavailable)?;
    Ok(())
}

async fn link_message(
    conn: &mut SqliteConnection,
    conversation_id: &ConversationId,
    message_id: &MessageId,
) -> Result<(), RepositoryError> {
    if !row_exists(
        &mut *conn,
        "SELECT 1 FROM conversations WHERE id = ?",
        conversation_id.to_string(),
    )
    .await?
    {
        return Err(RepositoryError::ConversationNotFound(conversation_id.to_string()));
    }
    if !row_exists(
        &mut *conn,
        "SELECT 1 FROM messages WHERE id = ?",
        message_id.to_string(),
    )
    .await?
    {
        return Err(RepositoryError::MessageNotFound(message_id.to_string()));
    }

    sqlx::query(
        "INSERT INTO conversation_messages (conversation_id, message_id) VALUES (?, ?) \
         ON CONFLICT(conversation_id, message_id) DO NOTHING",
    )
    .bind(conversation_id.to_string())
    .bind(message_id.to_string())
    .execute(conn)
    .await
    .map_err(unavailable)?;
    Ok(())
}

fn new_message(sender_id: UserId, receiver_id: UserId, body: MessageBody) -> Message {
    Message::new(
        MessageIdFactory::generate(),
        sender_id,
        receiver_id,
        body,
        Timestamp::now(),
    )
}

/// SQLite Message Repository 実装
pub struct SqliteMessageRepository {
    pool: SqlitePool,
}

impl SqliteMessageRepository {
    /// データベースに接続し、スキーマを作成する
    ///
    /// `database_url` は `sqlite:hanashi.db` や `sqlite::memory:` の形式。
    /// インメモリ DB は接続ごとに別の DB になるため、接続数を 1 に制限します。
    pub async fn connect(database_url: &str) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(unavailable)?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = database_url.contains(":memory:");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(unavailable)?;

        let repository = Self { pool };
        repository.init_schema().await?;
        tracing::info!("Connected to message store at '{}'", database_url);
        Ok(repository)
    }

    async fn init_schema(&self) -> Result<(), RepositoryError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(unavailable)?;
        }
        Ok(())
    }

    async fn load_conversation(
        &self,
        pair: &ParticipantPair,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let row: Option<(String, i64)> = sqlx::query_as(
            "SELECT id, created_at FROM conversations WHERE user_low = ? AND user_high = ?",
        )
        .bind(pair.low().as_str())
        .bind(pair.high().as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        let Some((id, created_at)) = row else {
            return Ok(None);
        };

        let message_ids: Vec<(String,)> = sqlx::query_as(
            "SELECT message_id FROM conversation_messages WHERE conversation_id = ? ORDER BY position",
        )
        .bind(&id)
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        let mut conversation = Conversation::new(
            ConversationId::parse(&id).map_err(invalid)?,
            pair.clone(),
            Timestamp::new(created_at),
        );
        for (message_id,) in message_ids {
            conversation.append(MessageId::parse(&message_id).map_err(invalid)?);
        }
        Ok(Some(conversation))
    }
}

#[async_trait]
impl MessageRepository for SqliteMessageRepository {
    async fn find_conversation(
        &self,
        user_a: &UserId,
        user_b: &UserId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let pair = ParticipantPair::new(user_a.clone(), user_b.clone());
        self.load_conversation(&pair).await
    }

    async fn create_conversation(
        &self,
        user_a: &UserId,
        user_b: &UserId,
    ) -> Result<Conversation, RepositoryError> {
        self.find_or_create_conversation(user_a, user_b).await
    }

    async fn find_or_create_conversation(
        &self,
        user_a: &UserId,
        user_b: &UserId,
    ) -> Result<Conversation, RepositoryError> {
        let pair = ParticipantPair::new(user_a.clone(), user_b.clone());

        sqlx::query(
            "INSERT INTO conversations (id, user_low, user_high, created_at) VALUES (?, ?, ?, ?) \
             ON CONFLICT(user_low, user_high) DO NOTHING",
        )
        .bind(ConversationIdFactory::generate().to_string())
        .bind(pair.low().as_str())
        .bind(pair.high().as_str())
        .bind(Timestamp::now().value())
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        self.load_conversation(&pair)
            .await?
            .ok_or_else(|| {
                RepositoryError::Unavailable("conversation vanished after upsert".to_string())
            })
    }

    async fn create_message(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        body: MessageBody,
    ) -> Result<Message, RepositoryError> {
        let message = new_message(sender_id, receiver_id, body);
        let mut conn = self.pool.acquire().await.map_err(unavailable)?;
        insert_message(&mut conn, &message).await?;
        Ok(message)
    }

    async fn append_message_to_conversation(
        &self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(unavailable)?;
        link_message(&mut conn, conversation_id, message_id).await
    }

    async fn persist_message(
        &self,
        conversation_id: &ConversationId,
        sender_id: UserId,
        receiver_id: UserId,
        body: MessageBody,
    ) -> Result<Message, RepositoryError> {
        let message = new_message(sender_id, receiver_id, body);

        // Dropping the transaction on an error path rolls the insert back
        let mut tx = self.pool.begin().await.map_err(unavailable)?;
        insert_message(&mut tx, &message).await?;
        link_message(&mut tx, conversation_id, &message.id).await?;
        tx.commit().await.map_err(unavailable)?;

        Ok(message)
    }

    async fn get_messages_for_conversation(
        &self,
        user_a: &UserId,
        user_b: &UserId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let pair = ParticipantPair::new(user_a.clone(), user_b.clone());

        let rows: Vec<MessageRow> = sqlx::query_as(
            r#"
            SELECT m.id, m.sender_id, m.receiver_id, m.body, m.created_at
            FROM conversations c
            JOIN conversation_messages cm ON cm.conversation_id = c.id
            JOIN messages m ON m.id = cm.message_id
            WHERE c.user_low = ? AND c.user_high = ?
            ORDER BY cm.position
            "#,
        )
        .bind(pair.low().as_str())
        .bind(pair.high().as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        rows.into_iter().map(message_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn body(text: &str) -> MessageBody {
        MessageBody::new(text.to_string()).unwrap()
    }

    async fn create_test_repository() -> SqliteMessageRepository {
        SqliteMessageRepository::connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory SQLite")
    }

    #[tokio::test]
    async fn test_find_or_create_conversation_is_symmetric() {
        // テスト項目: (A,B) と (B,A) で同じ会話が返される
        // given (前提条件):
        let repo = create_test_repository().await;

        // when (操作):
        let first = repo
            .find_or_create_conversation(&user("1"), &user("2"))
            .await
            .unwrap();
        let second = repo
            .find_or_create_conversation(&user("2"), &user("1"))
            .await
            .unwrap();
        let found = repo.find_conversation(&user("2"), &user("1")).await.unwrap();

        // then (期待する結果):
        assert_eq!(first.id, second.id);
        assert_eq!(found.unwrap().id, first.id);
    }

    #[tokio::test]
    async fn test_history_in_creation_order() {
        // テスト項目: 永続化したメッセージが作成順に返される
        // given (前提条件):
        let repo = create_test_repository().await;
        let alice = user("1");
        let bob = user("2");
        let conversation = repo.find_or_create_conversation(&alice, &bob).await.unwrap();

        // when (操作):
        for (sender, receiver, text) in [(&alice, &bob, "hi"), (&bob, &alice, "hello")] {
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
            .get_messages_for_conversation(&alice, &bob)
            .await
            .unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].body.as_str(), "hi");
        assert_eq!(messages[0].sender_id, alice);
        assert_eq!(messages[1].body.as_str(), "hello");
        assert_eq!(messages[1].sender_id, bob);

        let conversation = repo.find_conversation(&alice, &bob).await.unwrap().unwrap();
        assert_eq!(
            conversation.message_ids,
            messages.iter().map(|m| m.id).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_empty_history_for_unknown_pair() {
        // テスト項目: 会話がないペアの履歴は空
        let repo = create_test_repository().await;

        let messages = repo
            .get_messages_for_conversation(&user("1"), &user("3"))
            .await
            .unwrap();

        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_append_to_unknown_conversation_fails() {
        // テスト項目: 存在しない会話への追加はエラーになる
        let repo = create_test_repository().await;
        let message = repo
            .create_message(user("1"), user("2"), body("hi"))
            .await
            .unwrap();

        let result = repo
            .append_message_to_conversation(&ConversationIdFactory::generate(), &message.id)
            .await;

        assert!(matches!(
            result.unwrap_err(),
            RepositoryError::ConversationNotFound(_)
        ));
    }

    async fn count_messages(repo: &SqliteMessageRepository) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        count
    }

    #[tokio::test]
    async fn test_persist_message_is_listed_in_history() {
        // テスト項目: 作成と追加が一つのトランザクションで行われ、履歴に現れる
        // given (前提条件):
        let repo = create_test_repository().await;
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
    async fn test_failed_persist_leaves_no_orphan_message() {
        // テスト項目: 会話への追加に失敗した場合、メッセージの行もロールバックされる
        // given (前提条件):
        let repo = create_test_repository().await;
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
        assert_eq!(count_messages(&repo).await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_find_or_create_yields_single_conversation() {
        // テスト項目: 同時 find-or-create でも会話は一つ
        let repo = Arc::new(create_test_repository().await);

        let mut handles = Vec::new();
        for i in 0..8 {
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

        assert!(ids.iter().all(|id| *id == ids[0]));
    }

    #[tokio::test]
    async fn test_connect_fails_when_directory_missing() {
        // テスト項目: 開けない DB ではストアが利用不可エラーになる
        let result =
            SqliteMessageRepository::connect("sqlite:/nonexistent-hanashi-dir/nested/hanashi.db")
                .await;

        assert!(matches!(result, Err(RepositoryError::Unavailable(_))));
    }
}
