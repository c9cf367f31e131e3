//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{RepositoryError, ValueObjectError};

/// メッセージ送信のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendMessageError {
    /// 送信者・受信者・本文のいずれかが欠けている、または不正
    #[error("Invalid message: {0}")]
    Validation(#[from] ValueObjectError),

    /// 永続化に失敗した（メッセージは保存されていない）
    #[error("Failed to persist message: {0}")]
    Persistence(#[from] RepositoryError),
}

/// 履歴取得のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GetMessagesError {
    #[error("Invalid participant: {0}")]
    Validation(#[from] ValueObjectError),

    #[error("Failed to load messages: {0}")]
    Persistence(#[from] RepositoryError),
}

/// 接続（ハンドシェイク）のエラー
///
/// いずれも致命的ではなく、接続はブロードキャスト受信用に維持されます。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// ハンドシェイクにユーザー ID が含まれていない
    #[error("Handshake carries no user identity")]
    IdentityMissing,

    /// ユーザー ID の形式が不正
    #[error("Handshake carries an invalid user identity: {0}")]
    InvalidIdentity(ValueObjectError),
}
