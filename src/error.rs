use thiserror::Error;

/// Failure category, kept separate from the message so the operator can
/// tell "can't read data" from "can't write data".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Subscription,
    StatusUpdate,
    Notification,
    BlockUser,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("unable to fetch {collection}: {source}")]
    Subscription {
        collection: &'static str,
        source: sqlx::Error,
    },

    #[error("unable to update report status: {0}")]
    StatusUpdate(#[source] sqlx::Error),

    #[error("failed to send notification: {0}")]
    Notification(#[source] sqlx::Error),

    #[error("unable to block user: {0}")]
    BlockUser(#[source] sqlx::Error),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Subscription { .. } => ErrorKind::Subscription,
            StoreError::StatusUpdate(_) => ErrorKind::StatusUpdate,
            StoreError::Notification(_) => ErrorKind::Notification,
            StoreError::BlockUser(_) => ErrorKind::BlockUser,
        }
    }
}
