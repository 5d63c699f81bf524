/// Account deletion and deletion scheduling
///
/// The stores are external collaborators behind traits; the logic here only
/// cares about ordering and failure policy:
/// - authorization is checked before any mutation
/// - subcollection documents go first, then the user root document, then the
///   blob objects, and the auth identity last, so a partial failure leaves a
///   recoverable account instead of an orphaned identity
/// - blob-store failures are logged and tolerated; document and auth
///   failures abort

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Subcollections removed under the user document
pub const USER_SUBCOLLECTIONS: [&str; 2] = ["paints", "projects"];

/// Blob path prefixes holding user-owned objects
pub const BLOB_PREFIXES: [&str; 2] = ["project-photos", "profile-images"];

/// Grace period granted by the scheduling call
pub const DELETION_GRACE_DAYS: i64 = 30;

/// Status flag stamped on the user document by `schedule_deletion`
pub const SCHEDULED_STATUS: &str = "pending_deletion";

#[derive(Debug, Error)]
#[error("{0}")]
pub struct StoreError(pub String);

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("callers may only delete their own account")]
    Unauthorized,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Document-store collaborator (managed backend)
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Delete every document in a user subcollection, returning the count
    async fn delete_subcollection(&self, uid: &str, name: &str) -> Result<usize, StoreError>;

    /// Delete the user's root document
    async fn delete_user_document(&self, uid: &str) -> Result<(), StoreError>;

    /// Stamp the user document with a future deletion timestamp and status
    async fn set_deletion_schedule(
        &self,
        uid: &str,
        scheduled_for: DateTime<Utc>,
        status: &str,
    ) -> Result<(), StoreError>;
}

/// Blob-store collaborator
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Delete every object under a path prefix, returning the count
    async fn delete_prefix(&self, prefix: &str) -> Result<usize, StoreError>;
}

/// Authentication collaborator
#[async_trait]
pub trait AuthStore: Send + Sync {
    async fn delete_identity(&self, uid: &str) -> Result<(), StoreError>;
}

/// The three collaborators the deletion flow touches
#[derive(Clone)]
pub struct AccountStores {
    pub documents: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub auth: Arc<dyn AuthStore>,
}

/// Counts reported back to the caller after a deletion
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionSummary {
    pub documents_deleted: usize,
    pub blobs_deleted: usize,
    pub blob_failures: usize,
}

/// Delete a user's account across documents, blobs, and auth
pub async fn delete_account(
    stores: &AccountStores,
    caller_uid: &str,
    target_uid: &str,
) -> Result<DeletionSummary, AccountError> {
    if caller_uid != target_uid {
        return Err(AccountError::Unauthorized);
    }

    let mut summary = DeletionSummary::default();

    for name in USER_SUBCOLLECTIONS {
        summary.documents_deleted += stores
            .documents
            .delete_subcollection(target_uid, name)
            .await?;
    }

    stores.documents.delete_user_document(target_uid).await?;
    summary.documents_deleted += 1;

    for prefix in BLOB_PREFIXES {
        let path = format!("{}/{}", prefix, target_uid);
        match stores.blobs.delete_prefix(&path).await {
            Ok(count) => summary.blobs_deleted += count,
            Err(e) => {
                // Tolerated: orphaned blobs are preferable to an aborted
                // deletion that strands the identity
                tracing::warn!(uid = target_uid, prefix, error = %e, "blob deletion failed");
                summary.blob_failures += 1;
            }
        }
    }

    // Identity goes last so a failure above leaves the account recoverable
    stores.auth.delete_identity(target_uid).await?;

    tracing::info!(
        uid = target_uid,
        documents = summary.documents_deleted,
        blobs = summary.blobs_deleted,
        "account deleted"
    );
    Ok(summary)
}

/// Stamp a future deletion on the user document; no destructive action
pub async fn schedule_deletion(
    stores: &AccountStores,
    caller_uid: &str,
    target_uid: &str,
) -> Result<DateTime<Utc>, AccountError> {
    if caller_uid != target_uid {
        return Err(AccountError::Unauthorized);
    }

    let scheduled_for = Utc::now() + Duration::days(DELETION_GRACE_DAYS);
    stores
        .documents
        .set_deletion_schedule(target_uid, scheduled_for, SCHEDULED_STATUS)
        .await?;

    tracing::info!(uid = target_uid, %scheduled_for, "deletion scheduled");
    Ok(scheduled_for)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::memory::{MemoryAuthStore, MemoryBlobStore, MemoryDocumentStore};

    fn seeded_stores() -> (
        AccountStores,
        Arc<MemoryDocumentStore>,
        Arc<MemoryBlobStore>,
        Arc<MemoryAuthStore>,
    ) {
        let documents = Arc::new(MemoryDocumentStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let auth = Arc::new(MemoryAuthStore::new());

        documents.seed_user("ada");
        documents.seed_subcollection("ada", "paints", 3);
        documents.seed_subcollection("ada", "projects", 2);
        blobs.seed_object("project-photos/ada/mini-1.jpg");
        blobs.seed_object("project-photos/ada/mini-2.jpg");
        blobs.seed_object("profile-images/ada/avatar.jpg");
        auth.seed_identity("ada");

        let stores = AccountStores {
            documents: documents.clone(),
            blobs: blobs.clone(),
            auth: auth.clone(),
        };
        (stores, documents, blobs, auth)
    }

    #[tokio::test]
    async fn deletes_everything_in_order() {
        let (stores, documents, blobs, auth) = seeded_stores();

        let summary = delete_account(&stores, "ada", "ada").await.unwrap();
        assert_eq!(summary.documents_deleted, 6); // 3 paints + 2 projects + root
        assert_eq!(summary.blobs_deleted, 3);
        assert_eq!(summary.blob_failures, 0);

        assert!(!documents.user_exists("ada"));
        assert_eq!(blobs.object_count(), 0);
        assert!(!auth.identity_exists("ada"));
    }

    #[tokio::test]
    async fn mismatched_caller_mutates_nothing() {
        let (stores, documents, blobs, auth) = seeded_stores();

        let err = delete_account(&stores, "mallory", "ada").await.unwrap_err();
        assert!(matches!(err, AccountError::Unauthorized));

        // No document or storage mutation occurred
        assert!(documents.user_exists("ada"));
        assert_eq!(documents.subcollection_len("ada", "paints"), 3);
        assert_eq!(blobs.object_count(), 3);
        assert!(auth.identity_exists("ada"));
    }

    #[tokio::test]
    async fn blob_failure_is_tolerated() {
        let (mut stores, documents, _, auth) = seeded_stores();
        stores.blobs = Arc::new(MemoryBlobStore::failing());

        let summary = delete_account(&stores, "ada", "ada").await.unwrap();
        assert_eq!(summary.blob_failures, 2);

        // Documents and identity still removed despite the storage failure
        assert!(!documents.user_exists("ada"));
        assert!(!auth.identity_exists("ada"));
    }

    #[tokio::test]
    async fn schedule_stamps_without_deleting() {
        let (stores, documents, blobs, auth) = seeded_stores();

        let when = schedule_deletion(&stores, "ada", "ada").await.unwrap();
        assert!(when > Utc::now());

        let (stamped, status) = documents.deletion_schedule("ada").unwrap();
        assert_eq!(stamped, when);
        assert_eq!(status, SCHEDULED_STATUS);

        // Nothing destructive happened
        assert!(documents.user_exists("ada"));
        assert_eq!(blobs.object_count(), 3);
        assert!(auth.identity_exists("ada"));
    }

    #[tokio::test]
    async fn schedule_requires_matching_caller() {
        let (stores, documents, _, _) = seeded_stores();
        let err = schedule_deletion(&stores, "mallory", "ada")
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::Unauthorized));
        assert!(documents.deletion_schedule("ada").is_none());
    }
}
