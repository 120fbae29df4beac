//! Persistence contract: the flat template rows this core reads and writes.
//!
//! The durable copy of every template lives behind [`TemplateStore`]; the
//! builder only ever holds a transient working copy. [`MemoryTemplateStore`]
//! is the reference implementation, useful for tests and small embedders.

use std::error::Error as StdError;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::BoxFuture;
use crate::domain::{Category, TemplateStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
/// Serialized shape of one button in the record's `buttons` column.
pub enum StoredButton {
    QuickReply { text: String },
    Url { text: String, url: String },
    Phone { text: String, phone: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One persisted template row.
pub struct TemplateRecord {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub language: String,
    pub status: TemplateStatus,
    pub header_text: Option<String>,
    pub body_text: Option<String>,
    pub footer_text: Option<String>,
    pub buttons: Vec<StoredButton>,
    /// Present in the row shape for compatibility; currently always empty.
    pub variables: Vec<String>,
    pub provider_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
/// Insertable row; the store assigns `id` and both timestamps.
pub struct NewTemplateRecord {
    pub name: String,
    pub category: Category,
    pub language: String,
    pub status: TemplateStatus,
    pub header_text: Option<String>,
    pub body_text: Option<String>,
    pub footer_text: Option<String>,
    pub buttons: Vec<StoredButton>,
    pub provider_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
/// Partial patch for [`TemplateStore::update`].
///
/// The outer `Option` selects whether a column changes at all; for nullable
/// text columns the inner `Option` carries the new value or clears it.
/// Implementations refresh `updated_at` on every successful update.
pub struct TemplateUpdate {
    pub name: Option<String>,
    pub category: Option<Category>,
    pub language: Option<String>,
    pub status: Option<TemplateStatus>,
    pub header_text: Option<Option<String>>,
    pub body_text: Option<Option<String>>,
    pub footer_text: Option<Option<String>>,
    pub buttons: Option<Vec<StoredButton>>,
    pub provider_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("template record not found: {id}")]
    NotFound { id: String },

    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn StdError + Send + Sync>),
}

/// Object-safe persistence contract for template rows.
///
/// Writes are last-write-wins; there is no optimistic version check.
pub trait TemplateStore: Send + Sync {
    fn list<'a>(&'a self) -> BoxFuture<'a, Result<Vec<TemplateRecord>, StoreError>>;

    fn get<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<TemplateRecord, StoreError>>;

    fn insert<'a>(
        &'a self,
        record: NewTemplateRecord,
    ) -> BoxFuture<'a, Result<TemplateRecord, StoreError>>;

    fn update<'a>(
        &'a self,
        id: &'a str,
        patch: TemplateUpdate,
    ) -> BoxFuture<'a, Result<TemplateRecord, StoreError>>;

    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<(), StoreError>>;
}

#[derive(Debug, Default)]
/// In-memory [`TemplateStore`] with sequential ids.
pub struct MemoryTemplateStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    next_id: u64,
    rows: Vec<TemplateRecord>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn list<'a>(&'a self) -> BoxFuture<'a, Result<Vec<TemplateRecord>, StoreError>> {
        Box::pin(async move { Ok(self.lock().rows.clone()) })
    }

    fn get<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<TemplateRecord, StoreError>> {
        Box::pin(async move {
            self.lock()
                .rows
                .iter()
                .find(|row| row.id == id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound { id: id.to_owned() })
        })
    }

    fn insert<'a>(
        &'a self,
        record: NewTemplateRecord,
    ) -> BoxFuture<'a, Result<TemplateRecord, StoreError>> {
        Box::pin(async move {
            let mut inner = self.lock();
            inner.next_id += 1;
            let now = Utc::now();
            let row = TemplateRecord {
                id: inner.next_id.to_string(),
                name: record.name,
                category: record.category,
                language: record.language,
                status: record.status,
                header_text: record.header_text,
                body_text: record.body_text,
                footer_text: record.footer_text,
                buttons: record.buttons,
                variables: Vec::new(),
                provider_id: record.provider_id,
                created_at: now,
                updated_at: now,
            };
            inner.rows.push(row.clone());
            Ok(row)
        })
    }

    fn update<'a>(
        &'a self,
        id: &'a str,
        patch: TemplateUpdate,
    ) -> BoxFuture<'a, Result<TemplateRecord, StoreError>> {
        Box::pin(async move {
            let mut inner = self.lock();
            let row = inner
                .rows
                .iter_mut()
                .find(|row| row.id == id)
                .ok_or_else(|| StoreError::NotFound { id: id.to_owned() })?;

            if let Some(name) = patch.name {
                row.name = name;
            }
            if let Some(category) = patch.category {
                row.category = category;
            }
            if let Some(language) = patch.language {
                row.language = language;
            }
            if let Some(status) = patch.status {
                row.status = status;
            }
            if let Some(header_text) = patch.header_text {
                row.header_text = header_text;
            }
            if let Some(body_text) = patch.body_text {
                row.body_text = body_text;
            }
            if let Some(footer_text) = patch.footer_text {
                row.footer_text = footer_text;
            }
            if let Some(buttons) = patch.buttons {
                row.buttons = buttons;
            }
            if let Some(provider_id) = patch.provider_id {
                row.provider_id = Some(provider_id);
            }
            row.updated_at = Utc::now();

            Ok(row.clone())
        })
    }

    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let mut inner = self.lock();
            let before = inner.rows.len();
            inner.rows.retain(|row| row.id != id);
            if inner.rows.len() == before {
                return Err(StoreError::NotFound { id: id.to_owned() });
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_row(name: &str) -> NewTemplateRecord {
        NewTemplateRecord {
            name: name.to_owned(),
            category: Category::Marketing,
            language: "tr".to_owned(),
            status: TemplateStatus::Draft,
            header_text: Some("Merhaba".to_owned()),
            body_text: Some("Siparişiniz {{1}} yola çıktı".to_owned()),
            footer_text: None,
            buttons: vec![StoredButton::QuickReply {
                text: "Tamam".to_owned(),
            }],
            provider_id: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_timestamps() {
        let store = MemoryTemplateStore::new();

        let first = store.insert(draft_row("kargo_bildirimi")).await.unwrap();
        let second = store.insert(draft_row("hos_geldin")).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(first.created_at, first.updated_at);
        assert!(first.variables.is_empty());

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(store.get(&first.id).await.unwrap().name, "kargo_bildirimi");
    }

    #[tokio::test]
    async fn update_applies_partial_patch_and_clears_nullable_columns() {
        let store = MemoryTemplateStore::new();
        let row = store.insert(draft_row("kargo_bildirimi")).await.unwrap();

        let patched = store
            .update(
                &row.id,
                TemplateUpdate {
                    status: Some(TemplateStatus::Pending),
                    provider_id: Some("1407680676729941".to_owned()),
                    header_text: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(patched.status, TemplateStatus::Pending);
        assert_eq!(patched.provider_id.as_deref(), Some("1407680676729941"));
        assert_eq!(patched.header_text, None);
        // Untouched columns survive.
        assert_eq!(patched.name, "kargo_bildirimi");
        assert!(patched.updated_at >= patched.created_at);
    }

    #[tokio::test]
    async fn missing_ids_surface_not_found() {
        let store = MemoryTemplateStore::new();
        assert!(matches!(
            store.get("42").await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.update("42", TemplateUpdate::default()).await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete("42").await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let store = MemoryTemplateStore::new();
        let row = store.insert(draft_row("kargo_bildirimi")).await.unwrap();
        store.delete(&row.id).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[test]
    fn stored_buttons_round_trip_as_tagged_json() {
        let buttons = vec![
            StoredButton::QuickReply {
                text: "Evet".to_owned(),
            },
            StoredButton::Url {
                text: "Aç".to_owned(),
                url: "https://example.com".to_owned(),
            },
            StoredButton::Phone {
                text: "Ara".to_owned(),
                phone: "+905321234567".to_owned(),
            },
        ];

        let json = serde_json::to_string(&buttons).unwrap();
        assert!(json.contains(r#""type":"quick_reply""#));

        let decoded: Vec<StoredButton> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, buttons);
    }
}
