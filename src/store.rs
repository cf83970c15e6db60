//! Where group books live between requests.
//!
//! Books are stored whole, one document per group, and every change is a
//! read-modify-write of that document. Concurrent writers to the same group
//! get last-write-wins semantics on the MongoDB backend.
use std::collections::HashMap;

use bson::doc;
use futures::TryStreamExt;
use mongodb::{Client, Collection};
use tokio::sync::RwLock;

use crate::error::{LedgerError, StoreError};
use crate::schemas::GroupBook;
use crate::settings::Storage;

#[derive(Debug, Default)]
pub struct MemoryStore {
    books: RwLock<HashMap<String, GroupBook>>,
}

#[derive(Clone)]
pub struct MongoStore {
    groups: Collection<GroupBook>,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        Ok(MongoStore {
            groups: client.database(database).collection("Groups"),
        })
    }

    async fn find(&self, id: &str) -> Result<Option<GroupBook>, StoreError> {
        Ok(self.groups.find_one(doc! { "id": id }, None).await?)
    }

    async fn list(&self) -> Result<Vec<GroupBook>, StoreError> {
        let cursor = self.groups.find(None, None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert(&self, book: &GroupBook) -> Result<(), StoreError> {
        self.groups.insert_one(book, None).await?;
        Ok(())
    }

    async fn replace(&self, book: &GroupBook) -> Result<(), StoreError> {
        self.groups
            .replace_one(doc! { "id": book.id() }, book, None)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let result = self.groups.delete_one(doc! { "id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }
}

pub enum Store {
    Memory(MemoryStore),
    Mongo(MongoStore),
}

impl Store {
    pub fn memory() -> Self {
        Store::Memory(MemoryStore::default())
    }

    pub async fn connect(storage: &Storage) -> Result<Self, StoreError> {
        match storage {
            Storage::Memory => Ok(Store::memory()),
            Storage::Mongo { uri, database } => {
                tracing::info!("connecting to mongodb database `{database}`");
                Ok(Store::Mongo(MongoStore::connect(uri, database).await?))
            }
        }
    }

    pub async fn list(&self) -> Result<Vec<GroupBook>, LedgerError> {
        match self {
            Store::Memory(memory) => {
                let mut books: Vec<GroupBook> = memory.books.read().await.values().cloned().collect();
                books.sort_by(|a, b| a.group.created_at.cmp(&b.group.created_at));
                Ok(books)
            }
            Store::Mongo(mongo) => Ok(mongo.list().await?),
        }
    }

    pub async fn get(&self, id: &str) -> Result<GroupBook, LedgerError> {
        let book = match self {
            Store::Memory(memory) => memory.books.read().await.get(id).cloned(),
            Store::Mongo(mongo) => mongo.find(id).await?,
        };
        book.ok_or_else(|| LedgerError::GroupNotFound(id.to_string()))
    }

    pub async fn insert(&self, book: GroupBook) -> Result<GroupBook, LedgerError> {
        match self {
            Store::Memory(memory) => {
                let mut books = memory.books.write().await;
                if books.contains_key(book.id()) {
                    return Err(LedgerError::GroupExists(book.id().to_string()));
                }
                books.insert(book.id().to_string(), book.clone());
            }
            Store::Mongo(mongo) => {
                if mongo.find(book.id()).await?.is_some() {
                    return Err(LedgerError::GroupExists(book.id().to_string()));
                }
                mongo.insert(&book).await?;
            }
        }
        Ok(book)
    }

    /// Deletes a group together with its expenses and settlements.
    pub async fn delete(&self, id: &str) -> Result<(), LedgerError> {
        let deleted = match self {
            Store::Memory(memory) => memory.books.write().await.remove(id).is_some(),
            Store::Mongo(mongo) => mongo.delete(id).await?,
        };
        if deleted {
            Ok(())
        } else {
            Err(LedgerError::GroupNotFound(id.to_string()))
        }
    }

    /// Applies `change` to the book and saves it. Nothing is written when
    /// `change` fails.
    pub async fn update<T, F>(&self, id: &str, change: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut GroupBook) -> Result<T, LedgerError>,
    {
        match self {
            Store::Memory(memory) => {
                let mut books = memory.books.write().await;
                let stored = books
                    .get_mut(id)
                    .ok_or_else(|| LedgerError::GroupNotFound(id.to_string()))?;
                let mut book = stored.clone();
                let value = change(&mut book)?;
                *stored = book;
                Ok(value)
            }
            Store::Mongo(mongo) => {
                let mut book = mongo
                    .find(id)
                    .await?
                    .ok_or_else(|| LedgerError::GroupNotFound(id.to_string()))?;
                let value = change(&mut book)?;
                mongo.replace(&book).await?;
                Ok(value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{NewGroup, NewMember};
    use crate::schemas::{Currency, GroupCategory};
    use chrono::Utc;

    fn book(id: &str) -> GroupBook {
        GroupBook::create(
            id,
            NewGroup {
                name: format!("group {id}"),
                description: None,
                category: GroupCategory::Home,
                currency: Currency::Usd,
                members: vec![NewMember { name: "Jordan".into(), email: None }],
            },
            Utc::now(),
        )
    }

    #[actix_web::test]
    async fn insert_then_get() {
        let store = Store::memory();
        store.insert(book("home")).await.unwrap();

        let loaded = store.get("home").await.unwrap();
        assert_eq!(loaded.group.name, "group home");
        assert!(matches!(
            store.insert(book("home")).await,
            Err(LedgerError::GroupExists(_))
        ));
        assert!(matches!(store.get("nope").await, Err(LedgerError::GroupNotFound(_))));
    }

    #[actix_web::test]
    async fn failed_update_leaves_book_untouched() {
        let store = Store::memory();
        store.insert(book("home")).await.unwrap();

        let result: Result<(), _> = store
            .update("home", |book| {
                book.group.name = "changed".into();
                Err(LedgerError::SelfSettlement)
            })
            .await;
        assert!(result.is_err());
        assert_eq!(store.get("home").await.unwrap().group.name, "group home");

        store
            .update("home", |book| {
                book.group.name = "changed".into();
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(store.get("home").await.unwrap().group.name, "changed");
    }

    #[actix_web::test]
    async fn delete_removes_the_whole_book() {
        let store = Store::memory();
        store.insert(book("a")).await.unwrap();
        store.insert(book("b")).await.unwrap();

        store.delete("a").await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
        assert!(matches!(store.delete("a").await, Err(LedgerError::GroupNotFound(_))));
    }
}
