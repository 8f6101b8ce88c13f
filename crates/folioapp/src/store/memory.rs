use super::mem_backend::MemBackend;
use super::record_store::RecordStore;

pub type InMemoryStore = RecordStore<MemBackend>;

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        RecordStore::with_backend(MemBackend::new())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{Author, FolderRecord, ItemKind, ItemRecord, Scope};
    use crate::owner::{OwnerFilter, OwnerValue};
    use crate::store::DataStore;
    use chrono::Utc;

    /// Seeds an [`InMemoryStore`] with adjacency records for one owner.
    pub struct StoreFixture {
        pub store: InMemoryStore,
        pub owner: String,
        pub scope: Scope,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new("owner-1")
        }
    }

    impl StoreFixture {
        pub fn new(owner: &str) -> Self {
            Self {
                store: InMemoryStore::new(),
                owner: owner.to_string(),
                scope: Scope::Local,
            }
        }

        pub fn filter(&self) -> OwnerFilter {
            OwnerFilter::new(&self.owner)
        }

        pub fn with_folder(mut self, id: &str, name: &str, parent: &str) -> Self {
            let now = Utc::now();
            let record = FolderRecord {
                owner_id: OwnerValue::from(self.owner.as_str()),
                id: id.to_string(),
                name: name.to_string(),
                parent_id: parent.to_string(),
                scope: self.scope,
                author: Author::default(),
                starred: false,
                trashed_at: None,
                created_at: now,
                updated_at: now,
            };
            self.store.insert_folder(self.scope, record).unwrap();
            self
        }

        pub fn with_text_item(mut self, id: &str, folder: &str, content: &str) -> Self {
            let now = Utc::now();
            let record = ItemRecord {
                owner_id: OwnerValue::from(self.owner.as_str()),
                id: id.to_string(),
                folder_id: folder.to_string(),
                kind: ItemKind::Text,
                name: None,
                url: None,
                file_name: None,
                content: Some(content.to_string()),
                scope: self.scope,
                author: Author::default(),
                starred: false,
                trashed_at: None,
                created_at: now,
                updated_at: now,
            };
            let owner = self.filter();
            self.store.upsert_item(self.scope, &owner, record).unwrap();
            self
        }
    }
}
