use chrono::Utc;

use super::{Collection, Document, Fields, RecordStore, generate_id, merge_patch, stamp_created};
use crate::error::{BoardError, Result};

#[derive(Debug, Clone)]
struct Row {
    collection: Collection,
    seq: u64,
    doc: Document,
}

/// In-process store for tests and dry runs.
///
/// [`MemoryStore::set_unavailable`] makes every call fail with
/// `StoreUnavailable`, which exercises read degradation.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    rows: Vec<Row>,
    next_seq: u64,
    unavailable: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    fn check(&self) -> Result<()> {
        if self.unavailable {
            return Err(BoardError::StoreUnavailable(
                "memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn find_mut(&mut self, collection: Collection, id: &str) -> Result<&mut Row> {
        self.rows
            .iter_mut()
            .find(|row| row.collection == collection && row.doc.id == id)
            .ok_or_else(|| BoardError::NotFound {
                collection: collection.as_str(),
                id: id.to_string(),
            })
    }
}

impl RecordStore for MemoryStore {
    fn append(&mut self, collection: Collection, mut fields: Fields) -> Result<Document> {
        self.check()?;
        let now = Utc::now();
        stamp_created(&mut fields, now);
        let doc = Document {
            id: generate_id(collection, now),
            created_at: now,
            fields,
        };
        self.next_seq += 1;
        self.rows.push(Row {
            collection,
            seq: self.next_seq,
            doc: doc.clone(),
        });
        Ok(doc)
    }

    fn fetch_all(&self, collection: Collection) -> Result<Vec<Document>> {
        self.check()?;
        let mut rows: Vec<&Row> = self
            .rows
            .iter()
            .filter(|row| row.collection == collection)
            .collect();
        rows.sort_by(|a, b| {
            b.doc
                .created_at
                .cmp(&a.doc.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(rows.into_iter().map(|row| row.doc.clone()).collect())
    }

    fn patch(&mut self, collection: Collection, id: &str, fields: Fields) -> Result<()> {
        self.check()?;
        let row = self.find_mut(collection, id)?;
        merge_patch(&mut row.doc.fields, fields);
        Ok(())
    }

    fn delete(&mut self, collection: Collection, id: &str) -> Result<()> {
        self.check()?;
        let before = self.rows.len();
        self.rows
            .retain(|row| !(row.collection == collection && row.doc.id == id));
        if self.rows.len() == before {
            return Err(BoardError::NotFound {
                collection: collection.as_str(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
