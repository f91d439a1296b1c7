use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

use crate::{Document, StoreError, StoreResult, ID_FIELD};

/// Documents of one collection keyed by `_id`, kept in insertion order.
type Collection = IndexMap<String, Document>;

/// Backend-independent state shared by the memory and file stores.
#[derive(Debug, Clone, Default)]
pub(crate) struct Collections {
    collections: IndexMap<String, Collection>,
}

impl Collections {
    pub(crate) fn insert(&mut self, name: &str, mut document: Document) -> StoreResult<Document> {
        let id = match document.get(ID_FIELD) {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(other) => {
                return Err(StoreError::Backend(format!(
                    "invalid {ID_FIELD} value {other} in collection '{name}'"
                )))
            }
            None => Uuid::now_v7().to_string(),
        };

        let collection = self.collections.entry(name.to_string()).or_default();
        if collection.contains_key(&id) {
            return Err(StoreError::Backend(format!(
                "duplicate key {ID_FIELD}={id} in collection '{name}'"
            )));
        }

        document.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        collection.insert(id, document.clone());
        Ok(document)
    }

    pub(crate) fn find_all(&self, name: &str) -> Vec<Document> {
        self.collections
            .get(name)
            .map(|collection| collection.values().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn find_by_id(&self, name: &str, id: &str) -> Option<Document> {
        self.collections.get(name)?.get(id).cloned()
    }

    pub(crate) fn update(&mut self, name: &str, id: &str, changes: Document) -> Option<Document> {
        let document = self.collections.get_mut(name)?.get_mut(id)?;
        for (field, value) in changes {
            // `_id` is immutable once assigned.
            if field != ID_FIELD {
                document.insert(field, value);
            }
        }
        Some(document.clone())
    }

    pub(crate) fn delete(&mut self, name: &str, id: &str) -> Option<Document> {
        // shift_remove keeps the remaining documents in insertion order.
        self.collections.get_mut(name)?.shift_remove(id)
    }

    /// Flatten into `{collection: [documents...]}` for persistence.
    pub(crate) fn to_value(&self) -> Value {
        let snapshot = self
            .collections
            .iter()
            .map(|(name, collection)| {
                let documents = collection.values().cloned().map(Value::Object).collect();
                (name.clone(), Value::Array(documents))
            })
            .collect::<serde_json::Map<_, _>>();
        Value::Object(snapshot)
    }

    /// Rebuild from the persisted `{collection: [documents...]}` layout.
    pub(crate) fn from_value(value: Value) -> StoreResult<Self> {
        let Value::Object(snapshot) = value else {
            return Err(StoreError::Backend(
                "store file must contain a JSON object of collections".to_string(),
            ));
        };

        let mut collections = Self::default();
        for (name, documents) in snapshot {
            let Value::Array(documents) = documents else {
                return Err(StoreError::Backend(format!(
                    "collection '{name}' must be a JSON array"
                )));
            };

            collections.collections.entry(name.clone()).or_default();
            for document in documents {
                let Value::Object(document) = document else {
                    return Err(StoreError::Backend(format!(
                        "collection '{name}' contains a non-object document"
                    )));
                };
                if !matches!(document.get(ID_FIELD), Some(Value::String(_))) {
                    return Err(StoreError::Backend(format!(
                        "collection '{name}' contains a document without {ID_FIELD}"
                    )));
                }
                collections.insert(&name, document)?;
            }
        }

        Ok(collections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn insert_assigns_unique_ids() {
        let mut collections = Collections::default();
        let first = collections.insert("books", doc(json!({"title": "Dune"}))).unwrap();
        let second = collections.insert("books", doc(json!({"title": "Emma"}))).unwrap();

        let first_id = first[ID_FIELD].as_str().unwrap();
        let second_id = second[ID_FIELD].as_str().unwrap();
        assert!(!first_id.is_empty());
        assert_ne!(first_id, second_id);
    }

    #[test]
    fn insert_rejects_duplicate_id() {
        let mut collections = Collections::default();
        collections
            .insert("books", doc(json!({"_id": "a", "title": "Dune"})))
            .unwrap();
        let err = collections
            .insert("books", doc(json!({"_id": "a", "title": "Emma"})))
            .unwrap_err();
        assert!(err.to_string().contains("duplicate key"));
    }

    #[test]
    fn delete_preserves_insertion_order() {
        let mut collections = Collections::default();
        for title in ["a", "b", "c", "d"] {
            collections
                .insert("books", doc(json!({"_id": title, "title": title})))
                .unwrap();
        }

        collections.delete("books", "b").unwrap();

        let titles: Vec<_> = collections
            .find_all("books")
            .into_iter()
            .map(|d| d["title"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(titles, vec!["a", "c", "d"]);
    }

    #[test]
    fn update_never_rewrites_id() {
        let mut collections = Collections::default();
        collections
            .insert("books", doc(json!({"_id": "a", "title": "Dune"})))
            .unwrap();

        let updated = collections
            .update("books", "a", doc(json!({"_id": "b", "title": "Dune Messiah"})))
            .unwrap();

        assert_eq!(updated[ID_FIELD], "a");
        assert_eq!(updated["title"], "Dune Messiah");
        assert!(collections.find_by_id("books", "b").is_none());
    }

    #[test]
    fn snapshot_layout_round_trips() {
        let mut collections = Collections::default();
        collections
            .insert("books", doc(json!({"_id": "a", "title": "Dune"})))
            .unwrap();
        collections
            .insert("books", doc(json!({"_id": "b", "title": "Emma"})))
            .unwrap();

        let value = collections.to_value();
        assert_eq!(value["books"][1]["title"], "Emma");

        let restored = Collections::from_value(value).unwrap();
        assert_eq!(restored.find_all("books"), collections.find_all("books"));
    }

    #[test]
    fn snapshot_without_ids_is_rejected() {
        let err = Collections::from_value(json!({"books": [{"title": "Dune"}]})).unwrap_err();
        assert!(err.to_string().contains("without _id"));
    }
}
