use contact_similarity::dto::Record;
use contact_similarity::error::DuplicateKeyError;
use rustc_hash::FxHashMap;

const KEY_SEPARATOR: char = '\u{1f}';

///
/// Contacts keyed by their five text fields. Built once, read-only afterwards.
///
pub struct RecordIndex {
    records: FxHashMap<String, Record>,
}

impl RecordIndex {
    ///
    /// Builds the index in a single pass over `records`.
    ///
    /// ## Errors
    ///
    /// Fails on the first record whose composite key is already present; nothing
    /// built so far is returned.
    ///
    pub fn build<I>(records: I) -> Result<Self, DuplicateKeyError>
    where
        I: IntoIterator<Item = Record>,
    {
        let records = records.into_iter();
        let mut map: FxHashMap<String, Record> =
            FxHashMap::with_capacity_and_hasher(records.size_hint().0, Default::default());
        for record in records {
            let key = composite_key(&record);
            if map.contains_key(&key) {
                return Err(DuplicateKeyError { id: record.id });
            }
            map.insert(key, record);
        }
        Ok(RecordIndex { records: map })
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in map iteration order, which is not stable across builds.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }
}

/// Joins the five text fields with the unit separator, so `"a-b" + "c"` and
/// `"a" + "b-c"` stay distinct.
pub fn composite_key(record: &Record) -> String {
    let fields = [
        record.first_name.as_str(),
        record.last_name.as_str(),
        record.email.as_str(),
        record.zip_code.as_str(),
        record.address.as_str(),
    ];
    let mut key = String::with_capacity(fields.iter().map(|f| f.len() + 1).sum());
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            key.push(KEY_SEPARATOR);
        }
        key.push_str(field);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(id: i64, first_name: &str, last_name: &str) -> Record {
        Record {
            id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: format!("{}@x.com", first_name.to_lowercase()),
            zip_code: "12345".to_string(),
            address: "123 Main St".to_string(),
        }
    }

    #[test]
    fn builds_and_looks_up_by_key() {
        let records = vec![contact(1, "John", "Doe"), contact(2, "Jane", "Doe")];
        let index = RecordIndex::build(records.clone()).unwrap();
        assert_eq!(index.len(), 2);
        assert!(!index.is_empty());
        let found = index.get(&composite_key(&records[1])).unwrap();
        assert_eq!(found.id, 2);
        assert!(index.get("missing").is_none());
    }

    #[test]
    fn rejects_duplicate_fields_with_new_id() {
        let records = vec![
            contact(1, "John", "Doe"),
            contact(2, "Jane", "Doe"),
            contact(3, "John", "Doe"),
        ];
        let err = RecordIndex::build(records).err().unwrap();
        assert_eq!(err, DuplicateKeyError { id: 3 });
    }

    #[test]
    fn same_id_different_fields_is_accepted() {
        let index = RecordIndex::build(vec![contact(7, "John", "Doe"), contact(7, "Jon", "Doe")]);
        assert_eq!(index.unwrap().len(), 2);
    }

    #[test]
    fn empty_fields_are_accepted() {
        let index = RecordIndex::build(vec![Record::default()]).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(composite_key(&Record::default()), "\u{1f}\u{1f}\u{1f}\u{1f}");
    }

    #[test]
    fn separator_prevents_field_aliasing() {
        let a = Record {
            first_name: "a-b".to_string(),
            last_name: "c".to_string(),
            ..Default::default()
        };
        let b = Record {
            first_name: "a".to_string(),
            last_name: "b-c".to_string(),
            ..Default::default()
        };
        assert_ne!(composite_key(&a), composite_key(&b));
        assert!(RecordIndex::build(vec![a, b]).is_ok());
    }
}
