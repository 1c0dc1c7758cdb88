use std::fs::{self, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;
use crate::models::{Activity, Aval, InternalDocument, Member, Task};

pub type Result<T> = std::result::Result<T, StoreError>;

const SESSION_FILE: &str = "session.json";
const FILES_DIR: &str = "files";

/// The named collections the application persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Activities,
    Avales,
    Profiles,
    InternalDocuments,
    Tasks,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Activities,
        Collection::Avales,
        Collection::Profiles,
        Collection::InternalDocuments,
        Collection::Tasks,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Activities => "activities",
            Collection::Avales => "avales",
            Collection::Profiles => "profiles",
            Collection::InternalDocuments => "internal_documents",
            Collection::Tasks => "tasks",
        }
    }

    fn file_name(&self) -> String {
        format!("{}.json", self.name())
    }
}

/// A row that lives in one of the collections.
pub trait Record: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;

    fn id(&self) -> u64;
    fn set_id(&mut self, id: u64);

    /// Creation time used for newest-first listings. Records without one sort last.
    fn created_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

impl Record for Activity {
    const COLLECTION: Collection = Collection::Activities;
    fn id(&self) -> u64 { self.id }
    fn set_id(&mut self, id: u64) { self.id = id; }
    fn created_at(&self) -> Option<DateTime<Utc>> { Some(self.created_at) }
}

impl Record for Aval {
    const COLLECTION: Collection = Collection::Avales;
    fn id(&self) -> u64 { self.id }
    fn set_id(&mut self, id: u64) { self.id = id; }
    fn created_at(&self) -> Option<DateTime<Utc>> { Some(self.created_at) }
}

impl Record for Member {
    const COLLECTION: Collection = Collection::Profiles;
    fn id(&self) -> u64 { self.id }
    fn set_id(&mut self, id: u64) { self.id = id; }
}

impl Record for InternalDocument {
    const COLLECTION: Collection = Collection::InternalDocuments;
    fn id(&self) -> u64 { self.id }
    fn set_id(&mut self, id: u64) { self.id = id; }
    fn created_at(&self) -> Option<DateTime<Utc>> { Some(self.created_at) }
}

impl Record for Task {
    const COLLECTION: Collection = Collection::Tasks;
    fn id(&self) -> u64 { self.id }
    fn set_id(&mut self, id: u64) { self.id = id; }
}

/// JSON-file backed store. Each collection is one pretty-printed array.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Opens (and creates if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Store> {
        let root = root.into();
        if !root.exists() {
            fs::create_dir_all(&root)?;
        }
        Ok(Store { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, c: Collection) -> PathBuf {
        self.root.join(c.file_name())
    }

    pub(crate) fn session_path(&self) -> PathBuf {
        self.root.join(SESSION_FILE)
    }

    /// Reads a JSON file. Returns `None` if the file does not exist.
    pub(crate) fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let mut f = OpenOptions::new().read(true).open(path)?;
        let mut s = String::new();
        f.read_to_string(&mut s)?;
        if s.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&s)
            .map(Some)
            .map_err(|source| StoreError::Corrupt { path: path.to_path_buf(), source })
    }

    /// Writes a value as pretty JSON, overwriting the file.
    pub(crate) fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T, what: &'static str) -> Result<()> {
        let s = serde_json::to_string_pretty(value)
            .map_err(|source| StoreError::Encode { collection: what, source })?;
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        f.write_all(s.as_bytes())?;
        Ok(())
    }

    /// Loads every record of a collection, in insertion order.
    ///
    /// Returns an empty vector if the collection file does not exist yet.
    pub fn load_all<R: Record>(&self) -> Result<Vec<R>> {
        let path = self.collection_path(R::COLLECTION);
        let records: Vec<R> = self.read_json(&path)?.unwrap_or_default();
        tracing::debug!(collection = R::COLLECTION.name(), count = records.len(), "loaded collection");
        Ok(records)
    }

    /// Overwrites a collection with the given records.
    pub fn save_all<R: Record>(&self, records: &[R]) -> Result<()> {
        let path = self.collection_path(R::COLLECTION);
        self.write_json(&path, records, R::COLLECTION.name())?;
        tracing::debug!(collection = R::COLLECTION.name(), count = records.len(), "saved collection");
        Ok(())
    }

    /// Lists a collection newest first (by creation time, then by id).
    pub fn list_recent<R: Record>(&self) -> Result<Vec<R>> {
        let mut records = self.load_all::<R>()?;
        records.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(records)
    }

    /// Loads a single record by its id.
    pub fn get<R: Record>(&self, id: u64) -> Result<R> {
        self.load_all::<R>()?
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or(StoreError::NotFound { collection: R::COLLECTION.name(), id })
    }

    /// Inserts a record, assigning it the next free id. Returns the stored record.
    pub fn insert<R: Record>(&self, record: R) -> Result<R> {
        let mut inserted = self.insert_many(vec![record])?;
        Ok(inserted.remove(0))
    }

    /// Inserts several records with consecutive ids, preserving their order.
    pub fn insert_many<R: Record>(&self, new_records: Vec<R>) -> Result<Vec<R>> {
        let mut records = self.load_all::<R>()?;
        let mut next_id = records.iter().map(|r| r.id()).max().unwrap_or(0) + 1;
        let mut inserted = Vec::with_capacity(new_records.len());
        for mut r in new_records {
            r.set_id(next_id);
            next_id += 1;
            inserted.push(r);
        }
        records.extend(inserted.iter().cloned());
        self.save_all(&records)?;
        Ok(inserted)
    }

    /// Replaces the record with the same id.
    pub fn update<R: Record>(&self, record: &R) -> Result<()> {
        let mut records = self.load_all::<R>()?;
        match records.iter_mut().find(|r| r.id() == record.id()) {
            Some(r) => *r = record.clone(),
            None => {
                return Err(StoreError::NotFound { collection: R::COLLECTION.name(), id: record.id() });
            }
        }
        self.save_all(&records)
    }

    /// Copies a local file into the store's blob area.
    ///
    /// The file lands in `files/<bucket>/forms/<millis>_<name>`; the returned
    /// path is relative to the bucket (`forms/<millis>_<name>`). An existing
    /// blob is never overwritten: on a name clash a counter is appended to the
    /// timestamp (`forms/<millis>-<n>_<name>`).
    pub fn upload(&self, bucket: &str, source: &Path) -> Result<String> {
        if !source.is_file() {
            return Err(StoreError::MissingFile(source.to_path_buf()));
        }
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        fs::create_dir_all(self.blob_path(bucket, "forms"))?;

        let millis = Utc::now().timestamp_millis();
        let mut attempt = 0u32;
        loop {
            let relative = match attempt {
                0 => format!("forms/{}_{}", millis, file_name),
                n => format!("forms/{}-{}_{}", millis, n, file_name),
            };
            let dest = self.blob_path(bucket, &relative);
            match OpenOptions::new().write(true).create_new(true).open(&dest) {
                Ok(mut out) => {
                    let mut input = fs::File::open(source)?;
                    io::copy(&mut input, &mut out)?;
                    tracing::debug!(bucket, path = %relative, "uploaded file");
                    return Ok(relative);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Absolute location of an uploaded blob.
    pub fn blob_path(&self, bucket: &str, relative: &str) -> PathBuf {
        self.root.join(FILES_DIR).join(bucket).join(relative)
    }

    /// Deletes every collection, the session and all uploads.
    pub fn reset(&self) -> Result<()> {
        for c in Collection::ALL {
            let p = self.collection_path(c);
            if p.exists() {
                fs::remove_file(p)?;
            }
        }
        let session = self.session_path();
        if session.exists() {
            fs::remove_file(session)?;
        }
        let files = self.root.join(FILES_DIR);
        if files.exists() {
            fs::remove_dir_all(files)?;
        }
        Ok(())
    }
}
