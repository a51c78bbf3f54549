//! JSONL record storage
//!
//! Each record kind lives in its own file under `.workplan/`, one JSON object
//! per line. Reads take a shared lock, writes an exclusive one, and full
//! rewrites go through a temp file + rename.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{DependencyEdge, Project, ProjectId, Requirement, RequirementId, Task, TaskId};

/// A record that can be kept in a [`RecordStore`]
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Key the store deduplicates and sorts by
    type Key: Ord + Clone;

    /// File name under `.workplan/`
    const FILE_NAME: &'static str;

    /// Human name used in error messages
    const KIND: &'static str;

    fn key(&self) -> Self::Key;
}

impl Record for Project {
    type Key = ProjectId;
    const FILE_NAME: &'static str = "projects.jsonl";
    const KIND: &'static str = "project";

    fn key(&self) -> ProjectId {
        self.id
    }
}

impl Record for Requirement {
    type Key = RequirementId;
    const FILE_NAME: &'static str = "requirements.jsonl";
    const KIND: &'static str = "requirement";

    fn key(&self) -> RequirementId {
        self.id
    }
}

impl Record for Task {
    type Key = TaskId;
    const FILE_NAME: &'static str = "tasks.jsonl";
    const KIND: &'static str = "task";

    fn key(&self) -> TaskId {
        self.id
    }
}

impl Record for DependencyEdge {
    type Key = DependencyEdge;
    const FILE_NAME: &'static str = "dependencies.jsonl";
    const KIND: &'static str = "dependency";

    fn key(&self) -> DependencyEdge {
        *self
    }
}

/// Store for one record kind in JSONL format
pub struct RecordStore<T> {
    path: PathBuf,
    _record: PhantomData<T>,
}

impl<T: Record> RecordStore<T> {
    /// Creates a store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    /// Creates the default store inside a `.workplan/` directory
    pub fn in_dir(workplan_dir: &Path) -> Self {
        Self::new(workplan_dir.join(T::FILE_NAME))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all records, keyed and sorted
    ///
    /// A key that appears on several lines keeps its last line.
    pub fn read_all(&self) -> Result<BTreeMap<T::Key, T>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open {} store: {}", T::KIND, self.path.display()))?;

        file.lock_shared()
            .with_context(|| format!("Failed to acquire read lock on {} store", T::KIND))?;

        let reader = BufReader::new(&file);
        let mut records = BTreeMap::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let record: T = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse {} at line {}", T::KIND, line_num + 1))?;

            records.insert(record.key(), record);
        }

        Ok(records)
    }

    /// Reads all records as a vector in key order
    pub fn list(&self) -> Result<Vec<T>> {
        Ok(self.read_all()?.into_values().collect())
    }

    /// Looks up one record
    pub fn get(&self, key: &T::Key) -> Result<Option<T>> {
        Ok(self.read_all()?.remove(key))
    }

    /// Writes all records to the store (full rewrite)
    pub fn write_all(&self, records: &BTreeMap<T::Key, T>) -> Result<()> {
        self.ensure_parent()?;

        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            file.lock_exclusive()
                .with_context(|| format!("Failed to acquire write lock on {} store", T::KIND))?;

            let mut writer = BufWriter::new(&file);

            for record in records.values() {
                let line = serde_json::to_string(record)
                    .with_context(|| format!("Failed to serialize {}", T::KIND))?;
                writeln!(writer, "{}", line).with_context(|| format!("Failed to write {}", T::KIND))?;
            }

            writer
                .flush()
                .with_context(|| format!("Failed to flush {} store", T::KIND))?;
        }

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    /// Appends a single record without rewriting the file
    pub fn append(&self, record: &T) -> Result<()> {
        self.ensure_parent()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {} store: {}", T::KIND, self.path.display()))?;

        file.lock_exclusive()
            .with_context(|| format!("Failed to acquire write lock on {} store", T::KIND))?;

        let mut writer = BufWriter::new(&file);
        let line = serde_json::to_string(record)
            .with_context(|| format!("Failed to serialize {}", T::KIND))?;
        writeln!(writer, "{}", line).with_context(|| format!("Failed to write {}", T::KIND))?;

        writer
            .flush()
            .with_context(|| format!("Failed to flush {} store", T::KIND))?;

        Ok(())
    }

    /// Replaces a single record (reads all, updates, writes all)
    pub fn update(&self, record: &T) -> Result<()> {
        let mut records = self.read_all()?;
        records.insert(record.key(), record.clone());
        self.write_all(&records)
    }

    /// Removes a record by key, returning true if it existed
    pub fn remove(&self, key: &T::Key) -> Result<bool> {
        let mut records = self.read_all()?;
        let removed = records.remove(key).is_some();
        if removed {
            self.write_all(&records)?;
        }
        Ok(removed)
    }

    /// Keeps only the records matching `keep`, returning the ones dropped
    ///
    /// The file is rewritten only when something was dropped.
    pub fn retain(&self, mut keep: impl FnMut(&T) -> bool) -> Result<Vec<T>> {
        let (kept, dropped): (BTreeMap<T::Key, T>, BTreeMap<T::Key, T>) =
            self.read_all()?.into_iter().partition(|(_, record)| keep(record));

        if !dropped.is_empty() {
            self.write_all(&kept)?;
        }
        Ok(dropped.into_values().collect())
    }

    /// Rewrites the file with one line per key, dropping superseded lines
    pub fn compact(&self) -> Result<usize> {
        let records = self.read_all()?;
        let count = records.len();
        self.write_all(&records)?;
        Ok(count)
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, SlotPoint, TaskInterval, TaskStatus};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn make_task(seq: u32) -> Task {
        let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        Task::new(
            TaskId::new(seq),
            format!("Task {}", seq),
            "alice".parse().unwrap(),
            Priority::new(1).unwrap(),
            TaskInterval::new(SlotPoint::morning(day), SlotPoint::afternoon(day)).unwrap(),
        )
    }

    fn task_store(dir: &TempDir) -> RecordStore<Task> {
        RecordStore::in_dir(dir.path())
    }

    #[test]
    fn read_empty_store() {
        let dir = TempDir::new().unwrap();
        let tasks = task_store(&dir).read_all().unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn file_names_per_kind() {
        let dir = TempDir::new().unwrap();
        assert!(RecordStore::<Project>::in_dir(dir.path()).path().ends_with("projects.jsonl"));
        assert!(RecordStore::<DependencyEdge>::in_dir(dir.path())
            .path()
            .ends_with("dependencies.jsonl"));
    }

    #[test]
    fn write_and_read_tasks() {
        let dir = TempDir::new().unwrap();
        let store = task_store(&dir);

        let task1 = make_task(1);
        let task2 = make_task(2);

        let mut tasks = BTreeMap::new();
        tasks.insert(task2.id, task2.clone());
        tasks.insert(task1.id, task1.clone());
        store.write_all(&tasks).unwrap();

        let loaded = store.list().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, task1.id);
        assert_eq!(loaded[1].title, task2.title);
    }

    #[test]
    fn append_and_get() {
        let dir = TempDir::new().unwrap();
        let store = task_store(&dir);

        store.append(&make_task(1)).unwrap();
        store.append(&make_task(2)).unwrap();

        assert_eq!(store.read_all().unwrap().len(), 2);
        assert_eq!(store.get(&TaskId::new(2)).unwrap().unwrap().title, "Task 2");
        assert!(store.get(&TaskId::new(3)).unwrap().is_none());
    }

    #[test]
    fn update_task() {
        let dir = TempDir::new().unwrap();
        let store = task_store(&dir);

        let mut task = make_task(1);
        store.append(&task).unwrap();

        task.set_status(TaskStatus::InProgress);
        store.update(&task).unwrap();

        let loaded = store.get(&task.id).unwrap().unwrap();
        assert_eq!(loaded.status, TaskStatus::InProgress);
    }

    #[test]
    fn remove_edge() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::<DependencyEdge>::in_dir(dir.path());

        let edge = DependencyEdge::new(TaskId::new(1), TaskId::new(2));
        store.append(&edge).unwrap();
        store.append(&DependencyEdge::new(TaskId::new(2), TaskId::new(3))).unwrap();

        assert!(store.remove(&edge).unwrap());
        assert!(!store.remove(&edge).unwrap());
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn retain_returns_dropped_records() {
        let dir = TempDir::new().unwrap();
        let store = task_store(&dir);
        for seq in 1..=4 {
            store.append(&make_task(seq)).unwrap();
        }

        let dropped = store.retain(|t| t.id.seq() % 2 == 1).unwrap();
        let dropped: Vec<TaskId> = dropped.iter().map(|t| t.id).collect();
        assert_eq!(dropped, vec![TaskId::new(2), TaskId::new(4)]);

        let kept: Vec<TaskId> = store.list().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(kept, vec![TaskId::new(1), TaskId::new(3)]);
    }

    #[test]
    fn retain_everything_leaves_file_alone() {
        let dir = TempDir::new().unwrap();
        let store = task_store(&dir);
        store.append(&make_task(1)).unwrap();
        store.append(&make_task(1)).unwrap();

        assert!(store.retain(|_| true).unwrap().is_empty());
        // Superseded line is still there, nothing was rewritten
        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn last_line_wins_and_compact_dedupes() {
        let dir = TempDir::new().unwrap();
        let store = task_store(&dir);

        let mut task = make_task(1);
        store.append(&task).unwrap();
        task.set_status(TaskStatus::Done);
        store.append(&task).unwrap();

        assert_eq!(store.get(&task.id).unwrap().unwrap().status, TaskStatus::Done);
        assert_eq!(store.compact().unwrap(), 1);

        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::<Task>::new(dir.path().join("nested").join("tasks.jsonl"));
        store.append(&make_task(1)).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = task_store(&dir);

        let task = make_task(1);
        let mut tasks = BTreeMap::new();
        tasks.insert(task.id, task);
        store.write_all(&tasks).unwrap();

        assert!(!store.path().with_extension("jsonl.tmp").exists());
    }

    #[test]
    fn corrupt_line_reports_position() {
        let dir = TempDir::new().unwrap();
        let store = task_store(&dir);
        fs::write(store.path(), "{not json}\n").unwrap();

        let err = store.read_all().unwrap_err();
        assert!(format!("{:#}", err).contains("line 1"));
    }

    #[test]
    fn inverted_interval_on_disk_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = task_store(&dir);

        let mut line = serde_json::to_value(make_task(1)).unwrap();
        line["interval"]["start"]["date"] = "2024-03-08".into();
        fs::write(store.path(), format!("{}\n", line)).unwrap();

        let err = store.read_all().unwrap_err();
        assert!(format!("{:#}", err).contains("ends before it starts"));
    }
}
