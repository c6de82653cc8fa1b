//! In-memory task repository shared by the RPC and REST request paths

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use todo_daemon_core::{build_update, Error, FieldMask, Result, Task, TaskCreate, TaskPatch};

/// Demo entries used when the daemon is started with seeding enabled
pub const DEMO_TASKS: [&str; 3] = [
    "Get some milk 🥛",
    "Walk the dog 🐕",
    "Take over the world! 🌍",
];

/// Operations for querying and modifying tasks.
///
/// Implementations hand out copies; a returned `Task` never aliases stored
/// state.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// All tasks, oldest first
    async fn list(&self) -> Vec<Task>;

    /// Store a new task under a freshly allocated identifier
    async fn create(&self, task: TaskCreate) -> Result<Task>;

    /// Apply the masked fields of `update` to the task with the given ID.
    ///
    /// Returns `Error::TaskNotFound` if there is no such task.
    async fn update(&self, id: &str, update: &TaskPatch, fields: &FieldMask) -> Result<Task>;

    /// Remove the task with the given ID.
    ///
    /// Returns `Error::TaskNotFound` if there is no such task.
    async fn delete(&self, id: &str) -> Result<()>;
}

struct StoredTask {
    // Creation order, breaks ties between equal `created_at` values
    seq: u64,
    task: Task,
}

struct StoreInner {
    tasks: HashMap<String, StoredTask>,
    next_id: u64,
}

/// A `TaskRepository` keeping everything in a map behind one mutex.
///
/// Every operation holds the lock for its whole read-modify-write sequence
/// and never awaits while holding it.
pub struct InMemoryTaskStore {
    inner: Mutex<StoreInner>,
    clock: fn() -> DateTime<Utc>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    /// Create a store whose timestamps come from `clock`
    pub fn with_clock(clock: fn() -> DateTime<Utc>) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                tasks: HashMap::new(),
                next_id: 0,
            }),
            clock,
        }
    }

    /// Create a store pre-filled with the demo tasks
    pub fn with_demo_tasks() -> Self {
        let store = Self::new();
        for summary in DEMO_TASKS {
            store.insert(summary.to_string());
        }
        store
    }

    pub fn len(&self) -> usize {
        self.inner.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, summary: String) -> Task {
        let mut inner = self.inner.lock();
        // Identifiers come from a dedicated counter so they are never reused,
        // not even after deletions
        inner.next_id += 1;
        let seq = inner.next_id;
        let task = Task::new(seq.to_string(), summary, (self.clock)());
        inner.tasks.insert(
            task.id.clone(),
            StoredTask {
                seq,
                task: task.clone(),
            },
        );
        task
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskStore {
    async fn list(&self) -> Vec<Task> {
        let inner = self.inner.lock();
        let mut entries: Vec<&StoredTask> = inner.tasks.values().collect();
        entries.sort_by(|a, b| {
            a.task
                .created_at
                .cmp(&b.task.created_at)
                .then(a.seq.cmp(&b.seq))
        });
        entries.into_iter().map(|e| e.task.clone()).collect()
    }

    async fn create(&self, task: TaskCreate) -> Result<Task> {
        task.validate()?;
        Ok(self.insert(task.summary))
    }

    async fn update(&self, id: &str, update: &TaskPatch, fields: &FieldMask) -> Result<Task> {
        let update = build_update(update, fields);

        let mut inner = self.inner.lock();
        let entry = inner
            .tasks
            .get_mut(id)
            .ok_or_else(|| Error::task_not_found(id))?;
        entry.task.apply(&update, (self.clock)())?;
        Ok(entry.task.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        match inner.tasks.remove(id) {
            Some(_) => Ok(()),
            None => Err(Error::task_not_found(id)),
        }
    }
}
