//! File system storage for post comments

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tl_core::comment::{CommentRecord, NewComment};
use tl_core::error::{Result, ThreadlineError};
use tl_core::store::{CommentSink, CommentSource};
use tl_core::types::{Author, CommentId, PostId};
use tracing::{debug, info};

/// On-disk layout version of post files
pub const STORE_SCHEMA_VERSION: u32 = 1;

/// Comments of one post as stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct PostFile {
    schema_version: u32,
    post_id: PostId,
    #[serde(default)]
    comments: Vec<CommentRecord>,
}

impl PostFile {
    fn new(post_id: PostId) -> Self {
        Self {
            schema_version: STORE_SCHEMA_VERSION,
            post_id,
            comments: Vec::new(),
        }
    }
}

/// Id allocation state shared by all posts
#[derive(Debug, Serialize, Deserialize)]
struct Counter {
    next_id: i64,
}

impl Default for Counter {
    fn default() -> Self {
        Self { next_id: 1 }
    }
}

/// File system based comment storage
pub struct FileSystemStorage {
    /// Base directory for comment storage
    base_dir: PathBuf,
    /// Posts subdirectory
    posts_dir: PathBuf,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileSystemStorage {
    /// Create a new file system storage
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        let posts_dir = base_dir.join("posts");

        let storage = Self {
            base_dir,
            posts_dir,
            write_lock: Mutex::new(()),
        };

        storage.ensure_dirs()?;
        Ok(storage)
    }

    /// Create storage with default directory (~/.threadline)
    pub fn default_location() -> Result<Self> {
        let base_dir = directories::ProjectDirs::from("com", "threadline", "threadline")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".threadline")
            });

        Self::new(base_dir)
    }

    /// Ensure required directories exist
    fn ensure_dirs(&self) -> Result<()> {
        if !self.posts_dir.exists() {
            fs::create_dir_all(&self.posts_dir).map_err(|e| {
                ThreadlineError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create posts directory: {}", e),
                ))
            })?;
            debug!("Created posts directory: {:?}", self.posts_dir);
        }
        Ok(())
    }

    /// Get the path for a post file
    fn post_path(&self, post_id: PostId) -> PathBuf {
        self.posts_dir.join(format!("{}.json", post_id))
    }

    /// Get the path of the id counter
    fn counter_path(&self) -> PathBuf {
        self.base_dir.join("counter.json")
    }

    /// Write JSON atomically (write to temp, then rename)
    fn atomic_write<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("store");
        let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

        let temp_file = fs::File::create(&temp_path).map_err(|e| {
            ThreadlineError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create temp file: {}", e),
            ))
        })?;
        let mut writer = BufWriter::new(temp_file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;

        // Rename to final path (atomic on most filesystems)
        fs::rename(&temp_path, path).map_err(|e| {
            // Clean up temp file on failure
            let _ = fs::remove_file(&temp_path);
            ThreadlineError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to rename temp file: {}", e),
            ))
        })?;

        Ok(())
    }

    /// Read a post file; a post nobody commented on yet has no file
    fn read_post(&self, post_id: PostId) -> Result<PostFile> {
        let path = self.post_path(post_id);
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(PostFile::new(post_id)),
            Err(e) => return Err(ThreadlineError::Io(e)),
        };

        let post: PostFile = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            ThreadlineError::from(e).with_context(format!("Corrupt post file {:?}", path))
        })?;

        if post.schema_version > STORE_SCHEMA_VERSION {
            return Err(ThreadlineError::Store(format!(
                "Post file {:?} has unsupported schema version {}",
                path, post.schema_version
            )));
        }
        Ok(post)
    }

    fn read_counter(&self) -> Result<Counter> {
        let path = self.counter_path();
        if !path.exists() {
            return Ok(Counter::default());
        }
        let file = fs::File::open(&path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Check if any comment was stored for a post
    pub fn exists(&self, post_id: PostId) -> bool {
        self.post_path(post_id).exists()
    }

    /// Get base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get posts directory
    pub fn posts_dir(&self) -> &PathBuf {
        &self.posts_dir
    }
}

impl CommentSource for FileSystemStorage {
    fn fetch(&self, post_id: PostId) -> Result<Vec<CommentRecord>> {
        let mut records = self.read_post(post_id)?.comments;
        // Stable, so equal timestamps keep insertion order
        records.sort_by_key(|r| r.created_at);
        debug!("Fetched {} comments for post {}", records.len(), post_id);
        Ok(records)
    }
}

impl CommentSink for FileSystemStorage {
    fn create(&self, comment: &NewComment, author: &Author) -> Result<CommentId> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| ThreadlineError::Store("Store lock poisoned".to_string()))?;

        let mut counter = self.read_counter()?;
        let id = CommentId(counter.next_id);
        counter.next_id += 1;

        let mut post = self.read_post(comment.post_id)?;
        post.comments
            .push(comment.to_record(id, author, Utc::now()));

        // Persist the counter first so a crash can only skip an id, never reuse one
        self.atomic_write(&self.counter_path(), &counter)?;
        self.atomic_write(&self.post_path(comment.post_id), &post)?;

        info!("Stored comment {} on post {}", id, comment.post_id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tl_core::comment::{comments_from_records, NewCommentBuilder};
    use tl_core::types::AuthorId;

    fn create_test_storage() -> (FileSystemStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileSystemStorage::new(temp_dir.path()).unwrap();
        (storage, temp_dir)
    }

    fn author() -> Author {
        Author::new(AuthorId::new(), "alice")
    }

    fn root(post: i64, content: &str) -> NewComment {
        NewCommentBuilder::root(PostId(post)).content(content).build().unwrap()
    }

    #[test]
    fn test_storage_creation() {
        let (storage, _temp) = create_test_storage();
        assert!(storage.posts_dir().exists());
    }

    #[test]
    fn test_post_path() {
        let (storage, _temp) = create_test_storage();
        let path = storage.post_path(PostId(12));
        assert!(path.to_string_lossy().ends_with("12.json"));
    }

    #[test]
    fn test_fetch_unknown_post_is_empty() {
        let (storage, _temp) = create_test_storage();
        assert!(storage.fetch(PostId(1)).unwrap().is_empty());
        assert!(!storage.exists(PostId(1)));
    }

    #[test]
    fn test_create_and_fetch() {
        let (storage, _temp) = create_test_storage();
        let alice = author();

        let first = storage.create(&root(1, "first"), &alice).unwrap();
        let reply = NewCommentBuilder::reply(PostId(1), first)
            .content("reply")
            .build()
            .unwrap();
        let second = storage.create(&reply, &alice).unwrap();

        let records = storage.fetch(PostId(1)).unwrap();
        assert_eq!(records.len(), 2);

        let comments = comments_from_records(PostId(1), records);
        assert_eq!(comments[0].id, first);
        assert_eq!(comments[1].id, second);
        assert_eq!(comments[1].parent_id, Some(first));
        assert_eq!(comments[1].author_name, "alice");
    }

    #[test]
    fn test_ids_unique_across_posts() {
        let (storage, _temp) = create_test_storage();
        let alice = author();

        let a = storage.create(&root(1, "a"), &alice).unwrap();
        let b = storage.create(&root(2, "b"), &alice).unwrap();
        let c = storage.create(&root(1, "c"), &alice).unwrap();

        assert_eq!((a, b, c), (CommentId(1), CommentId(2), CommentId(3)));
        assert_eq!(storage.fetch(PostId(1)).unwrap().len(), 2);
        assert_eq!(storage.fetch(PostId(2)).unwrap().len(), 1);
    }

    #[test]
    fn test_ids_survive_reopen() {
        let temp = TempDir::new().unwrap();
        let alice = author();

        FileSystemStorage::new(temp.path())
            .unwrap()
            .create(&root(1, "a"), &alice)
            .unwrap();
        let id = FileSystemStorage::new(temp.path())
            .unwrap()
            .create(&root(1, "b"), &alice)
            .unwrap();

        assert_eq!(id, CommentId(2));
    }

    #[test]
    fn test_fetch_sorts_by_created_at() {
        let (storage, _temp) = create_test_storage();
        let alice = author();
        let earlier = Utc::now();
        let later = earlier + chrono::Duration::seconds(10);

        // Stored out of order on disk
        let mut post = PostFile::new(PostId(1));
        post.comments.push(root(1, "b").to_record(CommentId(2), &alice, later));
        post.comments.push(root(1, "a").to_record(CommentId(1), &alice, earlier));
        storage.atomic_write(&storage.post_path(PostId(1)), &post).unwrap();

        let records = storage.fetch(PostId(1)).unwrap();
        assert_eq!(records[0].content.as_deref(), Some("a"));
        assert_eq!(records[1].content.as_deref(), Some("b"));
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let (storage, _temp) = create_test_storage();
        storage.create(&root(1, "a"), &author()).unwrap();

        let temp_path = storage.posts_dir().join(".1.json.tmp");
        assert!(!temp_path.exists());

        let content = fs::read_to_string(storage.post_path(PostId(1))).unwrap();
        assert!(content.contains("schema_version"));
        assert!(content.contains("parent_comments_id"));
    }

    #[test]
    fn test_corrupt_post_file() {
        let (storage, _temp) = create_test_storage();
        fs::write(storage.post_path(PostId(1)), "not json").unwrap();

        let err = storage.fetch(PostId(1)).unwrap_err();
        assert!(err.to_string().contains("Corrupt post file"));
    }

    #[test]
    fn test_future_schema_rejected() {
        let (storage, _temp) = create_test_storage();
        fs::write(
            storage.post_path(PostId(1)),
            r#"{"schema_version": 99, "post_id": 1, "comments": []}"#,
        )
        .unwrap();

        assert!(matches!(
            storage.fetch(PostId(1)),
            Err(ThreadlineError::Store(_))
        ));
    }
}
