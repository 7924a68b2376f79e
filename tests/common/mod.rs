//! Test helpers for integration tests.
//!
//! Provides a gallery fixture (in-memory database plus directory storage),
//! a storage wrapper with injectable failures, and fixture data.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::Mutex;

use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};
use rand_core::OsRng;
use tempfile::TempDir;

use ponkesdes_gallery::storage::{LocalStorage, ObjectStorage};
use ponkesdes_gallery::{Database, GalleryError, Result, SourceFile};

/// Public base URL of the fixture storage.
pub const BASE_URL: &str = "http://localhost:8080/gallery-images";

/// LocalStorage wrapper that fails operations whose key contains a configured pattern.
pub struct FaultyStorage {
    inner: LocalStorage,
    upload_failures: Mutex<Vec<String>>,
    remove_failures: Mutex<Vec<String>>,
    fetch_failures: Mutex<Vec<String>>,
}

impl FaultyStorage {
    pub fn new(path: &Path) -> Self {
        Self {
            inner: LocalStorage::new(path, BASE_URL).unwrap(),
            upload_failures: Mutex::new(Vec::new()),
            remove_failures: Mutex::new(Vec::new()),
            fetch_failures: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &LocalStorage {
        &self.inner
    }

    pub fn fail_uploads_matching(&self, pattern: &str) {
        self.upload_failures.lock().unwrap().push(pattern.to_string());
    }

    pub fn fail_removes_matching(&self, pattern: &str) {
        self.remove_failures.lock().unwrap().push(pattern.to_string());
    }

    pub fn fail_fetches_matching(&self, pattern: &str) {
        self.fetch_failures.lock().unwrap().push(pattern.to_string());
    }

    fn check(list: &Mutex<Vec<String>>, target: &str, action: &str) -> Result<()> {
        if list.lock().unwrap().iter().any(|p| target.contains(p.as_str())) {
            return Err(GalleryError::Storage(format!(
                "injected {action} failure for {target}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for FaultyStorage {
    fn backend_name(&self) -> &'static str {
        "faulty"
    }

    async fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        Self::check(&self.upload_failures, key, "upload")?;
        self.inner.upload(key, bytes, content_type).await
    }

    fn public_url(&self, key: &str) -> String {
        self.inner.public_url(key)
    }

    async fn remove(&self, key: &str) -> Result<()> {
        Self::check(&self.remove_failures, key, "remove")?;
        self.inner.remove(key).await
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        Self::check(&self.fetch_failures, url, "fetch")?;
        self.inner.fetch(url).await
    }
}

/// Argon2id PHC hash with minimal cost for test accounts.
pub fn password_hash(password: &str) -> String {
    let params = Params::new(1024, 1, 1, None).unwrap();
    let salt = SaltString::generate(&mut OsRng);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string()
}

/// In-memory database plus temporary directory storage.
pub struct GalleryFixture {
    pub db: Database,
    pub storage: FaultyStorage,
    _dir: TempDir,
}

impl GalleryFixture {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        Self {
            db: Database::open_in_memory().await.unwrap(),
            storage: FaultyStorage::new(&dir.path().join("objects")),
            _dir: dir,
        }
    }

    /// Make the metadata store reject image row deletes.
    pub async fn block_image_deletes(&self) {
        sqlx::query(
            "CREATE TRIGGER block_image_delete BEFORE DELETE ON images \
             BEGIN SELECT RAISE(ABORT, 'image delete blocked'); END",
        )
        .execute(self.db.pool())
        .await
        .unwrap();
    }
}

/// A small PNG with a gradient.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// `count` source files named `<stem><i>.png`.
pub fn source_files(stem: &str, count: usize) -> Vec<SourceFile> {
    (0..count)
        .map(|i| SourceFile::new(format!("{stem}{i}.png"), png(32 + i as u32, 24)))
        .collect()
}
