//! Fixtures shared by unit tests.

use std::io::Cursor;
use std::path::Path;
use std::sync::Mutex;

use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use rand_core::OsRng;

use crate::db::Database;
use crate::storage::{LocalStorage, ObjectStorage};
use crate::{GalleryError, Result};

/// Base URL used by test storages.
pub const TEST_BASE_URL: &str = "http://localhost:8080/gallery-images";

fn encode_png(img: RgbImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// A single-colour PNG. Compresses to almost nothing.
pub fn solid_png(width: u32, height: u32) -> Vec<u8> {
    encode_png(RgbImage::from_pixel(width, height, Rgb([40, 120, 200])))
}

/// A PNG of pseudo-random pixels. JPEG can't do much with it.
pub fn noise_png(width: u32, height: u32, seed: u64) -> Vec<u8> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
    let img = RgbImage::from_fn(width, height, |_, _| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let [r, g, b, ..] = (state >> 33).to_le_bytes();
        Rgb([r, g, b])
    });
    encode_png(img)
}

/// An RGBA PNG: fully transparent except a white horizontal stripe.
pub fn transparent_png(width: u32, height: u32, stripe: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |_, y| {
        if y < stripe {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// Argon2id PHC hash with minimal cost, so tests don't pay for production parameters.
pub fn password_hash(password: &str) -> String {
    let params = Params::new(1024, 1, 1, None).unwrap();
    let salt = SaltString::generate(&mut OsRng);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string()
}

/// Make the metadata store reject `operation` (`INSERT` or `DELETE`) on images.
pub async fn block_image_writes(db: &Database, operation: &str) {
    let sql = format!(
        "CREATE TRIGGER block_image_{op} BEFORE {op} ON images \
         BEGIN SELECT RAISE(ABORT, 'image {op} blocked'); END",
        op = operation.to_lowercase()
    );
    sqlx::query(&sql).execute(db.pool()).await.unwrap();
}

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
            inner: LocalStorage::new(path, TEST_BASE_URL).unwrap(),
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
