//! In-memory fakes for the store and codec seams.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;

use crate::error::{ImageKitError, StoreError};
use crate::image_processing::{ImageCodec, TranscodeOptions};
use crate::s3::ObjectStore;
use crate::types::StoredObject;

/// Codec reporting fixed dimensions and emitting `transcoded:<codec>:<w>x<h>`.
pub struct FakeCodec {
    width: u32,
    height: u32,
    fail: bool,
    calls: AtomicUsize,
    last: StdMutex<Option<TranscodeOptions>>,
}

impl FakeCodec {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fail: false,
            calls: AtomicUsize::new(0),
            last: StdMutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(100, 100)
        }
    }

    pub fn transcode_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_options(&self) -> Option<TranscodeOptions> {
        *self.last.lock().unwrap()
    }
}

impl ImageCodec for FakeCodec {
    fn dimensions(&self, _data: &[u8]) -> Result<(u32, u32), ImageKitError> {
        Ok((self.width, self.height))
    }

    fn transcode(&self, _data: &[u8], options: &TranscodeOptions) -> Result<Vec<u8>, ImageKitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(*options);

        if self.fail {
            return Err(ImageKitError::transcode("codec blew up"));
        }

        Ok(format!("transcoded:{:?}:{}x{}", options.codec, options.width, options.height).into_bytes())
    }
}

/// Bucket/key map with call counters and optional write failures.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    fail_puts: bool,
    gets: AtomicUsize,
    puts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_puts() -> Self {
        Self {
            fail_puts: true,
            ..Self::default()
        }
    }

    pub async fn insert(&self, bucket: &str, key: &str, data: &[u8], content_type: &str) {
        self.store(bucket, key, Bytes::copy_from_slice(data), content_type)
            .await;
    }

    async fn store(&self, bucket: &str, key: &str, data: Bytes, content_type: &str) {
        self.objects.lock().await.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
    }

    pub async fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn put_calls(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<StoredObject, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.object(bucket, key).await.ok_or_else(|| StoreError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts {
            return Err(StoreError::Backend("write rejected".to_string()));
        }
        self.store(bucket, key, data, content_type).await;
        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> bool {
        self.object(bucket, key).await.is_some()
    }
}
