use std::future::Future;

use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};

/// The subset of object-store semantics the pipeline relies on.
///
/// Keys are opaque; each instance is bound to a single bucket. `get` and
/// `head` map a missing key to `Ok(None)` / `Ok(false)` rather than an
/// error, since "no result document yet" is the normal polling outcome.
pub trait ObjectStore: Send + Sync + 'static {
    fn put(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, StorageError>> + Send;

    fn head(&self, key: &str) -> impl Future<Output = Result<bool, StorageError>> + Send;
}

/// Client for an S3-compatible object store, bound to one bucket.
pub struct S3Store {
    bucket: Box<Bucket>,
}

impl S3Store {
    pub fn new(
        bucket_name: &str,
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: region.to_string(),
            endpoint: endpoint.to_string(),
        };

        let credentials = Credentials::new(Some(access_key), Some(secret_key), None, None, None)
            .map_err(|e| StorageError::Config(e.to_string()))?;

        let bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| StorageError::Config(e.to_string()))?;

        Ok(Self { bucket })
    }
}

impl ObjectStore for S3Store {
    fn put(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        async move {
            self.bucket
                .put_object_with_content_type(key, data, content_type)
                .await
                .map_err(StorageError::S3)?;
            Ok(())
        }
    }

    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, StorageError>> + Send {
        async move {
            match self.bucket.get_object(key).await {
                Ok(response) if response.status_code() == 404 => Ok(None),
                Ok(response) => Ok(Some(response.to_vec())),
                Err(S3Error::HttpFailWithBody(404, _)) => Ok(None),
                Err(e) => Err(StorageError::S3(e)),
            }
        }
    }

    fn head(&self, key: &str) -> impl Future<Output = Result<bool, StorageError>> + Send {
        async move {
            match self.bucket.head_object(key).await {
                Ok((_, code)) => Ok(code != 404),
                Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
                Err(e) => Err(StorageError::S3(e)),
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("S3 operation failed: {0}")]
    S3(#[from] S3Error),

    #[error("Storage configuration error: {0}")]
    Config(String),

    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}
