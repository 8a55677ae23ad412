//! AWS Signature Version 4 query-string presigning for S3-compatible stores.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use super::{ObjectStorage, PresignedRequest, StorageError};
use crate::config::{StorageSettings, MAX_PRESIGN_EXPIRY_SECS};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";
const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// Presigns requests against one bucket.
#[derive(Clone)]
pub struct S3Presigner {
    scheme: String,
    /// Endpoint host, with port when non-default
    host: String,
    region: String,
    bucket: String,
    access_key_id: String,
    secret_access_key: String,
    cdn_base_url: String,
    force_path_style: bool,
}

impl std::fmt::Debug for S3Presigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Presigner")
            .field("host", &self.host)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("force_path_style", &self.force_path_style)
            .finish_non_exhaustive()
    }
}

impl S3Presigner {
    pub fn new(settings: &StorageSettings) -> Result<Self, StorageError> {
        let (scheme, host) = match settings.endpoint.split_once("://") {
            Some((scheme, rest)) => (scheme.to_ascii_lowercase(), rest),
            None => ("https".to_string(), settings.endpoint.as_str()),
        };
        let host = host.trim_end_matches('/');

        if scheme != "https" && scheme != "http" {
            return Err(StorageError::Configuration(format!(
                "unsupported endpoint scheme '{}'",
                scheme
            )));
        }
        if host.is_empty() || host.contains('/') {
            return Err(StorageError::Configuration(format!(
                "endpoint must be a bare host, got '{}'",
                settings.endpoint
            )));
        }
        if settings.bucket.is_empty() {
            return Err(StorageError::Configuration("bucket is empty".into()));
        }

        Ok(Self {
            scheme,
            host: host.to_ascii_lowercase(),
            region: settings.region.clone(),
            bucket: settings.bucket.clone(),
            access_key_id: settings.access_key_id.clone(),
            secret_access_key: settings.secret_access_key.clone(),
            cdn_base_url: settings.cdn_base_url.trim_end_matches('/').to_string(),
            force_path_style: settings.force_path_style,
        })
    }

    /// Host and canonical path addressing `key`.
    fn locate(&self, key: &str) -> (String, String) {
        let encoded_key = encode_path(key);
        if self.force_path_style {
            (
                self.host.clone(),
                format!("/{}/{}", uri_encode(&self.bucket), encoded_key),
            )
        } else {
            (format!("{}.{}", self.bucket, self.host), format!("/{}", encoded_key))
        }
    }

    /// Presign `method` on `key` as of `now`.
    ///
    /// `headers` are signed in addition to `host` and must be sent by the
    /// client unchanged.
    pub fn presign_at(
        &self,
        method: &'static str,
        key: &str,
        headers: &BTreeMap<String, String>,
        expires_in: Duration,
        now: DateTime<Utc>,
    ) -> Result<PresignedRequest, StorageError> {
        let key = key.trim_start_matches('/');
        if key.is_empty() {
            return Err(StorageError::InvalidKey("key is empty".into()));
        }
        let expires = expires_in.as_secs();
        if expires == 0 || expires > MAX_PRESIGN_EXPIRY_SECS {
            return Err(StorageError::Signing(format!(
                "expiry must be within 1..={} seconds",
                MAX_PRESIGN_EXPIRY_SECS
            )));
        }

        let (host, path) = self.locate(key);
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let scope = format!("{}/{}/{}/aws4_request", date, self.region, SERVICE);

        // Canonical headers: lowercase names, sorted, host included.
        let mut signed: BTreeMap<String, String> = headers
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.trim().to_string()))
            .collect();
        signed.insert("host".into(), host.clone());
        let signed_headers = signed.keys().cloned().collect::<Vec<_>>().join(";");
        let canonical_headers: String = signed
            .iter()
            .map(|(k, v)| format!("{}:{}\n", k, v))
            .collect();

        let mut query = BTreeMap::new();
        query.insert("X-Amz-Algorithm", ALGORITHM.to_string());
        query.insert(
            "X-Amz-Credential",
            format!("{}/{}", self.access_key_id, scope),
        );
        query.insert("X-Amz-Date", amz_date.clone());
        query.insert("X-Amz-Expires", expires.to_string());
        query.insert("X-Amz-SignedHeaders", signed_headers.clone());
        let canonical_query = query
            .iter()
            .map(|(k, v)| format!("{}={}", uri_encode(k), uri_encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            method, path, canonical_query, canonical_headers, signed_headers, UNSIGNED_PAYLOAD
        );
        let string_to_sign = format!(
            "{}\n{}\n{}\n{:x}",
            ALGORITHM,
            amz_date,
            scope,
            Sha256::digest(canonical_request.as_bytes())
        );

        let signing_key = self.signing_key(&date)?;
        let signature = hex_lower(&hmac(&signing_key, string_to_sign.as_bytes())?);

        let url = format!(
            "{}://{}{}?{}&X-Amz-Signature={}",
            self.scheme, host, path, canonical_query, signature
        );

        Ok(PresignedRequest {
            url,
            method,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
                .collect(),
            expires_in: expires,
        })
    }

    fn signing_key(&self, date: &str) -> Result<Vec<u8>, StorageError> {
        let secret = format!("AWS4{}", self.secret_access_key);
        let k_date = hmac(secret.as_bytes(), date.as_bytes())?;
        let k_region = hmac(&k_date, self.region.as_bytes())?;
        let k_service = hmac(&k_region, SERVICE.as_bytes())?;
        hmac(&k_service, b"aws4_request")
    }
}

impl ObjectStorage for S3Presigner {
    fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<PresignedRequest, StorageError> {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), content_type.to_string());
        self.presign_at("PUT", key, &headers, expires_in, Utc::now())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.cdn_base_url, key.trim_start_matches('/'))
    }
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>, StorageError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| StorageError::Signing(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// RFC 3986 encoding of everything but unreserved characters.
fn uri_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Encode each path segment, keeping the separators.
fn encode_path(key: &str) -> String {
    key.split('/').map(uri_encode).collect::<Vec<_>>().join("/")
}

fn hex_lower(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
