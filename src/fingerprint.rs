//! Query Fingerprints
//!
//! Derives deterministic cache keys from an operation name, its variables and
//! optional scope (user, time bucket, namespace prefix).
//!
//! Variables are canonicalized first: object keys are sorted recursively and
//! array order is kept, so logically identical variable sets built in any
//! key order produce the same key.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Number of SHA-256 bytes kept in a hashed fingerprint (128 bits).
const FINGERPRINT_BYTES: usize = 16;

// == Time Buckets ==
/// Granularity of the time component. Coarser buckets make more requests
/// share a key, which expires them together at the bucket boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBucket {
    Minute,
    Hour,
    Day,
}

impl TimeBucket {
    /// Formats `now` (UTC calendar fields) at this granularity.
    pub fn label(&self, now: DateTime<Utc>) -> String {
        let format = match self {
            TimeBucket::Minute => "%Y-%m-%dT%H:%M",
            TimeBucket::Hour => "%Y-%m-%dT%H",
            TimeBucket::Day => "%Y-%m-%d",
        };
        now.format(format).to_string()
    }
}

/// How the canonical string is turned into the final key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEncoding {
    /// Truncated SHA-256, hex encoded
    #[default]
    Hashed,
    /// The canonical string itself; longer but equally deterministic
    Canonical,
}

/// Scoping options for [`build_fingerprint`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintOptions {
    pub include_user: bool,
    pub user_id: Option<String>,
    pub time_bucket: Option<TimeBucket>,
    pub prefix: Option<String>,
    pub encoding: KeyEncoding,
}

// == Canonicalization ==
/// Renders `value` as compact JSON with object keys sorted at every depth.
pub fn canonicalize(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Strings always serialize; escape keys exactly like values
                let _ = write!(out, "{}:", Value::String(key.clone()));
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => {
            let _ = write!(out, "{scalar}");
        }
    }
}

// == Fingerprint ==
/// Builds a fingerprint using the current UTC time for any time bucket.
pub fn build_fingerprint(operation: &str, variables: &Value, options: &FingerprintOptions) -> String {
    build_fingerprint_at(operation, variables, options, Utc::now())
}

/// Builds a fingerprint against an explicit clock reading.
pub fn build_fingerprint_at(
    operation: &str,
    variables: &Value,
    options: &FingerprintOptions,
    now: DateTime<Utc>,
) -> String {
    // Free-form parts are written as JSON strings so separators inside them
    // cannot pose as another part.
    let mut canonical = format!(
        "{}:{}",
        Value::String(operation.to_string()),
        canonicalize(variables)
    );

    if options.include_user {
        if let Some(user_id) = &options.user_id {
            let _ = write!(canonical, "|user:{}", Value::String(user_id.clone()));
        }
    }
    if let Some(bucket) = options.time_bucket {
        let _ = write!(canonical, "|time:{}", bucket.label(now));
    }

    let key = match options.encoding {
        KeyEncoding::Hashed => hash_canonical(&canonical),
        KeyEncoding::Canonical => canonical,
    };

    match &options.prefix {
        Some(prefix) => format!("{prefix}:{key}"),
        None => key,
    }
}

fn hash_canonical(canonical: &str) -> String {
    let digest = Sha256::digest(canonical.as_bytes());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

// == Fluent Builder ==
/// Fluent form of [`build_fingerprint`]; equivalent inputs give identical keys.
#[derive(Debug, Clone)]
pub struct FingerprintBuilder {
    operation: String,
    variables: Value,
    options: FingerprintOptions,
}

impl FingerprintBuilder {
    pub fn for_operation(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            variables: Value::Null,
            options: FingerprintOptions::default(),
        }
    }

    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.options.include_user = true;
        self.options.user_id = Some(user_id.into());
        self
    }

    pub fn with_time_bucket(mut self, bucket: TimeBucket) -> Self {
        self.options.time_bucket = Some(bucket);
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.prefix = Some(prefix.into());
        self
    }

    pub fn with_encoding(mut self, encoding: KeyEncoding) -> Self {
        self.options.encoding = encoding;
        self
    }

    pub fn build(&self) -> String {
        build_fingerprint(&self.operation, &self.variables, &self.options)
    }

    pub fn build_at(&self, now: DateTime<Utc>) -> String {
        build_fingerprint_at(&self.operation, &self.variables, &self.options, now)
    }
}
