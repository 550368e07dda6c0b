use std::sync::Arc;

use thiserror::Error;

use super::chunk_store::StoreError;
use super::registry::ObjectRegistry;
use crate::models::FileDescriptor;

/// Inclusive byte interval within an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

#[derive(Error, Debug)]
pub enum RangeError {
    #[error("requested range is not satisfiable for an object of {length} bytes")]
    Unsatisfiable { length: i64 },
}

/// Parses a single-range `Range: bytes=<start>-<end>` value against an
/// object of `length` bytes. A missing end bound runs to the last byte; an
/// end past the last byte is clamped to it. Returns `Ok(None)` for a header
/// with a unit other than bytes, which callers serve unranged.
pub fn parse_range(header: &str, length: i64) -> Result<Option<ByteRange>, RangeError> {
    let Some(rest) = header.trim().strip_prefix("bytes=") else {
        return Ok(None);
    };

    let unsatisfiable = || RangeError::Unsatisfiable { length };

    let (start_str, end_str) = rest.split_once('-').ok_or_else(unsatisfiable)?;
    let start: u64 = start_str.trim().parse().map_err(|_| unsatisfiable())?;
    let end: u64 = match end_str.trim() {
        "" => (length - 1).max(0) as u64,
        s => s.parse().map_err(|_| unsatisfiable())?,
    };

    if length <= 0 || start > end || start >= length as u64 {
        return Err(unsatisfiable());
    }

    Ok(Some(ByteRange {
        start,
        end: end.min(length as u64 - 1),
    }))
}

/// A resolved read request: the descriptor for header construction plus the
/// effective byte window, if the request carried one.
pub struct Resolved {
    pub descriptor: FileDescriptor,
    pub range: Option<ByteRange>,
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Range(#[from] RangeError),
}

/// Read-side entry point: descriptor lookup, then range interpretation
/// against the committed length.
pub struct RangeRetrieval {
    registry: Arc<ObjectRegistry>,
}

impl RangeRetrieval {
    pub fn new(registry: Arc<ObjectRegistry>) -> Self {
        Self { registry }
    }

    pub async fn resolve(
        &self,
        bucket: &str,
        file_id: &str,
        range_header: Option<&str>,
    ) -> Result<Resolved, ResolveError> {
        let descriptor = self.registry.describe(bucket, file_id).await?;

        let range = match range_header {
            Some(header) => parse_range(header, descriptor.length)?,
            None => None,
        };

        Ok(Resolved { descriptor, range })
    }
}
