use std::env;

/// Smallest accepted chunk payload: 4 KiB
pub const MIN_CHUNK_SIZE: usize = 4 * 1024;

/// Largest accepted chunk payload: 1 MiB
pub const MAX_CHUNK_SIZE: usize = 1024 * 1024;

/// Storage configuration for uploads. All sizes are in bytes.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Chunk payload size for newly stored objects (default: 255 KiB)
    pub chunk_size: usize,

    /// Maximum accepted resume size (default: 5 MiB)
    pub resume_max_size: usize,

    /// Maximum accepted video size (default: 200 MiB)
    pub video_max_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            chunk_size: 255 * 1024,
            resume_max_size: 5 * 1024 * 1024,
            video_max_size: 200 * 1024 * 1024,
        }
    }
}

impl StorageConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            chunk_size: env::var("CHUNK_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(|v: usize| v.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE))
                .unwrap_or(default.chunk_size),

            resume_max_size: env::var("RESUME_MAX_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.resume_max_size),

            video_max_size: env::var("VIDEO_MAX_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.video_max_size),
        }
    }

    /// Request body ceiling: the largest accepted file plus slack for the
    /// multipart framing and form fields.
    pub fn max_body_size(&self) -> usize {
        self.resume_max_size.max(self.video_max_size) + 1024 * 1024
    }
}
