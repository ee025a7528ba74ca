//! Response body generation for `/content_size`.
//!
//! Only the length of a generated body matters; the content is a single
//! filler character repeated.

use std::sync::Arc;

use crate::config::schema::BehaviorConfig;
use crate::generators::random::RandomSource;

/// Character every generated body is made of.
pub const FILLER: char = '-';

/// Produces the body of a `/content_size` response.
pub trait ResponseBodyGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// A body of `len` filler characters.
pub fn filler(len: u64) -> String {
    let len = usize::try_from(len).unwrap_or(usize::MAX);
    std::iter::repeat(FILLER).take(len).collect()
}

/// Always `size` bytes long.
#[derive(Debug, Clone, Copy)]
pub struct FixedSizeBody {
    size: u64,
}

impl FixedSizeBody {
    pub fn new(size: u64) -> Self {
        Self { size }
    }
}

impl ResponseBodyGenerator for FixedSizeBody {
    fn generate(&self) -> String {
        filler(self.size)
    }
}

/// Length drawn from `[min, max)` on every call.
pub struct RandomSizeBody {
    min: u64,
    max: u64,
    random: Arc<dyn RandomSource>,
}

impl RandomSizeBody {
    pub fn new(min: u64, max: u64, random: Arc<dyn RandomSource>) -> Self {
        Self { min, max, random }
    }
}

impl ResponseBodyGenerator for RandomSizeBody {
    fn generate(&self) -> String {
        filler(self.random.int(self.min, self.max))
    }
}

/// Returns the same string every time. Used to pin `/content_size` output.
#[derive(Debug, Clone, Default)]
pub struct StaticBody {
    body: String,
}

impl StaticBody {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

impl ResponseBodyGenerator for StaticBody {
    fn generate(&self) -> String {
        self.body.clone()
    }
}

/// Pick the body generator described by the size settings.
pub fn from_config(
    config: &BehaviorConfig,
    random: Arc<dyn RandomSource>,
) -> Arc<dyn ResponseBodyGenerator> {
    if config.random_body_size {
        Arc::new(RandomSizeBody::new(config.min_body_size, config.max_body_size, random))
    } else {
        Arc::new(FixedSizeBody::new(config.max_body_size))
    }
}
