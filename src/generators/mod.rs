//! Randomized response ingredients.
//!
//! # Data Flow
//! ```text
//! random.rs (RandomSource: thread RNG or fixed stub)
//!     → codes.rs (status code drawn from a family set)
//!     → body.rs (filler body of fixed or drawn length)
//!     → snooze.rs (fixed or drawn request delay)
//!     → Generators (bundle handed to the behavior engine)
//! ```
//!
//! # Design Decisions
//! - One RandomSource is shared by every generator and request
//! - Code sets are values passed into constructors, never globals
//! - Every generator sits behind a trait so tests can pin its output

pub mod body;
pub mod codes;
pub mod random;
pub mod snooze;

use std::sync::Arc;

use crate::config::schema::BehaviorConfig;

pub use body::{FixedSizeBody, RandomSizeBody, ResponseBodyGenerator, StaticBody};
pub use codes::{
    CodeFamily, CodeSet, CodeSetError, CodeSets, FixedCodeGenerator, RandomCodeGenerator,
    ResponseCodeGenerator,
};
pub use random::{FixedRandom, RandomSource, ThreadRandom};
pub use snooze::{FixedSnoozer, RangeSnoozer, Snoozer};

/// Everything the behavior engine draws from.
#[derive(Clone)]
pub struct Generators {
    pub redirection: Arc<dyn ResponseCodeGenerator>,
    pub client_error: Arc<dyn ResponseCodeGenerator>,
    pub server_error: Arc<dyn ResponseCodeGenerator>,
    pub body: Arc<dyn ResponseBodyGenerator>,
    pub snoozer: Arc<dyn Snoozer>,
}

impl Generators {
    /// Wire all generators to one random source, following the size,
    /// delay and code settings of `config`.
    pub fn from_config(
        config: &BehaviorConfig,
        random: Arc<dyn RandomSource>,
    ) -> Result<Self, CodeSetError> {
        let codes = CodeSets::from_config(&config.codes)?;
        Ok(Self::with_codes(config, codes, random))
    }

    pub fn with_codes(
        config: &BehaviorConfig,
        codes: CodeSets,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            redirection: Arc::new(RandomCodeGenerator::new(codes.redirection, random.clone())),
            client_error: Arc::new(RandomCodeGenerator::new(codes.client_error, random.clone())),
            server_error: Arc::new(RandomCodeGenerator::new(codes.server_error, random.clone())),
            body: body::from_config(config, random.clone()),
            snoozer: snooze::from_config(config, random),
        }
    }
}
