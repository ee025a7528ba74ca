//! Status code families and the generators that draw from them.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use axum::http::StatusCode;

use crate::config::schema::CodeSetConfig;
use crate::generators::random::RandomSource;

const REDIRECTION: &[u16] = &[300, 301, 302, 303, 304, 305, 307];
const CLIENT_ERROR: &[u16] = &[
    400, 401, 402, 403, 404, 405, 406, 407, 408, 409, 410, 411, 412, 413, 414, 415, 416, 417,
];
const SERVER_ERROR: &[u16] = &[500, 501, 502, 503, 504, 505];

/// The three status code families served by the family endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeFamily {
    Redirection,
    ClientError,
    ServerError,
}

impl CodeFamily {
    pub const ALL: [CodeFamily; 3] = [
        CodeFamily::Redirection,
        CodeFamily::ClientError,
        CodeFamily::ServerError,
    ];

    /// Codes served when the configuration does not override the family.
    pub fn defaults(self) -> &'static [u16] {
        match self {
            CodeFamily::Redirection => REDIRECTION,
            CodeFamily::ClientError => CLIENT_ERROR,
            CodeFamily::ServerError => SERVER_ERROR,
        }
    }

    fn range(self) -> RangeInclusive<u16> {
        match self {
            CodeFamily::Redirection => 300..=399,
            CodeFamily::ClientError => 400..=499,
            CodeFamily::ServerError => 500..=599,
        }
    }
}

impl fmt::Display for CodeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CodeFamily::Redirection => "redirection",
            CodeFamily::ClientError => "client_error",
            CodeFamily::ServerError => "server_error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodeSetError {
    #[error("code set is empty")]
    Empty,

    #[error("{code} is not a {family} status code")]
    OutOfFamily { code: u16, family: CodeFamily },
}

/// A non-empty list of status codes belonging to one family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSet {
    family: CodeFamily,
    codes: Vec<StatusCode>,
}

impl CodeSet {
    pub fn new(family: CodeFamily, codes: &[u16]) -> Result<Self, CodeSetError> {
        if codes.is_empty() {
            return Err(CodeSetError::Empty);
        }

        let codes = codes
            .iter()
            .map(|&code| {
                if !family.range().contains(&code) {
                    return Err(CodeSetError::OutOfFamily { code, family });
                }
                StatusCode::from_u16(code).map_err(|_| CodeSetError::OutOfFamily { code, family })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { family, codes })
    }

    /// The built-in codes of a family.
    pub fn defaults(family: CodeFamily) -> Self {
        Self {
            family,
            codes: family
                .defaults()
                .iter()
                .filter_map(|&code| StatusCode::from_u16(code).ok())
                .collect(),
        }
    }

    pub fn family(&self) -> CodeFamily {
        self.family
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Never true for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn codes(&self) -> &[StatusCode] {
        &self.codes
    }

    /// Code at `index`. Indices past the end, such as those from a fixed
    /// random source, are clamped to the last code. Constructed sets are
    /// never empty.
    pub fn get(&self, index: usize) -> StatusCode {
        self.codes[index.min(self.codes.len() - 1)]
    }
}

/// The redirection, client-error and server-error sets, passed explicitly
/// into whatever needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSets {
    pub redirection: CodeSet,
    pub client_error: CodeSet,
    pub server_error: CodeSet,
}

impl CodeSets {
    pub fn from_config(config: &CodeSetConfig) -> Result<Self, CodeSetError> {
        Ok(Self {
            redirection: CodeSet::new(CodeFamily::Redirection, &config.redirection)?,
            client_error: CodeSet::new(CodeFamily::ClientError, &config.client_error)?,
            server_error: CodeSet::new(CodeFamily::ServerError, &config.server_error)?,
        })
    }
}

impl Default for CodeSets {
    fn default() -> Self {
        Self {
            redirection: CodeSet::defaults(CodeFamily::Redirection),
            client_error: CodeSet::defaults(CodeFamily::ClientError),
            server_error: CodeSet::defaults(CodeFamily::ServerError),
        }
    }
}

/// Picks the status code of a family endpoint.
pub trait ResponseCodeGenerator: Send + Sync {
    fn generate(&self) -> StatusCode;
}

/// Draws a uniformly random index into a code set.
pub struct RandomCodeGenerator {
    codes: CodeSet,
    random: Arc<dyn RandomSource>,
}

impl RandomCodeGenerator {
    pub fn new(codes: CodeSet, random: Arc<dyn RandomSource>) -> Self {
        Self { codes, random }
    }
}

impl ResponseCodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> StatusCode {
        let index = self.random.int(0, self.codes.len() as u64);
        self.codes.get(usize::try_from(index).unwrap_or(usize::MAX))
    }
}

/// Always answers with the same code.
#[derive(Debug, Clone, Copy)]
pub struct FixedCodeGenerator(pub StatusCode);

impl ResponseCodeGenerator for FixedCodeGenerator {
    fn generate(&self) -> StatusCode {
        self.0
    }
}
