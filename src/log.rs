use std::fmt::{Display, Formatter};

/// Debug verbosity label threaded through the tokenizer and the combinator
/// engine.
///
/// Mirrors the level ladder used throughout the production-utility crate
/// this engine grew out of: each level is a strict superset of the
/// previous one's output. Trace calls compile away entirely in release
/// builds (they sit behind `cfg(debug_assertions)`), so choosing a level
/// has no runtime cost outside of development builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Log<T> {
    None,
    Default(T),
    Success(T),
    Result(T),
    Verbose(T),
}

impl<T> Log<T> {
    pub fn order(&self) -> u8 {
        match self {
            Log::None => 0,
            Log::Default(_) => 1,
            Log::Success(_) => 2,
            Log::Result(_) => 3,
            Log::Verbose(_) => 4,
        }
    }
}

impl<T: Display> Display for Log<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Log::None => Ok(()),
            Log::Default(s) | Log::Success(s) | Log::Result(s) | Log::Verbose(s) => {
                write!(f, "{}", s)
            }
        }
    }
}
