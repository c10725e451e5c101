//! Token coercion into scalar and sequence field targets
//!
//! Raw request values arrive as string tokens; [`FromToken`] parses one token
//! into a scalar and [`FromTokens`] decides how a field consumes the token
//! list of its winning source: scalars take the first token, sequences take
//! every token in order. Out-of-range input is a parse failure, never a
//! truncation.

use std::error::Error as StdError;
use std::fmt;

/// Typed coercion failure carrying the offending token and target kind
///
/// For sequence targets the index of the failing element is recorded too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoerceError {
    /// The raw token that failed to parse
    pub token: String,
    /// Name of the target kind, e.g. `u32`
    pub target: &'static str,
    /// Element index, present only for sequence coercion
    pub index: Option<usize>,
}

impl CoerceError {
    fn new(token: &str, target: &'static str) -> Self {
        Self {
            token: token.to_owned(),
            target,
            index: None,
        }
    }

    fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl fmt::Display for CoerceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid value {:?} for {}", self.token, self.target)?;
        if let Some(index) = self.index {
            write!(f, " at index {}", index)?;
        }
        Ok(())
    }
}

impl StdError for CoerceError {}

/// Parse a single string token into a scalar value
pub trait FromToken: Sized {
    /// Kind name reported in coercion errors
    const KIND: &'static str;

    /// Parse the token, failing on malformed or out-of-range input
    fn from_token(token: &str) -> Result<Self, CoerceError>;
}

impl FromToken for String {
    const KIND: &'static str = "string";

    fn from_token(token: &str) -> Result<Self, CoerceError> {
        Ok(token.to_owned())
    }
}

impl FromToken for bool {
    const KIND: &'static str = "bool";

    fn from_token(token: &str) -> Result<Self, CoerceError> {
        match token {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
            _ => Err(CoerceError::new(token, Self::KIND)),
        }
    }
}

macro_rules! from_token_via_parse {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FromToken for $ty {
                const KIND: &'static str = stringify!($ty);

                fn from_token(token: &str) -> Result<Self, CoerceError> {
                    token
                        .parse()
                        .map_err(|_| CoerceError::new(token, Self::KIND))
                }
            }
        )+
    };
}

from_token_via_parse!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

/// Bind a field target from the token list of its winning source
///
/// Returning `Ok(None)` leaves the field untouched; raw byte payloads
/// (`Vec<u8>`) always do so since they are not token-shaped.
pub trait FromTokens: Sized {
    /// Consume the tokens of the winning source
    fn from_tokens(tokens: &[String]) -> Result<Option<Self>, CoerceError>;
}

macro_rules! from_tokens_scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FromTokens for $ty {
                fn from_tokens(tokens: &[String]) -> Result<Option<Self>, CoerceError> {
                    match tokens.first() {
                        Some(token) => <$ty>::from_token(token).map(Some),
                        None => Ok(None),
                    }
                }
            }
        )+
    };
}

from_tokens_scalar!(
    String, bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

impl<V: FromToken> FromTokens for Option<V> {
    fn from_tokens(tokens: &[String]) -> Result<Option<Self>, CoerceError> {
        match tokens.first() {
            Some(token) => V::from_token(token).map(|value| Some(Some(value))),
            None => Ok(None),
        }
    }
}

macro_rules! from_tokens_sequence {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FromTokens for Vec<$ty> {
                fn from_tokens(tokens: &[String]) -> Result<Option<Self>, CoerceError> {
                    let mut out = Vec::with_capacity(tokens.len());
                    for (index, token) in tokens.iter().enumerate() {
                        out.push(
                            <$ty>::from_token(token).map_err(|e| e.at_index(index))?,
                        );
                    }
                    Ok(Some(out))
                }
            }
        )+
    };
}

// Every scalar except u8: Vec<u8> is a raw byte payload, left untouched.
from_tokens_sequence!(
    String, bool, i8, i16, i32, i64, i128, isize, u16, u32, u64, u128, usize, f32, f64,
);

impl FromTokens for Vec<u8> {
    fn from_tokens(_tokens: &[String]) -> Result<Option<Self>, CoerceError> {
        Ok(None)
    }
}
