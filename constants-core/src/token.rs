use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A dynamically typed key produced by reading an attribute off a value.
///
/// Tokens let one library mix keys of different shapes (a symbol string, an
/// atomic number) in its indexes. Floats compare by bit pattern so that the
/// type can be hashed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Token {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<Token>),
}

impl Token {
    /// Returns true for [`Token::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Token::Null)
    }

    /// Returns the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Token::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer payload, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Token::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Interprets the token as a collection slot.
    ///
    /// Only non-negative integers are slots.
    pub fn as_slot(&self) -> Option<usize> {
        self.as_int().and_then(|n| usize::try_from(n).ok())
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Token::Null, Token::Null) => true,
            (Token::Bool(a), Token::Bool(b)) => a == b,
            (Token::Int(a), Token::Int(b)) => a == b,
            (Token::Float(a), Token::Float(b)) => a.to_bits() == b.to_bits(),
            (Token::Str(a), Token::Str(b)) => a == b,
            (Token::Seq(a), Token::Seq(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Token::Null => {}
            Token::Bool(b) => b.hash(state),
            Token::Int(n) => n.hash(state),
            Token::Float(f) => f.to_bits().hash(state),
            Token::Str(s) => s.hash(state),
            Token::Seq(items) => items.hash(state),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Null => f.write_str("null"),
            Token::Bool(b) => write!(f, "{b}"),
            Token::Int(n) => write!(f, "{n}"),
            Token::Float(x) => write!(f, "{x}"),
            Token::Str(s) => f.write_str(s),
            Token::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Conversion of a field value into a [`Token`].
///
/// Implemented for the scalar types that commonly serve as keys, and used by
/// `#[derive(Attributes)]` for every field it exposes.
pub trait ToToken {
    fn to_token(&self) -> Token;
}

macro_rules! int_to_token {
    ($($ty:ty),*) => {
        $(
            impl ToToken for $ty {
                fn to_token(&self) -> Token {
                    Token::Int(i64::from(*self))
                }
            }

            impl From<$ty> for Token {
                fn from(value: $ty) -> Self {
                    Token::Int(i64::from(value))
                }
            }
        )*
    };
}

int_to_token!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! wide_int_to_token {
    ($($ty:ty),*) => {
        $(
            impl ToToken for $ty {
                fn to_token(&self) -> Token {
                    Token::from(*self)
                }
            }

            impl From<$ty> for Token {
                fn from(value: $ty) -> Self {
                    match i64::try_from(value) {
                        Ok(n) => Token::Int(n),
                        Err(_) => Token::Float(value as f64),
                    }
                }
            }
        )*
    };
}

wide_int_to_token!(u64, usize, isize);

impl ToToken for f32 {
    fn to_token(&self) -> Token {
        Token::Float(f64::from(*self))
    }
}

impl ToToken for f64 {
    fn to_token(&self) -> Token {
        Token::Float(*self)
    }
}

impl ToToken for bool {
    fn to_token(&self) -> Token {
        Token::Bool(*self)
    }
}

impl ToToken for char {
    fn to_token(&self) -> Token {
        Token::Str(self.to_string())
    }
}

impl ToToken for str {
    fn to_token(&self) -> Token {
        Token::Str(self.to_owned())
    }
}

impl ToToken for String {
    fn to_token(&self) -> Token {
        Token::Str(self.clone())
    }
}

impl ToToken for Token {
    fn to_token(&self) -> Token {
        self.clone()
    }
}

impl<T: ToToken> ToToken for Option<T> {
    fn to_token(&self) -> Token {
        match self {
            Some(value) => value.to_token(),
            None => Token::Null,
        }
    }
}

impl<T: ToToken> ToToken for [T] {
    fn to_token(&self) -> Token {
        Token::Seq(self.iter().map(ToToken::to_token).collect())
    }
}

impl<T: ToToken> ToToken for Vec<T> {
    fn to_token(&self) -> Token {
        self.as_slice().to_token()
    }
}

impl<T: ToToken + ?Sized> ToToken for &T {
    fn to_token(&self) -> Token {
        (**self).to_token()
    }
}

impl From<f64> for Token {
    fn from(value: f64) -> Self {
        Token::Float(value)
    }
}

impl From<bool> for Token {
    fn from(value: bool) -> Self {
        Token::Bool(value)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token::Str(value.to_owned())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Token::Str(value)
    }
}

impl<T: Into<Token>> From<Option<T>> for Token {
    fn from(value: Option<T>) -> Self {
        value.map_or(Token::Null, Into::into)
    }
}

/// Read access to named attributes of a value.
///
/// This is the name-string layer used by attribute-based index and
/// collection registration. `None` means the value has no such attribute.
/// Usually derived with `#[derive(Attributes)]`.
pub trait Attributes {
    fn attribute(&self, name: &str) -> Option<Token>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn float_tokens_hash_by_bits() {
        let mut set = HashSet::new();
        set.insert(Token::Float(0.5));
        assert!(set.contains(&Token::Float(0.5)));
        assert!(!set.contains(&Token::Float(-0.5)));
    }

    #[test]
    fn variants_never_compare_across_types() {
        assert_ne!(Token::Int(1), Token::Float(1.0));
        assert_ne!(Token::Str("1".into()), Token::Int(1));
        assert_ne!(Token::Null, Token::Bool(false));
    }

    #[test]
    fn slots_are_non_negative_ints() {
        assert_eq!(Token::Int(3).as_slot(), Some(3));
        assert_eq!(Token::Int(-1).as_slot(), None);
        assert_eq!(Token::Str("3".into()).as_slot(), None);
    }

    #[test]
    fn conversions() {
        assert_eq!(Token::from("C"), Token::Str("C".into()));
        assert_eq!(Token::from(6u32), Token::Int(6));
        assert_eq!(Token::from(None::<u32>), Token::Null);
        assert_eq!(vec![12u32, 13].to_token(), Token::Seq(vec![Token::Int(12), Token::Int(13)]));
        assert_eq!(Some("x".to_string()).to_token(), Token::Str("x".into()));
    }

    #[test]
    fn display() {
        let seq = Token::Seq(vec![Token::Int(1), Token::Str("a".into()), Token::Null]);
        assert_eq!(seq.to_string(), "[1, a, null]");
    }
}
