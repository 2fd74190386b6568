use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub name: String,
    pub value: Option<KeywordValue>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeywordValue {
    Logical(bool),
    Integer(i64),
    Real(f64),
    String(String),
}

impl Keyword {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            value: None,
            comment: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<KeywordValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_comment<S: Into<String>>(mut self, comment: S) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn logical<S: Into<String>>(name: S, value: bool) -> Self {
        Self::new(name).with_value(value)
    }

    pub fn integer<S: Into<String>>(name: S, value: i64) -> Self {
        Self::new(name).with_value(value)
    }

    pub fn real<S: Into<String>>(name: S, value: f64) -> Self {
        Self::new(name).with_value(value)
    }

    pub fn string<S: Into<String>, V: Into<String>>(name: S, value: V) -> Self {
        Self::new(name).with_value(KeywordValue::String(value.into()))
    }

    /// Free text in the value field, no value indicator.
    pub fn history<S: Into<String>>(text: S) -> Self {
        Self::new("HISTORY").with_comment(text)
    }

    pub fn comment<S: Into<String>>(text: S) -> Self {
        Self::new("COMMENT").with_comment(text)
    }

    pub fn is_commentary(&self) -> bool {
        matches!(self.name.as_str(), "HISTORY" | "COMMENT" | "")
    }

    /// Keywords that describe the HDU layout and are always generated by
    /// the writer rather than copied from a template.
    pub fn is_structural(&self) -> bool {
        is_structural_name(&self.name)
    }
}

pub fn is_structural_name(name: &str) -> bool {
    matches!(
        name,
        "SIMPLE" | "XTENSION" | "BITPIX" | "NAXIS" | "EXTEND" | "PCOUNT" | "GCOUNT" | "TFIELDS" | "END"
    ) || has_numeric_suffix(name, "NAXIS")
        || has_numeric_suffix(name, "TTYPE")
        || has_numeric_suffix(name, "TFORM")
}

fn has_numeric_suffix(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .map(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

impl KeywordValue {
    pub fn as_logical(&self) -> Option<bool> {
        match self {
            Self::Logical(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for KeywordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logical(b) => write!(f, "{}", if *b { "T" } else { "F" }),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Real(r) => write!(f, "{}", r),
            Self::String(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<bool> for KeywordValue {
    fn from(value: bool) -> Self {
        Self::Logical(value)
    }
}

impl From<i64> for KeywordValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for KeywordValue {
    fn from(value: i32) -> Self {
        Self::Integer(value as i64)
    }
}

impl From<usize> for KeywordValue {
    fn from(value: usize) -> Self {
        Self::Integer(value as i64)
    }
}

impl From<f64> for KeywordValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<String> for KeywordValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for KeywordValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_uppercased() {
        let kw = Keyword::real("crpix1", 10.0);
        assert_eq!(kw.name, "CRPIX1");
    }

    #[test]
    fn test_builder_chain() {
        let kw = Keyword::new("EXPTIME")
            .with_value(100.0)
            .with_comment("exposure duration (seconds)");
        assert_eq!(kw.value, Some(KeywordValue::Real(100.0)));
        assert_eq!(kw.comment.as_deref(), Some("exposure duration (seconds)"));
    }

    #[test]
    fn test_history_has_no_value() {
        let kw = Keyword::history("AstroDrizzle processing performed using: ");
        assert_eq!(kw.name, "HISTORY");
        assert!(kw.value.is_none());
        assert!(kw.is_commentary());
    }

    #[test]
    fn test_structural_names() {
        assert!(is_structural_name("NAXIS"));
        assert!(is_structural_name("NAXIS2"));
        assert!(is_structural_name("TFORM3"));
        assert!(is_structural_name("XTENSION"));
        assert!(!is_structural_name("NAXISX"));
        assert!(!is_structural_name("EXTNAME"));
        assert!(!is_structural_name("BUNIT"));
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(KeywordValue::Integer(3).as_real(), Some(3.0));
        assert_eq!(KeywordValue::Real(3.5).as_integer(), None);
        assert_eq!(KeywordValue::from("SCI").as_string(), Some("SCI"));
        assert_eq!(KeywordValue::from(true).as_logical(), Some(true));
    }

    #[test]
    fn test_display() {
        assert_eq!(KeywordValue::Logical(false).to_string(), "F");
        assert_eq!(KeywordValue::from("cps").to_string(), "'cps'");
    }
}
