//! Validated primitive types shared across the Paeon crates.

/// Errors that can occur when creating validated text or score types.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input text exceeded the permitted number of characters
    #[error("Text exceeds maximum length of {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },
    /// A confidence value was NaN or outside `[0, 1]`
    #[error("Confidence must be within [0, 1] (got {0})")]
    ConfidenceOutOfRange(f64),
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    ///
    /// # Arguments
    ///
    /// * `input` - Any type that can be converted to a string reference
    ///
    /// # Returns
    ///
    /// Returns `Ok(NonEmptyText)` if the trimmed input is non-empty,
    /// or `Err(TextError::Empty)` if it's empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Creates a new `NonEmptyText` that is also bounded to `max_chars` characters.
    ///
    /// Length is measured in Unicode scalar values after trimming, so multi-byte scripts are
    /// not penalised relative to ASCII input.
    ///
    /// # Arguments
    ///
    /// * `input` - Any type that can be converted to a string reference
    /// * `max_chars` - Largest permitted character count after trimming
    ///
    /// # Returns
    ///
    /// Returns `Ok(NonEmptyText)` if the trimmed input is non-empty and within bounds,
    /// `Err(TextError::Empty)` if it's blank, or `Err(TextError::TooLong)` with the
    /// measured length otherwise.
    pub fn bounded(input: impl AsRef<str>, max_chars: usize) -> Result<Self, TextError> {
        let text = Self::new(input)?;
        let actual = text.char_len();
        if actual > max_chars {
            return Err(TextError::TooLong {
                max: max_chars,
                actual,
            });
        }
        Ok(text)
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters (not bytes) in the text.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    /// Consumes the wrapper and returns the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A confidence score guaranteed to lie within `[0, 1]`.
///
/// Serialized as a bare number. Deserialization applies the same range check as
/// [`Confidence::new`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Confidence(f64);

impl Confidence {
    pub const ZERO: Confidence = Confidence(0.0);
    pub const ONE: Confidence = Confidence(1.0);

    /// Creates a confidence, rejecting NaN and values outside `[0, 1]`.
    ///
    /// # Arguments
    ///
    /// * `value` - Raw score to validate
    ///
    /// # Returns
    ///
    /// Returns `Ok(Confidence)` for values in range, or
    /// `Err(TextError::ConfidenceOutOfRange)` carrying the rejected value.
    pub fn new(value: f64) -> Result<Self, TextError> {
        if value.is_nan() || !(0.0..=1.0).contains(&value) {
            return Err(TextError::ConfidenceOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Creates a confidence by clamping `value` into `[0, 1]`. NaN becomes zero.
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Returns the score as a plain `f64`.
    pub fn value(self) -> f64 {
        self.0
    }

    /// Multiplies by `factor`, clamping the product back into range.
    ///
    /// # Arguments
    ///
    /// * `factor` - Multiplier, typically a penalty below 1.0
    ///
    /// # Returns
    ///
    /// A new `Confidence`; the receiver is unchanged.
    pub fn scaled(self, factor: f64) -> Self {
        Self::clamped(self.0 * factor)
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl serde::Serialize for Confidence {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f64(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Confidence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let v = f64::deserialize(deserializer)?;
        Confidence::new(v).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  chest pain \n").unwrap();
        assert_eq!(text.as_str(), "chest pain");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new("   \t").unwrap_err(), TextError::Empty);
    }

    #[test]
    fn bounded_counts_characters_not_bytes() {
        // 7 code points, 21 bytes
        let text = NonEmptyText::bounded("सिरदर्द", 7).unwrap();
        assert_eq!(text.char_len(), 7);

        let err = NonEmptyText::bounded("abcdef", 5).unwrap_err();
        assert_eq!(err, TextError::TooLong { max: 5, actual: 6 });
    }

    #[test]
    fn deserialize_rejects_blank() {
        let result: Result<NonEmptyText, _> = serde_json::from_str("\"  \"");
        assert!(result.is_err());
    }

    #[test]
    fn confidence_rejects_out_of_range() {
        assert!(Confidence::new(1.01).is_err());
        assert!(Confidence::new(-0.1).is_err());
        assert!(Confidence::new(f64::NAN).is_err());
        assert_eq!(Confidence::new(0.5).unwrap().value(), 0.5);
    }

    #[test]
    fn confidence_scaled_stays_in_range() {
        let c = Confidence::new(0.9).unwrap().scaled(0.7);
        assert!((c.value() - 0.63).abs() < 1e-9);
        assert_eq!(Confidence::new(0.9).unwrap().scaled(2.0), Confidence::ONE);
    }

    #[test]
    fn confidence_serializes_as_number() {
        let json = serde_json::to_string(&Confidence::new(0.75).unwrap()).unwrap();
        assert_eq!(json, "0.75");
    }
}
