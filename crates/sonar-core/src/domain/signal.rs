//! Sonar signal vectors and raw-input parsing.
//!
//! A signal is the 60 band energies returned by one sonar sweep. The UI hands
//! us the raw comma-separated text exactly as the user typed it; everything
//! that can go wrong with that text is an [`InputError`], which is a user
//! mistake rather than a system fault.

use serde::{Deserialize, Serialize};

/// Number of energy bands in one sonar sweep.
pub const SIGNAL_LEN: usize = 60;

/// A validated sonar signal: exactly [`SIGNAL_LEN`] finite values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalVector(Vec<f64>);

impl SignalVector {
    /// Build a signal from already-parsed values.
    pub fn new(values: Vec<f64>) -> Result<Self, InputError> {
        if let Some(position) = values.iter().position(|v| !v.is_finite()) {
            return Err(InputError::NonFinite {
                position: position + 1,
            });
        }
        if values.len() != SIGNAL_LEN {
            return Err(InputError::WrongCount {
                expected: SIGNAL_LEN,
                found: values.len(),
            });
        }
        Ok(Self(values))
    }

    /// The band values, in sweep order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.0
    }
}

impl AsRef<[f64]> for SignalVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Problems with user-supplied signal text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    /// Parsed cleanly but the number of values is wrong.
    #[error("Please enter exactly {expected} numeric values (got {found}).")]
    WrongCount { expected: usize, found: usize },

    /// A token is not a number. `position` is 1-based.
    #[error("Invalid input: value {position} ('{token}') is not a number.")]
    NotNumeric { position: usize, token: String },

    /// A token parsed to NaN or infinity. `position` is 1-based.
    #[error("Invalid input: value {position} is not a finite number.")]
    NonFinite { position: usize },
}

impl InputError {
    /// Short message for the result area of the page.
    #[must_use]
    pub const fn summary(&self) -> &'static str {
        match self {
            Self::WrongCount { .. } => "Please enter exactly 60 numeric values.",
            Self::NotNumeric { .. } | Self::NonFinite { .. } => "Invalid input.",
        }
    }
}

/// Parse the raw comma-separated text from the input box.
///
/// Tokens are trimmed, so `"0.1, 0.2"` is fine. Token problems are reported
/// before the count, which means `"1,x"` is `NotNumeric` rather than
/// `WrongCount`.
pub fn parse_signal(raw: &str) -> Result<SignalVector, InputError> {
    let mut values = Vec::with_capacity(SIGNAL_LEN);

    for (index, token) in raw.split(',').enumerate() {
        let token = token.trim();
        let value: f64 = token.parse().map_err(|_| InputError::NotNumeric {
            position: index + 1,
            token: token.to_string(),
        })?;
        if !value.is_finite() {
            return Err(InputError::NonFinite {
                position: index + 1,
            });
        }
        values.push(value);
    }

    SignalVector::new(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sixty(value: &str) -> String {
        vec![value; SIGNAL_LEN].join(",")
    }

    #[test]
    fn parses_sixty_values() {
        let signal = parse_signal(&sixty("0.02")).unwrap();
        assert_eq!(signal.values().len(), SIGNAL_LEN);
        assert!((signal.values()[59] - 0.02).abs() < f64::EPSILON);
    }

    #[test]
    fn tolerates_whitespace_around_tokens() {
        let raw = vec![" 0.5 "; SIGNAL_LEN].join(",");
        assert!(parse_signal(&raw).is_ok());
    }

    #[test]
    fn three_values_is_wrong_count() {
        let err = parse_signal("1,2,3").unwrap_err();
        assert_eq!(
            err,
            InputError::WrongCount {
                expected: SIGNAL_LEN,
                found: 3
            }
        );
        assert_eq!(err.summary(), "Please enter exactly 60 numeric values.");
    }

    #[test]
    fn sixty_one_values_is_wrong_count() {
        let raw = vec!["0.1"; SIGNAL_LEN + 1].join(",");
        assert!(matches!(
            parse_signal(&raw),
            Err(InputError::WrongCount { found: 61, .. })
        ));
    }

    #[test]
    fn non_numeric_token_reports_position() {
        let mut tokens = vec!["0.1"; SIGNAL_LEN];
        tokens[4] = "abc";
        let err = parse_signal(&tokens.join(",")).unwrap_err();
        assert_eq!(
            err,
            InputError::NotNumeric {
                position: 5,
                token: "abc".to_string()
            }
        );
        assert_eq!(err.summary(), "Invalid input.");
    }

    #[test]
    fn token_errors_win_over_count() {
        assert!(matches!(
            parse_signal("1,x"),
            Err(InputError::NotNumeric { position: 2, .. })
        ));
    }

    #[test]
    fn empty_input_is_not_numeric() {
        assert!(matches!(
            parse_signal(""),
            Err(InputError::NotNumeric { position: 1, .. })
        ));
        assert!(matches!(
            parse_signal("1,,2"),
            Err(InputError::NotNumeric { position: 2, .. })
        ));
    }

    #[test]
    fn nan_and_infinity_are_rejected() {
        let mut tokens = vec!["0.1"; SIGNAL_LEN];
        tokens[0] = "NaN";
        assert_eq!(
            parse_signal(&tokens.join(",")).unwrap_err(),
            InputError::NonFinite { position: 1 }
        );
        tokens[0] = "inf";
        assert!(matches!(
            parse_signal(&tokens.join(",")),
            Err(InputError::NonFinite { .. })
        ));
    }
}
