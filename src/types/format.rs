//! Parsing settings for the delimited text files read by the crate.
//!
//! Nothing here is inferred from the file or from process-wide state: every
//! loader receives its format explicitly.

use std::fmt;

/// The character separating the integer and fractional part of a decimal number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DecimalSeparator {
    /// `16,3`, as written in most continental European locales.
    #[default]
    Comma,
    /// `16.3`
    Period,
}

impl DecimalSeparator {
    pub fn as_char(&self) -> char {
        match self {
            DecimalSeparator::Comma => ',',
            DecimalSeparator::Period => '.',
        }
    }

    /// Parses `raw` as a decimal number written with this separator.
    ///
    /// Surrounding whitespace is ignored. With [`DecimalSeparator::Comma`] a period
    /// is not accepted as the decimal point, so `"1.5"` fails to parse.
    ///
    /// # Examples
    ///
    /// ```
    /// use hydrocover::DecimalSeparator;
    ///
    /// assert_eq!(DecimalSeparator::Comma.parse("16,3"), Some(16.3));
    /// assert_eq!(DecimalSeparator::Period.parse("16.3"), Some(16.3));
    /// assert_eq!(DecimalSeparator::Comma.parse("16.3"), None);
    /// ```
    pub fn parse(&self, raw: &str) -> Option<f64> {
        let trimmed = raw.trim();
        match self {
            DecimalSeparator::Period => trimmed.parse().ok(),
            DecimalSeparator::Comma => {
                if trimmed.contains('.') {
                    return None;
                }
                trimmed.replacen(',', ".", 1).parse().ok()
            }
        }
    }
}

impl fmt::Display for DecimalSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Layout of the station metadata file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataFormat {
    /// Field delimiter. Defaults to `;`.
    pub separator: u8,
    /// Decimal separator for `lon`, `lat`, `z` and `catchment`. Defaults to a comma.
    pub decimal: DecimalSeparator,
}

impl Default for MetadataFormat {
    fn default() -> Self {
        Self {
            separator: b';',
            decimal: DecimalSeparator::Comma,
        }
    }
}

impl MetadataFormat {
    /// Period-decimal, comma-delimited files.
    pub fn period_decimal() -> Self {
        Self {
            separator: b',',
            decimal: DecimalSeparator::Period,
        }
    }
}

/// Layout of a per-station discharge series file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesFormat {
    /// Whether the first row is a header. Defaults to `true`.
    pub has_header: bool,
    /// Field delimiter. Defaults to `,`.
    pub separator: u8,
    /// Decimal separator for the `discharge` column. Defaults to a period.
    pub decimal: DecimalSeparator,
    /// chrono format string for the `time` column. Defaults to `%Y-%m-%d`.
    pub date_format: String,
}

impl Default for SeriesFormat {
    fn default() -> Self {
        Self {
            has_header: true,
            separator: b',',
            decimal: DecimalSeparator::Period,
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

/// Rejects field delimiters that collide with the decimal separator.
pub(crate) fn check_separators(separator: u8, decimal: DecimalSeparator) -> Result<(), String> {
    if separator as char == decimal.as_char() {
        return Err(format!(
            "field separator '{}' cannot equal the decimal separator",
            separator as char
        ));
    }
    Ok(())
}
