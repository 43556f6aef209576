//! Culture descriptors for number and date parsing.
//!
//! A [`Culture`] is a small captured descriptor, not a handle to an ambient
//! platform locale: the separators and currency symbol are fixed at
//! construction and travel with the configuration.

/// Number-formatting culture captured at configuration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Culture {
    /// BCP 47-style name, `"invariant"` for the neutral culture.
    pub name: &'static str,
    /// Decimal separator.
    pub decimal_separator: char,
    /// Digit group separator.
    pub group_separator: char,
    /// Currency symbol recognized by money parsing.
    pub currency_symbol: &'static str,
}

impl Default for Culture {
    fn default() -> Self {
        Self::invariant()
    }
}

impl Culture {
    /// The neutral culture: `.` decimal, `,` grouping, `¤` currency.
    #[must_use]
    pub const fn invariant() -> Self {
        Self {
            name: "invariant",
            decimal_separator: '.',
            group_separator: ',',
            currency_symbol: "¤",
        }
    }

    /// United States English.
    #[must_use]
    pub const fn en_us() -> Self {
        Self {
            name: "en-US",
            decimal_separator: '.',
            group_separator: ',',
            currency_symbol: "$",
        }
    }

    /// German (Germany).
    #[must_use]
    pub const fn de_de() -> Self {
        Self {
            name: "de-DE",
            decimal_separator: ',',
            group_separator: '.',
            currency_symbol: "€",
        }
    }

    /// French (France).
    #[must_use]
    pub const fn fr_fr() -> Self {
        Self {
            name: "fr-FR",
            decimal_separator: ',',
            group_separator: '\u{00A0}',
            currency_symbol: "€",
        }
    }

    /// Swedish (Sweden).
    #[must_use]
    pub const fn sv_se() -> Self {
        Self {
            name: "sv-SE",
            decimal_separator: ',',
            group_separator: '\u{00A0}',
            currency_symbol: "kr",
        }
    }

    /// Look a culture up by name, case-insensitively. The empty string and
    /// `"invariant"` both name the neutral culture.
    #[must_use]
    pub fn named(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "" | "invariant" => Some(Self::invariant()),
            "en-us" | "en" => Some(Self::en_us()),
            "de-de" | "de" => Some(Self::de_de()),
            "fr-fr" | "fr" => Some(Self::fr_fr()),
            "sv-se" | "sv" => Some(Self::sv_se()),
            _ => None,
        }
    }

    /// Format a decimal with this culture's decimal separator (no grouping).
    #[must_use]
    pub fn format_decimal(&self, value: &rust_decimal::Decimal) -> String {
        let plain = value.to_string();
        if self.decimal_separator == '.' {
            plain
        } else {
            plain.replace('.', &self.decimal_separator.to_string())
        }
    }
}
