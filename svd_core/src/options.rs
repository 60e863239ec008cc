//! The options a company supplies to narrow down which dates apply to it.
//!
//! Every option is named and spelled like the query parameter Skatteverket expects, so the same
//! values are accepted from the incoming request, sent upstream and offered on the command line.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// All options for one calendar.
///
/// Missing fields fall back to their defaults, so an empty query string is a valid request.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Options {
    #[serde(rename = "foretagsform")]
    pub company_form: CompanyForm,
    #[serde(rename = "momsredovisningsperiod")]
    pub vat_period: VatPeriod,
    #[serde(rename = "omsattning")]
    pub turnover: Turnover,
    #[serde(rename = "rakenskapsaretsSistaManad")]
    pub fiscal_year_end_month: FiscalYearEndMonth,
    #[serde(rename = "arbetsgivare")]
    pub include_employer_events: bool,
}

/// Declares an option enum together with its wire values.
///
/// The wire value is used for parsing, displaying and (de)serializing, and parsing an unknown
/// value fails with a [`ValidationError`] naming the query parameter.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident($field:literal) {
            #[default]
            $default:ident => $default_wire:literal,
            $($variant:ident => $wire:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
        #[serde(try_from = "String", into = "&'static str")]
        pub enum $name {
            #[default]
            $default,
            $($variant,)*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$name::$default, $($name::$variant,)*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $name::$default => $default_wire,
                    $($name::$variant => $wire,)*
                }
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .find(|candidate| candidate.as_str() == value)
                    .copied()
                    .ok_or_else(|| {
                        let allowed: Vec<&str> = $name::ALL.iter().map($name::as_str).collect();
                        ValidationError::new(
                            $field,
                            value,
                            format!("expected one of {}", allowed.join(", ")),
                        )
                    })
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for &'static str {
            fn from(value: $name) -> Self {
                value.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// The legal form of the company.
    CompanyForm("foretagsform") {
        #[default]
        SoleProprietorship => "ENSKILD_NARINGSIDKARE",
        LimitedCompany => "AKTIEBOLAG_FORENINGAR",
        Partnership => "HANDELSBOLAG_KOMMANDITBOLAG",
    }
}

wire_enum! {
    /// How often VAT is reported.
    VatPeriod("momsredovisningsperiod") {
        #[default]
        Quarterly => "KVARTAL",
        Yearly => "AR",
        Monthly => "MANAD",
    }
}

wire_enum! {
    /// The yearly turnover bracket.
    Turnover("omsattning") {
        #[default]
        UpToOneMillion => "UPP_TILL_EN_MILJON",
        OneToFortyMillion => "MER_AN_EN_MILJON_TILL_FYRTIO_MILJONER",
        OverFortyMillion => "OVER_FYRTIO_MILJONER",
    }
}

/// The last month (1 to 12) of the fiscal year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FiscalYearEndMonth(u8);

impl FiscalYearEndMonth {
    const FIELD: &'static str = "rakenskapsaretsSistaManad";

    pub fn new(month: u8) -> Result<Self, ValidationError> {
        if (1..=12).contains(&month) {
            Ok(Self(month))
        } else {
            Err(ValidationError::new(
                Self::FIELD,
                month.to_string(),
                "expected a month between 1 and 12",
            ))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl Default for FiscalYearEndMonth {
    /// December, i.e. the fiscal year is the calendar year.
    fn default() -> Self {
        Self(12)
    }
}

impl TryFrom<u8> for FiscalYearEndMonth {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FiscalYearEndMonth> for u8 {
    fn from(value: FiscalYearEndMonth) -> Self {
        value.0
    }
}

impl FromStr for FiscalYearEndMonth {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let month: u8 = value.trim().parse().map_err(|_| {
            ValidationError::new(Self::FIELD, value, "expected a month between 1 and 12")
        })?;
        Self::new(month)
    }
}

impl fmt::Display for FiscalYearEndMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
