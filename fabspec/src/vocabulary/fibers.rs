//! Fiber identities and their per-scheme codes
//!
//! Two code schemes exist for the same fourteen fibers. `legacy` is the
//! two-letter set the form and prompt were built on; `iso` is the
//! ISO 2076 / EU textile-label style set. The table below is the only place
//! the two are related, so migration never guesses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fiber code scheme tag carried on every record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FiberScheme {
    /// Two-letter codes (PE, NA, AC, VI, MD, TE, ...)
    #[default]
    Legacy,
    /// ISO-style codes (PES, PA, PAN, CV, CMD, CLY, ...)
    Iso,
}

impl FiberScheme {
    pub const ALL: [FiberScheme; 2] = [FiberScheme::Legacy, FiberScheme::Iso];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Iso => "iso",
        }
    }
}

impl fmt::Display for FiberScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FiberScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "iso" => Ok(Self::Iso),
            other => Err(format!("unknown fiber scheme '{}' (expected legacy or iso)", other)),
        }
    }
}

/// Canonical fiber identity, independent of any code scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Fiber {
    Cotton,
    Linen,
    Wool,
    Silk,
    Polyester,
    Nylon,
    Polyurethane,
    Elastane,
    Acrylic,
    Viscose,
    Modal,
    Lyocell,
    Microfiber,
    Cashmere,
}

/// (fiber, legacy code, iso code, display label)
static FIBER_TABLE: [(Fiber, &str, &str, &str); 14] = [
    (Fiber::Cotton, "CO", "CO", "Cotton"),
    (Fiber::Linen, "LI", "LI", "Linen"),
    (Fiber::Wool, "WO", "WO", "Wool"),
    (Fiber::Silk, "SE", "SE", "Silk"),
    (Fiber::Polyester, "PE", "PES", "Polyester"),
    (Fiber::Nylon, "NA", "PA", "Nylon"),
    (Fiber::Polyurethane, "PU", "PU", "Polyurethane"),
    (Fiber::Elastane, "EL", "EL", "Elastane"),
    (Fiber::Acrylic, "AC", "PAN", "Acrylic"),
    (Fiber::Viscose, "VI", "CV", "Viscose"),
    (Fiber::Modal, "MD", "CMD", "Modal"),
    (Fiber::Lyocell, "TE", "CLY", "Lyocell"),
    (Fiber::Microfiber, "MI", "MI", "Microfiber"),
    (Fiber::Cashmere, "CA", "CA", "Cashmere"),
];

impl Fiber {
    pub const ALL: [Fiber; 14] = [
        Fiber::Cotton,
        Fiber::Linen,
        Fiber::Wool,
        Fiber::Silk,
        Fiber::Polyester,
        Fiber::Nylon,
        Fiber::Polyurethane,
        Fiber::Elastane,
        Fiber::Acrylic,
        Fiber::Viscose,
        Fiber::Modal,
        Fiber::Lyocell,
        Fiber::Microfiber,
        Fiber::Cashmere,
    ];

    fn row(self) -> &'static (Fiber, &'static str, &'static str, &'static str) {
        // FIBER_TABLE lists every variant in declaration order
        &FIBER_TABLE[self as usize]
    }

    /// Code for this fiber under `scheme`
    pub fn code(self, scheme: FiberScheme) -> &'static str {
        let &(_, legacy, iso, _) = self.row();
        match scheme {
            FiberScheme::Legacy => legacy,
            FiberScheme::Iso => iso,
        }
    }

    /// English display label
    pub fn label(self) -> &'static str {
        self.row().3
    }

    /// Look up a fiber by its exact code under `scheme`
    pub fn from_code(code: &str, scheme: FiberScheme) -> Option<Fiber> {
        Fiber::ALL.into_iter().find(|f| f.code(scheme) == code)
    }
}

/// Map a code from one scheme to another through the explicit table
///
/// Returns `None` when `code` is not a member of `from`.
pub fn migrate_code(code: &str, from: FiberScheme, to: FiberScheme) -> Option<&'static str> {
    Fiber::from_code(code, from).map(|fiber| fiber.code(to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_variants() {
        for fiber in Fiber::ALL {
            assert_eq!(fiber.row().0, fiber);
        }
    }

    #[test]
    fn test_scheme_specific_codes() {
        assert_eq!(Fiber::Polyester.code(FiberScheme::Legacy), "PE");
        assert_eq!(Fiber::Polyester.code(FiberScheme::Iso), "PES");
        assert_eq!(Fiber::Nylon.code(FiberScheme::Iso), "PA");
        assert_eq!(Fiber::Cotton.code(FiberScheme::Iso), "CO");
    }

    #[test]
    fn test_migrate_code_round_trip() {
        for fiber in Fiber::ALL {
            let legacy = fiber.code(FiberScheme::Legacy);
            let iso = migrate_code(legacy, FiberScheme::Legacy, FiberScheme::Iso).unwrap();
            let back = migrate_code(iso, FiberScheme::Iso, FiberScheme::Legacy).unwrap();
            assert_eq!(back, legacy);
        }
    }

    #[test]
    fn test_migrate_rejects_foreign_code() {
        // PES is not a legacy code, so there is nothing to migrate from
        assert_eq!(migrate_code("PES", FiberScheme::Legacy, FiberScheme::Iso), None);
        assert_eq!(migrate_code("Cotton", FiberScheme::Legacy, FiberScheme::Iso), None);
    }

    #[test]
    fn test_scheme_parse() {
        assert_eq!("ISO".parse::<FiberScheme>().unwrap(), FiberScheme::Iso);
        assert_eq!(" legacy ".parse::<FiberScheme>().unwrap(), FiberScheme::Legacy);
        assert!("metric".parse::<FiberScheme>().is_err());
    }
}
