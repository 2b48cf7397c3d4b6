//! Weave / construction codes and their families

use serde::{Deserialize, Serialize};
use std::fmt;

/// Code every unclassifiable weave is repaired to
pub const FALLBACK_WEAVE_CODE: &str = "ZZ";

/// Weave family (the `categoryMajor` display label source)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaveFamily {
    Plain,
    Twill,
    Satin,
    Fancy,
    Knit,
    Etc,
}

impl WeaveFamily {
    /// Display label stored in `categoryMajor`
    pub fn label(self) -> &'static str {
        match self {
            Self::Plain => "평직 (Plain)",
            Self::Twill => "능직 (Twill)",
            Self::Satin => "주자직 (Satin)",
            Self::Fancy => "변형 (Fancy)",
            Self::Knit => "니트 (Knit)",
            Self::Etc => "기타 (Etc)",
        }
    }
}

impl fmt::Display for WeaveFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// (code, family, Korean fabric name where one is conventional)
pub(crate) const WEAVE_TABLE: [(&str, WeaveFamily, Option<&str>); 24] = [
    ("PL", WeaveFamily::Plain, Some("기본 평직")),
    ("PO", WeaveFamily::Plain, Some("옥스포드")),
    ("PB", WeaveFamily::Plain, None),
    ("PR", WeaveFamily::Plain, Some("립스탑")),
    ("PP", WeaveFamily::Plain, None),
    ("PC", WeaveFamily::Plain, None),
    ("TW", WeaveFamily::Twill, Some("능직")),
    ("TD", WeaveFamily::Twill, None),
    ("TH", WeaveFamily::Twill, None),
    ("TB", WeaveFamily::Twill, None),
    ("TS", WeaveFamily::Twill, None),
    ("SA", WeaveFamily::Satin, Some("새틴")),
    ("SN", WeaveFamily::Satin, None),
    ("SC", WeaveFamily::Satin, None),
    ("DO", WeaveFamily::Fancy, Some("도비")),
    ("DP", WeaveFamily::Fancy, None),
    ("JA", WeaveFamily::Fancy, Some("자카드")),
    ("VL", WeaveFamily::Fancy, Some("벨벳")),
    // CO here is Corduroy; the fiber table's CO (Cotton) is a separate vocabulary
    ("CO", WeaveFamily::Fancy, Some("코듀로이")),
    ("SE", WeaveFamily::Fancy, Some("시어서커")),
    ("KS", WeaveFamily::Knit, Some("싱글 저지")),
    ("KI", WeaveFamily::Knit, Some("인터록")),
    ("KR", WeaveFamily::Knit, Some("리브")),
    (FALLBACK_WEAVE_CODE, WeaveFamily::Etc, Some("기타")),
];
