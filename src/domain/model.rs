use crate::utils::error::{CuppingError, Result};
use crate::utils::validation::{validate_count, validate_score};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The eight affective sections scored on a cupping form, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Fragrance,
    Aroma,
    Flavor,
    Aftertaste,
    Acidity,
    Body,
    Balance,
    Overall,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Fragrance,
        Section::Aroma,
        Section::Flavor,
        Section::Aftertaste,
        Section::Acidity,
        Section::Body,
        Section::Balance,
        Section::Overall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Fragrance => "fragrance",
            Section::Aroma => "aroma",
            Section::Flavor => "flavor",
            Section::Aftertaste => "aftertaste",
            Section::Acidity => "acidity",
            Section::Body => "body",
            Section::Balance => "balance",
            Section::Overall => "overall",
        }
    }

    /// Capitalised name used in printed forms.
    pub fn label(&self) -> &'static str {
        match self {
            Section::Fragrance => "Fragrance",
            Section::Aroma => "Aroma",
            Section::Flavor => "Flavor",
            Section::Aftertaste => "Aftertaste",
            Section::Acidity => "Acidity",
            Section::Body => "Body",
            Section::Balance => "Balance",
            Section::Overall => "Overall",
        }
    }

    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(Section::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = CuppingError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|section| section.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CuppingError::InvalidSection {
                name: s.to_string(),
                valid: Section::names(),
            })
    }
}

/// A complete, validated set of section scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionScores {
    values: [f64; 8],
}

impl SectionScores {
    /// Every section set to the same score.
    pub fn uniform(score: f64) -> Result<Self> {
        Self::from_pairs(Section::ALL.iter().map(|s| (s.as_str(), score)))
    }

    /// Builds scores from `(section name, value)` pairs.
    ///
    /// Names are matched case-insensitively. Each of the eight sections must
    /// appear exactly once and every value must lie in `[0, 10]`.
    pub fn from_pairs<I, K>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut slots: [Option<f64>; 8] = [None; 8];

        for (name, value) in pairs {
            let section: Section = name.as_ref().parse()?;
            validate_score(section.as_str(), value)?;

            let slot = &mut slots[section.index()];
            if slot.is_some() {
                return Err(CuppingError::DuplicateSection {
                    section: section.to_string(),
                });
            }
            *slot = Some(value);
        }

        let mut values = [0.0; 8];
        for section in Section::ALL {
            values[section.index()] =
                slots[section.index()].ok_or_else(|| CuppingError::MissingSection {
                    section: section.to_string(),
                })?;
        }

        Ok(Self { values })
    }

    pub fn get(&self, section: Section) -> f64 {
        self.values[section.index()]
    }

    pub(crate) fn set(&mut self, section: Section, value: f64) -> Result<()> {
        validate_score(section.as_str(), value)?;
        self.values[section.index()] = value;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Section, f64)> + '_ {
        Section::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }
}

impl Default for SectionScores {
    /// All sections at zero, the state of a blank cupping form.
    fn default() -> Self {
        Self { values: [0.0; 8] }
    }
}

impl Serialize for SectionScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Section::ALL.len()))?;
        for (section, value) in self.iter() {
            map.serialize_entry(section.as_str(), &value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CupQualityCounts {
    pub non_uniform: u32,
    pub defective: u32,
}

impl CupQualityCounts {
    pub fn new(non_uniform: i64, defective: i64) -> Result<Self> {
        Ok(Self {
            non_uniform: validate_count("non_uniform", non_uniform)?,
            defective: validate_count("defective", defective)?,
        })
    }
}

/// Classification band of a final cupping score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    BelowStandard,
    Fair,
    Good,
    VeryGood,
    Excellent,
    Outstanding,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::Outstanding
        } else if score >= 85.0 {
            Grade::Excellent
        } else if score >= 80.0 {
            Grade::VeryGood
        } else if score >= 75.0 {
            Grade::Good
        } else if score >= 70.0 {
            Grade::Fair
        } else {
            Grade::BelowStandard
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Grade::Outstanding => "Outstanding (Specialty Grade)",
            Grade::Excellent => "Excellent (Specialty Grade)",
            Grade::VeryGood => "Very Good (Specialty Grade)",
            Grade::Good => "Good (Premium Grade)",
            Grade::Fair => "Fair (Exchange Grade)",
            Grade::BelowStandard => "Below Standard",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one evaluation. All fields are unrounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CuppingResult {
    pub scores: SectionScores,
    pub counts: CupQualityCounts,
    pub sum_of_sections: f64,
    pub base_contribution: f64,
    pub non_uniform_penalty: f64,
    pub defect_penalty: f64,
    pub final_score: f64,
}

impl CuppingResult {
    pub fn grade(&self) -> Grade {
        Grade::from_score(self.final_score)
    }
}

/// One row of a cupping sheet, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CuppingSample {
    /// 1-based data row number in the sheet (header excluded).
    pub row: usize,
    pub name: String,
    pub origin: Option<String>,
    pub scores: Vec<(Section, String)>,
    pub non_uniform: Option<String>,
    pub defective: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedSample {
    pub rank: usize,
    pub name: String,
    pub origin: Option<String>,
    pub grade: Grade,
    pub result: CuppingResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub samples: Vec<RankedSample>,
    pub highest_score: f64,
    pub lowest_score: f64,
    pub score_range: f64,
}
