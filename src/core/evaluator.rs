//! Specialty cupping score: `S = 0.65625 × Σh + 52.75 − 2u − 4d`.
//!
//! `h` are the eight affective section scores (0–10), `u` the number of
//! non-uniform cups and `d` the number of defective cups. The result is never
//! clamped; heavy penalties can push it below zero.

use crate::domain::model::{CupQualityCounts, CuppingResult, Section, SectionScores};
use crate::utils::error::Result;
use crate::utils::validation::validate_count;

pub const COEFFICIENT: f64 = 0.65625;
pub const BASE_SCORE: f64 = 52.75;
pub const NON_UNIFORM_PENALTY: f64 = 2.0;
pub const DEFECT_PENALTY: f64 = 4.0;

/// Largest number of decimal places accepted for presentation.
pub const MAX_DECIMALS: u32 = 6;

/// Rounds to `decimals` places, exact ties going to the even digit. Presentation only.
///
/// Precision beyond `f64::DIGITS` carries no information and is capped there.
pub fn round_half_even(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals.min(f64::DIGITS) as i32);
    (value * factor).round_ties_even() / factor
}

pub struct CuppingScoreEvaluator;

impl CuppingScoreEvaluator {
    /// Validates raw `(section name, score)` pairs and cup counts, then scores them.
    pub fn evaluate<I, K>(
        scores: I,
        non_uniform_count: i64,
        defective_count: i64,
    ) -> Result<CuppingResult>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let scores = SectionScores::from_pairs(scores)?;
        let counts = CupQualityCounts::new(non_uniform_count, defective_count)?;
        Ok(Self::compute(&scores, counts))
    }

    pub fn compute(scores: &SectionScores, counts: CupQualityCounts) -> CuppingResult {
        let sum_of_sections = scores.sum();
        let base_contribution = COEFFICIENT * sum_of_sections + BASE_SCORE;
        let non_uniform_penalty = NON_UNIFORM_PENALTY * f64::from(counts.non_uniform);
        let defect_penalty = DEFECT_PENALTY * f64::from(counts.defective);

        CuppingResult {
            scores: *scores,
            counts,
            sum_of_sections,
            base_contribution,
            non_uniform_penalty,
            defect_penalty,
            final_score: base_contribution - non_uniform_penalty - defect_penalty,
        }
    }
}

/// A cupping form filled in field by field.
///
/// Starts blank (every section at zero, no penalty cups). Each setter
/// validates its input and leaves the form untouched on error.
#[derive(Debug, Clone, Default)]
pub struct CuppingCalculator {
    scores: SectionScores,
    counts: CupQualityCounts,
}

impl CuppingCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_score(&mut self, section: &str, score: f64) -> Result<()> {
        let section: Section = section.parse()?;
        self.scores.set(section, score)
    }

    /// Applies every pair or none of them.
    pub fn set_all_scores<I, K>(&mut self, scores: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut staged = self.scores;
        for (name, value) in scores {
            let section: Section = name.as_ref().parse()?;
            staged.set(section, value)?;
        }
        self.scores = staged;
        Ok(())
    }

    pub fn set_cups_info(&mut self, non_uniform: i64, defective: i64) -> Result<()> {
        self.counts = CupQualityCounts::new(non_uniform, defective)?;
        Ok(())
    }

    pub fn set_non_uniform(&mut self, non_uniform: i64) -> Result<()> {
        self.counts.non_uniform = validate_count("non_uniform", non_uniform)?;
        Ok(())
    }

    pub fn set_defective(&mut self, defective: i64) -> Result<()> {
        self.counts.defective = validate_count("defective", defective)?;
        Ok(())
    }

    pub fn scores(&self) -> &SectionScores {
        &self.scores
    }

    pub fn counts(&self) -> CupQualityCounts {
        self.counts
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn breakdown(&self) -> CuppingResult {
        CuppingScoreEvaluator::compute(&self.scores, self.counts)
    }

    pub fn calculate(&self) -> f64 {
        self.breakdown().final_score
    }

    pub fn calculate_rounded(&self, decimals: u32) -> f64 {
        round_half_even(self.calculate(), decimals)
    }
}
