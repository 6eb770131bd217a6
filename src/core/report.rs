use crate::core::evaluator::{round_half_even, BASE_SCORE, COEFFICIENT, DEFECT_PENALTY, NON_UNIFORM_PENALTY};
use crate::domain::model::{BatchReport, CuppingResult};
use std::fmt::Write;

const RULE_WIDTH: usize = 60;

fn heavy_rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn light_rule() -> String {
    "-".repeat(RULE_WIDTH)
}

pub fn formula_banner() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", heavy_rule());
    let _ = writeln!(out, "COFFEE CUPPING SCORE CALCULATOR");
    let _ = writeln!(out, "{}", heavy_rule());
    let _ = writeln!(out, "\nThis calculator uses the standard cupping formula:");
    let _ = writeln!(out, "S = {} × Σ(h_i) + {} - 2u - 4d", COEFFICIENT, BASE_SCORE);
    let _ = writeln!(out, "\nWhere:");
    let _ = writeln!(out, "  - h_i: score for each of 8 sections (0-10 scale)");
    let _ = writeln!(out, "  - u: Number of non-uniform cups");
    let _ = writeln!(out, "  - d: Number of defective cups");
    let _ = writeln!(out, "\n{}", heavy_rule());
    out
}

/// Section table, intermediate terms and final score.
pub fn render_results(result: &CuppingResult, decimals: u32) -> String {
    let d = decimals as usize;
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", heavy_rule());
    let _ = writeln!(out, "COFFEE CUPPING SCORE - RESULTS");
    let _ = writeln!(out, "{}", heavy_rule());
    let _ = writeln!(out, "\nSection Scores:");
    for (section, score) in result.scores.iter() {
        let _ = writeln!(out, "  {:15} {:5.2}", section.label(), score);
    }
    let _ = writeln!(out, "\nSum of sections: {:.2}", result.sum_of_sections);
    let _ = writeln!(
        out,
        "Base contribution: {:.*}",
        d,
        round_half_even(result.base_contribution, decimals)
    );
    let _ = writeln!(out, "Non-uniform penalty: -{:.2}", result.non_uniform_penalty);
    let _ = writeln!(out, "Defect penalty: -{:.2}", result.defect_penalty);
    let _ = writeln!(out, "\n{}", heavy_rule());
    let _ = writeln!(
        out,
        "FINAL SCORE: {:.*}",
        d,
        round_half_even(result.final_score, decimals)
    );
    let _ = writeln!(out, "Classification: {}", result.grade());
    let _ = writeln!(out, "{}", heavy_rule());
    out
}

/// Step-by-step arithmetic behind a result.
pub fn render_details(result: &CuppingResult, decimals: u32) -> String {
    let d = decimals as usize;
    let mut out = String::new();
    let _ = writeln!(out, "\nCalculation Details:");
    let _ = writeln!(
        out,
        "  Sum of sections (Σh_i) = {:.2}",
        result.sum_of_sections
    );
    let _ = writeln!(
        out,
        "  {} × {:.2} + {} = {:.*}",
        COEFFICIENT,
        result.sum_of_sections,
        BASE_SCORE,
        d,
        round_half_even(result.base_contribution, decimals)
    );
    let _ = writeln!(
        out,
        "  Non-uniform penalty ({} × {}) = {:.2}",
        NON_UNIFORM_PENALTY, result.counts.non_uniform, result.non_uniform_penalty
    );
    let _ = writeln!(
        out,
        "  Defect penalty ({} × {}) = {:.2}",
        DEFECT_PENALTY, result.counts.defective, result.defect_penalty
    );
    let _ = writeln!(
        out,
        "  Final Score = {:.*}",
        d,
        round_half_even(result.final_score, decimals)
    );
    out
}

pub fn render_ranking(report: &BatchReport, decimals: u32) -> String {
    let d = decimals as usize;
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", light_rule());
    let _ = writeln!(out, "CUPPING RESULTS RANKING");
    let _ = writeln!(out, "{}", light_rule());

    for sample in &report.samples {
        let _ = writeln!(out, "\n#{} - {}", sample.rank, sample.name);
        if let Some(origin) = &sample.origin {
            let _ = writeln!(out, "     Origin: {}", origin);
        }
        let _ = writeln!(out, "     Grade: {}", sample.grade);
        let _ = writeln!(
            out,
            "     Score: {:.*}",
            d,
            round_half_even(sample.result.final_score, decimals)
        );
        let _ = writeln!(
            out,
            "     Non-uniform cups: {}",
            sample.result.counts.non_uniform
        );
        let _ = writeln!(out, "     Defective cups: {}", sample.result.counts.defective);
    }

    if let (Some(first), Some(last)) = (report.samples.first(), report.samples.last()) {
        let _ = writeln!(out, "\n{}", light_rule());
        let _ = writeln!(
            out,
            "\nHighest Score: {} - {:.*}",
            first.name,
            d,
            round_half_even(report.highest_score, decimals)
        );
        let _ = writeln!(
            out,
            "Lowest Score: {} - {:.*}",
            last.name,
            d,
            round_half_even(report.lowest_score, decimals)
        );
        let _ = writeln!(
            out,
            "Score Range: {:.*} points",
            d,
            round_half_even(report.score_range, decimals)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::evaluator::CuppingScoreEvaluator;
    use crate::domain::model::Section;

    fn sample_result() -> CuppingResult {
        let scores = [
            ("fragrance", 8.5),
            ("aroma", 8.25),
            ("flavor", 8.75),
            ("aftertaste", 8.5),
            ("acidity", 8.5),
            ("body", 8.25),
            ("balance", 8.5),
            ("overall", 8.75),
        ];
        CuppingScoreEvaluator::evaluate(scores, 0, 0).unwrap()
    }

    #[test]
    fn test_results_block_lists_every_section() {
        let text = render_results(&sample_result(), 2);
        for section in Section::ALL {
            assert!(text.contains(section.label()));
        }
        assert!(text.contains("Sum of sections: 67.00"));
        assert!(text.contains("FINAL SCORE: 96.72"));
        assert!(text.contains("Outstanding (Specialty Grade)"));
    }

    #[test]
    fn test_details_show_penalty_arithmetic() {
        let scores: Vec<_> = Section::ALL.iter().map(|s| (s.as_str(), 8.0)).collect();
        let result = CuppingScoreEvaluator::evaluate(scores, 3, 2).unwrap();
        let text = render_details(&result, 2);
        assert!(text.contains("Non-uniform penalty (2 × 3) = 6.00"));
        assert!(text.contains("Defect penalty (4 × 2) = 8.00"));
        assert!(text.contains("Final Score = 80.75"));
    }

    #[test]
    fn test_exact_tie_prints_even_digit() {
        let scores: Vec<_> = Section::ALL.iter().map(|s| (s.as_str(), 1.5)).collect();
        let result = CuppingScoreEvaluator::evaluate(scores, 0, 0).unwrap();
        assert_eq!(result.final_score, 60.625);
        assert!(render_results(&result, 2).contains("FINAL SCORE: 60.62\n"));
    }

    #[test]
    fn test_decimals_control_presented_precision() {
        let text = render_results(&sample_result(), 3);
        assert!(text.contains("FINAL SCORE: 96.719"));
    }
}
