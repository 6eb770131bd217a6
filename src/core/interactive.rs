use crate::core::evaluator::{CuppingCalculator, MAX_DECIMALS};
use crate::core::report::{formula_banner, render_details, render_results};
use crate::domain::model::{CuppingResult, Section};
use crate::utils::error::{CuppingError, Result};
use crate::utils::validation::validate_range;
use std::io::{BufRead, Write};

/// Prompt-driven cupping form over any line reader and writer.
///
/// A bad entry is reported and the same field is asked again. Running out
/// of input before the form is complete ends the session with
/// [`CuppingError::InputClosed`].
pub struct InteractiveSession<R: BufRead, W: Write> {
    input: R,
    output: W,
    decimals: u32,
}

impl<R: BufRead, W: Write> InteractiveSession<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            decimals: 2,
        }
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn run(&mut self) -> Result<CuppingResult> {
        validate_range("decimals", self.decimals, 0, MAX_DECIMALS)?;
        write!(self.output, "{}", formula_banner())?;

        let mut calculator = CuppingCalculator::new();

        writeln!(self.output, "\nEnter scores for each section (0-10 scale):\n")?;
        for section in Section::ALL {
            let prompt = format!("  {:15}: ", section.label());
            self.ask(&prompt, section.as_str(), |line| {
                let score = parse_number::<f64>(section.as_str(), line)?;
                calculator.set_score(section.as_str(), score)
            })?;
        }

        writeln!(self.output, "\nEnter cup quality information:\n")?;
        self.ask("  Non-uniform cups: ", "non_uniform", |line| {
            calculator.set_non_uniform(parse_number::<i64>("non_uniform", line)?)
        })?;
        self.ask("  Defective cups: ", "defective", |line| {
            calculator.set_defective(parse_number::<i64>("defective", line)?)
        })?;

        let result = calculator.breakdown();
        tracing::debug!(
            final_score = result.final_score,
            "interactive evaluation complete"
        );

        write!(self.output, "{}", render_results(&result, self.decimals))?;
        write!(self.output, "{}", render_details(&result, self.decimals))?;
        writeln!(self.output)?;
        self.output.flush()?;

        Ok(result)
    }

    fn ask<F>(&mut self, prompt: &str, field: &str, mut accept: F) -> Result<()>
    where
        F: FnMut(&str) -> Result<()>,
    {
        loop {
            write!(self.output, "{}", prompt)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Err(CuppingError::InputClosed {
                    field: field.to_string(),
                });
            }

            match accept(line.trim()) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::debug!(field, error = %e, "rejected interactive entry");
                    writeln!(self.output, "    Error: {}. Please try again.", e)?;
                }
            }
        }
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T> {
    raw.parse::<T>().map_err(|_| CuppingError::InvalidInput {
        field: field.to_string(),
        value: raw.to_string(),
        reason: "not a number".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_session(script: &str) -> (Result<CuppingResult>, String) {
        let mut output = Vec::new();
        let result = InteractiveSession::new(Cursor::new(script.to_string()), &mut output).run();
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_complete_session() {
        let (result, output) = run_session("8\n8\n8\n8\n8\n8\n8\n8\n1\n1\n");
        let result = result.unwrap();
        assert_eq!(result.final_score, 88.75);
        assert!(output.contains("FINAL SCORE: 88.75"));
        assert!(output.contains("Calculation Details:"));
    }

    #[test]
    fn test_invalid_entries_reprompt_same_field() {
        let script = "abc\n11\n9\n9\n9\n9\n9\n9\n9\n9\n-1\n0\n0\n";
        let (result, output) = run_session(script);
        let result = result.unwrap();

        assert_eq!(result.sum_of_sections, 72.0);
        assert_eq!(output.matches("Please try again.").count(), 3);
        assert!(output.contains("not a number"));
        assert!(output.contains("score must be between 0 and 10"));
        assert!(output.contains("count must be non-negative"));
    }

    #[test]
    fn test_excessive_decimals_rejected_before_prompting() {
        let mut output = Vec::new();
        let result = InteractiveSession::new(Cursor::new("8\n".to_string()), &mut output)
            .with_decimals(400)
            .run();
        assert!(matches!(
            result,
            Err(CuppingError::InvalidConfigValueError { ref field, .. }) if field == "decimals"
        ));
        assert!(output.is_empty());
    }

    #[test]
    fn test_eof_aborts_with_field_name() {
        let (result, _) = run_session("8\n8\n");
        match result {
            Err(CuppingError::InputClosed { field }) => assert_eq!(field, "flavor"),
            other => panic!("expected InputClosed, got {:?}", other),
        }
    }
}
