//! Tutorial command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use pharmacheck_core::onboarding::{self, Advance, OnboardingStep, OnboardingWizard};

use crate::Output;

fn print_step(number: usize, total: usize, step: &OnboardingStep) {
    let title = format!("[{number}/{total}] {}", step.title);
    if step.warning {
        println!("{}", title.yellow().bold());
    } else {
        println!("{}", title.bold());
    }
    println!("   {}", step.description);
    println!("   {} {}", "Tip:".dimmed(), step.tip);
}

/// Execute the tutorial command.
pub fn execute(step: Option<usize>, out: Output) -> Result<()> {
    let mut wizard = OnboardingWizard::new();
    let total = wizard.step_count();

    let steps: Vec<(usize, &OnboardingStep)> = match step {
        Some(n) => {
            let s = n
                .checked_sub(1)
                .and_then(onboarding::step)
                .with_context(|| format!("No tutorial step {n} (expected 1-{total})"))?;
            vec![(n, s)]
        }
        None => {
            let mut steps = vec![(1, wizard.current())];
            while let Advance::Step(index) = wizard.next() {
                steps.push((index + 1, wizard.current()));
            }
            steps
        }
    };

    if out.json {
        let docs: Vec<_> = steps.iter().map(|(_, s)| s).collect();
        println!("{}", serde_json::to_string_pretty(&docs)?);
    } else if !out.quiet {
        for (i, (number, s)) in steps.iter().enumerate() {
            if i > 0 {
                println!();
            }
            print_step(*number, total, s);
        }
    }
    Ok(())
}
