use std::time::Instant;

use digitrace_core::generators::build;
use digitrace_core::{Algorithm, GeneratorOptions, check_base, parse_seed, sample};
use digitrace_tests::TestResult;

struct GeneratorReport {
    algorithm: Algorithm,
    digits: Vec<u8>,
    results: Vec<TestResult>,
}

pub fn run(
    digits: usize,
    base: u8,
    algorithm_filter: Option<&str>,
    seed: &str,
    output_path: Option<&str>,
) {
    if let Err(e) = check_base(base) {
        super::fail(e);
    }
    if digits == 0 {
        super::fail("--digits must be at least 1");
    }
    let seed = parse_seed(seed);
    let algorithms = super::select_algorithms(algorithm_filter);

    println!(
        "\u{1F52C} Running test battery on {} generator(s), {} base-{} digits each...\n",
        algorithms.len(),
        digits,
        base
    );

    let mut reports = Vec::new();
    for algorithm in algorithms {
        print!("  Sampling {:<14}", algorithm.key());

        let t0 = Instant::now();
        let mut generator = build(algorithm, base, GeneratorOptions::seeded(seed));
        let sampled = sample(&mut *generator, digits);
        if sampled.len() < digits {
            println!(" \u{2717} only {} digits", sampled.len());
            continue;
        }

        let results = digitrace_tests::run_all_tests(&sampled, base);
        let elapsed = t0.elapsed().as_secs_f64();
        let score = digitrace_tests::calculate_quality_score(&results);
        let passed = results.iter().filter(|r| r.passed).count();
        println!(
            " \u{2192} {:.0}/100 ({}/{} passed) [{:.2}s]",
            score,
            passed,
            results.len(),
            elapsed
        );

        reports.push(GeneratorReport {
            algorithm,
            digits: sampled,
            results,
        });
    }

    if reports.is_empty() {
        super::fail("no generator produced digits");
    }

    if let Some(path) = output_path {
        let report = generate_report(&reports, base);
        if let Err(e) = std::fs::write(path, &report) {
            eprintln!("Failed to write report to {path}: {e}");
        } else {
            println!("\n\u{1F4C4} Report saved to: {path}");
        }
    }

    // Summary table
    println!("\n{}", "=".repeat(60));
    println!(
        "{:<25} {:>6} {:>6} {:>8}",
        "Generator", "Score", "Grade", "Pass"
    );
    println!("{}", "-".repeat(60));

    reports.sort_by(|a, b| {
        let sa = digitrace_tests::calculate_quality_score(&a.results);
        let sb = digitrace_tests::calculate_quality_score(&b.results);
        sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal)
    });

    for report in &reports {
        let score = digitrace_tests::calculate_quality_score(&report.results);
        let passed = report.results.iter().filter(|r| r.passed).count();
        let warning = if report.algorithm.info().warning { " \u{26A0}" } else { "" };
        println!(
            "  {:<23} {:>5.1} {:>6} {:>4}/{}{}",
            report.algorithm.info().name,
            score,
            super::grade_for_score(score),
            passed,
            report.results.len(),
            warning
        );
    }
}

fn generate_report(reports: &[GeneratorReport], base: u8) -> String {
    let mut out = String::new();
    out.push_str("# digitrace: Digit Randomness Test Report\n\n");
    out.push_str(&format!("Generated: {}\n\n", unix_now()));
    out.push_str(&format!("Base: {base}\n\n"));

    for report in reports {
        let info = report.algorithm.info();
        let score = digitrace_tests::calculate_quality_score(&report.results);
        let passed = report.results.iter().filter(|r| r.passed).count();
        out.push_str(&format!("## {} (`{}`)\n\n", info.name, info.key));
        out.push_str(&format!(
            "- Samples: {} digits\n- Expected distribution: {}\n- Score: {:.1}/100\n- Passed: {}/{}\n\n",
            report.digits.len(),
            info.distribution,
            score,
            passed,
            report.results.len()
        ));

        out.push_str("| Test | P | Grade | p-value | Statistic | Details |\n");
        out.push_str("|------|---|-------|---------|-----------|--------|\n");
        for t in &report.results {
            let ok = if t.passed { "\u{2713}" } else { "\u{2717}" };
            let pval = t
                .p_value
                .map(|p| format!("{p:.6}"))
                .unwrap_or_else(|| "n/a".to_string());
            out.push_str(&format!(
                "| {} | {} | {} | {} | {:.4} | {} |\n",
                t.name, ok, t.grade, pval, t.statistic, t.details
            ));
        }
        out.push_str("\n---\n\n");
    }

    out
}

fn unix_now() -> String {
    let dur = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    format!("Unix timestamp: {}", dur.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_report_sections() {
        let mut generator = build(Algorithm::Pcg, 10, GeneratorOptions::seeded(1));
        let digits = sample(&mut *generator, 5000);
        let results = digitrace_tests::run_all_tests(&digits, 10);
        let report = generate_report(
            &[GeneratorReport {
                algorithm: Algorithm::Pcg,
                digits,
                results,
            }],
            10,
        );
        assert!(report.contains("## PCG (`pcg`)"));
        assert!(report.contains("- Samples: 5000 digits"));
        assert!(report.contains("| Digit Frequency |"));
    }
}
