//! Statistical test battery for digit sequences.
//!
//! Provides 6 tests for judging how random a stream of digits in base 2 to 16
//! looks. Each test returns a [`TestResult`] with a p-value (where applicable),
//! a pass/fail determination, and a letter grade (A through F).

use flate2::Compression;
use flate2::write::ZlibEncoder;
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};
use std::io::Write;

const LABELS: &[u8; 16] = b"0123456789ABCDEF";

// ═══════════════════════════════════════════════════════════════════════════════
// Core types
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of a single randomness test.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub p_value: Option<f64>,
    pub statistic: f64,
    pub details: String,
    pub grade: char,
}

impl TestResult {
    /// Assign a letter grade based on p-value.
    ///
    /// - A: p >= 0.1
    /// - B: p >= 0.01
    /// - C: p >= 0.001
    /// - D: p >= 0.0001
    /// - F: otherwise or None
    pub fn grade_from_p(p: Option<f64>) -> char {
        match p {
            Some(p) if p >= 0.1 => 'A',
            Some(p) if p >= 0.01 => 'B',
            Some(p) if p >= 0.001 => 'C',
            Some(p) if p >= 0.0001 => 'D',
            _ => 'F',
        }
    }

    /// Determine pass/fail from p-value against a threshold (default 0.01).
    pub fn pass_from_p(p: Option<f64>, threshold: f64) -> bool {
        match p {
            Some(p) => p >= threshold,
            None => false,
        }
    }

    fn failed(name: &str, details: String) -> Self {
        TestResult {
            name: name.to_string(),
            passed: false,
            p_value: None,
            statistic: 0.0,
            details,
            grade: 'F',
        }
    }

    fn from_p(name: &str, p: f64, statistic: f64, details: String) -> Self {
        TestResult {
            name: name.to_string(),
            passed: TestResult::pass_from_p(Some(p), 0.01),
            p_value: Some(p),
            statistic,
            details,
            grade: TestResult::grade_from_p(Some(p)),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Return a failing `TestResult` when data is too short.
fn insufficient(name: &str, needed: usize, got: usize) -> TestResult {
    TestResult::failed(name, format!("Insufficient data: need {needed}, got {got}"))
}

/// Reject unsupported bases and digits outside `0..base`.
fn check_digits(name: &str, digits: &[u8], base: u8) -> Option<TestResult> {
    if !(2..=16).contains(&base) {
        return Some(TestResult::failed(name, format!("Unsupported base {base}")));
    }
    digits
        .iter()
        .find(|&&d| d >= base)
        .map(|d| TestResult::failed(name, format!("Digit {d} outside base {base}")))
}

/// Pearson chi-square over `bins` equally likely categories.
fn chi_square_uniform(hist: &[u64], n: usize) -> f64 {
    let expected = n as f64 / hist.len() as f64;
    hist.iter()
        .map(|&c| {
            let diff = c as f64 - expected;
            diff * diff / expected
        })
        .sum()
}

/// Chi-square on non-overlapping tuples of `width` digits.
fn tuple_frequency(name: &str, digits: &[u8], base: u8, width: u32) -> TestResult {
    if let Some(bad) = check_digits(name, digits, base) {
        return bad;
    }
    let bins = (base as usize).pow(width);
    // At least one expected hit per bin.
    let needed = bins * width as usize;
    if digits.len() < needed {
        return insufficient(name, needed, digits.len());
    }
    let mut hist = vec![0u64; bins];
    let mut tuples = 0usize;
    for chunk in digits.chunks_exact(width as usize) {
        let index = chunk
            .iter()
            .fold(0usize, |acc, &d| acc * base as usize + d as usize);
        hist[index] += 1;
        tuples += 1;
    }
    let chi2 = chi_square_uniform(&hist, tuples);
    let df = (bins - 1) as f64;
    let p = ChiSquared::new(df).map(|dist| dist.sf(chi2)).unwrap_or(0.0);
    TestResult::from_p(
        name,
        p,
        chi2,
        format!("tuples={tuples}, bins={bins}, df={df}"),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// 1. FREQUENCY TESTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Test 1: Digit frequency -- chi-squared on the digit histogram (base bins).
pub fn digit_frequency(digits: &[u8], base: u8) -> TestResult {
    let name = "Digit Frequency";
    if let Some(bad) = check_digits(name, digits, base) {
        return bad;
    }
    let n = digits.len();
    let needed = 5 * base as usize;
    if n < needed {
        return insufficient(name, needed, n);
    }
    let mut hist = vec![0u64; base as usize];
    for &d in digits {
        hist[d as usize] += 1;
    }
    let chi2 = chi_square_uniform(&hist, n);
    let df = f64::from(base - 1);
    let p = ChiSquared::new(df).map(|dist| dist.sf(chi2)).unwrap_or(0.0);
    TestResult::from_p(
        name,
        p,
        chi2,
        format!("n={n}, expected_per_digit={:.1}", n as f64 / f64::from(base)),
    )
}

/// Test 2: Serial pairs -- chi-squared on non-overlapping digit pairs.
pub fn serial_pairs(digits: &[u8], base: u8) -> TestResult {
    tuple_frequency("Serial Pairs", digits, base, 2)
}

/// Test 3: Triplet frequency -- chi-squared on non-overlapping digit triples.
pub fn triplet_frequency(digits: &[u8], base: u8) -> TestResult {
    tuple_frequency("Triplet Frequency", digits, base, 3)
}

// ═══════════════════════════════════════════════════════════════════════════════
// 2. RUNS AND CORRELATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Test 4: Runs above/below the median digit (Wald-Wolfowitz, normal approx).
///
/// Digits equal to the median (odd bases only) are skipped.
pub fn runs_above_below(digits: &[u8], base: u8) -> TestResult {
    let name = "Runs Above/Below Median";
    if let Some(bad) = check_digits(name, digits, base) {
        return bad;
    }
    // Twice the median, so odd bases compare exactly.
    let median2 = u16::from(base - 1);
    let signs: Vec<bool> = digits
        .iter()
        .map(|&d| u16::from(d) * 2)
        .filter(|&d2| d2 != median2)
        .map(|d2| d2 > median2)
        .collect();
    let n = signs.len();
    if n < 20 {
        return insufficient(name, 20, n);
    }
    let above = signs.iter().filter(|&&s| s).count() as f64;
    let below = n as f64 - above;
    if above == 0.0 || below == 0.0 {
        return TestResult {
            name: name.to_string(),
            passed: false,
            p_value: Some(0.0),
            statistic: 0.0,
            details: format!("All {n} digits on one side of the median"),
            grade: 'F',
        };
    }
    let runs = 1 + signs.windows(2).filter(|w| w[0] != w[1]).count();
    let nf = n as f64;
    let mu = 2.0 * above * below / nf + 1.0;
    let var = (mu - 1.0) * (mu - 2.0) / (nf - 1.0);
    if var <= 0.0 {
        return TestResult::failed(name, "Degenerate run variance".to_string());
    }
    let z = (runs as f64 - mu) / var.sqrt();
    let p = 2.0 * (1.0 - Normal::standard().cdf(z.abs()));
    TestResult::from_p(
        name,
        p,
        z.abs(),
        format!("runs={runs}, expected={mu:.1}, above={above}, below={below}"),
    )
}

/// Test 5: Lag-1 correlation -- adjacent digit correlation. Z-test.
pub fn lag_one_correlation(digits: &[u8], base: u8) -> TestResult {
    let name = "Lag-1 Correlation";
    if let Some(bad) = check_digits(name, digits, base) {
        return bad;
    }
    let n = digits.len();
    if n < 20 {
        return insufficient(name, 20, n);
    }
    let arr: Vec<f64> = digits.iter().map(|&d| f64::from(d)).collect();
    let mean: f64 = arr.iter().sum::<f64>() / n as f64;
    let var: f64 = arr.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n as f64;
    if var < 1e-10 {
        return TestResult {
            name: name.to_string(),
            passed: false,
            p_value: None,
            statistic: 1.0,
            details: "Zero variance".to_string(),
            grade: 'F',
        };
    }
    let sum: f64 = arr
        .windows(2)
        .map(|w| (w[0] - mean) * (w[1] - mean))
        .sum();
    let r = sum / ((n - 1) as f64 * var);
    let z = r * (n as f64).sqrt();
    let p = 2.0 * (1.0 - Normal::standard().cdf(z.abs()));
    TestResult {
        statistic: r.abs(),
        ..TestResult::from_p(name, p, 0.0, format!("r={r:.6}, z={z:.4}"))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// 3. COMPRESSION
// ═══════════════════════════════════════════════════════════════════════════════

/// Test 6: Compression ratio -- zlib on the label string, relative to the
/// `log2(base)` bits per digit a perfect coder would need (random ~ 1.0+).
pub fn compression_ratio(digits: &[u8], base: u8) -> TestResult {
    let name = "Compression Ratio";
    if let Some(bad) = check_digits(name, digits, base) {
        return bad;
    }
    let n = digits.len();
    if n < 100 {
        return insufficient(name, 100, n);
    }
    let text: Vec<u8> = digits.iter().map(|&d| LABELS[d as usize]).collect();
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    let compressed = match encoder.write_all(&text).and_then(|_| encoder.finish()) {
        Ok(bytes) => bytes,
        Err(e) => return TestResult::failed(name, format!("Compression failed: {e}")),
    };
    let ideal_bytes = n as f64 * f64::from(base).log2() / 8.0;
    let ratio = compressed.len() as f64 / ideal_bytes;
    let grade = if ratio > 0.95 {
        'A'
    } else if ratio > 0.85 {
        'B'
    } else if ratio > 0.7 {
        'C'
    } else if ratio > 0.5 {
        'D'
    } else {
        'F'
    };
    TestResult {
        name: name.to_string(),
        passed: ratio > 0.85,
        p_value: None,
        statistic: ratio,
        details: format!("{}/{ideal_bytes:.0} = {ratio:.4}", compressed.len()),
        grade,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Test battery
// ═══════════════════════════════════════════════════════════════════════════════

/// Run the complete 6-test battery on a digit sequence.
pub fn run_all_tests(digits: &[u8], base: u8) -> Vec<TestResult> {
    let tests: Vec<fn(&[u8], u8) -> TestResult> = vec![
        // Frequency (3)
        digit_frequency,
        serial_pairs,
        triplet_frequency,
        // Runs and correlation (2)
        runs_above_below,
        lag_one_correlation,
        // Compression (1)
        compression_ratio,
    ];

    tests
        .iter()
        .map(|test_fn| {
            match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| test_fn(digits, base)))
            {
                Ok(result) => result,
                Err(_) => TestResult::failed("Unknown", "Test panicked".to_string()),
            }
        })
        .collect()
}

/// Calculate overall quality score (0-100) from test results.
///
/// Each grade maps to a score: A=100, B=75, C=50, D=25, F=0.
/// Returns the average across all tests.
pub fn calculate_quality_score(results: &[TestResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let total: f64 = results
        .iter()
        .map(|r| match r.grade {
            'A' => 100.0,
            'B' => 75.0,
            'C' => 50.0,
            'D' => 25.0,
            _ => 0.0,
        })
        .sum();
    total / results.len() as f64
}
