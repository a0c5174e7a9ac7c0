//! Running statistics, lead time and anomaly classification.
//!
//! Everything here is a pure function of the `counts` and `lead_time` arrays
//! kept by the stream controller, so renderers and tests can call them on
//! synthetic data just as well as on a live run.
//!
//! Winner sets always include every tied index. The anomaly classification
//! calls a run consistent when any count leader is also a lead-time leader,
//! and reports the full tie sets alongside the chosen winners.

use serde::Serialize;

use crate::base::label;

/// Share of steps in the lead below which a count winner counts as a late surge.
pub const LATE_SURGE_SHARE: f64 = 0.20;
/// Share of steps in the lead above which a non-winner counts as a marathon leader.
pub const MARATHON_SHARE: f64 = 0.50;

// ---------------------------------------------------------------------------
// Winners and lead time
// ---------------------------------------------------------------------------

/// Every index holding the maximum value.
///
/// Empty when `values` is empty or the maximum is 0, since nobody leads a
/// race that has not started.
pub fn leaders(values: &[u64]) -> Vec<usize> {
    let max = values.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return Vec::new();
    }
    values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v == max)
        .map(|(i, _)| i)
        .collect()
}

/// Credit one step of lead time to every current plurality leader.
///
/// Ties credit all tied digits, so `sum(lead_time)` can exceed the number of
/// steps taken.
pub fn update_lead_time(counts: &[u64], lead_time: &mut [u64]) {
    for i in leaders(counts) {
        if let Some(slot) = lead_time.get_mut(i) {
            *slot += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Distribution statistics
// ---------------------------------------------------------------------------

/// Summary statistics of a digit histogram.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Statistics {
    /// Digits counted.
    pub total: u64,
    /// Count each digit would have under a uniform distribution.
    pub expected: f64,
    /// Count-weighted mean digit value.
    pub mean: f64,
    /// Count-weighted population standard deviation of the digit value.
    pub std_dev: f64,
    /// Pearson chi-square against the uniform expectation (df = base - 1).
    pub chi_square: f64,
}

/// Compute mean, standard deviation and chi-square from `counts`.
///
/// All zeros when nothing has been counted.
pub fn compute_statistics(counts: &[u64]) -> Statistics {
    let total: u64 = counts.iter().sum();
    if total == 0 || counts.is_empty() {
        return Statistics::default();
    }
    let n = total as f64;
    let expected = n / counts.len() as f64;

    let mean = counts
        .iter()
        .enumerate()
        .map(|(d, &c)| d as f64 * c as f64)
        .sum::<f64>()
        / n;
    let variance = counts
        .iter()
        .enumerate()
        .map(|(d, &c)| c as f64 * (d as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    let chi_square = counts
        .iter()
        .map(|&c| (c as f64 - expected).powi(2) / expected)
        .sum();

    Statistics {
        total,
        expected,
        mean,
        std_dev: variance.sqrt(),
        chi_square,
    }
}

// ---------------------------------------------------------------------------
// Anomaly classification
// ---------------------------------------------------------------------------

/// Ways the final-count winner and the lead-time winner can disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// The count winner never held the lead.
    Ghost,
    /// The count winner led for under 20% of the steps.
    LateSurge,
    /// A digit led for over half the steps and still lost on count.
    MarathonLeader,
}

impl std::fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ghost => write!(f, "ghost"),
            Self::LateSurge => write!(f, "late surge"),
            Self::MarathonLeader => write!(f, "marathon leader"),
        }
    }
}

/// Overall verdict on a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// The same digit won on count and on lead time.
    ConsistentPerformer,
    /// Count and lead time crowned different digits.
    Anomaly,
    /// No digits were produced.
    Inconclusive,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConsistentPerformer => write!(f, "consistent performer"),
            Self::Anomaly => write!(f, "anomaly"),
            Self::Inconclusive => write!(f, "inconclusive"),
        }
    }
}

/// Result of [`classify_outcome`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport {
    pub classification: Classification,
    pub kinds: Vec<AnomalyKind>,
    /// Digit with the highest final count. Among tied digits, the lowest one
    /// that also holds the most lead time, else the lowest.
    pub count_winner: Option<u8>,
    /// Digit with the most lead time. Equal to `count_winner` whenever a
    /// count leader shares the lead-time maximum.
    pub lead_winner: Option<u8>,
    /// All digits tied for the highest final count.
    pub count_leaders: Vec<u8>,
    /// All digits tied for the most lead time.
    pub lead_leaders: Vec<u8>,
    /// Steps counted (sum of counts).
    pub total_steps: u64,
    /// Count winner's share of all digits.
    pub count_winner_count_share: f64,
    /// Count winner's share of steps spent in the lead.
    pub count_winner_lead_share: f64,
    /// Lead winner's share of steps spent in the lead.
    pub lead_winner_lead_share: f64,
    /// Human-readable explanation.
    pub rationale: String,
}

impl AnomalyReport {
    pub fn is_anomaly(&self) -> bool {
        self.classification == Classification::Anomaly
    }

    pub fn has(&self, kind: AnomalyKind) -> bool {
        self.kinds.contains(&kind)
    }

    fn inconclusive() -> Self {
        Self {
            classification: Classification::Inconclusive,
            kinds: Vec::new(),
            count_winner: None,
            lead_winner: None,
            count_leaders: Vec::new(),
            lead_leaders: Vec::new(),
            total_steps: 0,
            count_winner_count_share: 0.0,
            count_winner_lead_share: 0.0,
            lead_winner_lead_share: 0.0,
            rationale: "No digits were produced.".to_string(),
        }
    }
}

/// Compare the final-count winner with the lead-time winner.
pub fn classify_outcome(counts: &[u64], lead_time: &[u64]) -> AnomalyReport {
    let total: u64 = counts.iter().sum();
    let count_leaders = leaders(counts);
    let lead_leaders = leaders(lead_time);
    if count_leaders.is_empty() || lead_leaders.is_empty() {
        return AnomalyReport::inconclusive();
    }
    // A count leader that also shares the lead-time maximum makes the run
    // consistent. Otherwise the lead winner is a digit that out-led every
    // count leader.
    let shared = count_leaders
        .iter()
        .copied()
        .find(|d| lead_leaders.contains(d));
    let (cw, lw) = match shared {
        Some(d) => (d, d),
        None => (count_leaders[0], lead_leaders[0]),
    };

    let n = total as f64;
    let lead_of = |d: usize| lead_time.get(d).copied().unwrap_or(0);
    let count_share = counts[cw] as f64 / n;
    let cw_lead_share = lead_of(cw) as f64 / n;
    let lw_lead_share = lead_of(lw) as f64 / n;

    let mut kinds = Vec::new();
    let classification = if cw == lw {
        Classification::ConsistentPerformer
    } else {
        if lead_of(cw) == 0 {
            kinds.push(AnomalyKind::Ghost);
        }
        if cw_lead_share < LATE_SURGE_SHARE {
            kinds.push(AnomalyKind::LateSurge);
        }
        if lw_lead_share > MARATHON_SHARE {
            kinds.push(AnomalyKind::MarathonLeader);
        }
        Classification::Anomaly
    };

    let rationale = rationale(
        cw,
        lw,
        count_share,
        cw_lead_share,
        lw_lead_share,
        &kinds,
    );

    AnomalyReport {
        classification,
        kinds,
        count_winner: Some(cw as u8),
        lead_winner: Some(lw as u8),
        count_leaders: count_leaders.iter().map(|&d| d as u8).collect(),
        lead_leaders: lead_leaders.iter().map(|&d| d as u8).collect(),
        total_steps: total,
        count_winner_count_share: count_share,
        count_winner_lead_share: cw_lead_share,
        lead_winner_lead_share: lw_lead_share,
        rationale,
    }
}

fn rationale(
    cw: usize,
    lw: usize,
    count_share: f64,
    cw_lead_share: f64,
    lw_lead_share: f64,
    kinds: &[AnomalyKind],
) -> String {
    let cw_label = label(cw as u8);
    let lw_label = label(lw as u8);
    if cw == lw {
        return format!(
            "Digit {cw_label} won the final count ({:.1}% of digits) and led for {:.1}% of the steps.",
            count_share * 100.0,
            cw_lead_share * 100.0
        );
    }

    let mut parts = vec![format!(
        "Digit {cw_label} won the final count but digit {lw_label} held the lead longest."
    )];
    for kind in kinds {
        parts.push(match kind {
            AnomalyKind::Ghost => {
                format!("Ghost: {cw_label} won without ever holding the lead.")
            }
            AnomalyKind::LateSurge => format!(
                "Late surge: {cw_label} led for only {:.1}% of the steps.",
                cw_lead_share * 100.0
            ),
            AnomalyKind::MarathonLeader => format!(
                "Marathon leader: {lw_label} led for {:.1}% of the steps yet lost on count.",
                lw_lead_share * 100.0
            ),
        });
    }
    parts.join(" ")
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// One row of the end-of-run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryLine {
    pub digit: u8,
    pub label: char,
    pub count: u64,
    /// Completed groups of five.
    pub tallies: u64,
}

/// Per-digit counts and tallies for printing.
pub fn summarize(counts: &[u64]) -> Vec<SummaryLine> {
    counts
        .iter()
        .enumerate()
        .map(|(d, &count)| SummaryLine {
            digit: d as u8,
            label: label(d as u8),
            count,
            tallies: count / 5,
        })
        .collect()
}
