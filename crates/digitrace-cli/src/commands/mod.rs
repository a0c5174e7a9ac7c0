pub mod algorithms;
pub mod bases;
pub mod report;
pub mod run;
pub mod serve;

use digitrace_core::{Algorithm, RunConfig};

/// Generators that need the network or a file and are skipped unless named.
const EXTERNAL_INPUT: &[Algorithm] = &[Algorithm::Quantum, Algorithm::FileBytes];

/// Print an error and exit with status 1.
pub fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

/// Load a run configuration file, or the defaults when no path is given.
pub fn load_config(path: Option<&str>) -> RunConfig {
    match path {
        Some(path) => RunConfig::from_path(path).unwrap_or_else(|e| fail(e)),
        None => RunConfig::default(),
    }
}

/// Resolve a comma-separated generator filter.
///
/// No filter selects every generator that works offline; `all` selects
/// everything. Unknown names are reported and skipped.
pub fn select_algorithms(filter: Option<&str>) -> Vec<Algorithm> {
    let offline = || -> Vec<Algorithm> {
        Algorithm::ALL
            .into_iter()
            .filter(|a| !EXTERNAL_INPUT.contains(a))
            .collect()
    };

    let Some(filter) = filter else {
        return offline();
    };
    if filter.trim() == "all" {
        return Algorithm::ALL.to_vec();
    }

    let mut selected = Vec::new();
    for name in filter.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        match name.parse::<Algorithm>() {
            Ok(a) if !selected.contains(&a) => selected.push(a),
            Ok(_) => {}
            Err(e) => eprintln!("Warning: {e}, skipping"),
        }
    }
    if selected.is_empty() {
        eprintln!("Warning: no generators matched filter, using all offline generators");
        return offline();
    }
    selected
}

/// Letter grade for a 0-100 quality score.
pub fn grade_for_score(score: f64) -> char {
    if score >= 80.0 {
        'A'
    } else if score >= 60.0 {
        'B'
    } else if score >= 40.0 {
        'C'
    } else if score >= 20.0 {
        'D'
    } else {
        'F'
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // select_algorithms tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_default_skips_external_input() {
        let selected = select_algorithms(None);
        assert_eq!(selected.len(), Algorithm::ALL.len() - 2);
        assert!(!selected.contains(&Algorithm::Quantum));
        assert!(!selected.contains(&Algorithm::FileBytes));
    }

    #[test]
    fn test_all_includes_everything() {
        assert_eq!(select_algorithms(Some("all")).len(), Algorithm::ALL.len());
    }

    #[test]
    fn test_filter_by_name_and_alias() {
        let selected = select_algorithms(Some("pcg, mt19937,pcg"));
        assert_eq!(selected, vec![Algorithm::Pcg, Algorithm::Mersenne]);
    }

    #[test]
    fn test_unknown_names_skipped() {
        let selected = select_algorithms(Some("randu,bogus"));
        assert_eq!(selected, vec![Algorithm::Randu]);
    }

    #[test]
    fn test_no_match_falls_back() {
        assert_eq!(select_algorithms(Some("bogus")), select_algorithms(None));
    }

    // -----------------------------------------------------------------------
    // grade_for_score tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(grade_for_score(100.0), 'A');
        assert_eq!(grade_for_score(80.0), 'A');
        assert_eq!(grade_for_score(79.9), 'B');
        assert_eq!(grade_for_score(40.0), 'C');
        assert_eq!(grade_for_score(20.0), 'D');
        assert_eq!(grade_for_score(0.0), 'F');
    }

    #[test]
    fn test_load_config_default() {
        assert_eq!(load_config(None), RunConfig::default());
    }
}
