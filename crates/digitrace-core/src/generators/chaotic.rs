//! Non-uniform generators: Gaussian, logistic map and Perlin noise.
//!
//! These exist to show what a skewed or correlated stream looks like next to
//! the uniform PRNGs. Each draws its starting randomness from a seeded
//! [`StdRng`], so a fixed seed reproduces the run on the same platform.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::generator::{DigitGenerator, GeneratorCategory, GeneratorInfo, GeneratorKind};

/// Map a real value onto `0..base`, clamping anything out of range.
fn clamp_digit(value: f64, base: u8) -> u8 {
    let top = f64::from(base - 1);
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, top) as u8
}

// ---------------------------------------------------------------------------
// Gaussian
// ---------------------------------------------------------------------------

pub static GAUSSIAN_INFO: GeneratorInfo = GeneratorInfo {
    key: "gaussian",
    name: "Gaussian",
    description: "Normally distributed digits centred on the middle of the base",
    mechanism: "Box-Muller turns two uniform draws into a standard normal z. \
                The digit is round((base-1)/2 + z*base/6), clamped into range, \
                so middle digits win and edge digits are rare.",
    category: GeneratorCategory::Mathematical,
    kind: GeneratorKind::PseudoRandom,
    distribution: "bell curve around (base-1)/2",
    compatible_bases: 2..=16,
    uniform: false,
    warning: false,
};

/// Box-Muller Gaussian digits.
pub struct Gaussian {
    base: u8,
    rng: StdRng,
}

impl Gaussian {
    pub fn new(base: u8, seed: u64) -> Self {
        Self {
            base,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn mean(&self) -> f64 {
        f64::from(self.base - 1) / 2.0
    }

    pub fn std_dev(&self) -> f64 {
        f64::from(self.base) / 6.0
    }

    fn standard_normal(&mut self) -> f64 {
        // u1 in (0, 1] keeps ln() finite.
        let u1 = 1.0 - self.rng.random::<f64>();
        let u2 = self.rng.random::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }
}

impl DigitGenerator for Gaussian {
    fn info(&self) -> &GeneratorInfo {
        &GAUSSIAN_INFO
    }

    fn base(&self) -> u8 {
        self.base
    }

    fn next_digit(&mut self) -> Option<u8> {
        let z = self.standard_normal();
        let value = (self.mean() + z * self.std_dev()).round();
        Some(clamp_digit(value, self.base))
    }
}

// ---------------------------------------------------------------------------
// Logistic map
// ---------------------------------------------------------------------------

/// Growth rate, deep in the chaotic regime.
pub const LOGISTIC_R: f64 = 3.99;

pub static LOGISTIC_INFO: GeneratorInfo = GeneratorInfo {
    key: "logistic",
    name: "Logistic Map",
    description: "The chaotic recurrence x = r*x*(1-x) with r = 3.99",
    mechanism: "Iterates the logistic map from a random start in (0,1). The \
                invariant density piles up near 0 and 1, so edge digits \
                dominate. digit = floor(x*base).",
    category: GeneratorCategory::Mathematical,
    kind: GeneratorKind::Chaotic,
    distribution: "U-shaped, edge digits favoured",
    compatible_bases: 2..=16,
    uniform: false,
    warning: false,
};

/// Logistic map digits.
pub struct Logistic {
    base: u8,
    x: f64,
    rng: StdRng,
}

impl Logistic {
    pub fn new(base: u8, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let x = rng.random_range(0.01..0.99);
        Self { base, x, rng }
    }

    fn step(&mut self) {
        self.x = LOGISTIC_R * self.x * (1.0 - self.x);
        // 0 and 1 are absorbing; float rounding can land on them.
        if !self.x.is_finite() || self.x <= 0.0 || self.x >= 1.0 {
            self.x = self.rng.random_range(0.01..0.99);
        }
    }
}

impl DigitGenerator for Logistic {
    fn info(&self) -> &GeneratorInfo {
        &LOGISTIC_INFO
    }

    fn base(&self) -> u8 {
        self.base
    }

    fn next_digit(&mut self) -> Option<u8> {
        self.step();
        Some(clamp_digit((self.x * f64::from(self.base)).floor(), self.base))
    }
}

// ---------------------------------------------------------------------------
// Perlin noise
// ---------------------------------------------------------------------------

const PERLIN_STEP: f64 = 0.1;

pub static PERLIN_INFO: GeneratorInfo = GeneratorInfo {
    key: "perlin",
    name: "Perlin Noise",
    description: "1-D coherent gradient noise sampled every 0.1 units",
    mechanism: "A shuffled 256-entry permutation table assigns a gradient to \
                each lattice point; a quintic fade blends neighbouring \
                gradients. Consecutive digits are strongly correlated.",
    category: GeneratorCategory::Mathematical,
    kind: GeneratorKind::Deterministic,
    distribution: "smooth, centre-heavy",
    compatible_bases: 2..=16,
    uniform: false,
    warning: false,
};

/// 1-D Perlin gradient noise digits.
pub struct Perlin {
    base: u8,
    perm: [u8; 512],
    x: f64,
}

impl Perlin {
    pub fn new(base: u8, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut table: Vec<u8> = (0..=255).collect();
        table.shuffle(&mut rng);
        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = table[i & 255];
        }
        Self { base, perm, x: 0.0 }
    }

    fn fade(t: f64) -> f64 {
        t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
    }

    fn gradient(&self, lattice: usize) -> f64 {
        f64::from(self.perm[lattice]) / 127.5 - 1.0
    }

    /// Noise at `x`, in `[-0.5, 0.5]`.
    pub fn noise(&self, x: f64) -> f64 {
        let floor = x.floor();
        let xi = (floor as i64 & 255) as usize;
        let xf = x - floor;
        let n0 = self.gradient(xi) * xf;
        let n1 = self.gradient(xi + 1) * (xf - 1.0);
        n0 + Self::fade(xf) * (n1 - n0)
    }
}

impl DigitGenerator for Perlin {
    fn info(&self) -> &GeneratorInfo {
        &PERLIN_INFO
    }

    fn base(&self) -> u8 {
        self.base
    }

    fn next_digit(&mut self) -> Option<u8> {
        let value = self.noise(self.x) + 0.5;
        self.x += PERLIN_STEP;
        Some(clamp_digit(
            (value * f64::from(self.base)).floor(),
            self.base,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(g: &mut dyn DigitGenerator, n: usize) -> Vec<u8> {
        (0..n).map(|_| g.next_digit().unwrap()).collect()
    }

    #[test]
    fn test_clamp_digit() {
        assert_eq!(clamp_digit(-3.0, 10), 0);
        assert_eq!(clamp_digit(42.0, 10), 9);
        assert_eq!(clamp_digit(f64::NAN, 10), 0);
        assert_eq!(clamp_digit(4.0, 10), 4);
    }

    #[test]
    fn test_gaussian_centred() {
        let mut g = Gaussian::new(10, 7);
        let digits = sample(&mut g, 10_000);
        let mean = digits.iter().map(|&d| f64::from(d)).sum::<f64>() / 10_000.0;
        assert!((mean - 4.5).abs() < 0.2, "mean {mean}");
        let mut counts = [0usize; 10];
        for d in digits {
            counts[d as usize] += 1;
        }
        assert!(counts[4] + counts[5] > counts[0] + counts[9]);
    }

    #[test]
    fn test_logistic_favours_edges() {
        let mut g = Logistic::new(10, 3);
        let digits = sample(&mut g, 10_000);
        let edges = digits.iter().filter(|&&d| d == 0 || d == 9).count();
        let middle = digits.iter().filter(|&&d| d == 4 || d == 5).count();
        assert!(edges > middle, "edges {edges} middle {middle}");
    }

    #[test]
    fn test_perlin_noise_bounds() {
        let p = Perlin::new(10, 11);
        let mut x = 0.0;
        while x < 300.0 {
            let n = p.noise(x);
            assert!((-0.5..=0.5).contains(&n), "noise {n} at {x}");
            x += 0.037;
        }
        // Zero at every lattice point.
        assert_eq!(p.noise(5.0), 0.0);
    }

    #[test]
    fn test_perlin_is_smooth() {
        let mut g = Perlin::new(10, 11);
        let digits = sample(&mut g, 5_000);
        let total_jump: u32 = digits
            .windows(2)
            .map(|w| u32::from(w[0].abs_diff(w[1])))
            .sum();
        let avg = f64::from(total_jump) / 4_999.0;
        assert!(avg < 1.0, "average jump {avg}");
    }

    #[test]
    fn test_all_bases_in_range() {
        for base in 2..=16u8 {
            let gens: Vec<Box<dyn DigitGenerator>> = vec![
                Box::new(Gaussian::new(base, 1)),
                Box::new(Logistic::new(base, 1)),
                Box::new(Perlin::new(base, 1)),
            ];
            for mut g in gens {
                for d in sample(&mut g, 2_000) {
                    assert!(d < base);
                }
            }
        }
    }
}
