//! Rank-biased probability distributions used by the extended EO heuristic.
//!
//! Six families over ranks `1..=n`, each parameterized by a shape parameter
//! `tau`. Callers pick a family by a normalized `force` in `(0, 1)` instead of
//! `tau` directly; `Pdf::new` resolves `force -> tau` once at construction.
//! "Force" is the probability mass concentrated on the best few ranks: given
//! `x_min = 1` and `x_max = min(0.2*n, n)`, a target force `f` corresponds to
//! a cutoff rank `x_f = x_max - f*(x_max - x_min)`, and `f` is the mass of
//! ranks `1..=floor(x_f)`.

use crate::rng::Rng32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfFamily {
    Power,
    Exponential,
    Normal,
    Gamma,
    Cauchy,
    Triangular,
    /// Resolved to one of the six concrete families, once, at `Pdf::new` time.
    Random,
}

const CONCRETE_FAMILIES: [PdfFamily; 6] = [
    PdfFamily::Power,
    PdfFamily::Exponential,
    PdfFamily::Normal,
    PdfFamily::Gamma,
    PdfFamily::Cauchy,
    PdfFamily::Triangular,
];

impl PdfFamily {
    /// `Gamma` is the one family whose force is not monotone in tau (its mode
    /// drifts away from rank 1 as tau grows), so it alone needs the grid
    /// search + bracket contraction instead of plain bisection.
    fn is_monotone(self) -> bool {
        !matches!(self, PdfFamily::Gamma)
    }

    /// `true` for families whose force grows with tau; `false` for families
    /// whose force grows with `1/tau` instead (force shrinks as tau grows).
    fn force_increases_with_tau(self) -> bool {
        matches!(self, PdfFamily::Power | PdfFamily::Exponential)
    }

    fn density(self, k: usize, tau: f64) -> f64 {
        let x = k as f64;
        match self {
            PdfFamily::Power => x.powf(-tau),
            PdfFamily::Exponential => (-tau * x).exp(),
            PdfFamily::Normal => (-0.5 * ((x - 1.0) / tau).powi(2)).exp(),
            PdfFamily::Gamma => {
                if tau <= 1.0 {
                    x.powf(tau - 1.0) * (-x).exp()
                } else {
                    x.powf(tau - 1.0) * (-x / tau).exp()
                }
            }
            PdfFamily::Cauchy => 1.0 / (1.0 + ((x - 1.0) / tau).powi(2)),
            PdfFamily::Triangular => (tau - x).max(0.0),
            PdfFamily::Random => unreachable!("Random must be resolved before use"),
        }
    }
}

/// A tabulated distribution over ranks `1..=n`, ready for `pick`.
pub struct Pdf {
    family: PdfFamily,
    tau: f64,
    /// `table[k-1]` is the probability of rank `k`.
    table: Vec<f64>,
}

impl Pdf {
    /// Resolves `family` (sampling a concrete one if `Random`), converts
    /// `force` to `tau`, and tabulates `P[1..=n]`.
    pub fn new(family: PdfFamily, n: usize, force: f64, rng: &mut Rng32) -> Self {
        let resolved = if family == PdfFamily::Random {
            CONCRETE_FAMILIES[rng.uniform_index(CONCRETE_FAMILIES.len())]
        } else {
            family
        };
        let tau = Self::compute_tau_from_force(resolved, n, force);
        let table = Self::tabulate(resolved, n, tau);
        Pdf {
            family: resolved,
            tau,
            table,
        }
    }

    pub fn family(&self) -> PdfFamily {
        self.family
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    pub fn table(&self) -> &[f64] {
        &self.table
    }

    fn tabulate(family: PdfFamily, n: usize, tau: f64) -> Vec<f64> {
        let mut raw: Vec<f64> = (1..=n).map(|k| family.density(k, tau)).collect();
        let sum: f64 = raw.iter().sum();
        if sum > 0.0 {
            for p in raw.iter_mut() {
                *p /= sum;
            }
        } else {
            // Degenerate shape parameter: fall back to a uniform table rather
            // than dividing by zero.
            let uniform = 1.0 / n as f64;
            raw.iter_mut().for_each(|p| *p = uniform);
        }
        raw
    }

    /// `x_min = 1`, `x_max = min(0.2*n, n)` (never below 1).
    fn x_bounds(n: usize) -> (f64, f64) {
        let x_min = 1.0;
        let x_max = (0.2 * n as f64).max(x_min).min(n as f64);
        (x_min, x_max)
    }

    /// The rank cutoff `x_f` below which the probability mass must equal
    /// `force`.
    fn x_f(n: usize, force: f64) -> f64 {
        let (x_min, x_max) = Self::x_bounds(n);
        x_max - force * (x_max - x_min)
    }

    /// Probability mass of ranks `1..=floor(x_f)`.
    fn mass_up_to(table: &[f64], x_f: f64) -> f64 {
        let cutoff = x_f.floor().max(0.0) as usize;
        table.iter().take(cutoff.min(table.len())).sum()
    }

    /// Recovers the force implied by a tabulated distribution: scans ranks
    /// `1..=x_max`, tracking the cumulative mass `S`, and picks the rank `x`
    /// whose `(x_max-x)/(x_max-x_min)` is closest to `S` at that point.
    fn force_of(family: PdfFamily, n: usize, tau: f64) -> f64 {
        let (x_min, x_max) = Self::x_bounds(n);
        if x_max <= x_min {
            return 1.0;
        }
        let table = Self::tabulate(family, n, tau);
        let upper = x_max.floor().max(1.0) as usize;
        let mut cumulative = 0.0;
        let mut best_x = 1.0;
        let mut best_err = f64::MAX;
        for x in 1..=upper {
            cumulative += table[x - 1];
            let ratio = (x_max - x as f64) / (x_max - x_min);
            let err = (ratio - cumulative).abs();
            if err < best_err {
                best_err = err;
                best_x = x as f64;
            }
        }
        (x_max - best_x) / (x_max - x_min)
    }

    fn compute_tau_from_force_monotone(family: PdfFamily, n: usize, target: f64) -> f64 {
        let x_f = Self::x_f(n, target);
        let mut lo = 1e-6f64;
        let mut hi = 60.0f64;
        let increasing = family.force_increases_with_tau();
        for _ in 0..200 {
            let mid = 0.5 * (lo + hi);
            let table = Self::tabulate(family, n, mid);
            let mass = Self::mass_up_to(&table, x_f);
            if (mass - target).abs() < 1e-10 {
                return mid;
            }
            if (mass > target) == increasing {
                hi = mid;
            } else {
                lo = mid;
            }
            if (hi - lo).abs() < 1e-10 {
                break;
            }
        }
        0.5 * (lo + hi)
    }

    /// Grid search followed by bracket contraction around the best
    /// candidate, doubling the sample count each round (capped at 256, then
    /// growing by 1.2x) until the best distance is tiny or 1000 rounds pass.
    /// Needed for `Gamma`, whose force is not monotone in tau.
    fn compute_tau_from_force_non_monotone(family: PdfFamily, n: usize, target: f64) -> f64 {
        let x_f = Self::x_f(n, target);
        let mut lo = 1e-3f64;
        let mut hi = 60.0f64;
        let mut samples = 16usize;
        let mut best_tau = lo;
        let mut best_err = f64::MAX;
        for _round in 0..1000 {
            let step = (hi - lo) / samples as f64;
            let mut round_best_tau = best_tau;
            let mut round_best_err = f64::MAX;
            for s in 0..=samples {
                let tau = (lo + step * s as f64).max(1e-6);
                let table = Self::tabulate(family, n, tau);
                let mass = Self::mass_up_to(&table, x_f);
                let err = (mass - target).abs();
                if err < round_best_err {
                    round_best_err = err;
                    round_best_tau = tau;
                }
            }
            if round_best_err < best_err {
                best_err = round_best_err;
                best_tau = round_best_tau;
            }
            if best_err < 1e-10 {
                break;
            }
            lo = (best_tau - step).max(1e-6);
            hi = best_tau + step;
            samples = if samples < 256 {
                samples * 2
            } else {
                ((samples as f64) * 1.2) as usize
            };
        }
        best_tau
    }

    pub fn compute_tau_from_force(family: PdfFamily, n: usize, force: f64) -> f64 {
        let force = force.clamp(0.0, 1.0);
        if family.is_monotone() {
            Self::compute_tau_from_force_monotone(family, n, force)
        } else {
            Self::compute_tau_from_force_non_monotone(family, n, force)
        }
    }

    /// Roulette-wheel draw over the tabulated distribution; returns a rank
    /// in `1..=n`.
    pub fn pick(&self, rng: &mut Rng32) -> usize {
        let u = rng.uniform_double();
        let mut acc = 0.0;
        for (i, p) in self.table.iter().enumerate() {
            acc += p;
            if u <= acc {
                return i + 1;
            }
        }
        self.table.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_sums_to_one_for_every_family() {
        let mut rng = Rng32::new(1);
        for &family in &CONCRETE_FAMILIES {
            let pdf = Pdf::new(family, 20, 0.5, &mut rng);
            let sum: f64 = pdf.table().iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "{family:?} table sums to {sum}");
        }
    }

    #[test]
    fn pick_always_returns_a_valid_rank() {
        let mut rng = Rng32::new(2);
        for &family in &CONCRETE_FAMILIES {
            let pdf = Pdf::new(family, 15, 0.7, &mut rng);
            for _ in 0..500 {
                let rank = pdf.pick(&mut rng);
                assert!((1..=15).contains(&rank));
            }
        }
    }

    #[test]
    fn higher_force_concentrates_more_mass_on_rank_one() {
        let mut rng = Rng32::new(3);
        for &family in &CONCRETE_FAMILIES {
            let low = Pdf::new(family, 30, 0.1, &mut rng);
            let high = Pdf::new(family, 30, 0.9, &mut rng);
            assert!(
                high.table()[0] >= low.table()[0],
                "{family:?}: P(rank 1) should grow with force"
            );
        }
    }

    #[test]
    fn random_family_resolves_to_a_concrete_one() {
        let mut rng = Rng32::new(4);
        let pdf = Pdf::new(PdfFamily::Random, 10, 0.5, &mut rng);
        assert!(CONCRETE_FAMILIES.contains(&pdf.family()));
    }

    #[test]
    fn force_round_trips_through_tau_for_power_family() {
        let n = 40;
        let target_force = 0.6;
        let tau = Pdf::compute_tau_from_force(PdfFamily::Power, n, target_force);
        let recovered = Pdf::force_of(PdfFamily::Power, n, tau);
        assert!(
            (recovered - target_force).abs() <= 1e-6,
            "recovered force {recovered} too far from {target_force}"
        );
    }

    #[test]
    fn mass_up_to_x_f_matches_requested_force_within_tolerance() {
        let n = 40;
        for &family in &[PdfFamily::Power, PdfFamily::Exponential, PdfFamily::Normal] {
            let target_force = 0.6;
            let tau = Pdf::compute_tau_from_force(family, n, target_force);
            let table = Pdf::tabulate(family, n, tau);
            let x_f = Pdf::x_f(n, target_force);
            let mass = Pdf::mass_up_to(&table, x_f);
            assert!(
                (mass - target_force).abs() <= 1e-8,
                "{family:?}: mass {mass} too far from force {target_force}"
            );
        }
    }
}
