//! Null distributions of the two-sample KS statistic

use super::Alternative;

/// Survival function of the limiting Kolmogorov distribution, P(K > lambda).
///
/// Uses the theta-function series for small arguments and the alternating
/// series otherwise; both converge in a handful of terms on their branch.
pub fn kolmogorov_sf(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }

    if lambda < 1.18 {
        // P(K <= lambda) = sqrt(2 pi) / lambda * sum_k exp(-(2k-1)^2 pi^2 / (8 lambda^2))
        let y = (-std::f64::consts::PI.powi(2) / (8.0 * lambda * lambda)).exp();
        let cdf = (2.0 * std::f64::consts::PI).sqrt() / lambda
            * (y + y.powi(9) + y.powi(25) + y.powi(49));
        (1.0 - cdf).clamp(0.0, 1.0)
    } else {
        let x = (-2.0 * lambda * lambda).exp();
        (2.0 * (x - x.powi(4) + x.powi(9) - x.powi(16))).clamp(0.0, 1.0)
    }
}

/// Hodges' approximation to the one-sided two-sample survival function.
///
/// `n1` and `n2` are the two sample sizes in any order.
pub fn smirnov_one_sided_sf(d: f64, n1: usize, n2: usize) -> f64 {
    if d <= 0.0 {
        return 1.0;
    }
    let (m, n) = if n1 >= n2 {
        (n1 as f64, n2 as f64)
    } else {
        (n2 as f64, n1 as f64)
    };
    let en = m * n / (m + n);
    let z = en.sqrt() * d;
    let expt = -2.0 * z * z - 2.0 * z * (m + 2.0 * n) / (m * n * (m + n)).sqrt() / 3.0;
    expt.exp().clamp(0.0, 1.0)
}

/// Exact P(D >= h / (m * n)) under the null hypothesis.
///
/// `h` is the observed statistic scaled by `m * n`, i.e. the largest value of
/// `i * n - j * m` (or its absolute value / negation, depending on the
/// alternative) over the merged sample, where `i` reference and `j` test
/// observations have been consumed. Every monotone lattice path from (0, 0)
/// to (m, n) is equally likely; the walk absorbs the probability mass of
/// paths that touch the rejection boundary.
pub fn exact_sf(h: u64, m: usize, n: usize, alternative: Alternative) -> f64 {
    if h == 0 {
        return 1.0;
    }

    let h = h as i64;
    let (mi, ni) = (m as i64, n as i64);
    let crosses = |i: usize, j: usize| -> bool {
        let diff = i as i64 * ni - j as i64 * mi;
        match alternative {
            Alternative::TwoSided => diff.abs() >= h,
            Alternative::Greater => diff >= h,
            Alternative::Less => -diff >= h,
        }
    };

    let mut outside = 0.0f64;
    let mut row = vec![0.0f64; n + 1];

    for i in 0..=m {
        for j in 0..=n {
            let mass = if i == 0 && j == 0 {
                1.0
            } else {
                // Arrivals from (i - 1, j) by a reference step and from (i, j - 1) by a test step
                let from_ref = if i > 0 {
                    let remaining = (m - i + 1) + (n - j);
                    row[j] * (m - i + 1) as f64 / remaining as f64
                } else {
                    0.0
                };
                let from_test = if j > 0 {
                    let remaining = (m - i) + (n - j + 1);
                    row[j - 1] * (n - j + 1) as f64 / remaining as f64
                } else {
                    0.0
                };
                from_ref + from_test
            };

            if crosses(i, j) {
                outside += mass;
                row[j] = 0.0;
            } else {
                row[j] = mass;
            }
        }
    }

    outside.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kolmogorov_sf_known_values() {
        // Classic critical values of the limiting distribution
        assert!((kolmogorov_sf(1.3581) - 0.05).abs() < 1e-3);
        assert!((kolmogorov_sf(1.6276) - 0.01).abs() < 1e-3);
        assert!((kolmogorov_sf(1.2239) - 0.10).abs() < 1e-3);
    }

    #[test]
    fn test_kolmogorov_sf_monotone_and_bounded() {
        let mut prev = 1.0;
        for k in 1..400 {
            let p = kolmogorov_sf(k as f64 * 0.01);
            assert!((0.0..=1.0).contains(&p));
            assert!(p <= prev + 1e-12, "sf must not increase at lambda={}", k as f64 * 0.01);
            prev = p;
        }
        assert_eq!(kolmogorov_sf(0.0), 1.0);
    }

    #[test]
    fn test_kolmogorov_sf_branches_agree() {
        let below = kolmogorov_sf(1.18 - 1e-9);
        let above = kolmogorov_sf(1.18);
        assert!((below - above).abs() < 1e-6);
    }

    #[test]
    fn test_exact_two_sided_small_case() {
        // m = n = 2: of the 6 equally likely paths, 2 reach D = 1
        let p = exact_sf(4, 2, 2, Alternative::TwoSided);
        assert!((p - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_exact_one_sided_small_case() {
        // m = n = 2: only the path with both reference points first reaches D+ = 1
        let p = exact_sf(4, 2, 2, Alternative::Greater);
        assert!((p - 1.0 / 6.0).abs() < 1e-12);
        let p = exact_sf(4, 2, 2, Alternative::Less);
        assert!((p - 1.0 / 6.0).abs() < 1e-12);
    }

    /// Tail probabilities by enumerating every lattice path from (0, 0) to (m, n)
    fn enumerate_tails(m: usize, n: usize, h: u64) -> (f64, f64, f64) {
        let (mut two_sided, mut greater, mut less, mut total) = (0u64, 0u64, 0u64, 0u64);
        for mask in 0u32..(1 << (m + n)) {
            if mask.count_ones() as usize != m {
                continue;
            }
            total += 1;
            let (mut i, mut j) = (0i64, 0i64);
            let (mut d_plus, mut d_minus) = (0i64, 0i64);
            for step in 0..(m + n) {
                if mask & (1 << step) != 0 {
                    i += 1;
                } else {
                    j += 1;
                }
                let diff = i * n as i64 - j * m as i64;
                d_plus = d_plus.max(diff);
                d_minus = d_minus.max(-diff);
            }
            let h = h as i64;
            two_sided += (d_plus.max(d_minus) >= h) as u64;
            greater += (d_plus >= h) as u64;
            less += (d_minus >= h) as u64;
        }
        let total = total as f64;
        (two_sided as f64 / total, greater as f64 / total, less as f64 / total)
    }

    #[test]
    fn test_exact_matches_path_enumeration() {
        for &(m, n) in &[(3, 5), (4, 7), (6, 6), (2, 9), (7, 5), (1, 4)] {
            for h in 1..=(m * n) as u64 {
                let (two_sided, greater, less) = enumerate_tails(m, n, h);
                let cases = [
                    (Alternative::TwoSided, two_sided),
                    (Alternative::Greater, greater),
                    (Alternative::Less, less),
                ];
                for (alternative, expected) in cases {
                    let p = exact_sf(h, m, n, alternative);
                    assert!(
                        (p - expected).abs() < 1e-12,
                        "m={m} n={n} h={h} {alternative}: dp={p} paths={expected}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_exact_zero_statistic() {
        assert_eq!(exact_sf(0, 10, 10, Alternative::TwoSided), 1.0);
    }

    #[test]
    fn test_exact_close_to_asymptotic_for_moderate_samples() {
        // m = n = 200, D = 0.15 -> h = 0.15 * 200 * 200
        let exact = exact_sf(6000, 200, 200, Alternative::TwoSided);
        let en: f64 = 100.0;
        let lambda = (en.sqrt() + 0.12 + 0.11 / en.sqrt()) * 0.15;
        let asymp = kolmogorov_sf(lambda);
        assert!(exact > 0.5 * asymp && exact < 2.0 * asymp, "exact={exact} asymp={asymp}");
    }

    #[test]
    fn test_one_sided_sf_bounds() {
        assert_eq!(smirnov_one_sided_sf(0.0, 50, 60), 1.0);
        let p = smirnov_one_sided_sf(0.3, 50, 60);
        assert!(p > 0.0 && p < 0.01);
        assert_eq!(smirnov_one_sided_sf(0.3, 50, 60), smirnov_one_sided_sf(0.3, 60, 50));
    }
}
