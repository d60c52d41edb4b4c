// crates/mh_subgrid/src/lookup.rs

//! 子网格查找引擎
//!
//! 三个纯函数，每次只作用于一个元素的一行表：
//!
//! - [`forward_thickness`]: 水位 → 层厚（湿体积/面积）
//! - [`wet_fraction`]: 水位 → 湿润比例
//! - [`inverse_ssh`]: 层厚 → 水位
//!
//! # 算法
//!
//! 表在 `[min, max]` 上等距采样 N 点，区间宽度 `dz = (max - min) / (N - 1)`。
//!
//! ```text
//! zeta >= max : h = zeta + b_mean          (完全湿，线性外推)
//! zeta <= min : h = 0                      (完全干)
//! 其余         : h = t[i] + (zeta - zeta_i) / dz * (t[i+1] - t[i])
//! ```
//!
//! 区间定位用 `floor((zeta - min) / dz)` 直接求下标，再按逐区间扫描的判定
//! `zeta_i <= zeta <= zeta_{i+1}` 向邻区修正，因此恰落在公共边界上时取
//! 下标较小的区间，结果与线性扫描逐位一致。
//!
//! 所有函数无分配、无状态、可重入，可在元素间任意并行。

use mh_core::Scalar;

use crate::table::SshRange;

/// 反查命中的分支
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InverseBranch {
    /// 层厚不小于表末值，按完全湿外推
    Extrapolated,
    /// 表内插值
    Interpolated,
    /// 层厚不大于表首值，取干极限 `-bathymetry_min`
    DryLimit,
}

/// 定位 `zeta` 所在区间
///
/// 返回满足 `edge(i) <= zeta <= edge(i+1)` 的最小 `i`，其中
/// `edge(i) = min + i * dz`。调用方保证 `min < zeta < max`。
/// 舍入使 `edge(n_bins) < zeta < max` 时返回末区间。
#[inline]
pub fn locate_bin<S: Scalar>(zeta: S, range: SshRange<S>, dz: S, n_bins: usize) -> usize {
    let last = n_bins - 1;
    let guess = ((zeta - range.min) / dz).floor().to_usize().unwrap_or(0);
    let mut i = guess.min(last);

    // 公共边界归下方区间
    while i > 0 && zeta <= range.level(i, dz) {
        i -= 1;
    }
    while i < last && zeta > range.level(i + 1, dz) {
        i += 1;
    }
    i
}

/// 表内线性插值（`min < zeta < max`）
#[inline]
fn interpolate<S: Scalar>(zeta: S, table: &[S], range: SshRange<S>) -> S {
    let n = table.len();
    let dz = range.bin_width(n);
    let i = locate_bin(zeta, range, dz, n - 1);
    let zeta0 = range.level(i, dz);
    S::lerp(table[i], table[i + 1], (zeta - zeta0) / dz)
}

/// 水位 → 层厚
///
/// # Arguments
/// * `zeta` - 水位
/// * `table` - 该元素的湿体积表，长度 N >= 2
/// * `range` - 表的水位范围
/// * `bathymetry_mean` - 平均底床深度
///
/// # Panics
/// 表长度小于 2 时 panic
#[inline]
pub fn forward_thickness<S: Scalar>(zeta: S, table: &[S], range: SshRange<S>, bathymetry_mean: S) -> S {
    assert!(table.len() >= 2, "查找表至少需要 2 个采样点");
    if zeta >= range.max {
        zeta + bathymetry_mean
    } else if zeta <= range.min {
        S::ZERO
    } else {
        interpolate(zeta, table, range)
    }
}

/// 水位 → 湿润比例，范围外钳制到 0 / 1
///
/// # Panics
/// 表长度小于 2 时 panic
#[inline]
pub fn wet_fraction<S: Scalar>(zeta: S, table: &[S], range: SshRange<S>) -> S {
    assert!(table.len() >= 2, "查找表至少需要 2 个采样点");
    if zeta >= range.max {
        S::ONE
    } else if zeta <= range.min {
        S::ZERO
    } else {
        interpolate(zeta, table, range)
    }
}

/// 层厚 → 水位
///
/// 干极限分支返回 `-bathymetry_min`，可能使下游水深为负；此处不修正。
///
/// # Panics
/// 表长度小于 2 时 panic
#[inline]
pub fn inverse_ssh<S: Scalar>(
    thickness: S,
    table: &[S],
    range: SshRange<S>,
    bathymetry_mean: S,
    bathymetry_min: S,
) -> S {
    inverse_ssh_classified(thickness, table, range, bathymetry_mean, bathymetry_min).0
}

/// 层厚 → 水位，并返回命中分支
///
/// 按表值逐区间扫描，取首个满足 `t[i] <= h <= t[i+1]` 的区间：
///
/// ```text
/// phi0 = (h - t[i+1]) / (t[i] - t[i+1])
/// phi1 = (h - t[i])   / (t[i+1] - t[i])
/// zeta = phi0 * zeta_i + phi1 * zeta_{i+1}
/// ```
///
/// 表单调时首个匹配区间满足 `t[i] < h`，分母非零。非单调表（仅宽松
/// 绑定可能出现）同样取首个满足条件的区间。`h` 为 NaN 时无区间命中，
/// 按干极限处理。
///
/// # Panics
/// 表长度小于 2 时 panic
pub fn inverse_ssh_classified<S: Scalar>(
    thickness: S,
    table: &[S],
    range: SshRange<S>,
    bathymetry_mean: S,
    bathymetry_min: S,
) -> (S, InverseBranch) {
    let n = table.len();
    assert!(n >= 2, "查找表至少需要 2 个采样点");

    if thickness >= table[n - 1] {
        return (thickness - bathymetry_mean, InverseBranch::Extrapolated);
    }
    if thickness <= table[0] {
        return (-bathymetry_min, InverseBranch::DryLimit);
    }

    let dz = range.bin_width(n);
    let bin = table
        .windows(2)
        .position(|w| thickness >= w[0] && thickness <= w[1]);

    match bin {
        Some(i) => {
            let (t0, t1) = (table[i], table[i + 1]);
            let zeta0 = range.level(i, dz);
            let zeta1 = range.level(i + 1, dz);
            let phi0 = (thickness - t1) / (t0 - t1);
            let phi1 = (thickness - t0) / (t1 - t0);
            (phi0 * zeta0 + phi1 * zeta1, InverseBranch::Interpolated)
        }
        None => (-bathymetry_min, InverseBranch::DryLimit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: [f64; 3] = [0.0, 2.0, 4.0];

    fn range() -> SshRange<f64> {
        SshRange::new(-2.0, 2.0)
    }

    /// 逐区间线性扫描，作为直接定位的对照
    fn scan_bin(zeta: f64, range: SshRange<f64>, n: usize) -> Option<usize> {
        let dz = range.bin_width(n);
        (0..n - 1).find(|&i| zeta >= range.level(i, dz) && zeta <= range.level(i + 1, dz))
    }

    #[test]
    fn test_forward_concrete_scenario() {
        assert_eq!(forward_thickness(0.0, &TABLE, range(), 2.0), 2.0);
        assert_eq!(forward_thickness(1.0, &TABLE, range(), 2.0), 3.0);
        assert_eq!(forward_thickness(3.0, &TABLE, range(), 2.0), 5.0);
        assert_eq!(forward_thickness(-5.0, &TABLE, range(), 2.0), 0.0);
    }

    #[test]
    fn test_forward_boundaries() {
        assert_eq!(forward_thickness(-2.0, &TABLE, range(), 2.0), 0.0);
        assert_eq!(forward_thickness(2.0, &TABLE, range(), 2.0), 4.0);
    }

    #[test]
    fn test_wet_fraction_clamps() {
        let table = [0.0, 0.25, 1.0];
        assert_eq!(wet_fraction(5.0, &table, range()), 1.0);
        assert_eq!(wet_fraction(2.0, &table, range()), 1.0);
        assert_eq!(wet_fraction(-2.0, &table, range()), 0.0);
        assert_eq!(wet_fraction(-1.0, &table, range()), 0.125);
        assert_eq!(wet_fraction(1.0, &table, range()), 0.625);
    }

    #[test]
    fn test_shared_boundary_takes_lower_bin() {
        // zeta = 0 是区间 0 与区间 1 的公共边界
        let r = range();
        let dz = r.bin_width(3);
        assert_eq!(locate_bin(0.0, r, dz, 2), 0);
        assert_eq!(locate_bin(1e-12, r, dz, 2), 1);
        assert_eq!(locate_bin(-1e-12, r, dz, 2), 0);
    }

    #[test]
    fn test_locate_matches_scan() {
        let r = SshRange::new(-3.7, 5.3);
        let n = 10;
        let dz = r.bin_width(n);
        for k in 1..900 {
            let zeta = -3.7 + k as f64 * 0.01;
            if zeta <= r.min || zeta >= r.max {
                continue;
            }
            let expected = scan_bin(zeta, r, n).unwrap_or(n - 2);
            assert_eq!(locate_bin(zeta, r, dz, n - 1), expected, "zeta = {}", zeta);
        }
        // 所有内部采样点本身
        for i in 1..n - 1 {
            let zeta = r.level(i, dz);
            assert_eq!(locate_bin(zeta, r, dz, n - 1), i - 1);
        }
    }

    #[test]
    fn test_inverse_branches() {
        let (zeta, branch) = inverse_ssh_classified(5.0, &TABLE, range(), 2.0, 1.5);
        assert_eq!((zeta, branch), (3.0, InverseBranch::Extrapolated));

        let (zeta, branch) = inverse_ssh_classified(0.0, &TABLE, range(), 2.0, 1.5);
        assert_eq!((zeta, branch), (-1.5, InverseBranch::DryLimit));

        let (zeta, branch) = inverse_ssh_classified(3.0, &TABLE, range(), 2.0, 1.5);
        assert_eq!(branch, InverseBranch::Interpolated);
        assert!((zeta - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_flat_segment_uses_first_rising_bin() {
        // t = [0, 1, 1, 3]：h = 1 命中首个区间 [0, 1]
        let table = [0.0, 1.0, 1.0, 3.0];
        let r = SshRange::new(0.0, 3.0);
        let zeta = inverse_ssh(1.0, &table, r, 0.0, 0.0);
        assert_eq!(zeta, 1.0);
    }

    #[test]
    fn test_inverse_non_monotonic_takes_first_bin() {
        // 宽松绑定下的坏表：h = 0.5 同时落在 [0, 5] 与 [-1, 6]，取前者
        let table = [0.0f64, 5.0, -1.0, 6.0];
        let r = SshRange::new(0.0, 3.0);
        let (zeta, branch) = inverse_ssh_classified(0.5, &table, r, 0.0, 2.0);
        assert_eq!(branch, InverseBranch::Interpolated);
        assert!((zeta - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_nan_is_dry_limit() {
        let (zeta, branch) = inverse_ssh_classified(f64::NAN, &TABLE, range(), 2.0, 1.5);
        assert_eq!((zeta, branch), (-1.5, InverseBranch::DryLimit));
    }

    #[test]
    #[should_panic(expected = "查找表至少需要 2 个采样点")]
    fn test_single_entry_table_panics() {
        forward_thickness(0.5f64, &[1.0], SshRange::new(0.0, 1.0), 0.0);
    }

    #[test]
    #[should_panic(expected = "查找表至少需要 2 个采样点")]
    fn test_empty_table_inverse_panics() {
        inverse_ssh(0.5f64, &[], SshRange::new(0.0, 1.0), 0.0, 0.0);
    }

    #[test]
    fn test_f32_lookup() {
        let table = [0.0f32, 2.0, 4.0];
        let r = SshRange::new(-2.0f32, 2.0);
        assert_eq!(forward_thickness(1.0f32, &table, r, 2.0), 3.0);
        assert_eq!(wet_fraction(-3.0f32, &table, r), 0.0);
    }
}
