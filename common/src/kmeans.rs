//! k-meansクラスタリング
//!
//! Lloyd法 + k-means++ 初期化。`n_init` 回の試行から慣性
//! (クラスタ内二乗距離の総和) が最小のものを採用する。
//! 乱数は `seed` 固定の ChaCha8 なので、同じ入力順・同じ設定なら結果は常に同じ。

use crate::error::{Error, Result};
use crate::types::Rgb;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// クラスタ数
    pub k: usize,
    /// 初期化の試行回数
    pub n_init: usize,
    /// 1試行あたりの最大反復回数
    pub max_iter: usize,
    /// 収束判定の閾値（特徴量の平均分散に対する相対値）
    pub tolerance: f64,
    pub seed: u64,
}

impl KMeansConfig {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            n_init: 10,
            max_iter: 300,
            tolerance: 1e-4,
            seed: 42,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// クラスタリング結果
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    /// 入力順のクラスタ番号 (0..k)
    pub labels: Vec<usize>,
    pub centroids: Vec<Rgb>,
    pub inertia: f64,
    /// 採用された試行の反復回数
    pub iterations: usize,
}

pub fn fit(points: &[Rgb], config: &KMeansConfig) -> Result<KMeansFit> {
    let k = config.k;
    if k == 0 {
        return Err(Error::Clustering("k must be at least 1".into()));
    }
    if points.len() < k {
        return Err(Error::Clustering(format!(
            "not enough points ({}) for {} clusters",
            points.len(),
            k
        )));
    }
    if config.n_init == 0 || config.max_iter == 0 {
        return Err(Error::Clustering(
            "n_init and max_iter must be at least 1".into(),
        ));
    }
    if let Some(i) = points.iter().position(|p| p.iter().any(|c| !c.is_finite())) {
        return Err(Error::Clustering(format!(
            "point {} is not finite: {:?}",
            i, points[i]
        )));
    }

    let tol = scaled_tolerance(points, config.tolerance);
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut best: Option<KMeansFit> = None;

    for _ in 0..config.n_init {
        let initial = kmeans_plus_plus(points, k, &mut rng);
        let run = lloyd(points, initial, config.max_iter, tol);

        // 同値なら先の試行を残す
        let better = best.as_ref().map_or(true, |b| run.inertia < b.inertia);
        if better {
            best = Some(run);
        }
    }

    best.ok_or_else(|| Error::Clustering("no initialization was run".into()))
}

#[inline]
fn distance_sq(a: &Rgb, b: &Rgb) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

/// 最も近い重心の番号と二乗距離。同距離なら番号の小さい方
fn nearest(point: &Rgb, centroids: &[Rgb]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, centroid) in centroids.iter().enumerate() {
        let d = distance_sq(point, centroid);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

fn scaled_tolerance(points: &[Rgb], tolerance: f64) -> f64 {
    let n = points.len() as f64;
    let mut variance_sum = 0.0;
    for dim in 0..3 {
        let mean = points.iter().map(|p| p[dim]).sum::<f64>() / n;
        variance_sum += points.iter().map(|p| (p[dim] - mean).powi(2)).sum::<f64>() / n;
    }
    tolerance * variance_sum / 3.0
}

/// k-means++ 初期化: 既存の重心からの二乗距離に比例した確率で次の重心を選ぶ
fn kmeans_plus_plus(points: &[Rgb], k: usize, rng: &mut ChaCha8Rng) -> Vec<Rgb> {
    let n = points.len();
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..n)]);

    let mut closest: Vec<f64> = points.iter().map(|p| distance_sq(p, &centroids[0])).collect();

    while centroids.len() < k {
        let total: f64 = closest.iter().sum();

        let next = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            // 丸め誤差で末尾まで届いた場合は距離が正の最後の点
            let mut chosen = closest.iter().rposition(|d| *d > 0.0).unwrap_or(n - 1);
            for (i, d) in closest.iter().enumerate() {
                if target < *d {
                    chosen = i;
                    break;
                }
                target -= d;
            }
            chosen
        } else {
            // 全点が重心と一致
            rng.gen_range(0..n)
        };

        let centroid = points[next];
        for (d, p) in closest.iter_mut().zip(points) {
            *d = d.min(distance_sq(p, &centroid));
        }
        centroids.push(centroid);
    }

    centroids
}

/// 全点を最寄りの重心に割り当て、慣性を返す
fn assign(points: &[Rgb], centroids: &[Rgb], labels: &mut [usize]) -> f64 {
    let mut inertia = 0.0;
    for (label, point) in labels.iter_mut().zip(points) {
        let (cluster, d) = nearest(point, centroids);
        *label = cluster;
        inertia += d;
    }
    inertia
}

/// 割り当てに基づいて重心を再計算する。
/// 空になったクラスタの重心は、現在の重心から最も遠い点へ移す
fn update_centroids(points: &[Rgb], labels: &[usize], previous: &[Rgb]) -> Vec<Rgb> {
    let k = previous.len();
    let mut sums = vec![[0.0; 3]; k];
    let mut counts = vec![0usize; k];

    for (point, &label) in points.iter().zip(labels) {
        counts[label] += 1;
        for dim in 0..3 {
            sums[label][dim] += point[dim];
        }
    }

    let mut centroids: Vec<Rgb> = sums
        .iter()
        .zip(&counts)
        .zip(previous)
        .map(|((sum, &count), prev)| {
            if count > 0 {
                let c = count as f64;
                [sum[0] / c, sum[1] / c, sum[2] / c]
            } else {
                *prev
            }
        })
        .collect();

    let empty: Vec<usize> = (0..k).filter(|&c| counts[c] == 0).collect();
    if !empty.is_empty() {
        let spread = |i: usize| distance_sq(&points[i], &previous[labels[i]]);
        let mut farthest: Vec<usize> = (0..points.len()).collect();
        farthest.sort_by(|&a, &b| spread(b).total_cmp(&spread(a)).then(a.cmp(&b)));

        for (&cluster, &idx) in empty.iter().zip(&farthest) {
            centroids[cluster] = points[idx];
        }
    }

    centroids
}

fn lloyd(points: &[Rgb], mut centroids: Vec<Rgb>, max_iter: usize, tol: f64) -> KMeansFit {
    let mut labels = vec![0usize; points.len()];
    let mut iterations = 0;

    for _ in 0..max_iter {
        iterations += 1;

        assign(points, &centroids, &mut labels);
        let updated = update_centroids(points, &labels, &centroids);

        let shift: f64 = centroids
            .iter()
            .zip(&updated)
            .map(|(a, b)| distance_sq(a, b))
            .sum();
        centroids = updated;

        if shift <= tol {
            break;
        }
    }

    // 最終重心に対してラベルを揃える
    let inertia = assign(points, &centroids, &mut labels);

    KMeansFit {
        labels,
        centroids,
        inertia,
        iterations,
    }
}
