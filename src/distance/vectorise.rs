//! Fixed-length feature vectors for the vector-based distance kinds.

use crate::diagram::PersistenceDiagram;

/// Pixel grid in (birth, persistence) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageResolution {
    pub birth_range: (f64, f64),
    pub pers_range: (f64, f64),
    pub pixel_size: f64,
    /// Variance of the isotropic Gaussian kernel.
    pub sigma: f64,
}

impl ImageResolution {
    /// Resolution used for `metric` at diagram `dimension`, if the metric has one.
    pub fn for_parameters(metric: &str, dimension: u32) -> Option<Self> {
        let (birth_range, pers_range, pixel_size, sigma) = match (metric, dimension) {
            ("euclidean", 0) => ((0.0, 1.0), (0.0, 10.0), 1.0, 1.0),
            ("euclidean", _) => ((0.0, 10.0), (0.0, 10.0), 1.0, 1.0),
            ("cosine", 0) => ((0.0, 0.1), (0.0, 1.0), 0.1, 0.1),
            ("cosine", _) => ((0.0, 1.0), (0.0, 1.0), 0.1, 0.1),
            _ => return None,
        };
        Some(Self {
            birth_range,
            pers_range,
            pixel_size,
            sigma,
        })
    }

    /// Pixel edges along one axis. A range that is not a whole number of
    /// pixels is widened evenly on both sides.
    fn edges(&self, range: (f64, f64)) -> Vec<f64> {
        let width = range.1 - range.0;
        let pixels = ((width / self.pixel_size) - 1e-9).ceil().max(1.0) as usize;
        let padding = (pixels as f64 * self.pixel_size - width) / 2.0;
        let start = range.0 - padding;
        (0..=pixels).map(|k| start + k as f64 * self.pixel_size).collect()
    }
}

/// Persistence image with linear persistence weighting. Each point spreads a
/// Gaussian over the grid, integrated exactly over every pixel.
pub fn persistence_image(diagram: &PersistenceDiagram, resolution: &ImageResolution) -> Vec<f64> {
    let birth_edges = resolution.edges(resolution.birth_range);
    let pers_edges = resolution.edges(resolution.pers_range);
    let (nb, np) = (birth_edges.len() - 1, pers_edges.len() - 1);
    let std_dev = resolution.sigma.sqrt();
    let mut image = vec![0.0; nb * np];

    for &(birth, death) in &diagram.points {
        let pers = death - birth;
        let weight = pers;
        if weight == 0.0 {
            continue;
        }
        let cdf = |edges: &[f64], centre: f64| -> Vec<f64> {
            edges.iter().map(|&e| normal_cdf((e - centre) / std_dev)).collect()
        };
        let birth_cdf = cdf(&birth_edges, birth);
        let pers_cdf = cdf(&pers_edges, pers);
        for bx in 0..nb {
            let mass_b = birth_cdf[bx + 1] - birth_cdf[bx];
            for py in 0..np {
                image[bx * np + py] += weight * mass_b * (pers_cdf[py + 1] - pers_cdf[py]);
            }
        }
    }
    image
}

const STATISTICS_PER_QUANTITY: usize = 10;

type Quantity = fn(f64, f64) -> f64;

fn birth_of(b: f64, _: f64) -> f64 {
    b
}

fn death_of(_: f64, d: f64) -> f64 {
    d
}

fn lifespan_of(b: f64, d: f64) -> f64 {
    (d - b).max(0.0)
}

fn midpoint_of(b: f64, d: f64) -> f64 {
    (b + d) / 2.0
}

const DEATHS_ONLY: [Quantity; 1] = [death_of];
const ALL_QUANTITIES: [Quantity; 4] = [birth_of, death_of, lifespan_of, midpoint_of];

/// Summary statistics of deaths (dimension 0) or of births, deaths,
/// lifespans and midpoints (higher dimensions), in that order.
pub fn bars_statistics(diagram: &PersistenceDiagram, only_death: bool) -> Vec<f64> {
    let quantities: &[Quantity] = if only_death { &DEATHS_ONLY } else { &ALL_QUANTITIES };

    let mut vector = Vec::with_capacity(quantities.len() * STATISTICS_PER_QUANTITY);
    for quantity in quantities {
        let mut values: Vec<f64> = diagram.points.iter().map(|&(b, d)| quantity(b, d)).collect();
        if values.is_empty() {
            values.push(0.0);
        }
        vector.extend(statistics(&mut values));
    }
    vector
}

fn statistics(values: &mut [f64]) -> [f64; STATISTICS_PER_QUANTITY] {
    values.sort_by(f64::total_cmp);
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
    let p10 = percentile(values, 10.0);
    let p25 = percentile(values, 25.0);
    let p75 = percentile(values, 75.0);
    let p90 = percentile(values, 90.0);
    [
        mean,
        variance.sqrt(),
        percentile(values, 50.0),
        p75 - p25,
        values[values.len() - 1] - values[0],
        p10,
        p25,
        p75,
        p90,
        entropy(values),
    ]
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Shannon entropy of the values taken as unnormalised weights.
fn entropy(values: &[f64]) -> f64 {
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let weighted: f64 = values.iter().filter(|&&x| x > 0.0).map(|&x| x * x.ln()).sum();
    total.ln() - weighted / total
}

fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Complementary error function, Chebyshev fit with fractional error below 1.2e-7.
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87
                                    + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let ans = t * poly.exp();
    if x >= 0.0 { ans } else { 2.0 - ans }
}
