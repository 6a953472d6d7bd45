use crate::diagram::PersistenceDiagram;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

pub const DIRECTIONS: usize = 50;

/// Sliced Wasserstein distance approximated with `directions` evenly spaced
/// projection lines, starting at angle pi/2. Each diagram is augmented with
/// the diagonal projections of the other diagram's points so both sides have
/// the same number of projected values.
pub fn sliced_wasserstein(
    a: &PersistenceDiagram,
    b: &PersistenceDiagram,
    directions: usize,
) -> f64 {
    let to_diagonal = |&(birth, death): &(f64, f64)| {
        let along = (birth + death) * FRAC_1_SQRT_2;
        let coord = (along * along / 2.0).sqrt();
        (coord, coord)
    };
    let a_diag: Vec<(f64, f64)> = a.points.iter().map(to_diagonal).collect();
    let b_diag: Vec<(f64, f64)> = b.points.iter().map(to_diagonal).collect();

    let step = 1.0 / directions as f64;
    let mut total = 0.0;
    let mut v1 = Vec::with_capacity(a.len() + b.len());
    let mut v2 = Vec::with_capacity(a.len() + b.len());
    for k in 0..directions {
        let theta = (0.5 + k as f64 * step) * PI;
        let (c, s) = (theta.cos(), theta.sin());
        let project = |&(x, y): &(f64, f64)| c * x + s * y;

        v1.clear();
        v1.extend(a.points.iter().chain(&b_diag).map(project));
        v2.clear();
        v2.extend(b.points.iter().chain(&a_diag).map(project));
        v1.sort_by(f64::total_cmp);
        v2.sort_by(f64::total_cmp);

        let l1: f64 = v1.iter().zip(&v2).map(|(x, y)| (x - y).abs()).sum();
        total += step * l1;
    }
    total
}
