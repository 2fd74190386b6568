use std::collections::BTreeMap;

#[inline]
pub fn power_term(u: f64, v: f64, p: u32, q: u32) -> f64 {
    u.powi(p as i32) * v.powi(q as i32)
}

/// Sparse 2-D polynomial `sum c_pq * u^p * v^q` with `p + q <= order`.
///
/// Coefficients are kept in `(p, q)` order so keyword export is stable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polynomial2D {
    order: u32,
    coeffs: BTreeMap<(u32, u32), f64>,
}

impl Polynomial2D {
    pub fn new(order: u32) -> Self {
        Self {
            order,
            coeffs: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Terms above the order or with a zero coefficient are dropped.
    pub fn set(&mut self, p: u32, q: u32, value: f64) {
        if p + q <= self.order && value != 0.0 {
            self.coeffs.insert((p, q), value);
        }
    }

    pub fn get(&self, p: u32, q: u32) -> f64 {
        self.coeffs.get(&(p, q)).copied().unwrap_or(0.0)
    }

    pub fn terms(&self) -> impl Iterator<Item = ((u32, u32), f64)> + '_ {
        self.coeffs.iter().map(|(&k, &v)| (k, v))
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn eval(&self, u: f64, v: f64) -> f64 {
        self.coeffs
            .iter()
            .map(|(&(p, q), &c)| c * power_term(u, v, p, q))
            .sum()
    }

    /// Partial derivatives `(d/du, d/dv)`.
    pub fn gradient(&self, u: f64, v: f64) -> (f64, f64) {
        let mut du = 0.0;
        let mut dv = 0.0;
        for (&(p, q), &c) in &self.coeffs {
            if p > 0 {
                du += c * p as f64 * power_term(u, v, p - 1, q);
            }
            if q > 0 {
                dv += c * q as f64 * power_term(u, v, p, q - 1);
            }
        }
        (du, dv)
    }
}

/// Solves `f(x, y) = target` by Newton iteration with a caller-supplied
/// Jacobian `[[df1/dx, df1/dy], [df2/dx, df2/dy]]`.
pub fn newton_raphson_2d<F, J>(
    target: (f64, f64),
    initial_guess: (f64, f64),
    f: F,
    jacobian: J,
    max_iter: usize,
    tolerance: f64,
) -> Result<(f64, f64), &'static str>
where
    F: Fn(f64, f64) -> (f64, f64),
    J: Fn(f64, f64) -> [[f64; 2]; 2],
{
    let (tx, ty) = target;
    let (mut x, mut y) = initial_guess;

    for _ in 0..max_iter {
        let (fx, fy) = f(x, y);
        let (rx, ry) = (fx - tx, fy - ty);

        if rx.abs() < tolerance && ry.abs() < tolerance {
            return Ok((x, y));
        }

        let (step_x, step_y) = solve_2x2(jacobian(x, y), rx, ry)?;
        x -= step_x;
        y -= step_y;
    }

    Err("Newton-Raphson failed to converge")
}

fn solve_2x2(m: [[f64; 2]; 2], b1: f64, b2: f64) -> Result<(f64, f64), &'static str> {
    let det = m[0][0] * m[1][1] - m[0][1] * m[1][0];
    if det.abs() < 1e-15 {
        return Err("Singular Jacobian matrix");
    }
    let inv_det = 1.0 / det;
    Ok((
        inv_det * (m[1][1] * b1 - m[0][1] * b2),
        inv_det * (-m[1][0] * b1 + m[0][0] * b2),
    ))
}
