//! Simple Imaging Polynomial (SIP) distortion.
//!
//! The forward polynomials `A`/`B` act on pixel offsets from CRPIX and are
//! applied before the linear transform. The inverse uses `AP`/`BP` when the
//! header provides them and falls back to Newton iteration otherwise.

use crate::error::{WcsError, WcsResult};
use crate::polynomial::{newton_raphson_2d, Polynomial2D};

const INVERSE_MAX_ITER: usize = 20;
const INVERSE_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct SipDistortion {
    crpix: [f64; 2],
    a: Polynomial2D,
    b: Polynomial2D,
    ap: Option<Polynomial2D>,
    bp: Option<Polynomial2D>,
}

impl SipDistortion {
    pub fn new(crpix: [f64; 2], a_order: u32, b_order: u32) -> Self {
        Self {
            crpix,
            a: Polynomial2D::new(a_order),
            b: Polynomial2D::new(b_order),
            ap: None,
            bp: None,
        }
    }

    pub fn set_a(&mut self, p: u32, q: u32, value: f64) {
        self.a.set(p, q, value);
    }

    pub fn set_b(&mut self, p: u32, q: u32, value: f64) {
        self.b.set(p, q, value);
    }

    pub fn set_inverse_order(&mut self, ap_order: u32, bp_order: u32) {
        self.ap = Some(Polynomial2D::new(ap_order));
        self.bp = Some(Polynomial2D::new(bp_order));
    }

    /// Ignored until `set_inverse_order` has been called.
    pub fn set_ap(&mut self, p: u32, q: u32, value: f64) {
        if let Some(ap) = self.ap.as_mut() {
            ap.set(p, q, value);
        }
    }

    pub fn set_bp(&mut self, p: u32, q: u32, value: f64) {
        if let Some(bp) = self.bp.as_mut() {
            bp.set(p, q, value);
        }
    }

    pub fn a(&self) -> &Polynomial2D {
        &self.a
    }

    pub fn b(&self) -> &Polynomial2D {
        &self.b
    }

    pub fn ap(&self) -> Option<&Polynomial2D> {
        self.ap.as_ref()
    }

    pub fn bp(&self) -> Option<&Polynomial2D> {
        self.bp.as_ref()
    }

    pub fn has_inverse_coeffs(&self) -> bool {
        self.ap.is_some() && self.bp.is_some()
    }

    /// Distorted pixel to undistorted pixel.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let u = x - self.crpix[0];
        let v = y - self.crpix[1];
        (x + self.a.eval(u, v), y + self.b.eval(u, v))
    }

    /// Undistorted pixel back to distorted pixel.
    pub fn apply_inverse(&self, x: f64, y: f64) -> WcsResult<(f64, f64)> {
        match (&self.ap, &self.bp) {
            (Some(ap), Some(bp)) => {
                let u = x - self.crpix[0];
                let v = y - self.crpix[1];
                Ok((x + ap.eval(u, v), y + bp.eval(u, v)))
            }
            _ => self.apply_inverse_iterative(x, y),
        }
    }

    fn apply_inverse_iterative(&self, x: f64, y: f64) -> WcsResult<(f64, f64)> {
        let forward = |px: f64, py: f64| self.apply(px, py);
        let jacobian = |px: f64, py: f64| {
            let u = px - self.crpix[0];
            let v = py - self.crpix[1];
            let (da_du, da_dv) = self.a.gradient(u, v);
            let (db_du, db_dv) = self.b.gradient(u, v);
            [[1.0 + da_du, da_dv], [db_du, 1.0 + db_dv]]
        };

        newton_raphson_2d(
            (x, y),
            (x, y),
            forward,
            jacobian,
            INVERSE_MAX_ITER,
            INVERSE_TOLERANCE,
        )
        .map_err(|msg| WcsError::convergence_failure(format!("SIP inverse distortion: {}", msg)))
    }
}
