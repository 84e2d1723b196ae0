//! Continuous-time view of a sampled vector trajectory.
//!
//! Every column of the sample matrix gets its own `splines::Spline` keyed by the
//! time grid. Outside the sampled range the first/last sample is held
//! (`clamped_sample`), so the interpolant is defined for any finite time.
use crate::matrices::matrix_errors::MatrixError;
use log::debug;
use nalgebra::{DMatrix, DVector};
use splines::{Interpolation, Key, Spline};
use strum_macros::{Display, EnumIter, EnumString};

/// Interpolation used between two consecutive samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum InterpolationKind {
    #[default]
    Linear,
    /// cosine easing between samples
    Cosine,
    /// zero-order hold: value of the sample at or before t
    Step,
}

impl InterpolationKind {
    fn to_splines(self) -> Interpolation<f64, f64> {
        match self {
            InterpolationKind::Linear => Interpolation::Linear,
            InterpolationKind::Cosine => Interpolation::Cosine,
            InterpolationKind::Step => Interpolation::Step(1.0),
        }
    }
}

/// Interpolating callable over `(tt, x)` where row `k` of `x` is the sample at `tt[k]`.
#[derive(Clone, Debug)]
pub struct TrajectoryInterpolant {
    splines: Vec<Spline<f64, f64>>,
    t_start: f64,
    t_end: f64,
}

impl TrajectoryInterpolant {
    pub fn new(
        tt: &DVector<f64>,
        x: &DMatrix<f64>,
        kind: InterpolationKind,
    ) -> Result<Self, MatrixError> {
        if tt.len() != x.nrows() {
            return Err(MatrixError::DimensionMismatch {
                context: "time grid vs sample rows".to_string(),
                expected: (tt.len(), x.ncols()),
                found: x.shape(),
            });
        }
        if tt.is_empty() {
            return Err(MatrixError::EmptyTrajectory);
        }
        if let Some(&time) = tt.iter().find(|t| !t.is_finite()) {
            return Err(MatrixError::NonFiniteTime { time });
        }
        let interpolation = kind.to_splines();
        let splines = x
            .column_iter()
            .map(|column| {
                let keys = tt
                    .iter()
                    .zip(column.iter())
                    .map(|(&t, &v)| Key::new(t, v, interpolation))
                    .collect();
                Spline::from_vec(keys)
            })
            .collect();
        let t_start = tt.min();
        let t_end = tt.max();
        debug!(
            "{} interpolant over {} samples of {} channels on [{}, {}]",
            kind,
            tt.len(),
            x.ncols(),
            t_start,
            t_end
        );
        Ok(Self {
            splines,
            t_start,
            t_end,
        })
    }

    /// number of channels (columns of the sample matrix)
    pub fn dim(&self) -> usize {
        self.splines.len()
    }

    /// sampled time range
    pub fn span(&self) -> (f64, f64) {
        (self.t_start, self.t_end)
    }

    /// Interpolated vector at time `t`.
    pub fn eval(&self, t: f64) -> Result<DVector<f64>, MatrixError> {
        if !t.is_finite() {
            return Err(MatrixError::NonFiniteTime { time: t });
        }
        let values = self
            .splines
            .iter()
            .map(|spline| spline.clamped_sample(t).ok_or(MatrixError::EmptyTrajectory))
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(DVector::from_vec(values))
    }

    /// Interpolated vectors at several times, one row per time.
    pub fn eval_many(&self, times: &[f64]) -> Result<DMatrix<f64>, MatrixError> {
        let mut out = DMatrix::zeros(times.len(), self.dim());
        for (k, &t) in times.iter().enumerate() {
            out.set_row(k, &self.eval(t)?.transpose());
        }
        Ok(out)
    }
}

/// Builds an interpolating callable from sampled data with linear interpolation.
pub fn callable_from_trajectory(
    tt: &DVector<f64>,
    x: &DMatrix<f64>,
) -> Result<TrajectoryInterpolant, MatrixError> {
    TrajectoryInterpolant::new(tt, x, InterpolationKind::default())
}
