use crate::models::window::{ChangePoint, WindowedPoint};

/// Splits each point's move from its predecessor into increase/decrease bars.
pub struct ChangeService;

impl ChangeService {
    pub fn new() -> Self {
        Self
    }

    /// Same length as `points`. The first point has no predecessor in the
    /// window, so both of its magnitudes are 0.
    pub fn decompose(&self, points: &[WindowedPoint]) -> Vec<ChangePoint> {
        let mut prev_close: Option<f64> = None;
        points
            .iter()
            .map(|point| {
                let close = point.record.close;
                let delta = prev_close.map_or(0.0, |prev| close - prev);
                prev_close = Some(close);
                ChangePoint {
                    point: point.clone(),
                    increase: if delta > 0.0 { delta } else { 0.0 },
                    decrease: if delta < 0.0 { -delta } else { 0.0 },
                }
            })
            .collect()
    }
}

impl Default for ChangeService {
    fn default() -> Self {
        Self::new()
    }
}
