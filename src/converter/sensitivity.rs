use crate::config::{CM_PER_INCH, DISTANCE_DECIMALS, K_CM_360, SENSITIVITY_DECIMALS};
use crate::error::{AppError, Result};
use crate::types::{ConversionRequest, ConversionResult};

/// Convert `req.source_sensitivity` into the target game's setting so that the
/// same hand movement produces the same rotation.
///
/// The universal factor `U = dpi * sensitivity * yaw` is the quantity held
/// constant across games. From it:
/// - target sensitivity = `U / (target_dpi * target_yaw)`
/// - cm/360 = `K_CM_360 / U`
/// - in/360 = cm/360 / 2.54
///
/// Pure: no shared state, safe to call from any number of tasks.
pub fn convert(
    req: &ConversionRequest,
    source_factor: f64,
    target_factor: f64,
) -> Result<ConversionResult> {
    if req.source_mouse_dpi <= 0 || req.target_mouse_dpi <= 0 {
        return Err(AppError::InvalidMagnitude(
            "DPI and Sensitivity must be positive.".to_string(),
        ));
    }
    if !is_positive(req.source_sensitivity) {
        return Err(AppError::InvalidMagnitude(
            "DPI and Sensitivity must be positive.".to_string(),
        ));
    }
    if !is_positive(source_factor) || !is_positive(target_factor) {
        return Err(AppError::InvalidMagnitude(format!(
            "game factors must be positive (source={source_factor}, target={target_factor})"
        )));
    }

    let universal = req.source_mouse_dpi as f64 * req.source_sensitivity * source_factor;
    // second check: catches underflow to zero and overflow to infinity
    if !universal.is_finite() || universal <= 0.0 {
        return Err(AppError::InvalidMagnitude(
            "DPI and Sensitivity must be positive.".to_string(),
        ));
    }

    let target_sensitivity = universal / (req.target_mouse_dpi as f64 * target_factor);
    let cm_360 = K_CM_360 / universal;
    let in_360 = cm_360 / CM_PER_INCH;

    Ok(ConversionResult {
        target_sensitivity: round_half_even(target_sensitivity, SENSITIVITY_DECIMALS),
        cm_360: round_half_even(cm_360, DISTANCE_DECIMALS),
        in_360: round_half_even(in_360, DISTANCE_DECIMALS),
    })
}

fn is_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// Round to `places` decimals on the exact binary value of `value`, ties to
/// even. 2.675 is stored as 2.67499999... and rounds to 2.67; only values
/// that are exactly halfway in binary (0.125, 1.03125) count as ties.
///
/// Scaling first (`value * 10^n`) would round twice: the product can land
/// on an exact .5 that the original value was not. Decimal formatting works
/// on the exact value instead.
pub fn round_half_even(value: f64, places: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.places$}").parse().unwrap_or(value)
}
