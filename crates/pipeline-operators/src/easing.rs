//! Funciones de easing `[0,1] -> [0,1]` para `tween`.

#[inline]
pub fn linear(t: f64) -> f64 {
    t
}

/// Aceleración cuadrática: t^2
#[inline]
pub fn ease_in(t: f64) -> f64 {
    t * t
}

#[inline]
pub fn ease_out(t: f64) -> f64 {
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Cúbica simétrica.
#[inline]
pub fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}
