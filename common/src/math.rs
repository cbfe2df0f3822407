pub fn div_or_zero(lhs: f64, rhs: f64) -> f64 {
    if rhs == 0.0 {
        0.0
    } else {
        lhs / rhs
    }
}
