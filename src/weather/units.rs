/// Kelvin to Fahrenheit, one decimal place.
///
/// The input is truncated toward zero before converting, so 300.9 K and
/// 300.0 K both read 80.3 °F.
pub fn kelvin_to_fahrenheit(kelvin: f64) -> f64 {
    let f = kelvin.trunc() * 1.8 - 459.67;
    (f * 10.0).round() / 10.0
}
