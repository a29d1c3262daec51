/// Render a double the way the engine prints doubles in text results:
/// integral finite values keep one decimal (`270.0`), everything else uses
/// the shortest round-trip form (`89.5`, `NaN`). Infinities print as
/// `Infinity` and `-Infinity`.
pub fn format_double(v: f64) -> String {
    if v.is_infinite() {
        if v > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() }
    } else if v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}
