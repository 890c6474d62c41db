pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Convert a millisecond quantity to seconds rounded to three decimal places.
///
/// Rounds half away from zero on the millisecond value, so `0.0755s` worth of
/// milliseconds (75.5) becomes `0.076`. Every displayed or exported average goes
/// through here.
pub fn ms_to_secs_3dp(ms: f64) -> f64 {
    ms.round() / 1000.0
}

/// Format milliseconds as seconds without trailing zeros, e.g. `900 -> "0.9"`
pub fn format_secs(ms: u64) -> String {
    format_secs_f64(ms as f64 / 1000.0)
}

pub fn format_secs_f64(secs: f64) -> String {
    let s = format!("{secs:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}
