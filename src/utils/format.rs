/// Format a reading for the template: two decimals at most, trailing zeros
/// trimmed, and always at least one decimal digit (`35.0`, `8.35`).
pub fn format_value(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    // Avoid printing "-0.0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };

    let mut text = format!("{:.2}", rounded);
    while text.ends_with('0') && !text.ends_with(".0") {
        text.pop();
    }
    text
}
