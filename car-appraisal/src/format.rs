// Display formatting for the result panel, following the es-CL locale:
// `.` groups thousands and Chilean pesos carry no decimals.

/// Format an amount as Chilean pesos, e.g. `5000000.0 -> "$5.000.000"`.
pub fn format_clp(amount: f64) -> String {
    if !amount.is_finite() {
        return "--".to_string();
    }
    let rounded = amount.round();
    let digits = group_thousands(rounded.abs() as u64);
    if rounded < 0.0 {
        format!("-${digits}")
    } else {
        format!("${digits}")
    }
}

/// Format a mileage reading, e.g. `50000 -> "50.000 km"`.
pub fn format_km(kilometers: u32) -> String {
    format!("{} km", group_thousands(u64::from(kilometers)))
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}
