/// New value for the opposite dimension when one side goes from `old_self` to `new_self`,
/// keeping the aspect ratio. A zero base or a non-finite result leaves `old_opposite` as is.
pub fn compute_opposite(old_self: f64, old_opposite: f64, new_self: f64) -> f64 {
    if old_self == 0.0 {
        return old_opposite;
    }
    let ratio = (new_self - old_self) / old_self + 1.0;
    let next = round_half_up(old_opposite * ratio);
    if next.is_finite() { next } else { old_opposite }
}

/// Rounds ties toward positive infinity (`2.5 -> 3`, `-2.5 -> -2`).
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Parses a dimension typed into an input. Blank or non-numeric text yields `None`.
pub fn parse_dimension(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

pub fn format_dimension(value: f64) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_ties_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(2.49), 2.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.51), -3.0);
    }

    #[test]
    fn parses_dimensions() {
        assert_eq!(parse_dimension(" 200 "), Some(200.0));
        assert_eq!(parse_dimension("12.5"), Some(12.5));
        assert_eq!(parse_dimension(""), None);
        assert_eq!(parse_dimension("wide"), None);
        assert_eq!(parse_dimension("inf"), None);
    }

    #[test]
    fn formats_whole_numbers_without_fraction() {
        assert_eq!(format_dimension(100.0), "100");
        assert_eq!(format_dimension(12.5), "12.5");
    }
}
