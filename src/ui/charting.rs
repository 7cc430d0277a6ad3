use crate::time_series::ResponsePoint;

/// Compute X (question count) and Y (seconds) bounds for the results chart
pub fn compute_chart_params(points: &[ResponsePoint]) -> (f64, f64) {
    let mut highest_secs = 0.0;
    for point in points {
        if point.secs > highest_secs {
            highest_secs = point.secs;
        }
    }
    if highest_secs < 1.0 {
        highest_secs = 1.0;
    }

    let mut question_count = match points.last() {
        Some(p) => p.question,
        None => 1.0,
    };
    if question_count < 1.0 {
        question_count = 1.0;
    }

    (question_count, highest_secs.ceil())
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_chart_params_empty() {
        let (x, y) = compute_chart_params(&[]);
        assert_eq!(x, 1.0);
        assert_eq!(y, 1.0);
    }

    #[test]
    fn test_compute_chart_params_spans_the_session() {
        let points = vec![
            ResponsePoint::new(1.0, 2.4),
            ResponsePoint::new(2.0, 0.8),
            ResponsePoint::new(3.0, 4.2),
        ];
        let (x, y) = compute_chart_params(&points);
        assert_eq!(x, 3.0);
        assert_eq!(y, 5.0);
    }

    #[test]
    fn test_compute_chart_params_floors_tiny_values() {
        let points = vec![ResponsePoint::new(1.0, 0.3)];
        let (x, y) = compute_chart_params(&points);
        assert_eq!(x, 1.0);
        assert_eq!(y, 1.0);
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(1.2345), "1.23");
    }
}
