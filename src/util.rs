/// Arithmetic mean; `None` for an empty slice.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Population standard deviation; `None` for an empty slice.
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let center = mean(data)?;
    let variance = data.iter().map(|v| (v - center).powi(2)).sum::<f64>() / data.len() as f64;
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_response_times() {
        assert_eq!(mean(&[1200., 800., 2500., 1500., 900.]), Some(1380.0));
        assert_eq!(mean(&[3000., 700., 5500., 1200., 400.]), Some(2160.0));
    }

    #[test]
    fn test_mean_single_value() {
        assert_eq!(mean(&[950.0]), Some(950.0));
    }

    #[test]
    fn test_mean_empty_slice() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_dev_of_response_times() {
        assert_eq!(
            std_dev(&[1000., 1200., 900., 1020., 940.]),
            Some(103.22790320451152)
        );
        assert_eq!(std_dev(&[1500., 700., 5500.]), Some(2099.7354330698163));
    }

    #[test]
    fn test_std_dev_single_value() {
        assert_eq!(std_dev(&[4200.0]), Some(0.0));
    }

    #[test]
    fn test_std_dev_empty_slice() {
        assert_eq!(std_dev(&[]), None);
    }

    #[test]
    fn test_std_dev_identical_values() {
        assert_eq!(std_dev(&[500.0, 500.0, 500.0, 500.0]), Some(0.0));
    }

}
