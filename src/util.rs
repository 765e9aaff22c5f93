pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Population standard deviation; used for exit-velocity consistency.
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let avg = mean(data)?;
    let variance = data
        .iter()
        .map(|value| {
            let diff = avg - *value;
            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;

    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_exit_velocities() {
        assert_eq!(mean(&[88.0, 92.0, 96.0]), Some(92.0));
        assert_eq!(mean(&[70.0, 99.0]), Some(84.5));
    }

    #[test]
    fn test_mean_single_value() {
        assert_eq!(mean(&[95.0]), Some(95.0));
    }

    #[test]
    fn test_mean_empty_slice() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(std_dev(&[90.0, 90.0, 90.0]), Some(0.0));
        let sd = std_dev(&[80.0, 90.0, 100.0]).unwrap();
        assert!((sd - 8.16496580927726).abs() < 1e-10);
    }

    #[test]
    fn test_std_dev_single_value() {
        assert_eq!(std_dev(&[42.0]), Some(0.0));
    }

    #[test]
    fn test_std_dev_empty_slice() {
        assert_eq!(std_dev(&[]), None);
    }
}
