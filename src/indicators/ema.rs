/// Exponential Moving Average — incremental computation.
///
/// Behaviour:
///   sample 0  → value = price (seeded with the first observation)
///   sample 1+ → value = α·price + (1−α)·prev   where α = 2/(window+1)
#[derive(Debug, Clone)]
pub struct Ema {
    alpha: f64,
    pub value: f64,
    count: usize,
}

impl Ema {
    pub fn new(window: usize) -> Self {
        Self {
            alpha: 2.0 / (window as f64 + 1.0),
            value: 0.0,
            count: 0,
        }
    }

    /// Feed one price, return the current EMA value.
    pub fn update(&mut self, price: f64) -> f64 {
        if self.count == 0 {
            self.value = price;
        } else {
            self.value = self.alpha * price + (1.0 - self.alpha) * self.value;
        }
        self.count += 1;
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_with_first_observation_then_smooths() {
        // window 3 → alpha = 0.5
        let mut ema = Ema::new(3);
        assert!((ema.update(10.0) - 10.0).abs() < 1e-12);
        assert!((ema.update(11.0) - 10.5).abs() < 1e-12);
        assert!((ema.update(12.0) - 11.25).abs() < 1e-12);
        assert!((ema.update(13.0) - 12.125).abs() < 1e-12);
    }

    #[test]
    fn constant_input_is_a_fixed_point() {
        let mut ema = Ema::new(12);
        for _ in 0..40 {
            assert_eq!(ema.update(42.0), 42.0);
        }
    }
}
