use super::ema::Ema;

/// MACD — fast EMA minus slow EMA, with an EMA of that difference as the
/// signal line.  Both lines are exposed; the wire format sends each one.
#[derive(Debug, Clone)]
pub struct MacdIndicator {
    ema_fast: Ema,
    ema_slow: Ema,
    ema_signal: Ema,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MacdOutput {
    pub line: f64,
    pub signal: f64,
}

impl MacdIndicator {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        Self {
            ema_fast: Ema::new(fast),
            ema_slow: Ema::new(slow),
            ema_signal: Ema::new(signal),
        }
    }

    /// Feed one close price, return the MACD and signal lines.
    pub fn update(&mut self, close: f64) -> MacdOutput {
        let fast = self.ema_fast.update(close);
        let slow = self.ema_slow.update(close);
        let line = fast - slow;
        let signal = self.ema_signal.update(line);
        MacdOutput { line, signal }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_closes_give_zero_lines() {
        let mut macd = MacdIndicator::new(12, 26, 9);
        let mut out = MacdOutput::default();
        for _ in 0..30 {
            out = macd.update(100.0);
        }
        assert_eq!(out.line, 0.0);
        assert_eq!(out.signal, 0.0);
    }

    #[test]
    fn rising_closes_push_line_above_signal() {
        let mut macd = MacdIndicator::new(12, 26, 9);
        let mut out = MacdOutput::default();
        for i in 0..30 {
            out = macd.update(100.0 + i as f64);
        }
        // Fast EMA tracks a rising series more closely than the slow EMA,
        // and the signal lags the line.
        assert!(out.line > 0.0);
        assert!(out.line > out.signal);
    }
}
