pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;

use crate::db::samples::PriceSample;
use crate::message::EnrichedSample;

use bollinger::{BbOutput, BollingerBands};
use macd::{MacdIndicator, MacdOutput};
use rsi::RsiIndicator;

/// Trailing window length for all derived indicators.
pub const WINDOW: usize = 20;

const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;
const RSI_PERIOD: usize = 14;

/// Annotate `sample` with indicator values computed over the trailing
/// window of close prices (`closes` is oldest-first and ends at the sample
/// being annotated).
///
/// Fewer than [`WINDOW`] closes is not an error: the sample passes through
/// with no indicator fields, and the consumer renders the bare candle.
///
/// Pure function of its inputs; calling it twice with the same window is
/// bit-identical.
pub fn annotate(sample: &PriceSample, closes: &[f64]) -> EnrichedSample {
    let mut out = EnrichedSample::from_sample(sample);
    if closes.len() < WINDOW {
        return out;
    }
    let window = &closes[closes.len() - WINDOW..];

    let mut bb = BollingerBands::new(WINDOW);
    let mut macd = MacdIndicator::new(MACD_FAST, MACD_SLOW, MACD_SIGNAL);
    let mut rsi = RsiIndicator::new(RSI_PERIOD);

    let (head, tail) = window.split_at(WINDOW - 1);
    for &close in head {
        bb.update(close);
        macd.update(close);
        rsi.update(close);
    }
    let last_close = tail[0];
    let bands: BbOutput = bb.update(last_close);
    let macd_out: MacdOutput = macd.update(last_close);
    let rsi_val = rsi.update(last_close);

    // bb middle over a full ring is exactly the SMA of the window.
    out.sma_20 = Some(bands.middle);
    out.macd = Some(macd_out.line);
    out.macd_signal = Some(macd_out.signal);
    out.rsi = Some(rsi_val);
    out.bb_upper = Some(bands.upper);
    out.bb_middle = Some(bands.middle);
    out.bb_lower = Some(bands.lower);
    out
}

/// Ring buffer for rolling-window computations.  The poll loop keeps one of
/// these for the close series so catch-up rows are enriched with the window
/// ending at the row itself, O(1) per sample.
#[derive(Debug, Clone)]
pub struct RingBuf {
    buf: Vec<f64>,
    pos: usize,
    len: usize,
    cap: usize,
}

impl RingBuf {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0.0; capacity],
            pos: 0,
            len: 0,
            cap: capacity,
        }
    }

    pub fn push(&mut self, val: f64) {
        self.buf[self.pos] = val;
        self.pos = (self.pos + 1) % self.cap;
        if self.len < self.cap {
            self.len += 1;
        }
    }

    pub fn full(&self) -> bool {
        self.len == self.cap
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over values in insertion order (oldest first).
    pub fn iter(&self) -> RingBufIter<'_> {
        RingBufIter {
            buf: &self.buf,
            start: if self.len < self.cap { 0 } else { self.pos },
            count: 0,
            total: self.len,
            cap: self.cap,
        }
    }

    /// Contents oldest-first as a contiguous slice-alike.
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }

    pub fn mean(&self) -> f64 {
        if self.len == 0 {
            return 0.0;
        }
        self.iter().sum::<f64>() / self.len as f64
    }

    /// Population standard deviation (ddof = 0).
    pub fn std_pop(&self) -> f64 {
        if self.len == 0 {
            return 0.0;
        }
        let mean = self.mean();
        let var = self.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / self.len as f64;
        var.sqrt()
    }
}

pub struct RingBufIter<'a> {
    buf: &'a [f64],
    start: usize,
    count: usize,
    total: usize,
    cap: usize,
}

impl Iterator for RingBufIter<'_> {
    type Item = f64;
    fn next(&mut self) -> Option<f64> {
        if self.count >= self.total {
            return None;
        }
        let idx = (self.start + self.count) % self.cap;
        self.count += 1;
        Some(self.buf[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(time: i64, close: f64) -> PriceSample {
        PriceSample {
            time,
            open_price: close,
            high_price: close,
            low_price: close,
            close_price: close,
        }
    }

    #[test]
    fn nineteen_closes_pass_through_unmodified() {
        let closes: Vec<f64> = vec![10.0; 19];
        let out = annotate(&sample(19, 10.0), &closes);
        assert_eq!(out.close_price, 10.0);
        assert!(out.sma_20.is_none());
        assert!(out.macd.is_none());
        assert!(out.macd_signal.is_none());
        assert!(out.rsi.is_none());
        assert!(out.bb_upper.is_none());
        assert!(out.bb_middle.is_none());
        assert!(out.bb_lower.is_none());
    }

    #[test]
    fn empty_window_passes_through_unmodified() {
        let out = annotate(&sample(1, 3.0), &[]);
        assert!(out.sma_20.is_none());
        assert_eq!(out.close_price, 3.0);
    }

    #[test]
    fn twenty_identical_closes_collapse_sma_and_bands() {
        let closes: Vec<f64> = vec![42.0; 20];
        let out = annotate(&sample(20, 42.0), &closes);
        assert_eq!(out.sma_20, Some(42.0));
        assert_eq!(out.bb_upper, Some(42.0));
        assert_eq!(out.bb_middle, Some(42.0));
        assert_eq!(out.bb_lower, Some(42.0));
        assert_eq!(out.macd, Some(0.0));
        assert_eq!(out.macd_signal, Some(0.0));
    }

    #[test]
    fn ascending_closes_have_known_sma() {
        let closes: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        let out = annotate(&sample(20, 20.0), &closes);
        assert_eq!(out.sma_20, Some(10.5));
        assert_eq!(out.bb_middle, Some(10.5));
    }

    #[test]
    fn only_the_trailing_twenty_closes_matter() {
        let mut closes: Vec<f64> = vec![1_000_000.0; 5];
        closes.extend((1..=20).map(|i| i as f64));
        let out = annotate(&sample(25, 20.0), &closes);
        assert_eq!(out.sma_20, Some(10.5));
    }

    #[test]
    fn annotation_is_deterministic() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + (i as f64).sin()).collect();
        let s = sample(20, *closes.last().unwrap());
        let a = annotate(&s, &closes);
        let b = annotate(&s, &closes);
        assert_eq!(a.sma_20, b.sma_20);
        assert_eq!(a.macd, b.macd);
        assert_eq!(a.macd_signal, b.macd_signal);
        assert_eq!(a.rsi, b.rsi);
        assert_eq!(a.bb_upper, b.bb_upper);
        assert_eq!(a.bb_lower, b.bb_lower);
    }

    #[test]
    fn ring_buf_evicts_oldest_and_iterates_in_order() {
        let mut ring = RingBuf::new(3);
        assert!(ring.is_empty());
        for v in [1.0, 2.0, 3.0, 4.0] {
            ring.push(v);
        }
        assert!(ring.full());
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.to_vec(), vec![2.0, 3.0, 4.0]);
        assert_eq!(ring.mean(), 3.0);
    }

    #[test]
    fn ring_buf_std_pop_matches_hand_computation() {
        let mut ring = RingBuf::new(4);
        for v in [2.0, 4.0, 4.0, 6.0] {
            ring.push(v);
        }
        // mean 4, variance (4+0+0+4)/4 = 2
        assert!((ring.std_pop() - 2.0_f64.sqrt()).abs() < 1e-12);
    }
}
