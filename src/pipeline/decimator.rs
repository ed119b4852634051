//! FIR low-pass decimation filter.

use std::sync::Arc;

use crate::PeriodCaptureError;

/// 49-tap anti-alias low-pass for 48 kHz → 12 kHz (decimate by 4).
///
/// Passband edge 4500 Hz, stopband edge 6000 Hz, 1 dB ripple, 40 dB
/// stopband attenuation. The raw taps sum to about 1.056; [`Decimator`]
/// normalizes them to unity DC gain.
pub const LOWPASS_48K_TO_12K: [f32; 49] = [
    0.000_861_074_04,
    0.010_051_920_21,
    0.010_161_983_649,
    0.011_363_155_076,
    0.008_706_594_219,
    0.002_613_872_664,
    -0.005_202_883_094,
    -0.011_720_748_164,
    -0.013_752_163_325,
    -0.009_431_602_741,
    0.000_539_063_909,
    0.012_636_767_098,
    0.021_494_659_597,
    0.021_951_235_065,
    0.011_564_169_382,
    -0.007_656_470_131,
    -0.028_965_787_341,
    -0.042_637_874_109,
    -0.039_203_309_748,
    -0.013_153_301_537,
    0.034_320_769_178,
    0.094_717_832_646,
    0.154_224_604_789,
    0.197_758_325_022,
    0.213_715_139_513,
    0.197_758_325_022,
    0.154_224_604_789,
    0.094_717_832_646,
    0.034_320_769_178,
    -0.013_153_301_537,
    -0.039_203_309_748,
    -0.042_637_874_109,
    -0.028_965_787_341,
    -0.007_656_470_131,
    0.011_564_169_382,
    0.021_951_235_065,
    0.021_494_659_597,
    0.012_636_767_098,
    0.000_539_063_909,
    -0.009_431_602_741,
    -0.013_752_163_325,
    -0.011_720_748_164,
    -0.005_202_883_094,
    0.002_613_872_664,
    0.008_706_594_219,
    0.011_363_155_076,
    0.010_161_983_649,
    0.010_051_920_21,
    0.000_861_074_04,
];

/// Relative tolerance when checking tap symmetry.
const SYMMETRY_TOLERANCE: f32 = 1e-6;

/// Checks that `coefficients` can drive a decimator with the given factor.
pub(crate) fn validate_coefficients(
    coefficients: &[f32],
    factor: usize,
) -> Result<(), PeriodCaptureError> {
    if coefficients.len() <= factor {
        return Err(PeriodCaptureError::FilterTooShort {
            taps: coefficients.len(),
            factor,
        });
    }

    let n = coefficients.len();
    for i in 0..n / 2 {
        let (a, b) = (coefficients[i], coefficients[n - 1 - i]);
        if (a - b).abs() > SYMMETRY_TOLERANCE * a.abs().max(b.abs()).max(1.0) {
            return Err(PeriodCaptureError::AsymmetricFilter { index: i });
        }
    }

    let gain: f32 = coefficients.iter().sum();
    if gain.abs() < f32::EPSILON {
        return Err(PeriodCaptureError::ZeroFilterGain);
    }

    Ok(())
}

/// Scales coefficients so they sum to one.
fn normalize(coefficients: &[f32]) -> Arc<[f32]> {
    let gain: f64 = coefficients.iter().map(|&c| f64::from(c)).sum();
    coefficients
        .iter()
        .map(|&c| (f64::from(c) / gain) as f32)
        .collect()
}

/// Streaming FIR low-pass that emits one sample per `factor` inputs.
///
/// Keeps the most recent `taps` input samples as history. Each call to
/// [`downsample`](Self::downsample) slides the history by `factor` samples
/// and convolves it against the coefficients.
///
/// # Example
///
/// ```
/// use period_capture::pipeline::Decimator;
///
/// let mut decimator = Decimator::lowpass_48k();
/// let mut out = 0.0;
/// for _ in 0..32 {
///     out = decimator.downsample(&[0.5; 4]);
/// }
/// assert!((out - 0.5).abs() < 1e-4);
/// ```
#[derive(Debug, Clone)]
pub struct Decimator {
    taps: Arc<[f32]>,
    history: Vec<f32>,
    factor: usize,
}

impl Decimator {
    /// Creates a decimator from raw coefficients, normalizing them to unity
    /// DC gain.
    ///
    /// # Errors
    ///
    /// Returns an error if the coefficients are too short for `factor`,
    /// not symmetric, or sum to zero.
    pub fn new(coefficients: &[f32], factor: usize) -> Result<Self, PeriodCaptureError> {
        validate_coefficients(coefficients, factor)?;
        Ok(Self::from_normalized(normalize(coefficients), factor))
    }

    /// The default 48 kHz → 12 kHz decimator.
    #[must_use]
    pub fn lowpass_48k() -> Self {
        Self::from_normalized(normalize(&LOWPASS_48K_TO_12K), 4)
    }

    fn from_normalized(taps: Arc<[f32]>, factor: usize) -> Self {
        Self {
            history: vec![0.0; taps.len()],
            taps,
            factor,
        }
    }

    /// Decimation factor (input samples consumed per output sample).
    pub fn factor(&self) -> usize {
        self.factor
    }

    /// Number of filter taps.
    pub fn num_taps(&self) -> usize {
        self.taps.len()
    }

    /// Normalized coefficients.
    pub fn taps(&self) -> &[f32] {
        &self.taps
    }

    /// Consumes exactly `factor` new samples and returns one filtered sample.
    ///
    /// `input` must hold exactly [`factor()`](Self::factor) samples.
    pub fn downsample(&mut self, input: &[f32]) -> f32 {
        debug_assert_eq!(input.len(), self.factor);

        let n = self.history.len();
        self.history.copy_within(self.factor.., 0);
        self.history[n - self.factor..].copy_from_slice(input);

        self.history
            .iter()
            .zip(self.taps.iter())
            .map(|(&x, &h)| x * h)
            .sum()
    }

    /// Zeroes the filter history.
    pub fn reset(&mut self) {
        self.history.fill(0.0);
    }
}
