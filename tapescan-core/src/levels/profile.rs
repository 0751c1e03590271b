//! Simplified volume profile: point of control and value area.
//!
//! The price range `[min low, max high]` is split into equal-width bins and
//! each candle's volume lands in the bin holding its typical price.

use crate::domain::Candle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileBin {
    pub lower: f64,
    pub upper: f64,
    pub volume: f64,
}

impl ProfileBin {
    pub fn center(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }
}

/// Volume per price bin, ascending by price. Empty bins are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeProfile {
    bins: Vec<ProfileBin>,
}

impl VolumeProfile {
    /// `None` for an empty window or one without finite prices.
    pub fn build(candles: &[Candle], bins: usize) -> Option<Self> {
        let min = candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
        let max = candles.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
        if !min.is_finite() || !max.is_finite() {
            return None;
        }

        let volume_of = |c: &Candle| if c.volume.is_finite() { c.volume.max(0.0) } else { 0.0 };

        if (max - min).abs() <= f64::EPSILON * max.abs().max(1.0) {
            let volume = candles.iter().map(volume_of).sum();
            return Some(Self {
                bins: vec![ProfileBin {
                    lower: min,
                    upper: max,
                    volume,
                }],
            });
        }

        let count = bins.max(1);
        let width = (max - min) / count as f64;
        let mut profile: Vec<ProfileBin> = (0..count)
            .map(|i| ProfileBin {
                lower: min + width * i as f64,
                upper: if i + 1 == count {
                    max
                } else {
                    min + width * (i + 1) as f64
                },
                volume: 0.0,
            })
            .collect();

        for c in candles {
            let tp = c.typical_price();
            if !tp.is_finite() {
                continue;
            }
            let idx = (((tp - min) / width).floor().max(0.0) as usize).min(count - 1);
            profile[idx].volume += volume_of(c);
        }

        Some(Self { bins: profile })
    }

    pub fn bins(&self) -> &[ProfileBin] {
        &self.bins
    }

    pub fn total_volume(&self) -> f64 {
        self.bins.iter().map(|b| b.volume).sum()
    }

    /// Center of the highest-volume bin. Ties go to the lower price.
    pub fn point_of_control(&self) -> Option<f64> {
        self.bins
            .iter()
            .fold(None::<&ProfileBin>, |best, b| match best {
                Some(best) if best.volume >= b.volume => Some(best),
                _ => Some(b),
            })
            .filter(|b| b.volume > 0.0)
            .map(ProfileBin::center)
    }

    /// (value area high, value area low): the price span of the
    /// highest-volume bins that together hold `fraction` of the volume.
    pub fn value_area(&self, fraction: f64) -> Option<(f64, f64)> {
        let total = self.total_volume();
        if total <= 0.0 {
            return None;
        }
        let threshold = total * fraction.clamp(0.0, 1.0);

        let mut ranked: Vec<&ProfileBin> = self.bins.iter().filter(|b| b.volume > 0.0).collect();
        ranked.sort_by(|a, b| b.volume.total_cmp(&a.volume).then(a.lower.total_cmp(&b.lower)));

        let mut accumulated = 0.0;
        let mut high = f64::NEG_INFINITY;
        let mut low = f64::INFINITY;
        for bin in ranked {
            accumulated += bin.volume;
            high = high.max(bin.upper);
            low = low.min(bin.lower);
            if accumulated >= threshold {
                break;
            }
        }
        Some((high, low))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_candles};

    fn candles_at(prices_and_volumes: &[(f64, f64)]) -> Vec<Candle> {
        let data: Vec<_> = prices_and_volumes
            .iter()
            .map(|&(p, _)| (p, p, p, p))
            .collect();
        let mut candles = make_ohlc_candles(&data);
        for (c, &(_, v)) in candles.iter_mut().zip(prices_and_volumes) {
            c.volume = v;
        }
        candles
    }

    #[test]
    fn poc_is_heaviest_bin_center() {
        // Range 100..110 in 10 bins of width 1.
        let candles = candles_at(&[(100.0, 1.0), (104.5, 10.0), (104.2, 5.0), (110.0, 2.0)]);
        let profile = VolumeProfile::build(&candles, 10).unwrap();
        assert_eq!(profile.bins().len(), 10);
        assert_approx(profile.point_of_control().unwrap(), 104.5, 1e-9);
        assert_approx(profile.total_volume(), 18.0, 1e-9);
    }

    #[test]
    fn top_of_range_lands_in_last_bin() {
        let candles = candles_at(&[(100.0, 1.0), (110.0, 3.0)]);
        let profile = VolumeProfile::build(&candles, 10).unwrap();
        assert_approx(profile.bins()[9].volume, 3.0, 1e-12);
    }

    #[test]
    fn value_area_spans_heaviest_bins() {
        let candles = candles_at(&[
            (100.0, 1.0),
            (103.5, 6.0),
            (104.5, 10.0),
            (105.5, 4.0),
            (110.0, 1.0),
        ]);
        let profile = VolumeProfile::build(&candles, 10).unwrap();
        // 70% of 22 = 15.4: bins 104 (10) + 103 (6) reach 16.
        let (vah, val) = profile.value_area(0.7).unwrap();
        assert_approx(vah, 105.0, 1e-9);
        assert_approx(val, 103.0, 1e-9);
    }

    #[test]
    fn flat_window_collapses_to_one_bin() {
        let candles = candles_at(&[(50.0, 2.0), (50.0, 3.0)]);
        let profile = VolumeProfile::build(&candles, 20).unwrap();
        assert_eq!(profile.bins().len(), 1);
        assert_approx(profile.point_of_control().unwrap(), 50.0, 1e-12);
    }

    #[test]
    fn empty_window_has_no_profile() {
        assert!(VolumeProfile::build(&[], 20).is_none());
    }
}
