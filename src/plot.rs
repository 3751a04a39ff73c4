//! Plot-ready series. Rendering is left to the consumer.

use serde::Serialize;
use std::ops::Range;

/// Min/max envelope of a series, one entry per bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlotSeries {
    pub x: Vec<f64>,
    pub min: Vec<f64>,
    pub max: Vec<f64>,
}

impl PlotSeries {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Rescale the x axis, e.g. from sample index to seconds.
    pub fn scale_x(mut self, factor: f64) -> Self {
        for x in &mut self.x {
            *x *= factor;
        }
        self
    }
}

/// Reduce `data[range]` to at most `target_points` min/max buckets.
///
/// `x` holds the absolute index at the middle of each bucket. A range that
/// already fits is returned point by point.
pub fn downsample(data: &[f64], target_points: usize, range: Option<Range<usize>>) -> PlotSeries {
    let range = range.unwrap_or(0..data.len());
    let end = range.end.min(data.len());
    let start = range.start.min(end);
    let span = end - start;

    if span == 0 || target_points == 0 {
        return PlotSeries::default();
    }

    if span <= target_points {
        let values = data[start..end].to_vec();
        return PlotSeries {
            x: (start..end).map(|i| i as f64).collect(),
            min: values.clone(),
            max: values,
        };
    }

    let step = span as f64 / target_points as f64;
    let mut series = PlotSeries {
        x: Vec::with_capacity(target_points),
        min: Vec::with_capacity(target_points),
        max: Vec::with_capacity(target_points),
    };

    for i in 0..target_points {
        let lo = start + (i as f64 * step).floor() as usize;
        let hi = (start + ((i + 1) as f64 * step).floor() as usize).min(end);
        // step > 1 here, so every bucket holds at least one value
        let bucket = &data[lo..hi.max(lo + 1)];

        let (min, max) = bucket
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
                (min.min(v), max.max(v))
            });

        series.x.push(((lo + hi - 1) / 2) as f64);
        series.min.push(min);
        series.max.push(max);
    }

    series
}

/// Series handed to a renderer: the mono waveform and the smoothed flux
/// curve, both on a seconds axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlotReport {
    pub waveform: PlotSeries,
    pub flux: PlotSeries,
}

impl PlotReport {
    pub fn build(
        mono: &[f64],
        sample_rate: u32,
        flux: &[f64],
        hop_size: usize,
        target_points: usize,
    ) -> Self {
        let seconds_per_sample = 1.0 / sample_rate as f64;
        Self {
            waveform: downsample(mono, target_points, None).scale_x(seconds_per_sample),
            flux: downsample(flux, target_points, None)
                .scale_x(hop_size as f64 * seconds_per_sample),
        }
    }
}
