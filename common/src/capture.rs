//! Capture files: the waveforms recorded on each channel of one acquisition run.
use crate::{Channel, Real, RunNumber, SourceKind, acquisition::ScopeSetting};
use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("IO Error: {0}")]
    IO(#[from] std::io::Error),
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Array Shape Error: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("Channel {channel}: time axis increment {increment} is not positive")]
    NonPositiveIncrement { channel: Channel, increment: Real },
    #[error("Channel {0}: time axis has no samples")]
    EmptyTimeAxis(Channel),
    #[error("Channel {channel}: event {event} has {found} samples, expected {expected}")]
    SampleCountMismatch {
        channel: Channel,
        event: usize,
        expected: usize,
        found: usize,
    },
    #[error("Waveforms have {samples} samples per event but the time axis has {axis} values")]
    AxisLengthMismatch { samples: usize, axis: usize },
}

/// Describes a regularly sampled time axis, in nanoseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TimeAxisDescriptor {
    pub origin: Real,
    pub increment: Real,
    pub samples: usize,
}

impl TimeAxisDescriptor {
    pub fn values(&self) -> Vec<Real> {
        (0..self.samples)
            .map(|i| self.origin + i as Real * self.increment)
            .collect()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChannelCapture {
    pub channel: Channel,
    #[serde(default)]
    pub source: SourceKind,
    pub time_axis: TimeAxisDescriptor,
    /// One row of voltages per acquisition event.
    pub waveforms: Vec<Vec<Real>>,
}

impl ChannelCapture {
    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.time_axis.increment <= 0.0 {
            return Err(CaptureError::NonPositiveIncrement {
                channel: self.channel,
                increment: self.time_axis.increment,
            });
        }
        if self.time_axis.samples == 0 {
            return Err(CaptureError::EmptyTimeAxis(self.channel));
        }
        if let Some((event, waveform)) = self
            .waveforms
            .iter()
            .enumerate()
            .find(|(_, waveform)| waveform.len() != self.time_axis.samples)
        {
            return Err(CaptureError::SampleCountMismatch {
                channel: self.channel,
                event,
                expected: self.time_axis.samples,
                found: waveform.len(),
            });
        }
        Ok(())
    }

    pub fn waveform_set(&self) -> Result<WaveformSet, CaptureError> {
        self.validate()?;
        let samples = Array2::from_shape_vec(
            (self.waveforms.len(), self.time_axis.samples),
            self.waveforms.iter().flatten().copied().collect(),
        )?;
        WaveformSet::try_new(samples, self.time_axis.values())
    }
}

/// A set of waveforms sharing one time axis.
/// The number of columns of `samples` always equals the length of `time`.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveformSet {
    samples: Array2<Real>,
    time: Vec<Real>,
}

impl WaveformSet {
    pub fn try_new(samples: Array2<Real>, time: Vec<Real>) -> Result<Self, CaptureError> {
        if samples.ncols() != time.len() {
            return Err(CaptureError::AxisLengthMismatch {
                samples: samples.ncols(),
                axis: time.len(),
            });
        }
        Ok(Self { samples, time })
    }

    pub fn samples(&self) -> ArrayView2<'_, Real> {
        self.samples.view()
    }

    pub fn time(&self) -> &[Real] {
        &self.time
    }

    pub fn num_events(&self) -> usize {
        self.samples.nrows()
    }

    /// Returns a new set in which each event has its own offset subtracted from every sample.
    /// `offsets` must have one entry per event.
    pub fn offset_events(&self, offsets: &Array1<Real>) -> Self {
        Self {
            samples: &self.samples - &offsets.view().insert_axis(Axis(1)),
            time: self.time.clone(),
        }
    }
}

/// The contents of one capture file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CaptureFile {
    pub run_number: RunNumber,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    /// The instrument commands used to acquire the capture, in the order they were sent.
    #[serde(default)]
    pub settings: Vec<ScopeSetting>,
    pub channels: Vec<ChannelCapture>,
}

impl CaptureFile {
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, CaptureError> {
        let file = File::open(path)?;
        let capture: Self = serde_json::from_reader(BufReader::new(file))?;
        for channel in &capture.channels {
            channel.validate()?;
        }
        tracing::debug!("Loaded {} channels", capture.channels.len());
        Ok(capture)
    }

    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn save(&self, path: &Path) -> Result<(), CaptureError> {
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }
}
