use crate::{
    channels::{ChannelCharges, extract_channel_charges},
    extraction::{SaveToFileFilter, save_to_file::get_save_file_name},
    parameters::ExtractionParameters,
};
use rayon::prelude::*;
use scope_charge_common::{
    Channel, RunNumber,
    capture::{CaptureError, CaptureFile},
};
use serde::Serialize;
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};
use tracing::info;

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct ExtractionReport {
    pub(crate) run_number: RunNumber,
    pub(crate) channels: Vec<ChannelCharges>,
}

/// Extracts charges from each requested channel of a capture. Channels are processed in
/// parallel and reported in capture order. An empty `channels` list selects every channel.
#[tracing::instrument(skip_all, fields(run_number = capture.run_number, num_channels))]
pub(crate) fn process(
    capture: &CaptureFile,
    parameters: &ExtractionParameters,
    channels: &[Channel],
) -> Result<ExtractionReport, CaptureError> {
    let selected: Vec<_> = capture
        .channels
        .iter()
        .filter(|channel| channels.is_empty() || channels.contains(&channel.channel))
        .collect();
    tracing::Span::current().record("num_channels", selected.len());

    let channels = selected
        .par_iter()
        .map(|channel| extract_channel_charges(channel, parameters))
        .collect::<Result<Vec<_>, _>>()?;

    for channel in &channels {
        info!(
            "Channel {}: {} events, {} pulsed, window {:?}",
            channel.channel, channel.num_events, channel.num_pulsed, channel.window_span
        );
    }
    Ok(ExtractionReport {
        run_number: capture.run_number,
        channels,
    })
}

/// Writes the report as JSON to `path`, or to stdout if no path is given.
pub(crate) fn write_report(report: &ExtractionReport, path: Option<&Path>) -> io::Result<()> {
    let mut writer: Box<dyn Write> = match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    writer.flush()
}

/// Saves each channel's charges, and histogram if there is one, as csv files.
pub(crate) fn save_report(report: &ExtractionReport, save_path: &Path) -> io::Result<()> {
    for channel in &report.channels {
        channel
            .charges
            .iter()
            .enumerate()
            .save_to_file(&get_save_file_name(
                save_path,
                report.run_number,
                channel.channel,
                "charges",
            ))?;

        if let Some(histogram) = &channel.histogram {
            channel
                .bins
                .edges()
                .iter()
                .zip(histogram)
                .save_to_file(&get_save_file_name(
                    save_path,
                    report.run_number,
                    channel.channel,
                    "histogram",
                ))?;
        }
    }
    Ok(())
}
