pub mod acquisition;
pub mod capture;
pub mod tracer;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub type Real = f64;
pub type Channel = u32;
pub type RunNumber = u32;

/// The kind of source driving a channel's detector.
/// Long decay-constant sources (e.g. slow scintillators) need a much wider integration window.
#[derive(
    Default, Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SourceKind {
    #[default]
    Generic,
    LongDecay,
}
