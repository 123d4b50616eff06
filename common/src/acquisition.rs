//! The oscilloscope configuration used to acquire a capture.
//!
//! Settings are held as a typed record and rendered to an ordered list of [ScopeSetting]
//! commands. Communicating with the instrument is not handled here; the command list is
//! attached to capture files as provenance.
use crate::{Channel, Real};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result};

/// Where the trigger is taken from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerSource {
    Channel(Channel),
    Aux,
}

impl Display for TriggerSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            TriggerSource::Channel(channel) => write!(f, "CHANnel{channel}"),
            TriggerSource::Aux => write!(f, "AUX"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerSlope {
    #[strum(to_string = "POSitive")]
    Positive,
    #[default]
    #[strum(to_string = "NEGative")]
    Negative,
    #[strum(to_string = "EITHer")]
    Either,
}

/// A single instrument command. `Display` yields the command text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "command")]
pub enum ScopeSetting {
    Stop,
    TimebaseRange {
        seconds: Real,
    },
    TimebaseReferencePercent {
        percent: u8,
    },
    TimebasePosition {
        seconds: Real,
    },
    SampleRateAuto,
    SegmentedMode,
    SegmentCount {
        count: usize,
    },
    PointsAuto,
    Interpolation {
        enabled: bool,
    },
    Bandwidth {
        hertz: Real,
    },
    ChannelScale {
        channel: Channel,
        volts_per_division: Real,
    },
    ChannelOffset {
        channel: Channel,
        volts: Real,
    },
    TriggerEdgeSource {
        source: TriggerSource,
    },
    TriggerLevel {
        source: TriggerSource,
        volts: Real,
    },
    TriggerEdgeSlope {
        slope: TriggerSlope,
    },
}

impl Display for ScopeSetting {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ScopeSetting::Stop => write!(f, ":STOP"),
            ScopeSetting::TimebaseRange { seconds } => write!(f, ":TIMebase:RANGe {seconds:e}"),
            ScopeSetting::TimebaseReferencePercent { percent } => {
                write!(f, ":TIMebase:REFerence:PERCent {percent}")
            }
            ScopeSetting::TimebasePosition { seconds } => {
                write!(f, ":TIMebase:POSition {seconds:e}")
            }
            ScopeSetting::SampleRateAuto => write!(f, ":ACQuire:SRATe:ANALog:AUTO ON"),
            ScopeSetting::SegmentedMode => write!(f, ":ACQuire:MODE SEGMented"),
            ScopeSetting::SegmentCount { count } => write!(f, ":ACQuire:SEGMented:COUNt {count}"),
            ScopeSetting::PointsAuto => write!(f, ":ACQuire:POINts:ANALog AUTO"),
            ScopeSetting::Interpolation { enabled } => {
                write!(f, ":ACQuire:INTerpolate {}", u8::from(*enabled))
            }
            ScopeSetting::Bandwidth { hertz } => write!(f, ":ACQuire:BANDwidth {hertz:e}"),
            ScopeSetting::ChannelScale {
                channel,
                volts_per_division,
            } => write!(f, ":CHANnel{channel}:SCALe {volts_per_division}"),
            ScopeSetting::ChannelOffset { channel, volts } => {
                write!(f, ":CHANnel{channel}:OFFSet {volts}")
            }
            ScopeSetting::TriggerEdgeSource { source } => {
                write!(f, ":TRIGger:MODE EDGE;:TRIGger:EDGE:SOURce {source}")
            }
            ScopeSetting::TriggerLevel { source, volts } => {
                write!(f, ":TRIGger:LEVel {source},{volts}")
            }
            ScopeSetting::TriggerEdgeSlope { slope } => write!(f, ":TRIGger:EDGE:SLOPe {slope}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VerticalSettings {
    pub channel: Channel,
    pub volts_per_division: Real,
    pub offset: Real,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TriggerSettings {
    pub source: TriggerSource,
    pub level: Real,
    pub slope: TriggerSlope,
}

/// Horizontal, vertical and trigger setup for a segmented acquisition.
/// Times are in seconds, as the instrument expects them.
#[derive(Clone, Debug, PartialEq)]
pub struct AcquisitionSettings {
    pub horizontal_range: Real,
    pub reference_percent: u8,
    pub time_offset: Real,
    pub segments: usize,
    pub bandwidth: Real,
    pub vertical: Vec<VerticalSettings>,
    pub trigger: TriggerSettings,
}

impl Default for AcquisitionSettings {
    fn default() -> Self {
        Self {
            horizontal_range: 1e-6,
            reference_percent: 70,
            time_offset: -53e-9,
            segments: 1000,
            bandwidth: 5e10,
            vertical: vec![VerticalSettings {
                channel: 1,
                volts_per_division: 0.005,
                offset: 0.016,
            }],
            trigger: TriggerSettings {
                source: TriggerSource::Channel(1),
                level: -0.0023,
                slope: TriggerSlope::Negative,
            },
        }
    }
}

impl AcquisitionSettings {
    /// The commands to send, in order, to put the instrument in this configuration.
    pub fn commands(&self) -> Vec<ScopeSetting> {
        let horizontal = [
            ScopeSetting::Stop,
            ScopeSetting::TimebaseRange {
                seconds: self.horizontal_range,
            },
            ScopeSetting::TimebaseReferencePercent {
                percent: self.reference_percent,
            },
            ScopeSetting::SampleRateAuto,
            ScopeSetting::TimebasePosition {
                seconds: self.time_offset,
            },
            ScopeSetting::SegmentedMode,
            ScopeSetting::SegmentCount {
                count: self.segments,
            },
            ScopeSetting::PointsAuto,
            ScopeSetting::Interpolation { enabled: false },
            ScopeSetting::Bandwidth {
                hertz: self.bandwidth,
            },
        ];
        let vertical = self.vertical.iter().flat_map(|vertical| {
            [
                ScopeSetting::ChannelScale {
                    channel: vertical.channel,
                    volts_per_division: vertical.volts_per_division,
                },
                ScopeSetting::ChannelOffset {
                    channel: vertical.channel,
                    volts: vertical.offset,
                },
            ]
        });
        let trigger = [
            ScopeSetting::TriggerEdgeSource {
                source: self.trigger.source,
            },
            ScopeSetting::TriggerLevel {
                source: self.trigger.source,
                volts: self.trigger.level,
            },
            ScopeSetting::TriggerEdgeSlope {
                slope: self.trigger.slope,
            },
        ];
        horizontal.into_iter().chain(vertical).chain(trigger).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_level_carries_its_source() {
        let setting = ScopeSetting::TriggerLevel {
            source: TriggerSource::Channel(3),
            volts: -0.05,
        };
        assert_eq!(setting.to_string(), ":TRIGger:LEVel CHANnel3,-0.05");

        let setting = ScopeSetting::TriggerLevel {
            source: TriggerSource::Aux,
            volts: 0.1,
        };
        assert_eq!(setting.to_string(), ":TRIGger:LEVel AUX,0.1");
    }

    #[test]
    fn default_commands_are_ordered() {
        let commands = AcquisitionSettings::default().commands();

        assert_eq!(commands.len(), 15);
        assert_eq!(commands.first(), Some(&ScopeSetting::Stop));
        assert_eq!(
            commands.get(6),
            Some(&ScopeSetting::SegmentCount { count: 1000 })
        );
        assert_eq!(
            commands.last(),
            Some(&ScopeSetting::TriggerEdgeSlope {
                slope: TriggerSlope::Negative
            })
        );
        let text: Vec<_> = commands.iter().map(ToString::to_string).collect();
        assert!(text.contains(&":CHANnel1:SCALe 0.005".to_owned()));
        assert!(text.contains(&":TRIGger:EDGE:SLOPe NEGative".to_owned()));
    }

    #[test]
    fn one_scale_and_offset_per_channel() {
        let settings = AcquisitionSettings {
            vertical: (1..=4)
                .map(|channel| VerticalSettings {
                    channel,
                    volts_per_division: 0.02,
                    offset: 0.0,
                })
                .collect(),
            ..Default::default()
        };
        let scales = settings
            .commands()
            .into_iter()
            .filter(|command| matches!(command, ScopeSetting::ChannelScale { .. }))
            .count();
        assert_eq!(scales, 4);
    }

    #[test]
    fn settings_survive_serialization() {
        let commands = AcquisitionSettings::default().commands();
        let json = serde_json::to_string(&commands).unwrap();
        assert!(json.contains(r#""command":"trigger-level""#));
        let decoded: Vec<ScopeSetting> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, commands);
    }
}
