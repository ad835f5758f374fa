use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Error;
use crate::thumbnail::{Channel, Thumbnail};

const INSTRUMENT_TYPE: &str = "TektronixMSO5204B";
const DUT: &str = "I2C board";
const CONFIG_NAME: &str = "I2C Capture";

/// Document uploaded to the results platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultData {
    /// Search index fields, passed through as-is.
    pub fields: Vec<Value>,
    pub result: ResultBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultBody {
    pub instrument_type: String,
    pub info: ResultInfo,
    pub dut: String,
    pub config: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultInfo {
    pub instrument_type: String,
    pub timebase_scale: f64,
    pub v_divs: u32,
    pub h_divs: u32,
    pub slice_length: u64,
    pub num_of_slices: u64,
    pub timebase_position: i64,
    pub total_points: u64,
    pub channels: Vec<ChannelInfo>,
    pub config_excerpt: ConfigExcerpt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub scale: i64,
    pub name: String,
    pub trigger_level: f64,
    pub offset: i64,
    pub time_step: f64,
    pub coupling: String,
    pub y_values: Vec<f64>,
    pub waveform_measurements_valid: bool,
    pub waveform_measurements: Vec<Measurement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub units: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ivi_name: Option<String>,
    pub display_name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigExcerpt {
    pub trigger_edge_slope: String,
    pub trigger: Trigger,
    pub acquisition: Acquisition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub source: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub coupling: String,
    pub level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Acquisition {
    pub record_length: u64,
    pub start_time: f64,
    pub number_of_envelopes: u64,
    pub sample_rate: f64,
    pub time_per_record: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub number_of_averages: u64,
}

// (units, ivi name, display name, value)
const SAMPLE_MEASUREMENTS: &[(&str, Option<&str>, &str, f64)] = &[
    ("s", None, "Rise Time", 9.73639807316e-09),
    ("s", None, "Rise Time", 3.142857043339e-08),
    ("s", None, "Fall Time", 9.524999655783e-08),
    ("Hz", None, "Frequency", 82545.39996998),
    ("s", None, "Period", 1.211454545455e-05),
    ("V", None, "Voltage RMS", 2.33134970739),
    ("s", None, "Voltage Peak to Peak", 1.36),
    ("V", Some("voltage_max"), "Voltage Max", 2.84),
    ("V", None, "Voltage Min", 1.48),
    ("V", None, "Voltage High", 2.52),
    ("V", None, "Voltage Low", 1.64),
    ("V", None, "Voltage Average", 2.29713713714),
    ("s", None, "Width Negative", 1.010107142857e-05),
    ("s", None, "Width Positive", 2.01347402597e-06),
    ("s", None, "Duty Cycle Negative", 83.37969811968),
    ("s", None, "Duty Cycle Positive", 16.62030188032),
    ("V", None, "Amplititude", 0.88),
    ("V", None, "Voltage Cycle RMS", 1.82686084344),
    ("V", None, "Voltage Cycle Average", 1.8030421732),
    ("V", None, "Overshoot Negative", 18.18181818182),
    ("V", None, "Overshoot Positive", 36.36363636364),
];

impl ResultInfo {
    /// Sample capture of an I2C bus on a Tektronix MSO5204B. Channel `ch1`
    /// carries the waveform of the first entry in `channels`.
    pub fn sample(channels: &[Channel]) -> Result<Self, Error> {
        let ch1 = channels.first().ok_or(Error::NoChannels)?;

        let waveform_measurements = SAMPLE_MEASUREMENTS
            .iter()
            .map(|&(units, ivi_name, display_name, value)| Measurement {
                units: units.to_string(),
                ivi_name: ivi_name.map(str::to_string),
                display_name: display_name.to_string(),
                value,
            })
            .collect();

        Ok(ResultInfo {
            instrument_type: INSTRUMENT_TYPE.to_string(),
            timebase_scale: 5e-06,
            v_divs: 10,
            h_divs: 10,
            slice_length: 1000,
            num_of_slices: 1,
            timebase_position: 0,
            total_points: 1000,
            channels: vec![ChannelInfo {
                scale: 2,
                name: "ch1".to_string(),
                trigger_level: 2.64,
                offset: -5,
                time_step: ch1.time_step,
                coupling: "dc".to_string(),
                y_values: ch1.y_values.clone(),
                waveform_measurements_valid: true,
                waveform_measurements,
            }],
            config_excerpt: ConfigExcerpt {
                trigger_edge_slope: "positive".to_string(),
                trigger: Trigger {
                    source: "ch1".to_string(),
                    kind: "edge".to_string(),
                    coupling: "dc".to_string(),
                    level: 2.64,
                },
                acquisition: Acquisition {
                    record_length: 1000,
                    start_time: -2.5e-05,
                    number_of_envelopes: 0,
                    sample_rate: 20000000.0,
                    time_per_record: 5e-05,
                    kind: "normal".to_string(),
                    number_of_averages: 16,
                },
            },
        })
    }
}

/// Search index fields that go with the sample capture.
pub fn sample_fields() -> Vec<Value> {
    vec![
        json!({"type": "text", "name": "config_name", "value": CONFIG_NAME}),
        json!({"type": "text", "name": "hardware_name", "value": "SF2"}),
        json!({"type": "text", "name": "instrument_type", "value": "MSO5204B"}),
        json!({"type": "text", "name": "start_datetime", "value": "2017-08-03 09:32:07.624304"}),
        json!({"type": "number", "name": "record_length", "value": 1000}),
        json!({"type": "text", "name": "acquisition_type", "value": "normal"}),
        json!({"type": "text", "name": "trigger_source", "value": "ch1"}),
        json!({"type": "text", "name": "trigger_type", "value": "edge"}),
        json!({"type": "number", "name": "trigger_level", "value": 2.65}),
        json!({"type": "text", "name": "ch1_enabled", "value": true}),
        json!({"type": "text", "name": "ch2_enabled", "value": false}),
        json!({"type": "text", "name": "dut", "value": DUT}),
        json!({"type": "number", "name": "john_fav_meas", "value": 49.9}),
    ]
}

/// Optional field carrying a precomputed thumbnail. Without it the server
/// builds its own preview from the result data.
pub fn thumbnail_field(thumbnail: &Thumbnail) -> Result<Value, Error> {
    Ok(json!({
        "type": "text",
        "name": "thumbnail_json",
        "value": serde_json::to_value(thumbnail)?,
    }))
}

impl ResultData {
    pub fn sample(channels: &[Channel], thumbnail: Option<&Thumbnail>) -> Result<Self, Error> {
        let mut fields = sample_fields();
        if let Some(thumbnail) = thumbnail {
            fields.push(thumbnail_field(thumbnail)?);
        }

        Ok(ResultData {
            fields,
            result: ResultBody {
                instrument_type: INSTRUMENT_TYPE.to_string(),
                info: ResultInfo::sample(channels)?,
                dut: DUT.to_string(),
                config: CONFIG_NAME.to_string(),
            },
        })
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shrink::Shrinker;

    fn channels() -> Vec<Channel> {
        vec![
            Channel {
                time_step: 5e-8,
                y_values: vec![1.28, 1.36, 1.28, 1.36, 1.44, 1.44, 1.36],
            },
            Channel {
                time_step: 5e-8,
                y_values: vec![2.28, 2.36, 2.28, 2.36, 2.44, 2.44, 2.36],
            },
        ]
    }

    #[test]
    fn info_takes_first_channel_waveform() {
        let info = ResultInfo::sample(&channels()).unwrap();
        assert_eq!(info.channels.len(), 1);
        assert_eq!(info.channels[0].name, "ch1");
        assert_eq!(info.channels[0].time_step, 5e-8);
        assert_eq!(info.channels[0].y_values[0], 1.28);
        assert_eq!(info.channels[0].waveform_measurements.len(), 21);
    }

    #[test]
    fn info_requires_a_channel() {
        assert!(matches!(ResultInfo::sample(&[]), Err(Error::NoChannels)));
    }

    #[test]
    fn serialized_shape() {
        let data = ResultData::sample(&channels(), None).unwrap();
        let v = serde_json::to_value(&data).unwrap();

        assert_eq!(v["fields"].as_array().unwrap().len(), 13);
        assert_eq!(v["result"]["config"], "I2C Capture");
        assert_eq!(v["result"]["info"]["config_excerpt"]["trigger"]["type"], "edge");
        assert_eq!(
            v["result"]["info"]["config_excerpt"]["acquisition"]["type"],
            "normal"
        );

        let info = &v["result"]["info"];
        assert_eq!(info["timebase_position"].to_string(), "0");
        assert_eq!(info["channels"][0]["scale"].to_string(), "2");
        assert_eq!(info["channels"][0]["offset"].to_string(), "-5");
        assert_eq!(info["config_excerpt"]["trigger"]["level"].to_string(), "2.64");

        let measurements = &v["result"]["info"]["channels"][0]["waveform_measurements"];
        assert_eq!(measurements[7]["ivi_name"], "voltage_max");
        assert_eq!(measurements[6]["value"].to_string(), "1.36");
        assert!(measurements[0].get("ivi_name").is_none());
    }

    #[test]
    fn thumbnail_field_is_appended() {
        let channels = channels();
        let thumbnail = Thumbnail::from_channels(&Shrinker::default(), &channels).unwrap();
        let data = ResultData::sample(&channels, Some(&thumbnail)).unwrap();

        let last = data.fields.last().unwrap();
        assert_eq!(last["name"], "thumbnail_json");
        assert_eq!(last["value"]["channels"].as_array().unwrap().len(), 2);
        assert_eq!(last["value"]["channels"][1]["y_values"][0], 2.28);
    }
}
