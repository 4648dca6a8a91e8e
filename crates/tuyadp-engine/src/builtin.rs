//! Built-in profile and fingerprint tables.
//!
//! Pre-defined profiles for the common Tuya hardware families, so an
//! embedding gets useful behavior with zero configuration. External tables
//! loaded by a config collaborator use the same serde shapes and may replace
//! or extend these.
//!
//! Fingerprint manufacturer ids are the `_TZE200_xxxxxxxx` style strings the
//! device reports during join; one profile usually serves several ids
//! because vendors rebadge the same MCU firmware.

use serde_json::json;

use crate::profile::{Fingerprint, Profile};
use crate::registry::{ProfileLoadError, ProfileRegistry};

/// All built-in profiles.
pub fn builtin_profiles() -> Vec<Profile> {
    vec![
        temperature_humidity_sensor(),
        soil_sensor(),
        smart_plug(),
        switch_2gang(),
        curtain_motor(),
        motion_sensor(),
        water_leak_sensor(),
        smoke_detector(),
        thermostat_valve(),
        dimmer(),
    ]
}

/// All built-in fingerprint rows.
pub fn builtin_fingerprints() -> Vec<Fingerprint> {
    [
        ("_TZE200_cwbvmsar", "TS0601", "temperature_humidity_sensor"),
        ("_TZE200_bjawzodf", "TS0601", "temperature_humidity_sensor"),
        ("_TZE200_zl1kmjqx", "TS0601", "temperature_humidity_sensor"),
        ("_TZE200_myd45weu", "TS0601", "soil_sensor"),
        ("_TZE200_ga1maeof", "TS0601", "soil_sensor"),
        ("_TZE204_cjbofhxw", "TS0601", "smart_plug"),
        ("_TZE200_bkkmqmyo", "TS0601", "smart_plug"),
        ("_TZE200_g1ib5ldv", "TS0601", "switch_2gang"),
        ("_TZE200_wfxuhoea", "TS0601", "switch_2gang"),
        ("_TZE200_fctwhugx", "TS0601", "curtain_motor"),
        ("_TZE200_cowvfni3", "TS0601", "curtain_motor"),
        ("_TZE200_3towulqd", "TS0601", "motion_sensor"),
        ("_TZE200_qq9mpfhw", "TS0601", "water_leak_sensor"),
        ("_TZE200_ntcy3xu1", "TS0601", "smoke_detector"),
        ("_TZE200_m9skfctm", "TS0601", "smoke_detector"),
        ("_TZE200_ckud7u2l", "TS0601", "thermostat_valve"),
        ("_TZE200_c88teujp", "TS0601", "thermostat_valve"),
        ("_TZE200_dfxkcots", "TS0601", "dimmer"),
        ("_TZE200_whpb9yts", "TS0601", "dimmer"),
    ]
    .into_iter()
    .map(|(manufacturer, model, profile)| {
        Fingerprint::new(manufacturer, profile).with_model(model)
    })
    .collect()
}

/// Registry preloaded with the built-in tables.
pub fn builtin_registry() -> Result<ProfileRegistry, ProfileLoadError> {
    ProfileRegistry::load(builtin_fingerprints(), builtin_profiles())
}

/// Temperature/humidity sensor, centi-degree and centi-percent firmware.
fn temperature_humidity_sensor() -> Profile {
    serde_json::from_value(json!({
        "name": "temperature_humidity_sensor",
        "capabilities": ["temperature", "humidity", "battery"],
        "dp_mapping": {
            "temperature": {
                "dp": 1,
                "wire_type": "value",
                "converter": "temperature",
                "params": { "divisor": 10.0 }
            },
            "humidity": {
                "dp": 2,
                "wire_type": "value",
                "converter": "humidity",
                "params": { "divisor": 1.0 }
            },
            "battery": {
                "dp": 4,
                "wire_type": "value",
                "converter": "battery"
            }
        }
    }))
    .expect("invalid temperature_humidity_sensor profile")
}

/// Soil moisture probe.
fn soil_sensor() -> Profile {
    serde_json::from_value(json!({
        "name": "soil_sensor",
        "capabilities": ["moisture", "temperature", "battery"],
        "dp_mapping": {
            "moisture": {
                "dp": 3,
                "wire_type": "value",
                "converter": "percent"
            },
            "temperature": {
                "dp": 5,
                "wire_type": "value",
                "converter": "temperature",
                "params": { "divisor": 10.0 }
            },
            "battery": {
                "dp": 15,
                "wire_type": "value",
                "converter": "battery"
            }
        }
    }))
    .expect("invalid soil_sensor profile")
}

/// Plug with power monitoring: deci-watt power, milliamp current,
/// deci-volt voltage, centi-kWh energy.
fn smart_plug() -> Profile {
    serde_json::from_value(json!({
        "name": "smart_plug",
        "capabilities": ["onoff", "power", "current", "voltage", "energy"],
        "dp_mapping": {
            "onoff": {
                "dp": 1,
                "wire_type": "bool",
                "converter": "boolean"
            },
            "energy": {
                "dp": 17,
                "wire_type": "value",
                "converter": "scale",
                "params": { "divisor": 100.0, "min": 0.0 }
            },
            "current": {
                "dp": 18,
                "wire_type": "value",
                "converter": "scale",
                "params": { "divisor": 1000.0, "min": 0.0 }
            },
            "power": {
                "dp": 19,
                "wire_type": "value",
                "converter": "scale",
                "params": { "divisor": 10.0, "min": 0.0 }
            },
            "voltage": {
                "dp": 20,
                "wire_type": "value",
                "converter": "scale",
                "params": { "divisor": 10.0, "min": 0.0 }
            }
        }
    }))
    .expect("invalid smart_plug profile")
}

/// Two independent relays.
fn switch_2gang() -> Profile {
    serde_json::from_value(json!({
        "name": "switch_2gang",
        "capabilities": ["onoff", "onoff.1"],
        "dp_mapping": {
            "onoff": {
                "dp": 1,
                "wire_type": "bool",
                "converter": "boolean"
            },
            "onoff.1": {
                "dp": 2,
                "wire_type": "bool",
                "converter": "boolean"
            }
        }
    }))
    .expect("invalid switch_2gang profile")
}

/// Curtain motor: enum command channel plus a percentage position.
fn curtain_motor() -> Profile {
    serde_json::from_value(json!({
        "name": "curtain_motor",
        "capabilities": ["windowcoverings_state", "windowcoverings_set"],
        "dp_mapping": {
            "windowcoverings_state": {
                "dp": 1,
                "wire_type": "enum",
                "converter": "enum",
                "params": { "labels": ["open", "stop", "close"] }
            },
            "windowcoverings_set": {
                "dp": 2,
                "wire_type": "value",
                "converter": "cover_position",
                "params": { "invert": true }
            }
        }
    }))
    .expect("invalid curtain_motor profile")
}

/// PIR with sensitivity setting and an illuminance channel.
fn motion_sensor() -> Profile {
    serde_json::from_value(json!({
        "name": "motion_sensor",
        "capabilities": ["alarm_motion", "battery", "sensitivity", "illuminance"],
        "dp_mapping": {
            "alarm_motion": {
                "dp": 1,
                "wire_type": "bool",
                "converter": "boolean"
            },
            "battery": {
                "dp": 4,
                "wire_type": "value",
                "converter": "battery"
            },
            "sensitivity": {
                "dp": 9,
                "wire_type": "enum",
                "converter": "enum",
                "params": { "labels": ["low", "medium", "high"] }
            },
            "illuminance": {
                "dp": 12,
                "wire_type": "value",
                "converter": "illuminance"
            }
        }
    }))
    .expect("invalid motion_sensor profile")
}

fn water_leak_sensor() -> Profile {
    serde_json::from_value(json!({
        "name": "water_leak_sensor",
        "capabilities": ["alarm_water", "battery"],
        "dp_mapping": {
            "alarm_water": {
                "dp": 1,
                "wire_type": "bool",
                "converter": "boolean"
            },
            "battery": {
                "dp": 4,
                "wire_type": "value",
                "converter": "battery"
            }
        }
    }))
    .expect("invalid water_leak_sensor profile")
}

/// Smoke detector. The battery datapoint feeds both a percentage and a
/// low-battery flag; the percentage is declared first so it wins the
/// reverse lookup on inbound reports.
fn smoke_detector() -> Profile {
    serde_json::from_value(json!({
        "name": "smoke_detector",
        "capabilities": ["alarm_smoke", "battery", "battery_low", "alarm_tamper"],
        "dp_mapping": {
            "alarm_smoke": {
                "dp": 1,
                "wire_type": "bool",
                "converter": "boolean"
            },
            "battery": {
                "dp": 15,
                "wire_type": "value",
                "converter": "battery"
            },
            "battery_low": {
                "dp": 15,
                "wire_type": "value",
                "converter": "identity"
            },
            "alarm_tamper": {
                "dp": 4,
                "wire_type": "bool",
                "converter": "boolean"
            }
        }
    }))
    .expect("invalid smoke_detector profile")
}

/// Radiator valve: deci-degree temperatures, writable setpoint and mode.
fn thermostat_valve() -> Profile {
    serde_json::from_value(json!({
        "name": "thermostat_valve",
        "capabilities": ["target_temperature", "temperature", "mode", "battery_low"],
        "dp_mapping": {
            "target_temperature": {
                "dp": 2,
                "wire_type": "value",
                "converter": "scale",
                "params": { "divisor": 10.0, "min": 5.0, "max": 35.0 }
            },
            "temperature": {
                "dp": 3,
                "wire_type": "value",
                "converter": "temperature",
                "params": { "divisor": 10.0 }
            },
            "mode": {
                "dp": 4,
                "wire_type": "enum",
                "converter": "enum",
                "params": { "labels": ["auto", "manual", "off"] }
            },
            "battery_low": {
                "dp": 35,
                "wire_type": "bool",
                "converter": "boolean"
            }
        }
    }))
    .expect("invalid thermostat_valve profile")
}

/// Single-channel dimmer: brightness carried as 10-1000 on the wire.
fn dimmer() -> Profile {
    serde_json::from_value(json!({
        "name": "dimmer",
        "capabilities": ["onoff", "dim"],
        "dp_mapping": {
            "onoff": {
                "dp": 1,
                "wire_type": "bool",
                "converter": "boolean"
            },
            "dim": {
                "dp": 2,
                "wire_type": "value",
                "converter": "percent",
                "params": { "divisor": 10.0, "min": 1.0, "max": 100.0 }
            }
        }
    }))
    .expect("invalid dimmer profile")
}
