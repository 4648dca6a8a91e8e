//! Conversion Pipeline Example
//!
//! Demonstrates the datapoint engine end to end:
//! 1. Built-in profile and fingerprint tables
//! 2. Inbound frame decoding and capability mapping
//! 3. Outbound capability writes
//! 4. Unmanaged-device degradation

use std::sync::Arc;

use tuyadp_core::{ConverterRegistry, DpValue};
use tuyadp_engine::{builtin_registry, ConversionPipeline};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    println!("=== Tuya Datapoint Pipeline Demo ===\n");

    let profiles = Arc::new(builtin_registry()?);
    let converters = Arc::new(ConverterRegistry::with_builtins());
    println!(
        "Loaded {} profiles, {} fingerprints, {} converters\n",
        profiles.profile_count(),
        profiles.fingerprint_count(),
        converters.names().len()
    );
    let pipeline = ConversionPipeline::new(profiles, converters);

    // === Example 1: Inbound climate sensor report ===
    println!("--- Example 1: Inbound climate sensor report ---");

    // dp1 temperature 23.5 C, dp2 humidity 55 %, dp4 battery 90 %
    let frame: Vec<u8> = [
        [0x01, 0x02, 0x00, 0x04, 0x00, 0x00, 0x00, 0xEB],
        [0x02, 0x02, 0x00, 0x04, 0x00, 0x00, 0x00, 0x37],
        [0x04, 0x02, 0x00, 0x04, 0x00, 0x00, 0x00, 0xB4],
    ]
    .concat();

    let report = pipeline.on_frame("_TZE200_cwbvmsar", &frame);
    for update in &report.updates {
        println!("  dp {:>3} -> {} = {}", update.dp, update.capability, update.value);
    }
    println!();

    // === Example 2: Outbound capability writes ===
    println!("--- Example 2: Outbound capability writes ---");

    let bytes = pipeline.write("_TZE200_fctwhugx", "windowcoverings_state", &"close".into())?;
    println!("  close curtain      -> {:02x?}", bytes);

    let bytes = pipeline.write("_TZE200_ckud7u2l", "target_temperature", &DpValue::Number(21.5))?;
    println!("  setpoint 21.5 C    -> {:02x?}", bytes);
    println!();

    // === Example 3: Unmanaged device ===
    println!("--- Example 3: Unmanaged device ---");

    let report = pipeline.on_frame("_TZWEIRD_unknown", &[0x01, 0x01, 0x00, 0x01, 0x01]);
    println!(
        "  {} updates, {} unmapped datapoints kept for discovery",
        report.updates.len(),
        report.unmapped.len()
    );
    for unmapped in &report.unmapped {
        println!("  dp {:>3} = {}", unmapped.dp, unmapped.value);
    }

    Ok(())
}
