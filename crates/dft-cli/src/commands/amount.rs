use crate::print_info;
use colored::*;
use dft_core::amount;
use dft_core::{DecimalConverter, FeeSchedule};

pub fn to_origin(human: &str, decimals: u8) -> Result<(), Box<dyn std::error::Error>> {
    let origin = amount::to_origin(human, decimals)?;
    println!("{}", origin.0);
    Ok(())
}

pub fn to_human(origin: &str, decimals: u8) -> Result<(), Box<dyn std::error::Error>> {
    // An origin amount is a human amount at zero decimals.
    let origin = amount::to_origin(origin, 0)?;
    println!("{}", amount::to_human(&origin, decimals));
    Ok(())
}

pub fn fee(
    value: &str,
    decimals: u8,
    minimum: &str,
    rate: &str,
    rate_decimals: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let schedule =
        FeeSchedule::from_human(minimum, rate, decimals, rate_decimals, &DecimalConverter)
            .map_err(|e| format!("{}: {}", e.field(), e.into_inner()))?;
    let value = amount::to_origin(value, decimals)?;
    let charged = schedule.transfer_fee(&value);

    if schedule.is_free() {
        print_info("Fee schedule is free");
    }
    println!(
        "{} {} ({} origin)",
        "Fee:".bold(),
        amount::to_human(&charged, decimals).cyan(),
        charged.0
    );
    println!(
        "{} {} rate={} rate_decimals={}",
        "Schedule:".bold(),
        format!("minimum={}", schedule.minimum.0).dimmed(),
        schedule.rate.0,
        schedule.rate_decimals
    );
    Ok(())
}
