//! FEM Node Main Application
//!
//! Entry point for the nRF52840-based front-end module node firmware.
//! Initializes hardware and spawns async tasks.

#![no_std]
#![no_main]

use defmt::info;
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Level, Output, OutputDrive};
use embassy_time::Timer;
use {defmt_rtt as _, panic_probe as _};

use fem_control::prelude::*;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("FEM Node Firmware v{}", env!("CARGO_PKG_VERSION"));

    // Initialize nRF52840 peripherals with default clock configuration
    let config = embassy_nrf::config::Config::default();
    let p = embassy_nrf::init(config);

    info!("Peripherals initialized");

    // Status LED (LED1 on the nRF52840-DK)
    let led = Output::new(p.P0_13, Level::High, OutputDrive::Standard);

    // Spawn background tasks
    spawner.spawn(heartbeat_task(led)).unwrap();
    // spawner.spawn(fem_supervisor_task()).unwrap();
    // spawner.spawn(radio_schedule_task()).unwrap();

    info!("Tasks spawned, entering main loop");

    // Main loop - additional coordination can happen here
    loop {
        Timer::after(Duration::from_secs(10)).await;
        info!("Main loop tick");
    }
}

/// Heartbeat task - blinks LED to show system is running
#[embassy_executor::task]
async fn heartbeat_task(mut led: Output<'static>) {
    loop {
        led.set_low();
        Timer::after(Duration::from_millis(100)).await;
        led.set_high();
        Timer::after(Duration::from_millis(900)).await;
    }
}
