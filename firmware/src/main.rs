#![no_std]
#![no_main]

#[cfg(feature = "defmt")]
use defmt_rtt as _;

// RISC-V runtime
use riscv_rt as _;

// Panic handler
#[cfg(feature = "defmt")]
use panic_probe as _;
#[cfg(not(feature = "defmt"))]
use panic_halt as _;

use embassy_executor::Spawner;
use embassy_time::Duration;

use softuart_firmware::*;

/// Main firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    #[cfg(feature = "defmt")]
    defmt::info!("Soft UART firmware starting...");

    init_hardware();

    // Line idles high before the bit timer starts ticking
    let mut line = tx_line();
    critical_section::with(|cs| ENCODER.borrow_ref(cs).init_line(&mut line)).ok();

    let tick = TICK_CONFIG;
    #[cfg(feature = "defmt")]
    defmt::info!(
        "Bit timer: {} baud, period register {}, {} us/bit",
        tick.baud(),
        tick.timer_period_register(),
        tick.bit_period().as_micros()
    );
    #[cfg(not(feature = "defmt"))]
    let _ = tick;

    unsafe { riscv::interrupt::enable() };

    spawner.must_spawn(button_task(buttons()));

    #[cfg(feature = "defmt")]
    defmt::info!("Soft UART ready: {:?}", POWER_ON_CONFIG);

    // Main supervision loop
    loop {
        embassy_time::Timer::after(Duration::from_secs(1)).await;
        #[cfg(feature = "defmt")]
        {
            let (state, config) = snapshot_shared(&ENCODER);
            defmt::trace!("Heartbeat: {:?} {:?}", state, config);
        }
    }
}
