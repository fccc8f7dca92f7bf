//! The shutdown button. Its task runs on an interrupt executor so it gets to run while the control loop blocks.

use defmt::info;
use embassy_stm32::exti::ExtiInput;
use pi_ano_lib::io::ShutdownFlag;

/// Observed by the control loop once per scan.
pub static SHUTDOWN: ShutdownFlag = ShutdownFlag::new();

/// Requests shutdown the first time the button is pressed.
#[embassy_executor::task]
pub async fn shutdown_button_task(mut button: ExtiInput<'static>, shutdown: &'static ShutdownFlag) {
    button.wait_for_rising_edge().await;
    info!("Shutdown button pressed");
    shutdown.request();
}
