//! Host-side integration tests for the software UART transmitter

#[cfg(test)]
mod frame_tests;
#[cfg(test)]
mod pin_tests;
#[cfg(test)]
mod shared_tests;
