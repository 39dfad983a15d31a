//! ESP-IDF UART adapter for the pulse-train command link.
//!
//! Wraps an [`UartDriver`] behind [`SerialPort`].  Reads never block, the
//! domain polls.  Target-only; host tests use a scripted mock.

use esp_idf_hal::delay::NON_BLOCK;
use esp_idf_hal::uart::UartDriver;

use crate::app::ports::SerialPort;
use crate::error::{Result, SerialError};

pub struct UartLink<'d> {
    uart: UartDriver<'d>,
}

impl<'d> UartLink<'d> {
    pub fn new(uart: UartDriver<'d>) -> Self {
        Self { uart }
    }
}

impl SerialPort for UartLink<'_> {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.uart.read(&mut buf, NON_BLOCK) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) => {
                log::error!("UART read failed: {:?}", e);
                Err(SerialError::ReadFailed.into())
            }
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let mut sent = 0;
        while sent < bytes.len() {
            match self.uart.write(&bytes[sent..]) {
                Ok(n) => sent += n,
                Err(e) => {
                    log::error!("UART write failed: {:?}", e);
                    return Err(SerialError::WriteFailed.into());
                }
            }
        }
        Ok(())
    }
}
