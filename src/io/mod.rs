// Purpose - output devices and note/pitch conversion

pub mod converter;
pub mod cpal_device;
pub mod device;

pub use cpal_device::{CpalDevice, CpalProvider};
pub use device::{DeviceProvider, DeviceState, OfflineDevice, OfflineProvider, OutputDevice};
