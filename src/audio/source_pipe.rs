//! System audio capture.
//!
//! Keeps a rolling window of the newest mono samples from a cpal input
//! stream. Capture problems degrade to silence instead of stopping the
//! show: with no stream the buffer stays zeroed and the volume probe
//! reports no signal.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use log::{error, info, warn};
use std::sync::{Arc, Mutex};

use super::BUFFER_SIZE;
use crate::utils::Config;

pub struct DeviceInfo {
    pub device: Device,
    pub name: String,
    pub is_input: bool,
}

pub struct SourcePipe {
    buffer: Arc<Mutex<Vec<f32>>>,
    devices: Vec<DeviceInfo>,
    current_device: usize,
    _stream: Option<Stream>,
}

impl SourcePipe {
    pub fn new() -> Self {
        let devices = Self::collect_devices();
        let buffer = Arc::new(Mutex::new(vec![0.0; BUFFER_SIZE]));

        // Prefer the device saved in the config, then any input device
        let config = Config::load();
        let start_index = config
            .last_device
            .as_ref()
            .and_then(|name| {
                let is_input = config.last_device_is_input.unwrap_or(true);
                devices
                    .iter()
                    .position(|d| d.name == *name && d.is_input == is_input)
            })
            .or_else(|| devices.iter().position(|d| d.is_input))
            .unwrap_or(0);

        let stream = match devices.get(start_index) {
            Some(info) => {
                let stream = Self::build_stream(info, Arc::clone(&buffer));
                if stream.is_some() {
                    let device_type = if info.is_input { "input" } else { "output" };
                    info!("[{}] capturing: {} ({})", start_index, info.name, device_type);
                } else {
                    warn!("audio capture unavailable, running silent");
                }
                stream
            }
            None => {
                warn!("no audio devices found, running silent");
                None
            }
        };

        Self {
            buffer,
            devices,
            current_device: start_index,
            _stream: stream,
        }
    }

    pub fn list_devices() {
        let host = cpal::default_host();
        let mut idx = 0;
        if let Ok(inputs) = host.input_devices() {
            for device in inputs {
                if let Ok(name) = device.name() {
                    info!("  [{}] {} (input)", idx, name);
                    idx += 1;
                }
            }
        }
        if let Ok(outputs) = host.output_devices() {
            for device in outputs {
                if let Ok(name) = device.name() {
                    info!("  [{}] {} (output)", idx, name);
                    idx += 1;
                }
            }
        }
        info!("use 0-9 (Shift for +10) to switch devices");
    }

    fn collect_devices() -> Vec<DeviceInfo> {
        let host = cpal::default_host();
        let mut devices = Vec::new();

        if let Ok(input_devices) = host.input_devices() {
            for device in input_devices {
                if let Ok(name) = device.name() {
                    devices.push(DeviceInfo {
                        device,
                        name,
                        is_input: true,
                    });
                }
            }
        }

        // Output devices stay listed for loopback capture on hosts that allow it
        if let Ok(output_devices) = host.output_devices() {
            for device in output_devices {
                if let Ok(name) = device.name() {
                    devices.push(DeviceInfo {
                        device,
                        name,
                        is_input: false,
                    });
                }
            }
        }

        devices
    }

    fn build_stream(info: &DeviceInfo, audio_buffer: Arc<Mutex<Vec<f32>>>) -> Option<Stream> {
        let default_config = if info.is_input {
            info.device.default_input_config()
        } else {
            info.device.default_output_config()
        };
        let stream_config: StreamConfig = match default_config {
            Ok(config) => config.into(),
            Err(err) => {
                warn!("no default config for {}: {}", info.name, err);
                return None;
            }
        };
        let channels = stream_config.channels as usize;

        let err_fn = |err| error!("audio stream error: {}", err);

        let stream = info.device.build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let mut buffer = audio_buffer.lock().unwrap();
                for chunk in data.chunks(channels) {
                    let sample: f32 = chunk.iter().sum::<f32>() / channels as f32;
                    buffer.remove(0);
                    buffer.push(sample);
                }
            },
            err_fn,
            None,
        );

        match stream {
            Ok(stream) => match stream.play() {
                Ok(()) => Some(stream),
                Err(err) => {
                    warn!("failed to start stream on {}: {}", info.name, err);
                    None
                }
            },
            Err(err) => {
                warn!("failed to open {}: {}", info.name, err);
                None
            }
        }
    }

    /// Newest mono samples; zeros while capture is down.
    pub fn stream(&self) -> Vec<f32> {
        self.buffer.lock().unwrap().clone()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Attempt to switch capture to the device at `index`. Returns the
    /// device name and whether its stream came up; `None` if the index is
    /// out of range.
    pub fn select_device(&mut self, index: usize) -> Option<(String, bool)> {
        if index >= self.devices.len() {
            return None;
        }
        if index == self.current_device && self._stream.is_some() {
            return Some((self.devices[index].name.clone(), true));
        }

        let info = &self.devices[index];
        let device_name = info.name.clone();
        let is_input = info.is_input;

        {
            let mut buffer = self.buffer.lock().unwrap();
            buffer.iter_mut().for_each(|sample| *sample = 0.0);
        }

        if let Some(stream) = Self::build_stream(info, Arc::clone(&self.buffer)) {
            info!("[{}] capturing: {}", index, device_name);
            self._stream = Some(stream);
            self.current_device = index;

            let mut config = Config::load();
            config.set_device(&device_name, is_input);

            Some((device_name, true))
        } else {
            warn!("[{}] switch to {} failed", index, device_name);
            Some((device_name, false))
        }
    }
}
