//! Direct HID output to a DualSense over USB or Bluetooth.

use hidapi::{BusType, HidApi, HidDevice};
use padhaptics_effects::{RumbleEffect, TriggerEffect};
use padhaptics_hid_dualsense_protocol::{
    DualSenseOutputState, MAX_REPORT_LEN, SONY_VENDOR_ID, Transport, TriggerBlock, is_dualsense,
    trigger_feedback, trigger_off, trigger_vibration,
};
use tracing::{debug, info, warn};

use super::OutputSink;
use crate::error::{OutputError, OutputResult};

/// Protocol block for one trigger effect.
pub fn trigger_block(effect: TriggerEffect) -> TriggerBlock {
    match effect {
        TriggerEffect::Off => trigger_off(),
        TriggerEffect::Feedback {
            start_position,
            strength,
        } => trigger_feedback(start_position, strength),
        TriggerEffect::Vibration {
            start_position,
            amplitude,
            frequency_hz,
        } => trigger_vibration(start_position, amplitude, frequency_hz),
    }
}

/// Full report state for one tick.
pub fn output_state(
    left: TriggerEffect,
    right: TriggerEffect,
    rumble: RumbleEffect,
) -> DualSenseOutputState {
    DualSenseOutputState {
        rumble_right: rumble.right_byte(),
        rumble_left: rumble.left_byte(),
        right_trigger: trigger_block(right),
        left_trigger: trigger_block(left),
    }
}

fn transport_for(bus: BusType) -> Transport {
    match bus {
        BusType::Bluetooth => Transport::Bluetooth,
        _ => Transport::Usb,
    }
}

/// Writes full output reports to the first DualSense found.
pub struct HidOutputSink {
    api: Option<HidApi>,
    device: Option<HidDevice>,
    transport: Transport,
    seq: u8,
    report: [u8; MAX_REPORT_LEN],
}

impl Default for HidOutputSink {
    fn default() -> Self {
        Self::new()
    }
}

impl HidOutputSink {
    pub fn new() -> Self {
        Self {
            api: None,
            device: None,
            transport: Transport::Usb,
            seq: 0,
            report: [0; MAX_REPORT_LEN],
        }
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    fn open(&mut self) -> OutputResult<()> {
        let mut api = match self.api.take() {
            Some(api) => api,
            None => HidApi::new()?,
        };
        let refreshed = api.refresh_devices();
        let opened = refreshed
            .map_err(OutputError::from)
            .and_then(|()| open_first_dualsense(&api));
        self.api = Some(api);

        let (device, transport) = opened?;
        self.device = Some(device);
        self.transport = transport;
        self.seq = 0;
        Ok(())
    }

    fn write_report(&mut self, state: &DualSenseOutputState) -> OutputResult<()> {
        let device = self.device.as_ref().ok_or(OutputError::NotConnected)?;
        let len = state.encode(self.transport, self.seq, &mut self.report);
        let bytes = self.report.get(..len).unwrap_or(&self.report);
        let written = device.write(bytes)?;
        if written < len {
            return Err(OutputError::ShortWrite {
                written,
                expected: len,
            });
        }
        self.seq = self.seq.wrapping_add(1) & 0x0F;
        Ok(())
    }
}

fn open_first_dualsense(api: &HidApi) -> OutputResult<(HidDevice, Transport)> {
    let info = api
        .device_list()
        .find(|d| d.vendor_id() == SONY_VENDOR_ID && is_dualsense(d.product_id()))
        .ok_or(OutputError::DeviceNotFound)?;
    let transport = transport_for(info.bus_type());
    let device = info.open_device(api)?;
    info!(
        product_id = format_args!("{:#06x}", info.product_id()),
        ?transport,
        "DualSense connected"
    );
    Ok((device, transport))
}

impl OutputSink for HidOutputSink {
    fn name(&self) -> &'static str {
        "DualSense HID"
    }

    fn try_connect(&mut self) -> bool {
        if self.device.is_some() {
            return true;
        }
        match self.open() {
            Ok(()) => true,
            Err(err) => {
                debug!(error = %err, "DualSense not available");
                false
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.device.is_some()
    }

    fn send(
        &mut self,
        left: TriggerEffect,
        right: TriggerEffect,
        rumble: RumbleEffect,
    ) -> OutputResult<()> {
        let state = output_state(left, right, rumble);
        self.write_report(&state).inspect_err(|err| {
            warn!(error = %err, "DualSense write failed, disconnecting");
            self.device = None;
        })
    }

    fn send_safe_state(&mut self) -> OutputResult<()> {
        let state = DualSenseOutputState::safe();
        self.write_report(&state).inspect_err(|_| {
            self.device = None;
        })
    }
}
