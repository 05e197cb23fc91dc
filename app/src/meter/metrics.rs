use infrastructure::{EventListener, meter};

use crate::meter::MeterEvent;

const POLL_TOTAL: &str = "meter_poll_total";
const CONNECTED: &str = "meter_connected";
const VOLTAGE: &str = "meter_voltage_volts";
const CURRENT: &str = "meter_current_milliamperes";

pub async fn record(mut events: EventListener<MeterEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            MeterEvent::ReadingAccepted(reading) => {
                meter::increment(POLL_TOTAL, &[("result", "ok")]);

                if let Some(voltage) = reading.value.voltage {
                    meter::set(VOLTAGE, voltage.0, &[]);
                }

                for (channel, current) in &reading.value.currents {
                    if let Some(current) = current {
                        meter::set(CURRENT, current.0, &[("channel", channel)]);
                    }
                }
            }
            MeterEvent::PollFailed(failure) => {
                meter::increment(POLL_TOTAL, &[("result", failure.value.label())]);
            }
            MeterEvent::ConnectionChanged(status) => {
                meter::set(CONNECTED, if status.is_connected() { 1.0 } else { 0.0 }, &[]);
            }
        }
    }
}
