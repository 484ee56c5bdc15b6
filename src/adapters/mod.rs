//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                  |
//! |------------|--------------------|------------------------------|
//! | `gateway`  | command inbox      | Any control-plane transport  |
//! | `hardware` | SensorPort         | LED-sense ISR, cup GPIO/ADC  |
//! |            | ActuatorPort       | Button GPIOs, LEDC buzzer    |
//! | `log_sink` | EventSink          | Serial log output            |
//! | `time`     | monotonic clock    | ESP32 system timer           |

pub mod gateway;
pub mod hardware;
pub mod log_sink;
pub mod time;
