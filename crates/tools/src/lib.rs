//! Concierge capabilities.
//!
//! Each module contributes one pack of [`runtime::Capability`] values:
//! current weather, simulated travel advisories, and the investment intake
//! with its simulated transaction.

pub use investment::{
    Intake, Investment, PaymentMode, process_transaction, process_transaction_with,
};
pub use weather::{Conditions, WeatherClient, WeatherError};

pub mod investment;
pub mod travel;
pub mod weather;
