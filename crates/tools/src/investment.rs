//! Investment intake.
//!
//! The intake collects the fields of one investment across several turns
//! and checks them in a fixed order: the first failing rule answers. The
//! transaction itself is simulated.

use chrono::{Local, NaiveDate, NaiveDateTime};
use parking_lot::Mutex;
use rand::Rng;
use runtime::{Arguments, Capability, Param};
use serde::Deserialize;
use std::{fmt, sync::Arc};

/// Default probability that a simulated transaction succeeds.
pub const SUCCESS_PROBABILITY: f64 = 0.8;

/// Prompt for a missing amount.
pub const ASK_AMOUNT: &str = "Please provide the investment amount.";
/// Rejection of a zero or negative amount.
pub const NON_POSITIVE_AMOUNT: &str = "The investment amount must be greater than zero.";
/// Prompt for a missing payment mode.
pub const ASK_PAYMENT_MODE: &str = "Please provide the payment mode (ACH or wire transfer).";
/// Rejection of an unknown payment mode.
pub const INVALID_PAYMENT_MODE: &str =
    "Invalid payment mode. Please choose either ACH or wire transfer.";
/// Prompt for a missing wire id.
pub const ASK_WIRE_ID: &str = "Please provide the wire ID for your wire transfer.";
/// Prompt for a missing transaction date.
pub const ASK_DATE: &str = "Please provide the transaction date (YYYY-MM-DD).";
/// Rejection of a malformed transaction date.
pub const INVALID_DATE: &str = "Invalid date format. Please use YYYY-MM-DD.";
/// Rejection of a transaction date after now.
pub const FUTURE_DATE: &str =
    "The transaction date cannot be in the future. Please provide a valid date.";

/// Supported payment modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMode {
    /// Automated clearing house.
    Ach,
    /// Wire transfer, requires a wire id.
    WireTransfer,
}

impl PaymentMode {
    /// Parse a user supplied mode. Case is ignored and `_`/`-` read as spaces.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw
            .trim()
            .replace(['_', '-'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        match normalized.as_str() {
            "ach" => Some(Self::Ach),
            "wire transfer" => Some(Self::WireTransfer),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ach => f.write_str("ACH"),
            Self::WireTransfer => f.write_str("wire transfer"),
        }
    }
}

/// Fields as extracted by the engine. Anything may be missing.
#[derive(Debug, Default, Deserialize)]
struct Fields {
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    payment_mode: Option<String>,
    #[serde(default)]
    wire_id: Option<String>,
    #[serde(default)]
    transaction_date: Option<String>,
}

/// Slot-filling state of one investment.
///
/// Fields are kept raw so the rules, not the merge, decide what is wrong.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Intake {
    /// Amount in dollars.
    pub amount: Option<f64>,
    /// Payment mode as given.
    pub payment_mode: Option<String>,
    /// Wire id as given.
    pub wire_id: Option<String>,
    /// Transaction date as given.
    pub transaction_date: Option<String>,
}

impl Intake {
    /// Overwrite every field present in `args`, keep the others.
    pub fn merge(&mut self, args: Arguments) -> anyhow::Result<()> {
        let fields: Fields = serde_json::from_value(args.into())?;
        if fields.amount.is_some() {
            self.amount = fields.amount;
        }
        if fields.payment_mode.is_some() {
            self.payment_mode = fields.payment_mode;
        }
        if fields.wire_id.is_some() {
            self.wire_id = fields.wire_id;
        }
        if fields.transaction_date.is_some() {
            self.transaction_date = fields.transaction_date;
        }
        Ok(())
    }

    /// Check the intake against the current local time.
    pub fn check(&self) -> String {
        self.check_at(Local::now().naive_local())
    }

    /// Check the intake against `now`: the first failing rule's message, or
    /// the summary when every rule passes.
    pub fn check_at(&self, now: NaiveDateTime) -> String {
        let Some(amount) = self.amount else {
            return ASK_AMOUNT.into();
        };
        if amount <= 0.0 {
            return NON_POSITIVE_AMOUNT.into();
        }

        let Some(raw_mode) = self.payment_mode.as_deref() else {
            return ASK_PAYMENT_MODE.into();
        };
        let Some(mode) = PaymentMode::parse(raw_mode) else {
            return INVALID_PAYMENT_MODE.into();
        };

        let wire_id = self.wire_id.as_deref().filter(|id| !id.trim().is_empty());
        if mode == PaymentMode::WireTransfer && wire_id.is_none() {
            return ASK_WIRE_ID.into();
        }

        let Some(raw_date) = self.transaction_date.as_deref() else {
            return ASK_DATE.into();
        };
        let Ok(date) = NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d") else {
            return INVALID_DATE.into();
        };
        if date.and_time(chrono::NaiveTime::MIN) > now {
            return FUTURE_DATE.into();
        }

        let mut summary =
            format!("Investment Summary:\nAmount: ${amount:.2}\nPayment Mode: {mode}");
        if let (PaymentMode::WireTransfer, Some(id)) = (mode, wire_id) {
            summary.push_str(&format!("\nWire ID: {}", id.trim()));
        }
        summary.push_str(&format!("\nTransaction Date: {}", date.format("%Y-%m-%d")));
        summary
    }

    /// Forget every collected field.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Simulate a transaction that succeeds with probability `p`.
pub fn process_transaction_with(rng: &mut impl Rng, p: f64) -> bool {
    rng.random_bool(p.clamp(0.0, 1.0))
}

/// Simulate a transaction that succeeds with probability `p`.
pub fn process_transaction(p: f64) -> bool {
    process_transaction_with(&mut rand::rng(), p)
}

/// The investment desk of one session: one intake, three capabilities.
#[derive(Debug, Clone)]
pub struct Investment {
    intake: Arc<Mutex<Intake>>,
    success_probability: f64,
}

impl Default for Investment {
    fn default() -> Self {
        Self::new(SUCCESS_PROBABILITY)
    }
}

impl Investment {
    /// Create a desk whose transactions succeed with `success_probability`.
    pub fn new(success_probability: f64) -> Self {
        Self {
            intake: Arc::new(Mutex::new(Intake::default())),
            success_probability,
        }
    }

    /// A snapshot of the current intake.
    pub fn intake(&self) -> Intake {
        self.intake.lock().clone()
    }

    /// `process_investment`, `process_transaction` and `cancel_investment`.
    pub fn capabilities(&self) -> Vec<Capability> {
        let intake = self.intake.clone();
        let process = Capability::new(
            "process_investment",
            "Collect and validate the details of an investment",
            move |args| {
                let intake = intake.clone();
                async move {
                    let mut intake = intake.lock();
                    intake.merge(args)?;
                    anyhow::Ok(intake.check())
                }
            },
        )
        .param(Param::number("amount").describe("The investment amount in dollars"))
        .param(Param::string("payment_mode").describe("The payment mode, ACH or wire transfer"))
        .param(Param::string("wire_id").describe("The wire ID, required for wire transfers"))
        .param(
            Param::string("transaction_date")
                .describe("The transaction date in YYYY-MM-DD format"),
        );

        let intake = self.intake.clone();
        let p = self.success_probability;
        let transact = Capability::new(
            "process_transaction",
            "Process the confirmed investment transaction",
            move |_| {
                let intake = intake.clone();
                async move {
                    let success = process_transaction(p);
                    tracing::debug!("simulated transaction succeeded: {success}");
                    if success {
                        intake.lock().reset();
                    }
                    anyhow::Ok(success.to_string())
                }
            },
        );

        let intake = self.intake.clone();
        let cancel = Capability::new(
            "cancel_investment",
            "Cancel the investment in progress and discard its details",
            move |_| {
                let intake = intake.clone();
                async move {
                    intake.lock().reset();
                    anyhow::Ok("The investment process has been cancelled.".to_owned())
                }
            },
        );

        vec![process, transact, cancel]
    }
}
