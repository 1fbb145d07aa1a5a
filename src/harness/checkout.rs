//! The PIX checkout flow
//!
//! Five calls, each feeding the next: server check, order creation, payment
//! creation, payment processing and, after a settlement wait, a status poll.
//! The poll is the only non-fatal step; whatever business status it returns
//! is a valid end of the run.

use std::fmt;

use reqwest::Method;
use serde_json::json;

use crate::common::config::OrderFixture;
use crate::common::Error;
use crate::http::StepResult;

use super::runner::{Outcome, RunReport, RunState, StepRecord};
use super::step::Step;

pub const SERVER: &str = "server";
pub const ORDER: &str = "order";
pub const PAYMENT: &str = "payment";
pub const PROCESSING: &str = "processing";
pub const STATUS: &str = "status";

/// Payment method requested from the backend
pub const PAYMENT_METHOD: &str = "pix";

/// Steps for a full checkout of `order`
pub fn checkout_plan(order: &OrderFixture) -> Vec<Step> {
    let fixture = order.clone();
    let valor = order.valor;

    vec![
        server_step(),
        Step::new(ORDER, RunState::CreatingOrder, Method::POST, "/pedidos")
            .title("Create order")
            .with_body(move |_| Ok(serde_json::to_value(&fixture)?))
            .display(&["id", "descricao", "valor"]),
        Step::new(PAYMENT, RunState::CreatingPayment, Method::POST, "/pagamentos")
            .title("Create PIX payment")
            .with_body(move |ctx| {
                Ok(json!({
                    "valor": valor,
                    "metodoPagamento": PAYMENT_METHOD,
                    "pedidoId": ctx.require(ORDER, "id")?.clone(),
                }))
            })
            .display(&["id", "status", "metodoPagamento"]),
        Step::new(
            PROCESSING,
            RunState::ProcessingPayment,
            Method::POST,
            "/pagamentos/{payment.id}/processar",
        )
        .title("Process payment")
        .display(&["transacaoId", "status", "qrCode", "qrCodeBase64", "ticketUrl"]),
        Step::new(
            STATUS,
            RunState::PollingStatus,
            Method::GET,
            "/pagamentos/{payment.id}/status",
        )
        .title("Check payment status")
        .non_fatal()
        .after_settlement(is_pending)
        .display(&["status"]),
    ]
}

/// Only the reachability check
pub fn ping_plan() -> Vec<Step> {
    vec![server_step()]
}

fn server_step() -> Step {
    Step::new(SERVER, RunState::CheckingServer, Method::GET, "/").title("Check server")
}

fn is_pending(result: &StepResult) -> bool {
    PaymentStatus::from_result(result) == Some(PaymentStatus::Pending)
}

/// Business status reported by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Approved,
    Declined,
    Other(String),
}

impl PaymentStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "pendente" | "pending" | "in_process" => PaymentStatus::Pending,
            "aprovado" | "approved" => PaymentStatus::Approved,
            "recusado" | "rejected" | "declined" => PaymentStatus::Declined,
            _ => PaymentStatus::Other(raw.to_string()),
        }
    }

    pub fn from_result(result: &StepResult) -> Option<Self> {
        result.body.field_text("status").map(|s| Self::parse(&s))
    }

    /// Whether `expected` (as written in a scenario file) names this status
    pub fn matches(&self, expected: &str) -> bool {
        match Self::parse(expected) {
            PaymentStatus::Other(other) => {
                matches!(self, PaymentStatus::Other(s) if s.eq_ignore_ascii_case(&other))
            }
            known => &known == self,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => f.write_str("pending"),
            PaymentStatus::Approved => f.write_str("approved"),
            PaymentStatus::Declined => f.write_str("declined"),
            PaymentStatus::Other(s) => f.write_str(s),
        }
    }
}

/// Final judgement on a checkout run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The status poll answered; any business status counts
    Settled(PaymentStatus),
    /// The run finished but the final status could not be read
    Unconfirmed,
    Aborted,
}

impl Verdict {
    pub fn from_report(report: &RunReport) -> Self {
        if report.outcome == Outcome::Aborted {
            return Verdict::Aborted;
        }
        report
            .result(STATUS)
            .and_then(PaymentStatus::from_result)
            .map(Verdict::Settled)
            .unwrap_or(Verdict::Unconfirmed)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Settled(status) => write!(f, "{}", status),
            Verdict::Unconfirmed => f.write_str("unconfirmed"),
            Verdict::Aborted => f.write_str("aborted"),
        }
    }
}

/// Remediation hint for a failed step
pub fn hint(record: &StepRecord) -> Option<&'static str> {
    match record.error()? {
        e if e.is_connection() => Some(
            "Is the backend running? Start the server and check --base-url (or PIXCHECK_BASE_URL).",
        ),
        Error::HttpStatus { .. } if record.name == PROCESSING => Some(
            "The payment provider call failed. Check the provider access token configured on the server.",
        ),
        Error::MissingField { .. } | Error::PathTemplate { .. } => {
            Some("A response is missing a field this flow depends on. Check the API response format.")
        }
        _ => None,
    }
}
