//! Checkout scenario files
//!
//! A scenario names a run, optionally replaces parts of the order payload and
//! can pin the final payment status the run is expected to reach.

use serde::Deserialize;
use std::path::Path;

use crate::common::config::OrderFixture;
use crate::common::{Error, Result};

use super::checkout::Verdict;

/// A checkout scenario loaded from a YAML file
#[derive(Deserialize, Debug)]
pub struct Scenario {
    /// Name of the scenario
    #[serde(default = "default_name")]
    pub name: String,
    /// Optional description of what the scenario checks
    pub description: Option<String>,
    /// Order payload overrides
    #[serde(default)]
    pub order: OrderOverrides,
    /// Expectations checked after the run
    #[serde(default)]
    pub expect: Expectation,
}

fn default_name() -> String {
    "PIX checkout".to_string()
}

/// Order fields to replace; anything absent keeps the configured value
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderOverrides {
    pub descricao: Option<String>,
    #[serde(alias = "endereco_origem")]
    pub endereco_origem: Option<String>,
    #[serde(alias = "endereco_destino")]
    pub endereco_destino: Option<String>,
    pub valor: Option<f64>,
}

/// Expected end state of the run
#[derive(Deserialize, Debug, Default)]
pub struct Expectation {
    /// Final payment status, e.g. "pendente" or "aprovado"
    pub status: Option<String>,
}

impl Scenario {
    /// Load a scenario from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let scenario: Self = serde_yaml::from_str(content)
            .map_err(|e| Error::Scenario(format!("Failed to parse scenario: {}", e)))?;

        if let Some(valor) = scenario.order.valor {
            if !valor.is_finite() || valor <= 0.0 {
                return Err(Error::Scenario(format!(
                    "order.valor must be a positive amount, got {}",
                    valor
                )));
            }
        }
        Ok(scenario)
    }

    /// Apply this scenario's overrides on top of a base order
    pub fn order(&self, base: &OrderFixture) -> OrderFixture {
        let overrides = &self.order;
        OrderFixture {
            descricao: overrides
                .descricao
                .clone()
                .unwrap_or_else(|| base.descricao.clone()),
            endereco_origem: overrides
                .endereco_origem
                .clone()
                .unwrap_or_else(|| base.endereco_origem.clone()),
            endereco_destino: overrides
                .endereco_destino
                .clone()
                .unwrap_or_else(|| base.endereco_destino.clone()),
            valor: overrides.valor.unwrap_or(base.valor),
        }
    }

    /// Compare the verdict against the expected status
    ///
    /// Returns a failure message on mismatch. An aborted run is reported by
    /// the run itself, so it never produces a mismatch here.
    pub fn check(&self, verdict: &Verdict) -> Option<String> {
        let expected = self.expect.status.as_deref()?;
        match verdict {
            Verdict::Aborted => None,
            Verdict::Settled(status) if status.matches(expected) => None,
            Verdict::Settled(status) => Some(format!(
                "Expected final status '{}', got '{}'",
                expected, status
            )),
            Verdict::Unconfirmed => Some(format!(
                "Expected final status '{}', but the status could not be read",
                expected
            )),
        }
    }
}
