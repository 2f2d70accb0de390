use serde::{Deserialize, Serialize};

use crease_agent::{FatigueOutput, RiskOutput, RunnerOutput, TacticalOutput};
use crease_core::Domain;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Ok,
    /// Output came from the paired fallback builder.
    Fallback,
    /// The runner failed and no output is reported.
    Error,
    /// The router did not select the domain.
    Skipped,
}

/// Outcome of one capability domain within a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityResult<T> {
    pub status: ResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(default)]
    pub fallbacks_used: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> CapabilityResult<T> {
    pub fn skipped() -> Self {
        Self {
            status: ResultStatus::Skipped,
            output: None,
            model_used: None,
            fallbacks_used: Vec::new(),
            error: None,
        }
    }

    /// A runner that returned normally. A runner that degraded internally
    /// (non-empty `fallbacks_used`) is still reported as a fallback.
    pub fn completed(run: RunnerOutput<T>) -> Self {
        let status = if run.fallbacks_used.is_empty() {
            ResultStatus::Ok
        } else {
            ResultStatus::Fallback
        };
        Self {
            status,
            output: Some(run.output),
            model_used: Some(run.model),
            fallbacks_used: run.fallbacks_used,
            error: None,
        }
    }

    /// A runner that failed and was replaced by its fallback builder.
    pub fn recovered(run: RunnerOutput<T>, error: String) -> Self {
        Self {
            status: ResultStatus::Fallback,
            output: Some(run.output),
            model_used: Some(run.model),
            fallbacks_used: run.fallbacks_used,
            error: Some(error),
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            status: ResultStatus::Error,
            output: None,
            model_used: None,
            fallbacks_used: Vec::new(),
            error: Some(error),
        }
    }

    pub fn output(&self) -> Option<&T> {
        self.output.as_ref()
    }

    /// Selected but not served by the primary runner.
    pub fn is_degraded(&self) -> bool {
        matches!(self.status, ResultStatus::Fallback | ResultStatus::Error)
    }
}

/// One invocation that failed, as reported to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainError {
    pub domain: Domain,
    pub message: String,
}

/// Every domain's outcome for one request, plus the invocation failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRun {
    pub fatigue: CapabilityResult<FatigueOutput>,
    pub risk: CapabilityResult<RiskOutput>,
    pub tactical: CapabilityResult<TacticalOutput>,
    pub errors: Vec<DomainError>,
}

impl DomainRun {
    pub fn status(&self, domain: Domain) -> ResultStatus {
        match domain {
            Domain::Fatigue => self.fatigue.status,
            Domain::Risk => self.risk.status,
            Domain::Tactical => self.tactical.status,
        }
    }

    pub fn any_degraded(&self) -> bool {
        self.fatigue.is_degraded() || self.risk.is_degraded() || self.tactical.is_degraded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(fallbacks: Vec<String>) -> RunnerOutput<u8> {
        RunnerOutput {
            output: 7,
            model: "m".to_string(),
            fallbacks_used: fallbacks,
        }
    }

    #[test]
    fn internal_fallback_is_not_ok() {
        assert_eq!(CapabilityResult::completed(run(vec![])).status, ResultStatus::Ok);
        let degraded = CapabilityResult::completed(run(vec!["invalid_output: x".into()]));
        assert_eq!(degraded.status, ResultStatus::Fallback);
        assert!(degraded.is_degraded());
    }

    #[test]
    fn skipped_is_not_degraded() {
        let skipped = CapabilityResult::<u8>::skipped();
        assert!(!skipped.is_degraded());
        assert_eq!(
            serde_json::to_value(&skipped).unwrap(),
            serde_json::json!({"status": "skipped", "fallbacksUsed": []})
        );
    }

    #[test]
    fn failed_carries_no_output() {
        let failed = CapabilityResult::<u8>::failed("boom".into());
        assert_eq!(failed.status, ResultStatus::Error);
        assert!(failed.output().is_none());
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }

    #[test]
    fn domain_run_reads_back_from_json() {
        let run: DomainRun = serde_json::from_value(serde_json::json!({
            "fatigue": {"status": "skipped", "fallbacksUsed": []},
            "risk": {"status": "error", "fallbacksUsed": [], "error": "risk service down"},
            "tactical": {
                "status": "ok",
                "modelUsed": "rules",
                "fallbacksUsed": [],
                "output": {"immediateAction": "Rest Shami", "rationale": "heavy spell", "confidence": "HIGH"}
            },
            "errors": [{"domain": "RISK", "message": "risk service down"}]
        }))
        .unwrap();
        assert_eq!(run.status(Domain::Risk), ResultStatus::Error);
        assert!(run.risk.output().is_none());
        assert_eq!(run.tactical.output().unwrap().immediate_action, "Rest Shami");
        assert_eq!(run.errors[0].domain, Domain::Risk);
    }
}
