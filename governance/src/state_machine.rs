//! Roadmap lifecycle state machine
//!
//! Canonical vocabulary for roadmap status evaluation: the eight lifecycle
//! states, the forward-only transition table, and the gate preconditions a
//! record must satisfy before it may declare a later-stage status.
//!
//! Transition checks run only when a previously observed status is known
//! (see `snapshot`). Gate preconditions are always checked.

use serde::{Deserialize, Serialize};

use crate::finding::ValidationOutcome;
use crate::frontmatter::Record;
use crate::schema::FieldEnum;

// ============================================================================
// Lifecycle States
// ============================================================================

/// Roadmap item lifecycle states in pipeline order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadmapStatus {
    /// Initial state: item authored, nothing validated
    Proposed,
    /// Architecture decision records validated
    AdrValidated,
    /// Waiting on BDD scenario approval
    BddPending,
    /// BDD scenarios approved
    BddComplete,
    /// Work in progress
    Implementing,
    /// Non-functional requirements under validation
    NfrValidating,
    /// NFR validation failed; loops back to `NfrValidating`
    NfrBlocked,
    /// Terminal state
    Complete,
}

impl FieldEnum for RoadmapStatus {
    const ALL: &'static [Self] = &[
        Self::Proposed,
        Self::AdrValidated,
        Self::BddPending,
        Self::BddComplete,
        Self::Implementing,
        Self::NfrValidating,
        Self::NfrBlocked,
        Self::Complete,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Proposed => "proposed",
            Self::AdrValidated => "adr_validated",
            Self::BddPending => "bdd_pending",
            Self::BddComplete => "bdd_complete",
            Self::Implementing => "implementing",
            Self::NfrValidating => "nfr_validating",
            Self::NfrBlocked => "nfr_blocked",
            Self::Complete => "complete",
        }
    }
}

impl RoadmapStatus {
    pub const INITIAL: Self = Self::Proposed;

    /// Position in the lifecycle. `NfrBlocked` shares a rank with
    /// `NfrValidating` since it only loops between the two.
    pub fn rank(self) -> u8 {
        match self {
            Self::Proposed => 0,
            Self::AdrValidated => 1,
            Self::BddPending => 2,
            Self::BddComplete => 3,
            Self::Implementing => 4,
            Self::NfrValidating | Self::NfrBlocked => 5,
            Self::Complete => 6,
        }
    }

    /// Allowed next states.
    pub fn next_states(self) -> &'static [Self] {
        match self {
            Self::Proposed => &[Self::AdrValidated],
            Self::AdrValidated => &[Self::BddPending],
            Self::BddPending => &[Self::BddComplete],
            Self::BddComplete => &[Self::Implementing],
            Self::Implementing => &[Self::NfrValidating],
            Self::NfrValidating => &[Self::Complete, Self::NfrBlocked],
            Self::NfrBlocked => &[Self::NfrValidating],
            Self::Complete => &[],
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next_states().is_empty()
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        self == next || self.next_states().contains(&next)
    }

    pub fn is_at_or_beyond(self, other: Self) -> bool {
        self.rank() >= other.rank()
    }
}

impl std::fmt::Display for RoadmapStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Gates
// ============================================================================

/// Preconditions guarding later lifecycle stages.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    /// `governance.adrs.validated == true`, from `bdd_pending` on
    AdrValidated,
    /// `governance.bdd.status == "approved"`, from `implementing` on
    BddApproved,
    /// `governance.nfrs.status == "pass"` and every applicable NFR passed, at `complete`
    NfrsPassed,
}

impl Gate {
    /// Gates that apply to `status`.
    pub fn required_for(status: RoadmapStatus) -> Vec<Self> {
        let mut gates = Vec::new();
        if status.is_at_or_beyond(RoadmapStatus::BddPending) {
            gates.push(Self::AdrValidated);
        }
        if status.is_at_or_beyond(RoadmapStatus::Implementing) {
            gates.push(Self::BddApproved);
        }
        if status == RoadmapStatus::Complete {
            gates.push(Self::NfrsPassed);
        }
        gates
    }
}

/// A gate precondition that does not hold.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GateViolation {
    pub gate: Gate,
    pub message: String,
}

/// Evaluate every gate `status` requires against the record's governance block.
pub fn gate_violations(status: RoadmapStatus, record: &Record) -> Vec<GateViolation> {
    let mut violations = Vec::new();
    for gate in Gate::required_for(status) {
        match gate {
            Gate::AdrValidated => {
                if record.bool_at("governance.adrs.validated") != Some(true) {
                    violations.push(GateViolation {
                        gate,
                        message: format!(
                            "ADR gate not met: governance.adrs.validated must be true for status {status}"
                        ),
                    });
                }
            }
            Gate::BddApproved => {
                let bdd = record.str_at("governance.bdd.status");
                if bdd != Some("approved") {
                    violations.push(GateViolation {
                        gate,
                        message: format!(
                            "BDD gate not met: governance.bdd.status must be \"approved\" for status {status} (found {})",
                            quoted_or_missing(bdd)
                        ),
                    });
                }
            }
            Gate::NfrsPassed => violations.extend(nfr_violations(record)),
        }
    }
    violations
}

fn nfr_violations(record: &Record) -> Vec<GateViolation> {
    let mut violations = Vec::new();

    let overall = record.str_at("governance.nfrs.status");
    if overall != Some("pass") {
        violations.push(GateViolation {
            gate: Gate::NfrsPassed,
            message: format!(
                "All NFRs must pass before complete (governance.nfrs.status is {})",
                quoted_or_missing(overall)
            ),
        });
    }

    let applicable = record
        .list_at("governance.nfrs.applicable")
        .map(|items| items.iter().filter_map(serde_json::Value::as_str).collect::<Vec<_>>())
        .unwrap_or_default();
    let results = record.object_at("governance.nfrs.results");

    for nfr in applicable {
        let result = results.and_then(|r| r.get(nfr));
        let status = result.and_then(|r| match r {
            serde_json::Value::String(s) => Some(s.as_str()),
            other => other.get("status").and_then(serde_json::Value::as_str),
        });
        match (result, status) {
            (None, _) => violations.push(GateViolation {
                gate: Gate::NfrsPassed,
                message: format!(
                    "NFR gate not met: no result recorded for applicable {nfr} in governance.nfrs.results"
                ),
            }),
            (Some(_), Some("pass")) => {}
            (Some(_), other) => violations.push(GateViolation {
                gate: Gate::NfrsPassed,
                message: format!(
                    "NFR gate not met: {nfr} result status is {} (expected \"pass\")",
                    quoted_or_missing(other)
                ),
            }),
        }
    }

    violations
}

fn quoted_or_missing(value: Option<&str>) -> String {
    value.map_or_else(|| "missing".to_string(), |v| format!("\"{v}\""))
}

// ============================================================================
// Checker
// ============================================================================

/// Error for a declared status that does not follow the previous one.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("Invalid status transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: RoadmapStatus,
    pub to: RoadmapStatus,
}

pub fn check_transition(from: RoadmapStatus, to: RoadmapStatus) -> Result<(), TransitionError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(TransitionError { from, to })
    }
}

/// Run the state-machine checks for one roadmap record.
///
/// Records without a recognised `status` produce no findings here; the
/// schema validator reports those.
pub fn check(record: &Record, previous: Option<RoadmapStatus>) -> ValidationOutcome {
    let mut out = ValidationOutcome::new();
    let Some(status) = record.str_at("status").and_then(RoadmapStatus::parse) else {
        return out;
    };

    if let Some(previous) = previous
        && let Err(err) = check_transition(previous, status)
    {
        out.error(err.to_string());
    }

    for violation in gate_violations(status, record) {
        out.error(violation.message);
    }
    out
}
