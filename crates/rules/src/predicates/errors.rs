// Copyright © 2024-present
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Structured error codes returned by the predicate functions in this
//! crate, per spec.md §4.4 and §9's "enumerate... for safety" hint applied
//! symmetrically to errors: a typed enum with a human `Display` rather than
//! bare strings, so UI consumers and `BID_PASSED{reason: ...}` events get a
//! stable code plus the message spec.md §7 requires.

use std::fmt;

/// The open-ended list of rule-violation codes from spec.md §4.4. New
/// variants can be added without breaking callers that only match on
/// `RuleErrorCode::code()`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RuleErrorCode {
    BidExceedsSpice,
    BidTooLow,
    BidNotPositive,
    SelfOutbid,
    HandFull,
    MovementOutOfRange,
    MovementIntoStorm,
    MovementNoSuchForces,
    StrongholdOccupancyExceeded,
    ShipmentToStorm,
    ShipmentInsufficientSpice,
    AdvisorFlipBlockedPeacetime,
    AdvisorFlipBlockedStormedIn,
}

impl RuleErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            RuleErrorCode::BidExceedsSpice => "BID_EXCEEDS_SPICE",
            RuleErrorCode::BidTooLow => "BID_TOO_LOW",
            RuleErrorCode::BidNotPositive => "BID_NOT_POSITIVE",
            RuleErrorCode::SelfOutbid => "SELF_OUTBID",
            RuleErrorCode::HandFull => "HAND_FULL",
            RuleErrorCode::MovementOutOfRange => "MOVEMENT_OUT_OF_RANGE",
            RuleErrorCode::MovementIntoStorm => "MOVEMENT_INTO_STORM",
            RuleErrorCode::MovementNoSuchForces => "MOVEMENT_NO_SUCH_FORCES",
            RuleErrorCode::StrongholdOccupancyExceeded => "STRONGHOLD_OCCUPANCY_EXCEEDED",
            RuleErrorCode::ShipmentToStorm => "SHIPMENT_TO_STORM",
            RuleErrorCode::ShipmentInsufficientSpice => "SHIPMENT_INSUFFICIENT_SPICE",
            RuleErrorCode::AdvisorFlipBlockedPeacetime => "ADVISOR_FLIP_BLOCKED_PEACETIME",
            RuleErrorCode::AdvisorFlipBlockedStormedIn => "ADVISOR_FLIP_BLOCKED_STORMED_IN",
        }
    }
}

/// One validation failure: a stable code plus the human message required by
/// spec.md §7 ("every rejection includes a message that names the rule...").
#[derive(Debug, Clone)]
pub struct RuleError {
    pub code: RuleErrorCode,
    pub message: String,
}

impl RuleError {
    pub fn new(code: RuleErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

/// The result of a predicate check: either valid, or a (possibly empty)
/// list of violations, per spec.md §4.4's `{valid, errors}` shape.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<RuleError>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn fail(code: RuleErrorCode, message: impl Into<String>) -> Self {
        Self { errors: vec![RuleError::new(code, message)] }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn first_error(&self) -> Option<&RuleError> {
        self.errors.first()
    }
}
