// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Engagement actions and the points they earn.

use std::fmt;

/// A user action on an app. Unknown action names are kept verbatim and earn
/// the base amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngagementAction {
    Visit,
    Use,
    Share,
    Other(String),
}

impl EngagementAction {
    pub fn parse(action: &str) -> Self {
        match action {
            "visit" => EngagementAction::Visit,
            "use" => EngagementAction::Use,
            "share" => EngagementAction::Share,
            other => EngagementAction::Other(other.to_string()),
        }
    }

    /// Points credited for this action. Never client-supplied.
    pub fn points(&self) -> u32 {
        match self {
            EngagementAction::Visit => 1,
            EngagementAction::Use => 5,
            EngagementAction::Share => 3,
            EngagementAction::Other(_) => 1,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EngagementAction::Visit => "visit",
            EngagementAction::Use => "use",
            EngagementAction::Share => "share",
            EngagementAction::Other(name) => name,
        }
    }
}

impl fmt::Display for EngagementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
