//! Task status machine and enumerated task attributes.

use super::{ParsePriorityError, ParseTaskStatusError, ParseTaskTypeError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task assigned to a contractor, no work recorded yet.
    Assigned,
    /// Contractor is working on the task.
    InProgress,
    /// Contractor marked the task complete; awaiting approval.
    Completed,
    /// Building creator approved the completion.
    Approved,
    /// Building creator rejected the completion; rework needed.
    Rejected,
    /// Work temporarily paused.
    OnHold,
    /// Task abandoned.
    Cancelled,
}

impl TaskStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 7] = [
        Self::Assigned,
        Self::InProgress,
        Self::Completed,
        Self::Approved,
        Self::Rejected,
        Self::OnHold,
        Self::Cancelled,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::OnHold => "on_hold",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` for statuses with no outgoing transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Cancelled)
    }

    /// Returns `true` when the work is finished from the deadline's point of
    /// view: completed, approved or cancelled.
    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Completed | Self::Approved | Self::Cancelled)
    }

    /// Returns `true` for statuses that satisfy a dependency.
    #[must_use]
    pub const fn satisfies_dependency(self) -> bool {
        matches!(self, Self::Completed | Self::Approved)
    }

    /// Returns `true` for statuses that receive deadline reminders.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Assigned | Self::InProgress)
    }

    /// Returns whether the lifecycle permits moving from `self` to `target`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self, target) {
            (Self::OnHold, Self::OnHold) => false,
            (_, Self::OnHold | Self::Cancelled) => true,
            (Self::Assigned, Self::InProgress | Self::Completed)
            | (Self::InProgress, Self::Completed)
            | (Self::Completed, Self::Approved | Self::Rejected)
            | (Self::Rejected | Self::OnHold, Self::InProgress) => true,
            _ => false,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match normalize(value).as_str() {
            "assigned" => Ok(Self::Assigned),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "on_hold" => Ok(Self::OnHold),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Urgency of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can slip without consequence.
    Low,
    /// Default urgency.
    Medium,
    /// Should be scheduled ahead of medium work.
    High,
    /// Blocks other work; surfaced in daily summaries.
    Urgent,
}

impl Priority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Priority {
    type Error = ParsePriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match normalize(value).as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ParsePriorityError(value.to_owned())),
        }
    }
}

/// Trade category of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Structural and earth works.
    CivilWork,
    /// Wiring and electrical installations.
    ElectricalWork,
    /// Water supply and drainage.
    PlumbingWork,
    /// Wall and floor tiling.
    Tiling,
    /// Interior and exterior painting.
    Painting,
    /// Roof construction and repair.
    Roofing,
    /// Floor laying.
    Flooring,
    /// Woodwork.
    Carpentry,
    /// Brick and block work.
    Masonry,
    /// Heating, ventilation and air conditioning.
    Hvac,
    /// Outdoor works.
    Landscaping,
    /// Quality or regulatory inspection.
    Inspection,
    /// Site cleanup.
    Cleanup,
    /// Anything else.
    Other,
}

impl TaskType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CivilWork => "civil_work",
            Self::ElectricalWork => "electrical_work",
            Self::PlumbingWork => "plumbing_work",
            Self::Tiling => "tiling",
            Self::Painting => "painting",
            Self::Roofing => "roofing",
            Self::Flooring => "flooring",
            Self::Carpentry => "carpentry",
            Self::Masonry => "masonry",
            Self::Hvac => "hvac",
            Self::Landscaping => "landscaping",
            Self::Inspection => "inspection",
            Self::Cleanup => "cleanup",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskType {
    type Error = ParseTaskTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match normalize(value).as_str() {
            "civil_work" => Ok(Self::CivilWork),
            "electrical_work" => Ok(Self::ElectricalWork),
            "plumbing_work" => Ok(Self::PlumbingWork),
            "tiling" => Ok(Self::Tiling),
            "painting" => Ok(Self::Painting),
            "roofing" => Ok(Self::Roofing),
            "flooring" => Ok(Self::Flooring),
            "carpentry" => Ok(Self::Carpentry),
            "masonry" => Ok(Self::Masonry),
            "hvac" => Ok(Self::Hvac),
            "landscaping" => Ok(Self::Landscaping),
            "inspection" => Ok(Self::Inspection),
            "cleanup" => Ok(Self::Cleanup),
            "other" => Ok(Self::Other),
            _ => Err(ParseTaskTypeError(value.to_owned())),
        }
    }
}

/// Lowercases and maps `-`/space separators to `_` so `IN_PROGRESS`,
/// `in-progress` and `in progress` parse alike.
pub(super) fn normalize(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|ch| match ch {
            '-' | ' ' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}
