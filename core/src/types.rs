//! Shared primitive types used across the crate.

/// Stable identifier of a department (e.g. "dept-01").
pub type DepartmentId = String;

/// Stable identifier of a branch (e.g. "branch-001").
pub type BranchId = String;

/// Stable identifier of an agency attached to a branch.
pub type AgencyId = String;

/// Stable identifier of a theme distribution.
pub type DistributionId = String;
