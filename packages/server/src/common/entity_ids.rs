//! Typed ids for every persisted entity.
//!
//! User ids come from the external identity provider; they are still UUIDs
//! and are typed the same way.

pub use super::id::Id;

/// Marker type for School entities.
pub struct School;

/// Marker type for user accounts (owned by the identity provider).
pub struct User;

/// Marker type for Profile entities.
pub struct Profile;

/// Marker type for Organization entities.
pub struct Organization;

/// Marker type for UserOrgApplication entities.
pub struct Application;

/// Marker type for OrgScrapeRequest entities.
pub struct ScrapeRequest;

pub type SchoolId = Id<School>;
pub type UserId = Id<User>;
pub type ProfileId = Id<Profile>;
pub type OrganizationId = Id<Organization>;
pub type ApplicationId = Id<Application>;
pub type ScrapeRequestId = Id<ScrapeRequest>;
