use std::future::Future;

use crate::core::errors::Result;
use crate::core::models::date_range::DateRange;
use crate::core::models::edit_record::{EditRecord, Property};
use crate::core::models::entity::{EntityDetails, EntityId};

/// Port for reading edit activity from a wiki revision API.
///
/// Each call issues its own requests and shares no state with concurrent
/// calls, so a bulk run can fan out over one source.
pub trait RevisionSource {
    /// Contributions of one user, newest first, capped at `limit`.
    ///
    /// When `properties` is non-empty only edits whose inferred property is
    /// in the set are returned.
    fn user_contributions(
        &self,
        username: &str,
        range: &DateRange,
        properties: &[Property],
        limit: usize,
    ) -> impl Future<Output = Result<Vec<EditRecord>>>;

    /// Revision history of one entity, newest first, capped at `limit`.
    fn entity_revisions(
        &self,
        entity: &EntityId,
        range: &DateRange,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<EditRecord>>>;

    /// Labels, descriptions and claims of an entity, or `None` if it does not exist.
    fn entity_details(&self, entity: &EntityId)
    -> impl Future<Output = Result<Option<EntityDetails>>>;

    /// Site-wide recent changes in the main namespace, capped at `limit`.
    fn recent_changes(
        &self,
        range: &DateRange,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<EditRecord>>>;
}
