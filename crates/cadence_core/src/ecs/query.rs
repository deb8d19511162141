//! # Entity Queries

use super::component::ComponentTag;
use super::entity::EntityRef;

/// Yields the active entities that carry every tag in `required`.
///
/// Entities that are inactive, or missing any one required fragment, are
/// skipped. An empty `required` list matches every active entity.
pub fn filter_entities<'a>(
    entities: &'a [EntityRef],
    required: &'a [ComponentTag],
) -> impl Iterator<Item = &'a EntityRef> + 'a {
    entities
        .iter()
        .filter(move |entity| entity.is_active() && entity.has_all(required))
}
