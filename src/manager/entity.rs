//! The entity contract the manager consumes.

use serde::{Deserialize, Serialize};

use crate::core::{Bounds, EntityId};
use crate::events::EventRecord;

/// What the manager needs from a world entity.
///
/// The manager assumes nothing else about entity internals. Hosts with
/// their own entity storage implement this on a thin view type; everyone
/// else can use [`SpatialEntity`].
pub trait EventEntity {
    /// Stable identity.
    fn id(&self) -> EntityId;

    /// Current bounding box, if the entity has a transform right now.
    fn bounds(&self) -> Option<Bounds>;

    /// The attached event, if any.
    fn event(&self) -> Option<&EventRecord>;

    /// Mutable access to the attached event.
    fn event_mut(&mut self) -> Option<&mut EventRecord>;
}

/// A plain entity: identity, optional box, optional event.
///
/// ```
/// use world_events::core::EntityId;
/// use world_events::events::{EventRecord, EventType, TriggerKind};
/// use world_events::manager::{EventEntity, SpatialEntity};
///
/// let chest = SpatialEntity::new(EntityId(3))
///     .with_bounds(64.0, 32.0, 32.0, 32.0)
///     .with_event(EventRecord::new("chest_3", TriggerKind::OnInteract, EventType::Chest));
///
/// assert!(chest.event().is_some());
/// assert_eq!(chest.bounds().unwrap().max_x(), 96.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpatialEntity {
    pub id: EntityId,
    pub bounds: Option<Bounds>,
    pub event: Option<EventRecord>,
}

impl SpatialEntity {
    /// Create an entity with no transform and no event.
    #[must_use]
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            bounds: None,
            event: None,
        }
    }

    /// Set the bounding box (builder pattern).
    #[must_use]
    pub fn with_bounds(mut self, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.bounds = Some(Bounds::new(x, y, width, height));
        self
    }

    /// Attach an event (builder pattern).
    #[must_use]
    pub fn with_event(mut self, event: EventRecord) -> Self {
        self.event = Some(event);
        self
    }

    /// Move the entity. No-op if it has no transform.
    pub fn move_to(&mut self, x: f32, y: f32) {
        if let Some(bounds) = self.bounds.as_mut() {
            bounds.move_to(x, y);
        }
    }
}

impl EventEntity for SpatialEntity {
    fn id(&self) -> EntityId {
        self.id
    }

    fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    fn event(&self) -> Option<&EventRecord> {
        self.event.as_ref()
    }

    fn event_mut(&mut self) -> Option<&mut EventRecord> {
        self.event.as_mut()
    }
}
