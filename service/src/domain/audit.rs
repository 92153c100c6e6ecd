//! [`Audit`] definitions.

use std::fmt;

use common::{unit, DateTime, DateTimeOf};

use super::user;

/// Mutation metadata and soft-deletion marker of an entity.
///
/// Entities are never removed from storage, they are soft-deleted instead and
/// may be [`restore`]d later.
///
/// [`restore`]: Audit::restore
pub struct Audit<Of> {
    /// [`DateTime`] when the entity was created.
    pub created_at: CreationDateTime<Of>,

    /// ID of the user who created the entity, if any.
    ///
    /// [`None`] for system-seeded data.
    pub created_by: Option<user::Id>,

    /// [`DateTime`] when the entity was modified for the last time.
    pub updated_at: ModificationDateTime<Of>,

    /// ID of the user who modified the entity for the last time, if any.
    pub updated_by: Option<user::Id>,

    /// [`DateTime`] when the entity was deleted, if it is.
    pub deleted_at: Option<DeletionDateTime<Of>>,

    /// ID of the user who deleted the entity, if it is deleted.
    pub deleted_by: Option<user::Id>,
}

impl<Of> Audit<Of> {
    /// Creates a new [`Audit`] of an entity created at the provided
    /// [`DateTime`] by the provided user.
    #[must_use]
    pub fn new(now: DateTime, actor: Option<user::Id>) -> Self {
        Self {
            created_at: now.coerce(),
            created_by: actor,
            updated_at: now.coerce(),
            updated_by: actor,
            deleted_at: None,
            deleted_by: None,
        }
    }

    /// Records a modification of the entity.
    pub fn touch(&mut self, now: DateTime, actor: user::Id) {
        self.updated_at = now.coerce();
        self.updated_by = Some(actor);
    }

    /// Marks the entity as deleted.
    ///
    /// Calling this on an already deleted entity overwrites the deletion
    /// metadata, so check [`Audit::is_deleted()`] first.
    pub fn soft_delete(&mut self, now: DateTime, actor: user::Id) {
        self.deleted_at = Some(now.coerce());
        self.deleted_by = Some(actor);
    }

    /// Clears the deletion marker of the entity.
    pub fn restore(&mut self) {
        self.deleted_at = None;
        self.deleted_by = None;
    }

    /// Indicates whether the entity is deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl<Of> Copy for Audit<Of> {}
impl<Of> Clone for Audit<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of> Eq for Audit<Of> {}
impl<Of> PartialEq for Audit<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.created_at == other.created_at
            && self.created_by == other.created_by
            && self.updated_at == other.updated_at
            && self.updated_by == other.updated_by
            && self.deleted_at == other.deleted_at
            && self.deleted_by == other.deleted_by
    }
}

impl<Of> fmt::Debug for Audit<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Audit")
            .field("created_at", &self.created_at)
            .field("created_by", &self.created_by)
            .field("updated_at", &self.updated_at)
            .field("updated_by", &self.updated_by)
            .field("deleted_at", &self.deleted_at)
            .field("deleted_by", &self.deleted_by)
            .finish()
    }
}

/// Entity carrying an [`Audit`].
pub trait Audited: Sized {
    /// Returns the [`Audit`] of this entity.
    fn audit(&self) -> &Audit<Self>;

    /// Returns the mutable [`Audit`] of this entity.
    fn audit_mut(&mut self) -> &mut Audit<Self>;

    /// Indicates whether this entity is soft-deleted.
    fn is_deleted(&self) -> bool {
        self.audit().is_deleted()
    }
}

/// Implements [`Audited`] for the provided entities having an `audit` field.
macro_rules! impl_audited {
    ($($ty:ty),* $(,)?) => {$(
        impl $crate::domain::Audited for $ty {
            fn audit(&self) -> &$crate::domain::Audit<Self> {
                &self.audit
            }

            fn audit_mut(&mut self) -> &mut $crate::domain::Audit<Self> {
                &mut self.audit
            }
        }
    )*};
}
pub(crate) use impl_audited;

/// [`DateTime`] when an entity was created.
pub type CreationDateTime<Of> = DateTimeOf<(Of, unit::Creation)>;

/// [`DateTime`] when an entity was modified.
pub type ModificationDateTime<Of> = DateTimeOf<(Of, unit::Modification)>;

/// [`DateTime`] when an entity was deleted.
pub type DeletionDateTime<Of> = DateTimeOf<(Of, unit::Deletion)>;

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::domain::{user, Premises};

    use super::Audit;

    #[test]
    fn soft_delete_then_restore_keeps_creation_data() {
        let actor = user::Id::new();
        let created = DateTime::from_rfc3339("2024-01-01T10:00:00Z").unwrap();
        let deleted = DateTime::from_rfc3339("2024-02-01T10:00:00Z").unwrap();

        let mut audit = Audit::<Premises>::new(created, Some(actor));
        let original = audit;
        assert!(!audit.is_deleted());

        audit.soft_delete(deleted, actor);
        assert!(audit.is_deleted());
        assert_eq!(audit.deleted_at, Some(deleted.coerce()));
        assert_eq!(audit.deleted_by, Some(actor));

        audit.restore();
        assert!(!audit.is_deleted());
        assert_eq!(audit, original);
    }

    #[test]
    fn second_soft_delete_overwrites_timestamp() {
        let actor = user::Id::new();
        let first = DateTime::from_rfc3339("2024-02-01T10:00:00Z").unwrap();
        let second = DateTime::from_rfc3339("2024-03-01T10:00:00Z").unwrap();

        let mut audit = Audit::<Premises>::new(first, None);
        audit.soft_delete(first, actor);
        audit.soft_delete(second, actor);
        assert_eq!(audit.deleted_at, Some(second.coerce()));
    }

    #[test]
    fn touch_records_modifier() {
        let creator = user::Id::new();
        let editor = user::Id::new();
        let created = DateTime::from_rfc3339("2024-01-01T10:00:00Z").unwrap();
        let edited = DateTime::from_rfc3339("2024-01-02T10:00:00Z").unwrap();

        let mut audit = Audit::<Premises>::new(created, Some(creator));
        audit.touch(edited, editor);
        assert_eq!(audit.created_by, Some(creator));
        assert_eq!(audit.updated_at, edited.coerce());
        assert_eq!(audit.updated_by, Some(editor));
    }
}
