//! Entity trait: identity + the content type that names the entity's table.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::id::RecordId;

/// Names an entity type: the owning app plus the model name (e.g. `store.product`).
///
/// Generic associations reference rows through a `(ContentType, RecordId)` pair
/// instead of a typed foreign key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentType {
    pub app_label: Cow<'static, str>,
    pub model: Cow<'static, str>,
}

impl ContentType {
    pub const fn new(app_label: &'static str, model: &'static str) -> Self {
        Self {
            app_label: Cow::Borrowed(app_label),
            model: Cow::Borrowed(model),
        }
    }

    /// Content type of an entity type.
    pub fn of<E: Entity>() -> Self {
        Self::new(E::APP_LABEL, E::MODEL)
    }

    pub fn is<E: Entity>(&self) -> bool {
        self.app_label == E::APP_LABEL && self.model == E::MODEL
    }
}

impl core::fmt::Display for ContentType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}", self.app_label, self.model)
    }
}

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + Into<RecordId>;

    /// App that owns the entity's table.
    const APP_LABEL: &'static str;

    /// Lowercase model name.
    const MODEL: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    fn content_type() -> ContentType
    where
        Self: Sized,
    {
        ContentType::of::<Self>()
    }

    /// Untyped identifier, for generic associations.
    fn object_id(&self) -> RecordId {
        (*self.id()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::record_id!(NoteId, "NoteId");

    struct Note {
        id: NoteId,
    }

    impl Entity for Note {
        type Id = NoteId;
        const APP_LABEL: &'static str = "notes";
        const MODEL: &'static str = "note";

        fn id(&self) -> &Self::Id {
            &self.id
        }
    }

    #[test]
    fn content_type_names_app_and_model() {
        let ct = Note::content_type();
        assert_eq!(ct.to_string(), "notes.note");
        assert!(ct.is::<Note>());
        assert_ne!(ct, ContentType::new("notes", "other"));
    }

    #[test]
    fn object_id_is_the_untyped_id() {
        let note = Note {
            id: NoteId::from_raw(9).unwrap(),
        };
        assert_eq!(note.object_id().get(), 9);
    }
}
