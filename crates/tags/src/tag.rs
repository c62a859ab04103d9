use serde::{Deserialize, Serialize};

use storefront_core::{ContentType, DomainResult, Entity, RecordId, validate};

use crate::APP_LABEL;

storefront_core::record_id!(
    /// Tag identifier.
    TagId,
    "TagId"
);
storefront_core::record_id!(
    /// Tagged item identifier.
    TaggedItemId,
    "TaggedItemId"
);

/// A free-form label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub label: String,
}

impl Tag {
    pub fn validate(&self) -> DomainResult<()> {
        validate::char_field("tag.label", &self.label)
    }
}

impl Entity for Tag {
    type Id = TagId;
    const APP_LABEL: &'static str = APP_LABEL;
    const MODEL: &'static str = "tag";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTag {
    pub label: String,
}

impl NewTag {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate::char_field("tag.label", &self.label)
    }
}

/// Untyped reference to a row of any entity type.
///
/// Nothing checks that the row exists, now or later: dereference only after
/// confirming it through the owning component.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub content_type: ContentType,
    pub object_id: RecordId,
}

impl ObjectRef {
    pub fn new(content_type: ContentType, object_id: impl Into<RecordId>) -> Self {
        Self {
            content_type,
            object_id: object_id.into(),
        }
    }

    /// Reference to an entity instance.
    pub fn to<E: Entity>(entity: &E) -> Self {
        Self {
            content_type: ContentType::of::<E>(),
            object_id: entity.object_id(),
        }
    }

    /// Reference to an entity by id alone.
    pub fn to_id<E: Entity>(id: E::Id) -> Self {
        Self {
            content_type: ContentType::of::<E>(),
            object_id: id.into(),
        }
    }

    pub fn is<E: Entity>(&self) -> bool {
        self.content_type.is::<E>()
    }
}

impl core::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}#{}", self.content_type, self.object_id)
    }
}

/// Applies a tag to the row named by `(content_type, object_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedItem {
    pub id: TaggedItemId,
    pub tag: TagId,
    pub content_type: ContentType,
    pub object_id: RecordId,
}

impl TaggedItem {
    pub fn target(&self) -> ObjectRef {
        ObjectRef::new(self.content_type.clone(), self.object_id)
    }

    pub fn points_at(&self, target: &ObjectRef) -> bool {
        self.content_type == target.content_type && self.object_id == target.object_id
    }
}

impl Entity for TaggedItem {
    type Id = TaggedItemId;
    const APP_LABEL: &'static str = APP_LABEL;
    const MODEL: &'static str = "taggeditem";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    storefront_core::record_id!(VideoId, "VideoId");

    /// Stand-in for an entity this crate knows nothing about.
    struct Video {
        id: VideoId,
    }

    impl Entity for Video {
        type Id = VideoId;
        const APP_LABEL: &'static str = "media";
        const MODEL: &'static str = "video";

        fn id(&self) -> &Self::Id {
            &self.id
        }
    }

    #[test]
    fn object_ref_names_foreign_entities() {
        let video = Video {
            id: VideoId::from_raw(12).unwrap(),
        };
        let target = ObjectRef::to(&video);
        assert!(target.is::<Video>());
        assert!(!target.is::<Tag>());
        assert_eq!(target.to_string(), "media.video#12");
        assert_eq!(target, ObjectRef::to_id::<Video>(video.id));
    }

    #[test]
    fn tagged_item_points_at_its_target() {
        let target = ObjectRef::new(ContentType::new("media", "video"), RecordId::FIRST);
        let item = TaggedItem {
            id: TaggedItemId::from_raw(1).unwrap(),
            tag: TagId::from_raw(1).unwrap(),
            content_type: target.content_type.clone(),
            object_id: target.object_id,
        };
        assert!(item.points_at(&target));
        assert_eq!(item.target(), target);

        let other = ObjectRef::new(ContentType::new("media", "image"), RecordId::FIRST);
        assert!(!item.points_at(&other));
    }

    #[test]
    fn tag_label_is_required() {
        assert!(NewTag::new(" ").validate().is_err());
        assert!(NewTag::new("sale").validate().is_ok());
    }
}
