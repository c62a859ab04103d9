//! Tags and generic tagged items.
//!
//! A tagged item only knows its target as an [`ObjectRef`]. The target is not
//! checked when the item is created, and deleting the target leaves the item
//! behind; callers use [`Database::object_exists`] before dereferencing.

use tracing::debug;

use storefront_core::Entity;
use storefront_tags::{NewTag, ObjectRef, Tag, TagId, TaggedItem, TaggedItemId};

use super::{Database, DbError, DbResult, Deleted, require};

impl Database {
    pub fn insert_tag(&self, new: NewTag) -> DbResult<Tag> {
        new.validate()?;
        let mut tables = self.write()?;
        let tag = tables.tags.insert_with(|id| Tag {
            id,
            label: new.label,
        })?;
        debug!(table = Tag::MODEL, id = %tag.id, "row inserted");
        Ok(tag)
    }

    pub fn tag(&self, id: TagId) -> DbResult<Option<Tag>> {
        Ok(self.read()?.tags.get(&id).cloned())
    }

    pub fn tags(&self) -> DbResult<Vec<Tag>> {
        Ok(self.read()?.tags.values().cloned().collect())
    }

    /// First tag with the label, by id. Labels are not unique.
    pub fn tag_by_label(&self, label: &str) -> DbResult<Option<Tag>> {
        Ok(self
            .read()?
            .tags
            .values()
            .find(|t| t.label == label)
            .cloned())
    }

    /// Removes the tag and every application of it.
    pub fn delete_tag(&self, id: TagId) -> DbResult<Deleted> {
        let mut tables = self.write()?;
        if !tables.tags.contains(&id) {
            return Err(DbError::not_found::<Tag>(id));
        }

        let mut deleted = Deleted::default();
        deleted.record::<TaggedItem>(tables.tagged_items.remove_where(|t| t.tag == id));
        tables.tags.remove(&id);
        deleted.record::<Tag>(1);
        debug!(table = Tag::MODEL, %id, cascaded = deleted.total() - 1, "row deleted");
        Ok(deleted)
    }

    /// Apply a tag to any row. Tagging the same target twice returns the
    /// existing item.
    pub fn tag_object(&self, tag: TagId, target: ObjectRef) -> DbResult<TaggedItem> {
        let mut tables = self.write()?;
        require(&tables.tags, tag, TaggedItem::MODEL, "tag")?;

        if let Some(existing) = tables
            .tagged_items
            .values()
            .find(|t| t.tag == tag && t.points_at(&target))
        {
            return Ok(existing.clone());
        }
        let item = tables.tagged_items.insert_with(|id| TaggedItem {
            id,
            tag,
            content_type: target.content_type,
            object_id: target.object_id,
        })?;
        debug!(table = TaggedItem::MODEL, id = %item.id, target = %item.target(), "row inserted");
        Ok(item)
    }

    pub fn tag_entity<E: Entity>(&self, tag: TagId, entity: &E) -> DbResult<TaggedItem> {
        self.tag_object(tag, ObjectRef::to(entity))
    }

    /// Returns whether an item was removed.
    pub fn untag_object(&self, tag: TagId, target: &ObjectRef) -> DbResult<bool> {
        let mut tables = self.write()?;
        let removed = tables
            .tagged_items
            .remove_where(|t| t.tag == tag && t.points_at(target));
        if removed > 0 {
            debug!(table = TaggedItem::MODEL, %tag, %target, "row deleted");
        }
        Ok(removed > 0)
    }

    /// Tags applied to the target, by tag id. Works for targets that no longer exist.
    pub fn tags_for(&self, target: &ObjectRef) -> DbResult<Vec<Tag>> {
        let tables = self.read()?;
        let mut ids: Vec<TagId> = tables
            .tagged_items
            .values()
            .filter(|t| t.points_at(target))
            .map(|t| t.tag)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids
            .into_iter()
            .filter_map(|id| tables.tags.get(&id).cloned())
            .collect())
    }

    pub fn tags_for_entity<E: Entity>(&self, entity: &E) -> DbResult<Vec<Tag>> {
        self.tags_for(&ObjectRef::to(entity))
    }

    /// Targets carrying the tag, in tagged-item order.
    pub fn objects_tagged(&self, tag: TagId) -> DbResult<Vec<ObjectRef>> {
        let tables = self.read()?;
        if !tables.tags.contains(&tag) {
            return Err(DbError::not_found::<Tag>(tag));
        }
        Ok(tables
            .tagged_items
            .values()
            .filter(|t| t.tag == tag)
            .map(TaggedItem::target)
            .collect())
    }

    pub fn tagged_item(&self, id: TaggedItemId) -> DbResult<Option<TaggedItem>> {
        Ok(self.read()?.tagged_items.get(&id).cloned())
    }

    pub fn tagged_items(&self) -> DbResult<Vec<TaggedItem>> {
        Ok(self.read()?.tagged_items.values().cloned().collect())
    }

    pub fn delete_tagged_item(&self, id: TaggedItemId) -> DbResult<Deleted> {
        let mut tables = self.write()?;
        if tables.tagged_items.remove(&id).is_none() {
            return Err(DbError::not_found::<TaggedItem>(id));
        }
        let mut deleted = Deleted::default();
        deleted.record::<TaggedItem>(1);
        debug!(table = TaggedItem::MODEL, %id, "row deleted");
        Ok(deleted)
    }
}
