//! Consistency rules
//!
//! Default-attribute population and completeness checking. Cascading delete
//! lives in [`TagStore::delete_tag`].

use crate::error::Result;
use crate::store::TagStore;
use crate::tag::{Attribute, Tag, TagId};
use std::fmt::{self, Display, Formatter};

/// Fill every attribute that has a default and is currently unset
///
/// Attributes that already hold a value are left alone, so a second call is
/// a no-op. Returns the attributes that were set.
///
/// # Errors
/// [`StoreError::NotFound`](crate::StoreError::NotFound) if `id` is not
/// live, or a persistence failure
pub fn populate_default_attributes(store: &mut TagStore, id: &TagId) -> Result<Vec<Attribute>> {
    let Some(tag) = store.get_tag_by_tid(id) else {
        return Err(crate::StoreError::NotFound(id.clone()));
    };
    let missing: Vec<(String, String)> = tag
        .tag_type()
        .attributes()
        .iter()
        .filter(|a| tag.attribute(a.name()).map_or(true, str::is_empty))
        .filter_map(|a| Some((a.name().to_string(), a.default_value()?.to_string())))
        .collect();
    store.merge_attributes(id, missing)
}

/// Something a tag still needs before it is complete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingField {
    /// Required attribute is empty
    Attribute(String),
    /// Argument slot is unfilled
    Argument(String),
    /// Consuming extent tag owns no span
    Spans,
}

impl Display for MissingField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute(name) => write!(f, "attribute '{name}'"),
            Self::Argument(name) => write!(f, "argument '{name}'"),
            Self::Spans => f.write_str("spans"),
        }
    }
}

/// Fields `tag` is missing, attributes first
#[must_use]
pub fn missing_fields(tag: &Tag) -> Vec<MissingField> {
    let tag_type = tag.tag_type();
    let mut missing: Vec<MissingField> = tag_type
        .required_attributes()
        .filter(|a| tag.attribute(a.name()).map_or(true, str::is_empty))
        .map(|a| MissingField::Attribute(a.name().to_string()))
        .collect();

    match tag {
        Tag::Extent(e) => {
            if e.spans().is_empty() && !tag_type.is_non_consuming() {
                missing.push(MissingField::Spans);
            }
        }
        Tag::Link(l) => missing.extend(
            l.unfilled_arguments()
                .map(|name| MissingField::Argument(name.to_string())),
        ),
    }
    missing
}

/// Check if `tag` has every required attribute and argument
#[inline]
#[must_use]
pub fn is_complete(tag: &Tag) -> bool {
    missing_fields(tag).is_empty()
}

/// Incomplete tags of a store, in id order
#[must_use]
pub fn check_completeness(store: &TagStore) -> Vec<&Tag> {
    store.tags().filter(|t| !is_complete(t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use std::sync::Arc;
    use tagbench_schema::{AttributeDefinition, SchemaDefinition, TagTypeDefinition};
    use tagbench_span::Span;

    fn store() -> TagStore {
        let schema = SchemaDefinition::new("ner")
            .tag(
                TagTypeDefinition::extent("PERSON")
                    .attribute(AttributeDefinition::new("role").with_default("subject").required())
                    .attribute(AttributeDefinition::new("note")),
            )
            .tag(TagTypeDefinition::link("RELATION").argument("arg1").argument("arg2"))
            .build()
            .unwrap();
        TagStore::new(Arc::new(schema), Document::new("doc.txt", "John met Mary"))
    }

    fn person(store: &mut TagStore) -> TagId {
        let t = store.schema().type_by_name("PERSON").unwrap();
        let id = store.next_id(&t);
        store
            .create_extent_tag(id.clone(), &t, None, Some(&[Span::new(0, 4).unwrap()]))
            .unwrap();
        id
    }

    #[test]
    fn defaults_fill_unset_only() {
        let mut s = store();
        let id = person(&mut s);
        let set = populate_default_attributes(&mut s, &id).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].value, "subject");

        let role = s.schema().attribute_type("PERSON", "role").unwrap().clone();
        s.add_attribute(&id, &role, "object").unwrap();
        assert!(populate_default_attributes(&mut s, &id).unwrap().is_empty());
        assert_eq!(s.get_tag_by_tid(&id).unwrap().attribute("role"), Some("object"));
    }

    #[test]
    fn defaults_are_idempotent() {
        let mut s = store();
        let id = person(&mut s);
        populate_default_attributes(&mut s, &id).unwrap();
        let once = s.get_tag_by_tid(&id).unwrap().clone();
        populate_default_attributes(&mut s, &id).unwrap();
        assert_eq!(s.get_tag_by_tid(&id).unwrap(), &once);
    }

    #[test]
    fn required_attribute_drives_completeness() {
        let mut s = store();
        let id = person(&mut s);
        let tag = s.get_tag_by_tid(&id).unwrap();
        assert_eq!(missing_fields(tag), vec![MissingField::Attribute("role".into())]);

        populate_default_attributes(&mut s, &id).unwrap();
        assert!(check_completeness(&s).is_empty());
    }

    #[test]
    fn link_lists_unfilled_slots() {
        let mut s = store();
        let rel = s.schema().type_by_name("RELATION").unwrap();
        let link = s.create_link_tag(TagId::new("R1"), &rel).unwrap();
        let tag = s.get_tag_by_tid(link.id()).unwrap();
        assert_eq!(
            missing_fields(tag),
            vec![
                MissingField::Argument("arg1".into()),
                MissingField::Argument("arg2".into())
            ]
        );
        assert_eq!(MissingField::Argument("arg1".into()).to_string(), "argument 'arg1'");
    }
}
