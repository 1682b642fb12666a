use pretty_assertions::assert_eq;
use vista::prelude::*;

use crate::common::{world, Holder};

#[test]
fn instance_descriptor_beats_self_description_and_declaration() {
    let w = world();
    let holder = Holder::new("gear");
    w.registry
        .attach_descriptor(&holder.part, Descriptor::new("Pinned part"))
        .unwrap();
    let root = w.root("holder", Value::shared(holder.clone()));

    let part = root.child("Part").unwrap().unwrap();
    part.value().unwrap();
    assert_eq!(part.header(), "Pinned part");

    w.registry.detach_descriptor(&holder.part).unwrap();
    part.refresh().unwrap();
    assert_eq!(part.header(), "gear (self-described)");
}

#[test]
fn declaration_applies_without_a_value() {
    let w = world();
    let root = w.root("holder", Value::shared(Holder::new("gear")));
    let spare = root.child("Spare").unwrap().unwrap();
    assert_eq!(spare.value().unwrap(), Value::Void);
    assert_eq!(spare.header(), "Spare part");
}

#[test]
fn hidden_members_stay_hidden() {
    let w = world();
    let root = w.root("holder", Value::shared(Holder::new("gear")));
    let names: Vec<Option<String>> = root
        .children()
        .unwrap()
        .iter()
        .map(ObjectNode::name)
        .collect();
    assert_eq!(
        names,
        vec![
            Some("Part".to_string()),
            Some("Spare".to_string()),
            Some("Locked".to_string()),
        ]
    );
    assert!(root.child("Internal").unwrap().is_none());
}
