use proptest::prelude::*;
use rowbind::{BindingConfiguration, ColumnSet, FieldInfo, FieldKind, Value, ValueRow, resolve};

fn primitive(names: &[&'static str]) -> Vec<FieldInfo<'static>> {
    names
        .iter()
        .map(|name| FieldInfo::new(*name, FieldKind::Primitive))
        .collect()
}

#[test]
fn stripping_convention_matches_separated_columns_only_when_enabled() {
    let columns = ColumnSet::from_names(["USER_ID", "NAME"]);
    let fields = primitive(&["UserId", "Name"]);

    let on = resolve(
        &columns,
        fields.clone(),
        &BindingConfiguration::new().with_stripping_convention(true),
    );
    let off = resolve(&columns, fields, &BindingConfiguration::default());

    assert_eq!(on.column_for("UserId"), Some("USER_ID"));
    assert_eq!(off.column_for("UserId"), None);
    assert_eq!(on.column_for("Name"), Some("NAME"));
    assert_eq!(off.column_for("Name"), Some("NAME"));
}

#[test]
fn explicit_binding_replaces_convention_match() {
    let columns = ColumnSet::from_names(["NAME", "FULL_NAME"]);
    let config = BindingConfiguration::new().bind("Name", "FULL_NAME");

    let mapping = resolve(&columns, primitive(&["Name"]), &config);

    assert_eq!(mapping.column_for("Name"), Some("FULL_NAME"));
}

#[test]
fn explicit_binding_is_trusted_without_a_matching_column() {
    let columns = ColumnSet::from_names(["ID"]);
    let config = BindingConfiguration::new().bind("Nickname", "ALIAS");

    let mapping = resolve(&columns, primitive(&["Id", "Nickname"]), &config);

    assert_eq!(mapping.column_for("Nickname"), Some("ALIAS"));
    assert_eq!(mapping.len(), 2);
}

#[test]
fn explicit_binding_for_undeclared_field_is_dropped() {
    let columns = ColumnSet::from_names(["ID"]);
    let config = BindingConfiguration::new().bind("Ghost", "ID");

    let mapping = resolve(&columns, primitive(&["Id"]), &config);

    assert!(!mapping.contains_field("Ghost"));
}

#[test]
fn ignored_field_is_absent_even_when_bound_and_present() {
    let columns = ColumnSet::from_names(["ID", "AGE"]);
    let config = BindingConfiguration::new().ignore("Age").bind("Age", "AGE");

    let mapping = resolve(&columns, primitive(&["Id", "Age"]), &config);

    assert!(!mapping.contains_field("Age"));
    assert_eq!(mapping.column_for("Id"), Some("ID"));
}

#[test]
fn unresolvable_fields_are_omitted() {
    let columns = ColumnSet::from_names(["ID", "NAME"]);

    let mapping = resolve(
        &columns,
        primitive(&["Id", "Name", "Age"]),
        &BindingConfiguration::default(),
    );

    assert_eq!(mapping.len(), 2);
    assert!(!mapping.contains_field("Age"));
}

#[test]
fn canonical_collisions_resolve_to_last_column() {
    let row = ValueRow::from_pairs([("id", Value::Int(1)), ("Id", Value::Int(2))]);
    let columns = ColumnSet::from_row(&row);

    let mapping = resolve(&columns, primitive(&["ID"]), &BindingConfiguration::default());

    assert_eq!(mapping.column_for("ID"), Some("Id"));
}

proptest! {
    #[test]
    fn exact_case_folded_matches_resolve_under_either_convention(
        name in "[A-Za-z][A-Za-z0-9_]{0,12}",
        noise in proptest::collection::vec("[A-Za-z][A-Za-z0-9_]{0,12}", 0..6),
        strip in any::<bool>(),
    ) {
        let column = name.to_uppercase();
        let mut names = noise.clone();
        names.push(column.clone());
        let columns = ColumnSet::from_names(&names);
        let config = BindingConfiguration::new().with_stripping_convention(strip);

        let mapping = resolve(&columns, [FieldInfo::new(&name, FieldKind::Primitive)], &config);

        prop_assert_eq!(mapping.column_for(&name), Some(column.as_str()));
    }
}
