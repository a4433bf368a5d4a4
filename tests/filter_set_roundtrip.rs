use firefly_filter::filter::{ColumnDef, FilterCondition, FilterOp, FilterSet, parse_conditions};

fn catalog_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("ra").with_title("RA"),
        ColumnDef::new("dec").with_title("Dec"),
        ColumnDef::new("mag"),
        ColumnDef::new("name"),
        ColumnDef::new("band").with_enums(["J", "H", "K"]),
    ]
}

#[test]
fn wire_list_restores_the_same_column_text() {
    let mut view = FilterSet::new(&catalog_columns());
    view.set_column_text("mag", "> 12345");
    view.set_column_text("name", "foo,bar");
    view.set_column_text("ra", "> 100; < 200");

    let wire = view
        .get_filters(false)
        .expect("all columns should validate");
    assert_eq!(
        wire,
        vec!["ra > 100", "ra < 200", "mag > 12345", "name IN (foo,bar)"]
    );

    let mut restored = FilterSet::new(&catalog_columns());
    restored.set_filters(&wire);
    assert_eq!(restored.column("mag").unwrap().raw_text(), "> 12345");
    assert_eq!(restored.column("ra").unwrap().raw_text(), "> 100; < 200");
    assert_eq!(restored.column("name").unwrap().raw_text(), "IN (foo,bar)");
    assert_eq!(restored.get_filters(false).unwrap(), wire);
}

#[test]
fn every_parsed_condition_survives_serialization() {
    for text in ["> 12345", "! 3000", "IN a,b,c,d", "LIKE m31", "<= 1.5; >= -1.5", "x,y"] {
        for cond in parse_conditions(text).unwrap() {
            let wire = cond.serialize("col");
            let remainder = wire.strip_prefix("col ").unwrap();
            assert_eq!(parse_conditions(remainder).unwrap(), vec![cond]);
        }
    }
}

#[test]
fn unrendered_columns_keep_their_filters() {
    let mut view = FilterSet::new(&catalog_columns());
    view.set_filters(["secretcol > 1", "#bcdid IN (1,2,3)", "dec < -30"]);

    assert_eq!(
        view.get_filters(true).unwrap(),
        vec!["dec < -30", "secretcol > 1", "#bcdid IN (1,2,3)"]
    );

    // Drop "dec" from the view and bring "secretcol" in.
    let mut columns = catalog_columns();
    columns.retain(|c| c.name != "dec");
    columns.push(ColumnDef::new("secretcol"));
    view.set_columns(&columns);

    assert_eq!(view.column("secretcol").unwrap().conditions(), &[FilterCondition::scalar(FilterOp::Gt, "1")]);
    assert_eq!(view.hidden_filters(), &["dec < -30".to_string()]);
    assert_eq!(
        view.get_filters(true).unwrap(),
        vec!["secretcol > 1", "dec < -30", "#bcdid IN (1,2,3)"]
    );
}

#[test]
fn one_bad_column_blocks_submission_only_until_fixed() {
    let mut view = FilterSet::new(&catalog_columns());
    view.set_column_text("ra", "> ");
    view.set_column_text("dec", "> 5");

    assert_eq!(view.get_filters(true), None);
    assert_eq!(view.invalid_columns(), vec!["ra"]);
    assert!(view.column("dec").unwrap().is_valid());

    view.set_column_text("ra", "");
    assert_eq!(view.get_filters(true).unwrap(), vec!["dec > 5"]);
}

#[test]
fn hidden_columns_are_cleared_before_submission() {
    let mut view = FilterSet::new(&catalog_columns());
    view.set_enum_selection("band", &["H", "K"]);
    view.set_column_text("mag", "< 20");
    view.set_column_visible("band", false);

    assert!(view.clear_hidden_filters());
    assert_eq!(view.get_filters(false).unwrap(), vec!["mag < 20"]);
    assert_eq!(view.num_filters(), 1);
}
