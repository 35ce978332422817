use pretty_assertions::assert_eq;
use proptest::prelude::*;

use tfvar_gen::ast::{Field, Source, Type, TypeKind};
use tfvar_gen::ir::{Primitive, RecordDefinition, TypeExpr};
use tfvar_gen::lower::{BuilderOptions, Entity, RecordBuilder, Variable, pascal};
use tfvar_gen::{Error, build_records, parse_type};

struct Decl {
    name: &'static str,
    required: bool,
    source: Source,
}

fn decl(name: &'static str, ty: &str, required: bool) -> Decl {
    Decl { name, required, source: Source::new(name, ty) }
}

fn entity<'a>(name: &str, decls: &'a [Decl]) -> Entity<'a> {
    Entity {
        name: name.to_string(),
        variables: decls
            .iter()
            .map(|d| Variable {
                name: d.name.to_string(),
                description: format!("The {}.", d.name),
                required: d.required,
                ty: parse_type(&d.source).expect("parse_type failed"),
            })
            .collect(),
    }
}

fn string() -> TypeExpr {
    TypeExpr::Primitive(Primitive::String)
}

fn boolean() -> TypeExpr {
    TypeExpr::Primitive(Primitive::Bool)
}

fn nullable(t: TypeExpr) -> TypeExpr {
    TypeExpr::Nullable(Box::new(t))
}

fn names(records: &[RecordDefinition]) -> Vec<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
}

#[test]
fn my_queue_record() {
    let decls = [decl("name", "string", true), decl("tags", "map(string)", false)];
    let records = build_records(&[entity("my_queue", &decls)], &[]).unwrap();

    assert_eq!(names(&records), ["MyQueue"]);
    let queue = &records[0];
    assert_eq!(queue.fields.len(), 2);

    let name = queue.field("Name").unwrap();
    assert_eq!(name.ty, string());
    assert_eq!(name.description, "The name.");

    let tags = queue.field("Tags").unwrap();
    assert_eq!(tags.ty, nullable(TypeExpr::Map(Box::new(string()))));
}

#[test]
fn top_level_tags_use_the_variable_name() {
    let decls = [decl("queue_name", "string", true)];
    let records = build_records(&[entity("q", &decls)], &[]).unwrap();
    let field = records[0].field("QueueName").unwrap();
    let tags: Vec<(&str, &str)> = field.tags.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(tags, [("json", "queue_name"), ("yaml", "queue_name"), ("hcl", "queue_name")]);
}

#[test]
fn scalar_mapping() {
    let decls = [
        decl("s", "string", true),
        decl("b", "bool", true),
        decl("n", "number", true),
        decl("z", "null", true),
        decl("a", "any", true),
    ];
    let records = build_records(&[entity("m", &decls)], &[]).unwrap();
    let types: Vec<_> = records[0].fields.iter().map(|f| f.ty.clone()).collect();
    assert_eq!(
        types,
        [
            string(),
            boolean(),
            // numbers travel as text
            string(),
            TypeExpr::Primitive(Primitive::Any),
            TypeExpr::Primitive(Primitive::Any),
        ]
    );
}

#[test]
fn optional_type_is_nullable_even_when_declared_required() {
    let decls = [decl("ttl", "optional(number)", true)];
    let records = build_records(&[entity("m", &decls)], &[]).unwrap();
    assert_eq!(records[0].fields[0].ty, nullable(string()));
}

#[test]
fn nullable_is_never_doubled() {
    let decls = [decl("ttl", "optional(optional(number))", false)];
    let records = build_records(&[entity("m", &decls)], &[]).unwrap();
    assert_eq!(records[0].fields[0].ty, nullable(string()));
}

#[test]
fn nested_objects_become_records() {
    let decls = [decl(
        "cache_policy",
        "object({
            cookie_behavior = string
            cookie_items    = optional(list(string))
            headers         = object({ names = list(string) })
        })",
        true,
    )];
    let records = build_records(&[entity("cdn", &decls)], &[]).unwrap();

    assert_eq!(names(&records), ["Cdn", "CdnCachePolicy", "CdnCachePolicyHeaders"]);
    assert_eq!(
        records[0].field("CachePolicy").unwrap().ty,
        TypeExpr::Record("CdnCachePolicy".to_string())
    );

    let policy = &records[1];
    let behavior = policy.field("CookieBehavior").unwrap();
    assert_eq!(behavior.ty, string());
    assert_eq!(behavior.description, "");
    let keys: Vec<&str> = behavior.tags.keys().map(String::as_str).collect();
    assert_eq!(keys, ["json", "yaml", "cty"]);
    assert_eq!(behavior.tags["cty"], "cookie_behavior");

    assert_eq!(
        policy.field("CookieItems").unwrap().ty,
        nullable(TypeExpr::List(Box::new(string())))
    );
    assert_eq!(
        policy.field("Headers").unwrap().ty,
        TypeExpr::Record("CdnCachePolicyHeaders".to_string())
    );
    assert_eq!(
        records[2].field("Names").unwrap().ty,
        TypeExpr::List(Box::new(string()))
    );
}

#[test]
fn list_of_objects_is_named_after_the_field() {
    let decls = [decl(
        "rules",
        "optional(list(object({ id = string  put_events = bool })))",
        false,
    )];
    let records = build_records(&[entity("event_bus", &decls)], &[]).unwrap();
    assert_eq!(names(&records), ["EventBus", "EventBusRules"]);
    assert_eq!(
        records[0].fields[0].ty,
        nullable(TypeExpr::List(Box::new(TypeExpr::Record("EventBusRules".to_string()))))
    );
    assert_eq!(records[1].field("PutEvents").unwrap().ty, boolean());
}

#[test]
fn ignore_list_is_case_insensitive_and_top_level_only() {
    let decls = [
        decl("name", "string", true),
        decl("tags", "map(string)", false),
        decl("settings", "object({ tags = list(string) })", true),
    ];
    let ignore = vec!["TAGS".to_string()];
    let records = build_records(&[entity("my_queue", &decls)], &ignore).unwrap();

    let top: Vec<&str> = records[0].fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(top, ["Name", "Settings"]);
    assert!(records[1].field("Tags").is_some());
}

#[test]
fn nested_records_of_different_entities_do_not_collide() {
    let a = [decl("config", "object({ x = string })", true)];
    let b = [decl("config", "object({ y = bool })", true)];
    let records = build_records(&[entity("alpha", &a), entity("beta", &b)], &[]).unwrap();
    assert_eq!(names(&records), ["Alpha", "AlphaConfig", "Beta", "BetaConfig"]);
}

#[test]
fn builder_options_override_tag_sets() {
    let decls = [decl("settings", "object({ port = number })", true)];
    let mut builder = RecordBuilder::new(BuilderOptions {
        top_level_tags: vec!["toml".to_string()],
        nested_tags: vec!["msgpack".to_string()],
        ..BuilderOptions::default()
    });
    builder.add_entity(&entity("svc", &decls)).unwrap();
    let records = builder.finish();
    assert_eq!(records[0].fields[0].tags.keys().collect::<Vec<_>>(), ["toml"]);
    assert_eq!(records[1].fields[0].tags.keys().collect::<Vec<_>>(), ["msgpack"]);
}

#[test]
fn list_without_element_is_unsupported() {
    let mut broken = Type::list(Type::scalar("string", TypeKind::String));
    broken.elem = None;
    let e = Entity {
        name: "m".to_string(),
        variables: vec![Variable {
            name: "items".to_string(),
            description: String::new(),
            required: true,
            ty: broken,
        }],
    };
    let err = build_records(&[e], &[]).unwrap_err();
    assert!(matches!(&err, Error::UnsupportedType { name, .. } if name == "list"));
    assert_eq!(err.to_string(), "unsupported type: list");
}

#[test]
fn scalar_with_fields_is_unsupported() {
    let mut broken = Type::scalar("string", TypeKind::String);
    broken.fields.push(Field::new("x", Type::scalar("bool", TypeKind::Boolean)));
    let inner = Type::object(vec![Field::new("broken", broken)]);
    let e = Entity {
        name: "m".to_string(),
        variables: vec![Variable {
            name: "v".to_string(),
            description: String::new(),
            required: true,
            ty: inner,
        }],
    };
    assert!(matches!(build_records(&[e], &[]), Err(Error::UnsupportedType { .. })));
}

#[test]
fn failed_entity_leaves_no_records_behind() {
    let good = [decl("name", "string", true)];
    let mut broken = Type::map(Type::scalar("string", TypeKind::String));
    broken.elem = None;
    let bad = Entity {
        name: "bad".to_string(),
        variables: vec![Variable {
            name: "labels".to_string(),
            description: String::new(),
            required: true,
            ty: Type::object(vec![Field::new("labels", broken)]),
        }],
    };

    let mut builder = RecordBuilder::new(BuilderOptions::default());
    builder.add_entity(&entity("good", &good)).unwrap();
    assert!(builder.add_entity(&bad).is_err());
    assert_eq!(names(builder.records()), ["Good"]);
}

#[test]
fn colliding_names_are_rejected() {
    let a = [decl("config", "object({ x = string })", true)];
    let b = [decl("name", "string", true)];
    let err = build_records(&[entity("x", &a), entity("x_config", &b)], &[]).unwrap_err();
    assert!(matches!(err, Error::DuplicateRecord { name } if name == "XConfig"));
}

#[test]
fn variables_sharing_a_field_name_are_rejected() {
    let decls = [decl("a_b", "string", true), decl("aB", "bool", false)];
    let err = build_records(&[entity("m", &decls)], &[]).unwrap_err();
    assert!(matches!(&err, Error::DuplicateField { record, field } if record == "M" && field == "AB"));
    assert_eq!(err.to_string(), "duplicate field AB in record M");
}

#[test]
fn object_fields_sharing_a_field_name_are_rejected() {
    let decls = [decl("settings", "object({ max_size = number  max-size = string })", true)];
    let err = build_records(&[entity("m", &decls)], &[]).unwrap_err();
    assert!(matches!(err, Error::DuplicateField { record, field } if record == "MSettings" && field == "MaxSize"));
}

#[test]
fn scalar_constructor_with_a_container_kind_is_unsupported() {
    let e = Entity {
        name: "m".to_string(),
        variables: vec![Variable {
            name: "items".to_string(),
            description: String::new(),
            required: true,
            ty: Type::scalar("list", TypeKind::List),
        }],
    };
    assert!(matches!(build_records(&[e], &[]), Err(Error::UnsupportedType { name, .. }) if name == "list"));
}

#[test]
fn pascal_names() {
    assert_eq!(pascal("my_queue"), "MyQueue");
    assert_eq!(pascal("name"), "Name");
    assert_eq!(pascal("event-bus"), "EventBus");
}

proptest! {
    #[test]
    fn record_names_are_unique(
        entities in prop::collection::btree_set("[a-z]{1,8}", 1..4),
        fields in prop::collection::btree_set("[a-z]{1,8}", 1..4),
    ) {
        let body = fields
            .iter()
            .map(|f| format!("{f} = object({{ inner = object({{ leaf = string }}) }})"))
            .collect::<Vec<_>>()
            .join("\n");
        let sources: Vec<Source> = entities
            .iter()
            .map(|e| Source::new(e.clone(), format!("object({{ {body} }})")))
            .collect();
        let parsed: Vec<Entity<'_>> = sources
            .iter()
            .map(|src| Entity {
                name: src.name.clone(),
                variables: vec![Variable {
                    name: "config".to_string(),
                    description: String::new(),
                    required: true,
                    ty: parse_type(src).unwrap(),
                }],
            })
            .collect();

        let records = build_records(&parsed, &[]).unwrap();
        let mut seen = std::collections::HashSet::new();
        for r in &records {
            prop_assert!(seen.insert(r.name.clone()), "duplicate {}", r.name);
        }
        // entity + config + per field (object + inner)
        prop_assert_eq!(records.len(), entities.len() * (2 + 2 * fields.len()));
    }
}
