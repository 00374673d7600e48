#![allow(clippy::unwrap_used, clippy::expect_used)]

use indexmap::{IndexMap, indexmap};
use problem_details::{ProblemError, ProblemType, RESERVED_EXTENSION_NAMES, UriError, format};
use serde_json::{Value, json};

#[test]
fn construct_blank_type() {
    let problem_type = ProblemType::new(None, "", "", IndexMap::new()).unwrap();
    assert_eq!(problem_type.identifier(), "about:blank");
    assert_eq!(problem_type.title(), "");
    assert_eq!(problem_type.detail(), "");
    assert!(problem_type.extension().is_empty());
    assert_eq!(problem_type.to_string(), "about:blank");
}

// identifier validation

#[test]
fn identifier_must_not_be_empty() {
    let err = ProblemType::new(Some(""), "", "", IndexMap::new()).unwrap_err();
    match err {
        ProblemError::InvalidIdentifier { identifier, reason } => {
            assert_eq!(identifier, "https://example.com");
            assert_eq!(reason, UriError::MissingComponent { component: "path" });
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn identifier_inserts_default_scheme() {
    let problem_type = ProblemType::builder()
        .identifier("//example.com/baz")
        .build()
        .unwrap();
    assert_eq!(problem_type.identifier(), "https://example.com/baz");
}

#[test]
fn identifier_inserts_default_scheme_and_host() {
    for input in ["foo/bar", "/foo/bar"] {
        let identifier = ProblemType::validate_identifier(input).unwrap();
        assert_eq!(identifier, "https://example.com/foo/bar", "{input}");
    }
}

#[test]
fn default_fill_in_for_bare_paths() {
    for path in ["a", "out-of-credit", "errors/validation", "deep/nested/path"] {
        assert_eq!(
            ProblemType::validate_identifier(path).unwrap(),
            format!("https://example.com/{path}")
        );
        assert_eq!(
            ProblemType::validate_identifier(&format!("/{path}")).unwrap(),
            format!("https://example.com/{path}")
        );
    }
}

#[test]
fn normalization_is_idempotent() {
    let inputs = [
        "foo/bar",
        "/foo/bar",
        "//example.com/baz",
        "http://example.com/x?y=1#z",
        "HTTPS://EXAMPLE.COM/Mixed",
        "with space",
        "about:blank",
        "about://EXAMPLE.COM/x",
    ];
    for input in inputs {
        let once = ProblemType::validate_identifier(input).unwrap();
        let twice = ProblemType::validate_identifier(&once).unwrap();
        assert_eq!(once, twice, "{input}");
    }
}

#[test]
fn host_case_does_not_produce_distinct_identifiers() {
    let upper = ProblemType::validate_identifier("about://EXAMPLE.COM/x").unwrap();
    let lower = ProblemType::validate_identifier("about://example.com/x").unwrap();
    assert_eq!(upper, "about://example.com/x");
    assert_eq!(upper, lower);
}

#[test]
fn rejects_unallowed_hostname() {
    let err = ProblemType::validate_identifier("https://foo.bar/baz").unwrap_err();
    assert!(
        err.to_string()
            .ends_with(r#"host was required to be one of ["example.com"] but was "foo.bar""#),
        "{err}"
    );
}

#[test]
fn rejects_every_host_outside_allow_list() {
    for host in ["foo.bar", "example.org", "sub.example.com", "localhost"] {
        let err = ProblemType::validate_identifier(&format!("https://{host}/x")).unwrap_err();
        assert!(
            matches!(err, ProblemError::InvalidIdentifier { .. }),
            "{host}"
        );
    }
}

#[test]
fn rejects_every_scheme_outside_allow_list() {
    for scheme in ["ftp", "mailto", "urn", "file", "ws"] {
        let err =
            ProblemType::validate_identifier(&format!("{scheme}://example.com/x")).unwrap_err();
        assert!(
            matches!(err, ProblemError::InvalidIdentifier { .. }),
            "{scheme}"
        );
    }
}

#[test]
fn rejects_identifier_without_path() {
    let err = ProblemType::validate_identifier("https://example.com").unwrap_err();
    assert!(
        err.to_string().ends_with("path was required but missing"),
        "{err}"
    );
}

// extensions

#[test]
fn extension_is_rejected_if_it_uses_a_reserved_name() {
    for name in RESERVED_EXTENSION_NAMES {
        let err = ProblemType::builder()
            .extension(*name, json!({}))
            .build()
            .unwrap_err();
        assert!(
            matches!(&err, ProblemError::ReservedFieldName { field } if field == name),
            "{name}: {err}"
        );
    }
}

#[test]
fn extension_is_rejected_if_not_valid_json_schema() {
    let err = ProblemType::builder()
        .extension("foo", json!([]))
        .build()
        .unwrap_err();
    assert!(matches!(&err, ProblemError::InvalidSchema { field, .. } if field == "foo"));
    assert!(
        err.to_string()
            .starts_with("Extension for the field 'foo' needs to be a valid JSON schema")
    );
}

#[test]
fn validate_extension_returns_mapping_unchanged() {
    let extension = indexmap! {
        "bar".to_owned() => json!({}),
        "baz".to_owned() => json!({"type": "integer"}),
    };
    let validated = ProblemType::validate_extension(extension.clone()).unwrap();
    assert_eq!(validated, extension);
}

// ordered projection

#[test]
fn convert_type_to_fields() {
    let problem_type = ProblemType::new(
        Some("https://example.com/foo"),
        "Foo problem",
        "Foo fighters attack",
        indexmap! { "bar".to_owned() => json!({}), "baz".to_owned() => json!({}) },
    )
    .unwrap();
    let fields: Vec<(&str, Value)> = problem_type.fields().into_iter().collect();
    assert_eq!(
        fields,
        vec![
            ("identifier", json!("https://example.com/foo")),
            ("title", json!("Foo problem")),
            ("detail", json!("Foo fighters attack")),
            ("extension", json!({"bar": {}, "baz": {}})),
        ]
    );
}

#[test]
fn convert_blank_type_to_json() {
    let value = serde_json::to_value(ProblemType::blank()).unwrap();
    assert_eq!(
        value,
        json!({"identifier": "about:blank", "title": "", "detail": "", "extension": {}})
    );
}

// formatting title and detail

#[test]
fn format_title_simple() {
    let data = indexmap! { "foo".to_owned() => json!("bar baz bam") };
    assert_eq!(format("test {foo}", &data).unwrap(), "test bar baz bam");
}

#[test]
fn format_title_nested() {
    let data = indexmap! { "foo".to_owned() => json!({"bar": "bar baz bam"}) };
    assert_eq!(format("test {foo.bar}", &data).unwrap(), "test bar baz bam");
}

#[test]
fn format_title_raises_error_on_incorrect_nested_key() {
    let data = indexmap! { "foo".to_owned() => json!({"bar": "bar baz bam"}) };
    let err = format("test {foo.baa}", &data).unwrap_err();
    assert!(matches!(&err, ProblemError::MissingTemplateField { field } if field == "baa"));
    assert_eq!(err.to_string(), "Template references a missing field 'baa'");
}
