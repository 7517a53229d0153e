//! End-to-end grammar coverage for locator parsing.

use pinpoint_locator::{Locator, LocatorError};

/// Asserts the full parse outcome: single-value flag, single value, and the
/// dimension name/value sequence (a name may repeat for multi-values).
fn check(text: &str, single_value: Option<&str>, dimensions: &[(&str, &str)]) {
    let mut locator = Locator::new(text).unwrap_or_else(|e| panic!("{text:?} failed: {e}"));
    assert_eq!(locator.is_single_value(), single_value.is_some(), "{text:?}");
    assert_eq!(locator.single_value(), single_value, "{text:?}");

    let mut expected: Vec<(String, Vec<String>)> = Vec::new();
    for (name, value) in dimensions {
        if let Some(entry) = expected.iter_mut().find(|entry| entry.0 == *name) {
            entry.1.push(value.to_string());
        } else {
            expected.push((name.to_string(), vec![value.to_string()]));
        }
    }
    assert_eq!(locator.dimension_count(), expected.len(), "{text:?}");
    for (name, values) in expected {
        assert_eq!(locator.values_of(&name), values, "{text:?} / {name}");
    }
}

fn check_error(text: &str) -> LocatorError {
    match Locator::new(text) {
        Ok(_) => panic!("{text:?} should not parse"),
        Err(e) => e,
    }
}

#[test]
fn single_values() {
    check("abc", Some("abc"), &[]);
    check("123", Some("123"), &[]);
    check("$any", Some("$any"), &[]);
    check("aaa(x", Some("aaa(x"), &[]);
    check("$base64", Some("$base64"), &[]);
}

#[test]
fn simple_dimensions() {
    check("name:1Vasiliy", None, &[("name", "1Vasiliy")]);
    check("age:15", None, &[("age", "15")]);
    check(
        "name:Bob:32,age:2,mood:permissive",
        None,
        &[("name", "Bob:32"), ("age", "2"), ("mood", "permissive")],
    );
    check("a:!@#$%^&*()_+\"'iqhjbw`0912", None, &[("a", "!@#$%^&*()_+\"'iqhjbw`0912")]);
}

#[test]
fn group_form_without_colon() {
    check("aaa(x:y)", None, &[("aaa", "x:y")]);
    check("aaa(x)", None, &[("aaa", "x")]);
    check("aaa(x(y))", None, &[("aaa", "x(y)")]);
}

#[test]
fn escaping() {
    check("(abc)", Some("abc"), &[]);
    check("(a:b)", Some("a:b"), &[]);
    check("(a:b,d(x:y))", Some("a:b,d(x:y)"), &[]);
    check("(a:b,)d(x:y)", Some("a:b,)d(x:y"), &[]);
    check("a:(bb)", None, &[("a", "bb")]);
    check("a:((bb))", None, &[("a", "(bb)")]);

    check_error("a:(a(b)");
    check_error("a:(a)b)");
    check_error("(a)b");
    check_error("(a:b");
}

#[test]
fn parentheses_in_values() {
    check("branch:(name(1))", None, &[("branch", "name(1)")]);
    check("branch:((name(1)))", None, &[("branch", "(name(1))")]);
    check("branch:name(1)", None, &[("branch", "name(1)")]);
    check("branch:value:name(1)", None, &[("branch", "value:name(1)")]);
    check(
        "branch:(name:(value:(name(1))))",
        None,
        &[("branch", "name:(value:(name(1)))")],
    );
    check("name:(value:(name(1)))", None, &[("name", "value:(name(1))")]);
}

#[test]
fn commas_and_brackets_in_values() {
    check("x:y:z", None, &[("x", "y:z")]);
    check("x:y:z,a:b", None, &[("x", "y:z"), ("a", "b")]);
    check("x:(y:z,a:b)", None, &[("x", "y:z,a:b")]);
    check("x:y:(z,a:b)", None, &[("x", "y:(z,a:b)")]);
    check("x:y:(a:b,c:d)", None, &[("x", "y:(a:b,c:d)")]);
    check("a:b)", None, &[("a", "b)")]);
}

#[test]
fn complex_values() {
    check(
        "name:(Bob:32_,age:2),mood:permissive",
        None,
        &[("name", "Bob:32_,age:2"), ("mood", "permissive")],
    );
    check(
        "a:smth,name:(Bob:32_,age:2),mood:permissive",
        None,
        &[("a", "smth"), ("name", "Bob:32_,age:2"), ("mood", "permissive")],
    );
    check(
        "name:(Bob:32_,age:2),mood:(permissive)",
        None,
        &[("name", "Bob:32_,age:2"), ("mood", "permissive")],
    );
    check("name:17,mood:(permiss:ive)", None, &[("name", "17"), ("mood", "permiss:ive")]);
}

#[test]
fn nested_complex_values() {
    check(
        "buildType:(name:5,project:(id:Project_1))",
        None,
        &[("buildType", "name:5,project:(id:Project_1)")],
    );
    check(
        "buildType:(name:5),project:(id:Project_1)",
        None,
        &[("buildType", "name:5"), ("project", "id:Project_1")],
    );
    check(
        "buildType:((name:5,project:(id:Project_1)))",
        None,
        &[("buildType", "(name:5,project:(id:Project_1))")],
    );
    check(
        "buildType:(name:5,(project:(id:Project_1)),a:b(c),d),f:d",
        None,
        &[("buildType", "name:5,(project:(id:Project_1)),a:b(c),d"), ("f", "d")],
    );
}

#[test]
fn unmatched_paren_positions() {
    match check_error("name:(Bob:32(,age:2),mood:permissive") {
        LocatorError::Parse { position, message } => {
            assert_eq!(position, 6);
            assert!(message.contains("matching ')'"), "{message}");
        }
        other => panic!("unexpected: {other:?}"),
    }
    match check_error("a:smth,name:(Bob:32(,age:2),mood:permissive") {
        LocatorError::Parse { position, .. } => assert_eq!(position, 13),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn empty_values() {
    check("name:,y:aaa,x:", None, &[("name", ""), ("y", "aaa"), ("x", "")]);
    check("a:,b:", None, &[("a", ""), ("b", "")]);
}

#[test]
fn invalid_dimension_syntax() {
    for text in [
        "",
        "name:(",
        "name:(value",
        ":value",
        "name:value,:value2",
        "name:value,(a:b)",
        "name:(val)a",
        "-:x",
        "a-b:y",
        "$aaa:bbb,a:b",
    ] {
        assert!(Locator::new(text).is_err(), "{text:?} should not parse");
    }
}

#[test]
fn extended_mode() {
    let mut locator = Locator::new_extended("id,number,status", &[]).unwrap();
    assert_eq!(locator.dimension_count(), 3);
    assert_eq!(locator.single_value_of("id").unwrap().as_deref(), Some(""));

    let mut locator = Locator::new_extended("buildType(name,project(id,name))", &[]).unwrap();
    assert_eq!(
        locator.single_value_of("buildType").unwrap().as_deref(),
        Some("name,project(id,name)")
    );

    let mut locator =
        Locator::new_extended("buildType(name,project(id,name),builds),href", &[]).unwrap();
    assert_eq!(locator.dimension_count(), 2);
    assert_eq!(locator.single_value_of("href").unwrap().as_deref(), Some(""));
    assert_eq!(locator.single_value_of("builds").unwrap(), None);

    let mut locator =
        Locator::new_extended("count,buildType:(name,project(id,name),builds),href", &[]).unwrap();
    assert_eq!(locator.dimension_count(), 3);
    assert_eq!(locator.single_value_of("count").unwrap().as_deref(), Some(""));

    let mut locator = Locator::new_extended("name,project(id,name)", &[]).unwrap();
    assert_eq!(locator.single_value_of("project").unwrap().as_deref(), Some("id,name"));

    let mut locator = Locator::new_extended("name,project(id,name),builds(),x", &[]).unwrap();
    assert_eq!(locator.dimension_count(), 4);
    assert_eq!(locator.single_value_of("builds").unwrap().as_deref(), Some(""));

    let mut locator = Locator::new_extended("a:x y ,b(x y),c", &[]).unwrap();
    assert_eq!(locator.single_value_of("a").unwrap().as_deref(), Some("x y "));
    assert_eq!(locator.single_value_of("b").unwrap().as_deref(), Some("x y"));
    assert_eq!(locator.single_value_of("c").unwrap().as_deref(), Some(""));

    let mut locator = Locator::new_extended("count,parentProject(id),projects(id)", &[]).unwrap();
    assert_eq!(locator.single_value_of("parentproject").unwrap(), None);
    assert_eq!(locator.single_value_of("parentProject").unwrap().as_deref(), Some("id"));
}

#[test]
fn extended_mode_single_name_is_a_dimension() {
    let mut locator = Locator::new_extended("a", &[]).unwrap();
    assert!(!locator.is_single_value());
    assert_eq!(locator.single_value_of("a").unwrap().as_deref(), Some(""));
}

#[test]
fn extended_mode_errors_and_dashes() {
    for text in ["a(b)(c),d", "a,b(a ,( b)", "+", "$a", "a$b"] {
        assert!(Locator::new_extended(text, &[]).is_err(), "{text:?}");
    }
    for text in ["-", "a-b(-)", "a-b", "a-b:ccc", "a-b:(ccc-ddd)"] {
        assert!(Locator::new_extended(text, &[]).is_ok(), "{text:?}");
    }
}

#[test]
fn custom_names() {
    let custom = ["~!@#$%^&*_+", "$aaa", "+", "-"];
    let mut locator = Locator::new_extended("~!@#$%^&*_+(c),+,$aaa:bbb", &custom).unwrap();
    assert_eq!(locator.dimension_count(), 3);
    assert_eq!(locator.single_value_of("~!@#$%^&*_+").unwrap().as_deref(), Some("c"));
    assert_eq!(locator.single_value_of("+").unwrap().as_deref(), Some(""));
    assert_eq!(locator.single_value_of("$aaa").unwrap().as_deref(), Some("bbb"));
    assert_eq!(locator.single_value_of("aaa").unwrap(), None);
    assert_eq!(locator.single_value_of("~").unwrap(), None);

    assert!(Locator::new_extended("~aa:b", &["~a", "~aaa", "-"]).is_err());
}

#[test]
fn base64_literals() {
    check("$base64", Some("$base64"), &[]);
    check("a:$base64", None, &[("a", "$base64")]);
    check("$base64:YWFh", Some("aaa"), &[]);
    check("$base64:(YWFh)", Some("aaa"), &[]);
    check("($base64:YWFh)", Some("$base64:YWFh"), &[]);
    check("$base64:YTooYjpjKQ==", Some("a:(b:c)"), &[]);
    check("$base64:KGE6Yik=", Some("(a:b)"), &[]);
    check("a:($base64:YWFh)", None, &[("a", "aaa")]);
    check("a:($base64:KQ==)", None, &[("a", ")")]);
    check("$base64:0KTQq9Cy0JAtQVNkRg==", Some("ФЫвА-ASdF"), &[]);
    check("$base64:0JXQs9C+0YDQldCz0L/RgA==", Some("ЕгорЕгпр"), &[]);
    // URL-safe alphabet
    check("$base64:0JXQs9C-0YDQldCz0L_RgA==", Some("ЕгорЕгпр"), &[]);
    check("$base64:56if", Some("稟"), &[]);
    check("$base64:JGJhc2U6WVE9PQ==", Some("$base:YQ=="), &[]);
    check("$base64:8J+mhA==", Some("\u{1F984}"), &[]);
    check("$base64:", Some(""), &[]);
}

#[test]
fn base64_rejections() {
    for text in [
        "$base64:((YWFh))",
        "$base64:YWFh)",
        "$base64:YWFh,a:b",
        "$base64:YWFh:",
        "$base64:YWFh:,",
        "$base64:YWFh,$base64:YWFh",
        "$base64:YWFh.",
        "$base64:YWFЕ=",
        "$base64:a.",
        "$base64:=a",
        "$base64:aLJBNlkjblk+/===",
    ] {
        assert!(Locator::new(text).is_err(), "{text:?} should not parse");
    }
}

#[test]
fn decoded_literals_are_never_reparsed() {
    // Decodes to "a:(b:c)" but stays a single value, not a dimension.
    let locator = Locator::new("$base64:YTooYjpjKQ==").unwrap();
    assert!(locator.is_single_value());
    assert_eq!(locator.dimension_count(), 0);
}

#[test]
fn known_dimensions_whitelist_reserved_names() {
    let known: Vec<String> = ["name".to_string(), "$strict".to_string()].into();
    let mut locator = Locator::with_known_dimensions("name:x,$strict:true", &known).unwrap();
    assert!(locator.strict_bool_of("$strict", false).unwrap());
}
