//! End-to-end resolution through the configuration manager.

mod common;

use std::sync::Arc;

use action_router::runtime::LookupOutcome;
use action_router::{ConfigError, ConfigWarning};

use common::{manager, try_manager, with_base};

#[test]
fn test_secure_wildcard_save_scenario() {
    let src = with_base(
        r#"
[[packages]]
name = "secure"
extends = "default"
namespace = "/secure"

[[packages.actions]]
name = "*Save"
class = "{1}Handler"
method = "save"

[[packages.actions.results]]
body = "/{1}/saved.jsp"
"#,
    );
    let manager = manager(&[("app.toml", &src)]);

    let action = manager.resolve("/secure", "userSave").expect("wildcard match");
    assert_eq!(action.name, "userSave");
    assert_eq!(action.class_name, "userHandler");
    assert_eq!(action.method_or_default(), "save");

    let success = action.result("success").expect("success result");
    assert_eq!(success.class_name, "DispatchResult");
    assert_eq!(success.params["location"], "/user/saved.jsp");
    // Inherited global result uses the inherited default result type too.
    assert_eq!(action.result("error").unwrap().class_name, "DispatchResult");
    assert_eq!(action.interceptor_names(), vec!["a", "b", "c"]);
}

#[test]
fn test_child_global_result_overrides_parent() {
    let src = with_base(
        r#"
[[packages]]
name = "child"
extends = "default"

[[packages.global_results]]
name = "error"
type = "redirect"
body = "/child-error"

[[packages.actions]]
name = "home"
"#,
    );
    let manager = manager(&[("app.toml", &src)]);
    let home = manager.resolve("", "home").unwrap();
    let error = home.result("error").unwrap();
    assert_eq!(error.class_name, "RedirectResult");
    assert_eq!(error.params["location"], "/child-error");
}

#[test]
fn test_declaration_order_does_not_matter() {
    let child = r#"
[[packages]]
name = "child"
extends = "default"
namespace = "/c"

[[packages.actions]]
name = "home"

[[packages.actions.results]]
body = "/home.html"
"#;
    let parent_first = manager(&[("base.toml", common::BASE), ("child.toml", child)]);
    let child_first = manager(&[("child.toml", child), ("base.toml", common::BASE)]);

    let a = parent_first.resolve("/c", "home").unwrap();
    let b = child_first.resolve("/c", "home").unwrap();
    assert_eq!(a.results, b.results);
    assert_eq!(a.interceptor_names(), b.interceptor_names());
    assert_eq!(a.class_name, b.class_name);
    assert!(child_first.snapshot().diagnostics().is_empty());
}

#[test]
fn test_first_declared_pattern_wins() {
    let src = with_base(
        r#"
[[packages]]
name = "admin"
extends = "default"

[[packages.actions]]
name = "admin/*"
class = "AdminAny"

[[packages.actions]]
name = "admin/*View"
class = "AdminView"
"#,
    );
    let manager = manager(&[("app.toml", &src)]);
    let (action, outcome) = manager.snapshot().lookup("", "admin/xView").unwrap();
    assert_eq!(outcome, LookupOutcome::Wildcard);
    assert_eq!(action.class_name, "AdminAny");
}

#[test]
fn test_loose_match_shorthand() {
    let src = with_base(
        r#"
[[packages]]
name = "loose"
extends = "default"

[[packages.actions]]
name = "foo*bar*"
class = "Foo{1}"
"#,
    );
    let manager = manager(&[("app.toml", &src)]);
    assert_eq!(manager.resolve("", "fooXbarY").unwrap().class_name, "FooX");
    assert_eq!(manager.resolve("", "fooXba").unwrap().class_name, "FooX");
    assert!(manager.resolve("", "fooX").is_none());
}

#[test]
fn test_uncaptured_token_renders_empty() {
    let src = with_base(
        r#"
[[packages]]
name = "tpl"
extends = "default"

[[packages.actions]]
name = "*Action"
class = "{1}Action"
method = "run{2}"
"#,
    );
    let manager = manager(&[("app.toml", &src)]);
    let action = manager.resolve("", "UserAction").unwrap();
    assert_eq!(action.class_name, "UserAction");
    assert_eq!(action.method.as_deref(), Some("run"));
}

#[test]
fn test_namespace_falls_back_to_empty_namespace() {
    let src = with_base(
        r#"
[[packages]]
name = "global"
extends = "default"

[[packages.actions]]
name = "foo"

[[packages]]
name = "secure"
extends = "default"
namespace = "/secure"

[[packages.actions]]
name = "bar"
"#,
    );
    let manager = manager(&[("app.toml", &src)]);
    let (foo, outcome) = manager.snapshot().lookup("/secure", "foo").unwrap();
    assert_eq!(outcome, LookupOutcome::Global);
    assert_eq!(foo.package_name, "global");
    assert!(manager.resolve("/secure", "missing").is_none());
}

#[test]
fn test_stack_override_preserves_order() {
    let src = with_base(
        r#"
[[packages]]
name = "web"
extends = "default"

[[packages.actions]]
name = "plain"
interceptor_refs = [{ name = "basic" }]

[[packages.actions]]
name = "tuned"
interceptor_refs = [{ name = "basic", params = { "b.max" = "5" } }]
"#,
    );
    let manager = manager(&[("app.toml", &src)]);
    let plain = manager.resolve("", "plain").unwrap();
    let tuned = manager.resolve("", "tuned").unwrap();

    assert_eq!(tuned.interceptor_names(), vec!["a", "b", "c"]);
    assert_eq!(tuned.interceptors[1].interceptor().params()["max"], "5");
    assert_eq!(plain.interceptors[1].interceptor().params()["max"], "1");
    for i in [0, 2] {
        assert!(Arc::ptr_eq(
            plain.interceptors[i].interceptor(),
            tuned.interceptors[i].interceptor()
        ));
    }
    assert!(manager.snapshot().diagnostics().is_empty());
}

#[test]
fn test_missing_parent_is_warning() {
    let src = with_base(
        r#"
[[packages]]
name = "orphan"
extends = "default, nowhere"

[[packages.actions]]
name = "home"
"#,
    );
    let manager = manager(&[("app.toml", &src)]);
    let snapshot = manager.snapshot();
    assert!(snapshot.resolve("", "home").is_some());
    assert!(snapshot.diagnostics().iter().any(|w| matches!(
        w,
        ConfigWarning::UnresolvedParentChain { package, missing, .. }
            if package == "orphan" && missing.iter().any(|m| m == "nowhere")
    )));
}

#[test]
fn test_cyclic_inheritance_rejected() {
    let src = r#"
[[packages]]
name = "a"
extends = "b"

[[packages]]
name = "b"
extends = "a"
"#;
    let err = try_manager(&[("app.toml", src)]).unwrap_err();
    assert!(matches!(err, ConfigError::CyclicInheritance { .. }));
}

#[test]
fn test_all_action_configs_lists_exact_actions() {
    let src = with_base(
        r#"
[[packages]]
name = "web"
extends = "default"
namespace = "/web"

[[packages.actions]]
name = "home"

[[packages.actions]]
name = "page*"
"#,
    );
    let manager = manager(&[("app.toml", &src)]);
    let all = manager.all_action_configs();
    assert_eq!(all.len(), 1);
    let web: Vec<_> = all["/web"].keys().map(String::as_str).collect();
    assert_eq!(web, vec!["home", "page*"]);
}

#[test]
fn test_constants_merge_across_sources() {
    let first = r#"
[constants]
mode = "dev"
theme = "plain"
"#;
    let second = r#"
[constants]
mode = "prod"
"#;
    let manager = manager(&[("first.toml", first), ("second.toml", second)]);
    let snapshot = manager.snapshot();
    assert_eq!(snapshot.constant("mode"), Some("prod"));
    assert_eq!(snapshot.constant("theme"), Some("plain"));
    assert_eq!(snapshot.constant("missing"), None);
    assert_eq!(snapshot.constants().len(), 2);
}
