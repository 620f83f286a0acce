use locator_cache::{
    action::grammar::ActionKind,
    agent::orchestrator::OrchestrationLoop,
    report::console::{format_repository, format_run_report},
    repository::store::LocatorStore,
    scenario::scenario_model::{Scenario, ScenarioStep, load_scenario},
};

use crate::common::{fake_driver::FakeDriver, utils::scripted_resolver};

mod common;

// =========================================================================
// Repository listing
// =========================================================================

#[test]
fn empty_repository_says_so() {
    let store = LocatorStore::in_memory();
    let out = format_repository(&store, None);
    assert!(out.contains("Repository is empty"));
}

#[test]
fn repository_listing_shows_every_field() {
    let mut store = LocatorStore::in_memory();
    store.put("LoginPage", "UsernameField", "input#user-name", ActionKind::Fill, "Fill username");
    store.put("LoginPage", "LoginButton", "input#login-button", ActionKind::Click, "");
    store.get("LoginPage", "UsernameField");

    let out = format_repository(&store, None);
    assert!(out.contains("PAGE: LoginPage"));
    assert!(out.contains("  UsernameField\n"));
    assert!(out.contains("Locator: input#user-name"));
    assert!(out.contains("Type: fill"));
    assert!(out.contains("Description: Fill username"));
    assert!(out.contains("Used: 1 times"));
    assert!(out.contains("Description: N/A"));
    assert!(out.contains("=== 2 objects on 1 pages ==="));
}

#[test]
fn repository_listing_filters_by_page() {
    let mut store = LocatorStore::in_memory();
    store.put("LoginPage", "UsernameField", "#u", ActionKind::Fill, "");
    store.put("Inventory", "Cart", "#cart", ActionKind::Click, "");

    let out = format_repository(&store, Some("Inventory"));
    assert!(out.contains("PAGE: Inventory"));
    assert!(!out.contains("LoginPage"));

    let none = format_repository(&store, Some("Checkout"));
    assert!(none.contains("Repository is empty"));
}

// =========================================================================
// Run report
// =========================================================================

#[test]
fn run_report_marks_failures_and_summarizes() {
    let (mut resolver, _, _) = scripted_resolver(&["click | #ok", "click | #bad"]);
    let mut driver = FakeDriver::default().with_broken("#bad");
    let steps = vec![
        ScenarioStep::new("click ok", None),
        ScenarioStep::new("click bad", None),
    ];
    let reports = OrchestrationLoop::new()
        .with_step_delay(std::time::Duration::ZERO)
        .run(&mut driver, &mut resolver, "Page", &steps)
        .unwrap();

    let out = format_run_report(&reports);
    assert!(out.contains("\u{2713} OK   [oracle] click ok -> Clicked #ok"));
    assert!(out.contains("\u{2717} FAIL [oracle] click bad -> Exec error:"));
    assert!(out.contains("=== Steps: 1 ok, 1 failed (2 total) ==="));
}

// =========================================================================
// Scenario files
// =========================================================================

#[test]
fn demo_scenario_has_three_cacheable_steps() {
    let scenario = Scenario::demo_login();
    assert_eq!(scenario.steps.len(), 4);
    assert_eq!(scenario.steps.iter().filter(|s| s.object.is_some()).count(), 3);
    assert_eq!(scenario.verify.as_deref(), Some("text=Products"));
}

#[test]
fn scenario_loads_from_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("login.yaml");
    std::fs::write(
        &path,
        r#"name: "Swag Labs login"
start_url: "https://www.saucedemo.com/"
page: "LoginPage"
steps:
  - instruction: "Fill username field with 'standard_user'"
    object: "UsernameField"
  - instruction: "Verify Products page is visible"
verify: "text=Products"
"#,
    )
    .unwrap();

    let scenario = load_scenario(path.to_str().unwrap()).unwrap();
    assert_eq!(scenario.page, "LoginPage");
    assert_eq!(
        scenario.steps[0],
        ScenarioStep::new("Fill username field with 'standard_user'", Some("UsernameField"))
    );
    assert!(scenario.steps[1].object.is_none());
}

#[test]
fn scenario_without_required_fields_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "name: only a name\n").unwrap();

    assert!(load_scenario(path.to_str().unwrap()).is_err());
}
