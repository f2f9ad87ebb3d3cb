//! Behavioural tests for partial-update construction through the public
//! API: a request must be untouched for any field not marked as changed.

use nuage::Delta;
use nuage::containers::{ContainerUpdate, ScalingOption, UpdateContainerRequest};
use nuage::error::ResourceError;
use rstest::rstest;

fn build(update: ContainerUpdate) -> UpdateContainerRequest {
    update
        .into_request("c1")
        .unwrap_or_else(|err| panic!("update should build: {err}"))
}

#[test]
fn an_empty_delta_set_yields_an_empty_request() {
    let request = build(ContainerUpdate::default());
    let json = serde_json::to_value(&request).unwrap_or_default();
    let body = json
        .as_object()
        .unwrap_or_else(|| panic!("request should serialize to an object"));
    assert!(
        body.is_empty(),
        "no field may reach the wire without a changed delta: {body:?}"
    );
}

#[test]
fn only_the_changed_fields_reach_the_wire() {
    let request = build(ContainerUpdate {
        min_scale: Delta::changed(1),
        description: Delta::changed(String::from("updated")),
        ..ContainerUpdate::default()
    });
    let json = serde_json::to_value(&request).unwrap_or_default();
    let body = json
        .as_object()
        .unwrap_or_else(|| panic!("request should serialize to an object"));
    let mut keys: Vec<&str> = body.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["description", "min_scale"]);
}

#[test]
fn unchanged_values_are_ignored_even_when_present() {
    let request = build(ContainerUpdate {
        port: Delta::unchanged(8080),
        privacy: Delta::unchanged(nuage::containers::Privacy::Private),
        ..ContainerUpdate::default()
    });
    assert_eq!(request.port, None);
    assert_eq!(request.privacy, None);
}

#[test]
fn a_changed_image_digest_forces_the_redeploy_flag() {
    let request = build(ContainerUpdate {
        registry_sha256: Delta::changed(String::from("sha256:0123")),
        ..ContainerUpdate::default()
    });
    assert_eq!(request.redeploy, Some(true));

    let json = serde_json::to_value(&request).unwrap_or_default();
    let body = json
        .as_object()
        .unwrap_or_else(|| panic!("request should serialize to an object"));
    let keys: Vec<&str> = body.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["redeploy"], "the digest itself is not a wire field");
}

#[rstest]
#[case::cpu_and_memory(ScalingOption {
    cpu_usage_threshold: Some(70),
    memory_usage_threshold: Some(80),
    ..ScalingOption::default()
})]
#[case::concurrency_and_cpu(ScalingOption {
    concurrent_requests_threshold: Some(30),
    cpu_usage_threshold: Some(70),
    ..ScalingOption::default()
})]
fn conflicting_scaling_thresholds_fail_validation(#[case] scaling: ScalingOption) {
    let result = ContainerUpdate {
        scaling_option: Delta::changed(scaling),
        ..ContainerUpdate::default()
    }
    .into_request("c1");
    assert!(matches!(result, Err(ResourceError::Validation(_))));
}

#[test]
fn an_unchanged_conflicting_scaling_option_is_not_validated() {
    let result = ContainerUpdate {
        scaling_option: Delta::unchanged(ScalingOption {
            cpu_usage_threshold: Some(70),
            memory_usage_threshold: Some(80),
            ..ScalingOption::default()
        }),
        ..ContainerUpdate::default()
    }
    .into_request("c1");
    assert!(result.is_ok(), "unchanged fields are never inspected");
}
