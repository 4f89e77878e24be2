use serde_json::json;
use tokio::time::Instant;

use super::*;

fn input(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_sleeps_for_requested_time() {
    let start = Instant::now();

    let output = run(input(json!({ "sleepTimeInMs": 500 }))).await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(500));
    assert_eq!(
        output,
        json!({ "msg": "Terminated successfully after around 500 ms." })
    );
}

#[tokio::test(start_paused = true)]
async fn test_missing_sleep_time_defaults_to_one_ms() {
    let start = Instant::now();

    let output = run(Map::new()).await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(1));
    assert_eq!(
        output,
        json!({ "msg": "Terminated successfully after around 1 ms." })
    );
}

#[tokio::test(start_paused = true)]
async fn test_omitted_and_explicit_default_are_identical() {
    let omitted = run(Map::new()).await.unwrap();
    let explicit = run(input(json!({ "sleepTimeInMs": 1 }))).await.unwrap();

    assert_eq!(omitted, explicit);
}

#[tokio::test(start_paused = true)]
async fn test_explicit_null_is_not_a_missing_sleep_time() {
    let start = Instant::now();

    let error = run(input(json!({ "sleepTimeInMs": null }))).await.unwrap_err();

    assert!(matches!(error, ActionError::InvalidSleepTime(ref got) if got == "null"));
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_message_restates_requested_value_verbatim() {
    let start = Instant::now();

    let output = run(input(json!({ "sleepTimeInMs": 1.5 }))).await.unwrap();

    assert!(start.elapsed() >= Duration::from_micros(1500));
    assert_eq!(
        output["msg"],
        "Terminated successfully after around 1.5 ms."
    );

    let params = SleepParams::from_value(&input(
        serde_json::from_str(r#"{ "sleepTimeInMs": 500.0 }"#).unwrap(),
    ))
    .unwrap();
    assert_eq!(
        params.completion_message(),
        "Terminated successfully after around 500.0 ms."
    );
}

#[tokio::test(start_paused = true)]
async fn test_zero_does_not_wait() {
    let start = Instant::now();

    let output = run(input(json!({ "sleepTimeInMs": 0 }))).await.unwrap();

    assert!(start.elapsed() < Duration::from_millis(2));
    assert_eq!(
        output["msg"],
        "Terminated successfully after around 0 ms."
    );
}

#[tokio::test(start_paused = true)]
async fn test_other_keys_are_ignored() {
    let output = run(input(json!({
        "sleepTimeInMs": 20,
        "__ow_method": "post",
        "unrelated": [1, 2, 3],
    })))
    .await
    .unwrap();

    assert_eq!(
        output,
        json!({ "msg": "Terminated successfully after around 20 ms." })
    );
}

#[tokio::test(start_paused = true)]
async fn test_non_numeric_sleep_time_is_rejected_without_sleeping() {
    for value in [json!("500"), json!([500]), json!({ "ms": 500 })] {
        let start = Instant::now();

        let error = run(input(json!({ "sleepTimeInMs": value.clone() })))
            .await
            .unwrap_err();

        assert!(
            matches!(error, ActionError::InvalidSleepTime(_)),
            "unexpected error for {value}: {error}"
        );
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}

#[tokio::test(start_paused = true)]
async fn test_boolean_sleep_time_is_rejected() {
    for flag in [true, false] {
        let error = run(input(json!({ "sleepTimeInMs": flag }))).await.unwrap_err();

        assert!(matches!(error, ActionError::BooleanSleepTime(got) if got == flag));
        assert_eq!(
            error.to_string(),
            format!("`sleepTimeInMs` does not accept booleans as a delay, got {flag}")
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_negative_sleep_time_is_rejected() {
    let error = run(input(json!({ "sleepTimeInMs": -5 }))).await.unwrap_err();
    assert!(matches!(error, ActionError::NegativeSleepTime(_)));

    let error = run(input(json!({ "sleepTimeInMs": -0.5 }))).await.unwrap_err();
    assert!(matches!(error, ActionError::NegativeSleepTime(_)));
}

#[test]
fn test_huge_sleep_time_is_out_of_range() {
    let params = SleepParams {
        sleep_time_in_ms: Number::from_f64(1e300).unwrap(),
    };

    assert!(matches!(
        params.duration(),
        Err(ActionError::SleepTimeOutOfRange(_))
    ));
}

#[test]
fn test_duration_conversion() {
    let whole = SleepParams {
        sleep_time_in_ms: Number::from(250_u64),
    };
    assert_eq!(whole.duration().unwrap(), Duration::from_millis(250));

    let fractional = SleepParams {
        sleep_time_in_ms: Number::from_f64(2.5).unwrap(),
    };
    assert_eq!(fractional.duration().unwrap(), Duration::from_micros(2500));

    // 0.1 ms is not exact in binary, the conversion must not land below it
    let inexact = SleepParams {
        sleep_time_in_ms: Number::from_f64(0.1).unwrap(),
    };
    assert!(inexact.duration().unwrap() >= Duration::from_micros(100));
}

#[test]
fn test_error_messages() {
    let error = SleepParams::from_value(&input(json!({ "sleepTimeInMs": "soon" }))).unwrap_err();

    assert_eq!(
        error.to_string(),
        "`sleepTimeInMs` must be a number, got \"soon\""
    );
}
