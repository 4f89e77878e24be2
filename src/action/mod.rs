use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Number, Value};
use thiserror::Error;

#[cfg(test)]
mod tests;

/// Input key holding the requested delay in milliseconds.
pub const SLEEP_TIME_KEY: &str = "sleepTimeInMs";

/// Delay used when the caller does not specify one.
pub const DEFAULT_SLEEP_TIME_IN_MS: u64 = 1;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("`sleepTimeInMs` must be a number, got {0}")]
    InvalidSleepTime(String),
    #[error("`sleepTimeInMs` does not accept booleans as a delay, got {0}")]
    BooleanSleepTime(bool),
    #[error("`sleepTimeInMs` must not be negative, got {0}")]
    NegativeSleepTime(Number),
    #[error("`sleepTimeInMs` is too large to sleep on, got {0}")]
    SleepTimeOutOfRange(Number),
}

/// Parameters of a single sleep activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SleepParams {
    /// The requested delay, kept exactly as supplied so it can be echoed back verbatim.
    pub sleep_time_in_ms: Number,
}

impl Default for SleepParams {
    fn default() -> Self {
        Self {
            sleep_time_in_ms: Number::from(DEFAULT_SLEEP_TIME_IN_MS),
        }
    }
}

impl SleepParams {
    /// Extracts the parameters from an activation input mapping. Unknown keys are ignored and
    /// a missing delay falls back to [`DEFAULT_SLEEP_TIME_IN_MS`]. An explicit `null` is not a
    /// missing delay.
    ///
    /// # Errors
    /// Returns `ActionError::InvalidSleepTime` if the delay is present but not a number, and
    /// `ActionError::BooleanSleepTime` if it is a boolean.
    pub fn from_value(value: &Map<String, Value>) -> Result<Self, ActionError> {
        match value.get(SLEEP_TIME_KEY) {
            None => Ok(Self::default()),
            Some(Value::Number(number)) => Ok(Self {
                sleep_time_in_ms: number.clone(),
            }),
            Some(Value::Bool(flag)) => Err(ActionError::BooleanSleepTime(*flag)),
            Some(other) => Err(ActionError::InvalidSleepTime(other.to_string())),
        }
    }

    /// Converts the requested delay into a `Duration`. Whole milliseconds convert exactly,
    /// fractional ones are rounded up to the next nanosecond.
    ///
    /// # Errors
    /// Returns an error if the delay is negative or does not fit in a `Duration`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn duration(&self) -> Result<Duration, ActionError> {
        if let Some(millis) = self.sleep_time_in_ms.as_u64() {
            return Ok(Duration::from_millis(millis));
        }

        let millis = self
            .sleep_time_in_ms
            .as_f64()
            .ok_or_else(|| ActionError::SleepTimeOutOfRange(self.sleep_time_in_ms.clone()))?;

        if millis < 0.0 {
            return Err(ActionError::NegativeSleepTime(self.sleep_time_in_ms.clone()));
        }

        let nanos = (millis * 1_000_000.0).ceil();
        if !nanos.is_finite() || nanos >= u64::MAX as f64 {
            return Err(ActionError::SleepTimeOutOfRange(
                self.sleep_time_in_ms.clone(),
            ));
        }

        Ok(Duration::from_nanos(nanos as u64))
    }

    #[must_use]
    pub fn completion_message(&self) -> String {
        format!(
            "Terminated successfully after around {} ms.",
            self.sleep_time_in_ms
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SleepResult {
    pub msg: String,
}

/// Sleeps for the requested delay and reports it. The message restates the requested value,
/// not the measured elapsed time, and the task always waits at least the requested delay.
///
/// # Errors
/// Returns an error without sleeping if the delay cannot be converted into a `Duration`.
pub async fn sleep_and_report(params: &SleepParams) -> Result<SleepResult, ActionError> {
    let duration = params.duration()?;

    tracing::info!(
        "Specified sleep time is {} ms.",
        params.sleep_time_in_ms
    );

    let result = SleepResult {
        msg: params.completion_message(),
    };

    tokio::time::sleep(duration).await;

    tracing::info!("{}", result.msg);
    Ok(result)
}

/// Generic action entry point: one input mapping in, one output mapping out.
///
/// # Errors
/// Returns an `ActionError` if the input is malformed.
pub async fn run(value: Map<String, Value>) -> Result<Value, ActionError> {
    let params = SleepParams::from_value(&value)?;
    let result = sleep_and_report(&params).await?;

    Ok(json!({ "msg": result.msg }))
}
