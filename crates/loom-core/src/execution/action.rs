use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Cause, TaskPath};

/// Whether an action changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkResult {
    DidWork,
    DidNoWork,
}

/// One unit of work attached to a task. Actions run in order.
#[async_trait]
pub trait TaskAction: Send + Sync {
    fn display_name(&self) -> &str;

    async fn execute(&self, path: &TaskPath) -> Result<WorkResult, Cause>;
}

/// Declarative action used by build files and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptedAction {
    Succeed {
        #[serde(default = "did_work_by_default")]
        did_work: bool,
    },
    Fail {
        message: String,
    },
    Sleep {
        millis: u64,
    },
}

fn did_work_by_default() -> bool {
    true
}

#[async_trait]
impl TaskAction for ScriptedAction {
    fn display_name(&self) -> &str {
        match self {
            ScriptedAction::Succeed { .. } => "succeed",
            ScriptedAction::Fail { .. } => "fail",
            ScriptedAction::Sleep { .. } => "sleep",
        }
    }

    async fn execute(&self, _path: &TaskPath) -> Result<WorkResult, Cause> {
        match self {
            ScriptedAction::Succeed { did_work: true } => Ok(WorkResult::DidWork),
            ScriptedAction::Succeed { did_work: false } => Ok(WorkResult::DidNoWork),
            ScriptedAction::Fail { message } => Err(Cause::new(message.clone())),
            ScriptedAction::Sleep { millis } => {
                tokio::time::sleep(Duration::from_millis(*millis)).await;
                Ok(WorkResult::DidWork)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_action_is_tagged() {
        let action: ScriptedAction =
            serde_json::from_str(r#"{ "type": "fail", "message": "boom" }"#).unwrap();
        assert_eq!(
            action,
            ScriptedAction::Fail {
                message: "boom".to_string()
            }
        );

        let action: ScriptedAction = serde_json::from_str(r#"{ "type": "succeed" }"#).unwrap();
        assert_eq!(action, ScriptedAction::Succeed { did_work: true });
    }

    #[tokio::test]
    async fn fail_action_returns_cause() {
        let action = ScriptedAction::Fail {
            message: "boom".to_string(),
        };
        let err = action.execute(&TaskPath::new(":a")).await.unwrap_err();
        assert_eq!(err.message(), "boom");
    }
}
