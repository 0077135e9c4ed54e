//! Workflow states and the control enablement derived from them.
//!
//! Controls are never tracked as separate flags. The surface asks
//! [`Controls::derive`] and renders what it says.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkflowState {
    Idle,
    AwaitingModelList,
    Capturing,
    Captured,
    Processing,
    ResultReady,
}

impl WorkflowState {
    /// A background job is outstanding; no new job may start.
    pub fn job_in_flight(self) -> bool {
        matches!(
            self,
            WorkflowState::AwaitingModelList | WorkflowState::Capturing | WorkflowState::Processing
        )
    }

    /// States a finished model fetch may return to.
    pub fn is_resting(self) -> bool {
        !self.job_in_flight()
    }
}

/// Which controls the interactive surface should enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Controls {
    pub credential_entry: bool,
    pub model_selector: bool,
    pub capture: bool,
    pub process: bool,
}

impl Controls {
    /// `models_loaded` is whether a non-empty model list is installed.
    pub fn derive(state: WorkflowState, models_loaded: bool) -> Self {
        use WorkflowState::*;

        let resting = state.is_resting();
        Self {
            credential_entry: resting,
            model_selector: resting && models_loaded,
            capture: models_loaded && matches!(state, Idle | Captured | ResultReady),
            process: models_loaded && matches!(state, Captured | ResultReady),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use WorkflowState::*;

    #[test]
    fn nothing_but_key_entry_before_models_load() {
        let c = Controls::derive(Idle, false);
        assert!(c.credential_entry);
        assert!(!c.model_selector);
        assert!(!c.capture);
        assert!(!c.process);
    }

    #[test]
    fn idle_with_models_allows_capture_only() {
        let c = Controls::derive(Idle, true);
        assert!(c.capture);
        assert!(!c.process);
        assert!(c.model_selector);
    }

    #[test]
    fn captured_and_result_ready_allow_both() {
        for state in [Captured, ResultReady] {
            let c = Controls::derive(state, true);
            assert!(c.capture, "{:?}", state);
            assert!(c.process, "{:?}", state);
        }
    }

    #[test]
    fn in_flight_states_disable_everything() {
        for state in [AwaitingModelList, Capturing, Processing] {
            let c = Controls::derive(state, true);
            assert_eq!(
                c,
                Controls {
                    credential_entry: false,
                    model_selector: false,
                    capture: false,
                    process: false,
                },
                "{:?}",
                state
            );
            assert!(state.job_in_flight());
        }
    }

    #[test]
    fn resting_states() {
        assert!(Idle.is_resting());
        assert!(Captured.is_resting());
        assert!(ResultReady.is_resting());
        assert!(!Processing.is_resting());
    }
}
