use serde::{Deserialize, Serialize};

/// Lifecycle states of one function node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    Unvalidated,
    Validated,
    Initialized,
    Streaming,
    Closed,
    Errored { error_msg: String },
}

impl NodeState {
    /// Check if transition from current state to target state is valid
    pub fn can_transition_to(&self, target: &NodeState) -> bool {
        use NodeState::*;

        matches!(
            (self, target),
            (Unvalidated, Validated) |

            (Validated, Initialized) |
            (Validated, Errored { .. }) |

            (Initialized, Streaming) |
            (Initialized, Errored { .. }) |

            (Streaming, Closed) |
            (Streaming, Errored { .. })
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeState::Closed | NodeState::Errored { .. })
    }

    /// Get human-readable state name
    pub fn name(&self) -> &str {
        match self {
            Self::Unvalidated => "Unvalidated",
            Self::Validated => "Validated",
            Self::Initialized => "Initialized",
            Self::Streaming => "Streaming",
            Self::Closed => "Closed",
            Self::Errored { .. } => "Errored",
        }
    }
}

impl Default for NodeState {
    fn default() -> Self {
        Self::Unvalidated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_path() {
        let path = [
            NodeState::Unvalidated,
            NodeState::Validated,
            NodeState::Initialized,
            NodeState::Streaming,
            NodeState::Closed,
        ];

        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(&pair[1]), "{} -> {}", pair[0].name(), pair[1].name());
            assert!(!pair[1].can_transition_to(&pair[0]));
        }
    }

    #[test]
    fn test_errored_reachability() {
        let errored = NodeState::Errored {
            error_msg: "boom".to_string(),
        };

        assert!(!NodeState::Unvalidated.can_transition_to(&errored));
        assert!(NodeState::Validated.can_transition_to(&errored));
        assert!(NodeState::Initialized.can_transition_to(&errored));
        assert!(NodeState::Streaming.can_transition_to(&errored));
        assert!(!NodeState::Closed.can_transition_to(&errored));
    }

    #[test]
    fn test_terminal_states() {
        assert!(NodeState::Closed.is_terminal());
        assert!(NodeState::Errored { error_msg: String::new() }.is_terminal());
        assert!(!NodeState::Streaming.is_terminal());
    }
}
