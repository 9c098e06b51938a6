//! Acknowledgement decisions for consumed jobs.

/// What the consumer tells the broker about one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Processed (or skipped as fresh); remove from the queue.
    Ack,
    /// Transient failure; deliver again.
    Requeue { reason: String },
    /// Permanent failure; never deliver again.
    Drop { reason: String },
}

impl Disposition {
    pub fn requeue(reason: impl Into<String>) -> Self {
        Disposition::Requeue {
            reason: reason.into(),
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Disposition::Drop {
            reason: reason.into(),
        }
    }

    pub fn is_ack(&self) -> bool {
        matches!(self, Disposition::Ack)
    }

    /// Failure reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Disposition::Ack => None,
            Disposition::Requeue { reason } | Disposition::Drop { reason } => Some(reason),
        }
    }

    /// Terminal state name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Ack => "acked",
            Disposition::Requeue { .. } => "nacked_requeue",
            Disposition::Drop { .. } => "nacked_drop",
        }
    }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.reason() {
            Some(reason) => write!(f, "{}: {}", self.as_str(), reason),
            None => f.write_str(self.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ack_settles_as_ack() {
        assert!(Disposition::Ack.is_ack());
        assert!(!Disposition::requeue("render failed").is_ack());
        assert!(!Disposition::reject("malformed").is_ack());
    }

    #[test]
    fn display_names_state_and_reason() {
        assert_eq!(Disposition::Ack.to_string(), "acked");
        assert_eq!(
            Disposition::reject("record missing").to_string(),
            "nacked_drop: record missing"
        );
    }
}
