/// Result of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    /// Connections the message was queued for
    pub delivered: usize,
    /// Connections removed because their send failed
    pub pruned: usize,
}
