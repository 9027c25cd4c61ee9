//! Replication shim.
//!
//! Destructive commands with non-deterministic results (SPOP and friends)
//! cannot be replayed verbatim on replicas. Each command execution gets a
//! fresh [`Propagation`] through which it can emit deterministic derived
//! commands, rewrite its own argument vector, or suppress itself entirely.
//! After execution the caller collects [`Propagation::effective`] and hands
//! it to the append-only log / replica fan-out (external collaborators).

/// One command's argument vector, owned for the log.
pub type CommandVec = Vec<Vec<u8>>;

/// Per-command propagation state.
#[derive(Debug, Default)]
pub struct Propagation {
    derived: Vec<CommandVec>,
    rewrite: Option<CommandVec>,
    suppress: bool,
}

impl Propagation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a derived command for the log and replicas.
    pub fn propagate(&mut self, argv: CommandVec) {
        self.derived.push(argv);
    }

    /// Replace the executing command's vector before emission.
    pub fn rewrite_current(&mut self, argv: CommandVec) {
        self.rewrite = Some(argv);
    }

    /// Skip emission of the executing command; derivatives already carry
    /// its effect.
    pub fn suppress_current(&mut self) {
        self.suppress = true;
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppress
    }

    /// The command sequence the log should record: the (possibly rewritten)
    /// original unless suppressed, followed by every derived command.
    pub fn effective(&self, original: &[&[u8]]) -> Vec<CommandVec> {
        let mut out = Vec::with_capacity(self.derived.len() + 1);
        if !self.suppress {
            out.push(
                self.rewrite
                    .clone()
                    .unwrap_or_else(|| original.iter().map(|a| a.to_vec()).collect()),
            );
        }
        out.extend(self.derived.iter().cloned());
        out
    }
}
