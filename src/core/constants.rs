// ============================================================================
// spark-mvvm - Constants
// Watcher state flags and the reserved names used by the directive compiler
// ============================================================================

// =============================================================================
// WATCHER STATE FLAGS
// =============================================================================

/// Watcher is not evaluating its expression
pub const IDLE: u32 = 1 << 0;

/// Watcher is resolving its expression (tracking cursor points at it)
pub const EVALUATING: u32 = 1 << 1;

/// Watcher callback is currently running (re-entrant changes are queued)
pub const CALLBACK_RUNNING: u32 = 1 << 2;

/// Mask to clear the evaluation state bits (IDLE | EVALUATING)
pub const STATE_MASK: u32 = !(IDLE | EVALUATING);

// =============================================================================
// COMPILER NAMES
// =============================================================================

/// Default prefix marking a directive attribute (`v-text`, `v-on:click`)
pub const DEFAULT_PREFIX: &str = "v-";

/// Prefix of the event directive, after the directive prefix
pub const EVENT_DIRECTIVE: &str = "on";

/// Local name bound to the element position inside an iteration clone
pub const INDEX_KEY: &str = "$index";

/// Path segment that reads the length of a list or string
pub const LENGTH_KEY: &str = "length";
