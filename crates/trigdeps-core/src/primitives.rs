//! # Primitives
//!
//! Hardcoded constants for the trigdeps CORE.
//!
//! These values are compiled into the binary. The link-related ones are only
//! defaults: `LinkTemplates` may be configured with other values at runtime.

// =============================================================================
// VARIANT TAGS
// =============================================================================

/// Variant tag marking a batch of trigger prototypes.
///
/// A batch whose `object` equals this tag gets prototype edit links
/// (which carry the parent discovery rule id).
pub const PROTOTYPE_TAG: &str = "deptrigger_prototype";

/// Variant tag the selection popup uses for plain triggers.
///
/// Any tag other than the prototype tag is treated as plain; this constant
/// only exists so callers have a canonical value to emit.
pub const PLAIN_TAG: &str = "deptrigger";

// =============================================================================
// LINK TEMPLATES
// =============================================================================

/// Edit page for trigger prototypes.
pub const PROTOTYPE_EDIT_PATH: &str = "trigger_prototypes.php";

/// Edit page for plain triggers.
pub const PLAIN_EDIT_PATH: &str = "triggers.php";

// =============================================================================
// FORM
// =============================================================================

/// Name of the hidden input submitted once per dependency.
pub const FORM_FIELD_NAME: &str = "dependencies[]";

/// Element id prefix of a dependency row.
pub const ROW_ID_PREFIX: &str = "dependency_";

/// Element id prefix of the hidden form field paired with a row.
pub const FIELD_ID_PREFIX: &str = "dependencies_";

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum number of descriptors in a single batch.
pub const MAX_BATCH_LENGTH: usize = 10000;

/// Maximum length of a trigger name, in bytes.
pub const MAX_NAME_LENGTH: usize = 2048;

/// Maximum length of a trigger id, in bytes (fits any unsigned 64-bit id).
pub const MAX_TRIGGER_ID_LENGTH: usize = 20;

// =============================================================================
// SNAPSHOT FORMAT
// =============================================================================

/// Magic bytes for the snapshot header.
pub const MAGIC_BYTES: &[u8; 4] = b"TDEP";

/// Current snapshot format version.
///
/// Increment this when making breaking changes to the snapshot layout.
pub const FORMAT_VERSION: u8 = 1;
