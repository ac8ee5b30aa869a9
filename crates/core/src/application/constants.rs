// Pipeline constants (no magic values at call sites)

/// Maximum background-edit attempts per request
pub const MAX_EDIT_ATTEMPTS: u32 = 3;

/// Base backoff delay between edit attempts (actual delay = base x attempt)
pub const EDIT_BACKOFF_BASE_MS: i64 = 2_000;

/// Pre-normalization bounding box edge (pixels). Never enlarges.
pub const NORMALIZE_MAX_EDGE: u32 = 1_200;

/// JPEG quality for the pre-normalized intermediate
pub const NORMALIZE_JPEG_QUALITY: u8 = 90;

/// JPEG quality for the final photo
pub const FINAL_JPEG_QUALITY: u8 = 95;

/// Target photo physical width (mm)
pub const PHOTO_WIDTH_MM: f64 = 35.0;

/// Target photo physical height (mm)
pub const PHOTO_HEIGHT_MM: f64 = 45.0;

/// Target photo resolution (dots per inch)
pub const PHOTO_DPI: u32 = 300;

/// Default instruction sent to the background editor
pub const DEFAULT_BACKGROUND_INSTRUCTION: &str = "Replace the background of this portrait \
photo with a plain, evenly lit white studio background suitable for an ID photo. Keep the \
person, hair edges and clothing exactly as they are.";
