//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [base] Section Defaults
// ============================================================================

pub mod base {
    pub fn url() -> String {
        "http://localhost:3000".into()
    }

    pub fn language() -> String {
        "en-US".into()
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn content() -> PathBuf {
        "contents".into()
    }

    pub fn types() -> PathBuf {
        "types".into()
    }

    pub fn pipelines() -> PathBuf {
        "pipelines".into()
    }

    pub fn output() -> PathBuf {
        "dist".into()
    }

    pub mod date {
        pub fn input() -> String {
            "%Y-%m-%d".into()
        }

        pub fn timezone() -> String {
            "+00:00".into()
        }
    }
}
