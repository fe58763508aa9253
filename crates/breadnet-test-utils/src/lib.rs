//! Shared test support: a temp-dir [`sandbox::Sandbox`] for driving the
//! `breadnet` binary, and canned detection documents in [`fixtures`].

pub mod fixtures;
pub mod sandbox;

pub use insta;

/// Macro to create a snapshot assertion with a clean interface
#[macro_export]
macro_rules! assert_snapshot {
    ($content:expr, @$snapshot:literal) => {
        $crate::insta::assert_snapshot!($content, @$snapshot)
    };
    ($name:expr, $content:expr) => {
        $crate::insta::assert_snapshot!($name, $content)
    };
}
