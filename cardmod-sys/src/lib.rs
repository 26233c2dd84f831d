//! Rust language: A binding to the Windows Smart Card Minidriver interface (cardmod.h), reduced to what a minidriver
//! implementation needs: the `CARD_DATA` context a Base CSP/KSP hands over, the function pointer types of every
//! member, the plain structs exchanged through it and the error codes it may return.
//!
//! This binding covers cardmod.h up to and including `CARD_DATA_VERSION_SEVEN`.
//!
//! Basically it's a pure '-sys'-binding, with these deviations:\
//! Function pointer members are declared `Option<unsafe extern "system" fn(..)>`, thus an unset member is `None`
//! and a `CARD_DATA` gets a `Default` impl with everything unset.\
//! Structs that a minidriver only ever passes along as pointers (`CARD_SIGNING_INFO` etc.) are declared opaque.\
//! The well-known property names are provided as NUL-terminated UTF-16 arrays built at compile time.
//!
//! Nothing here links to a library: the host process (e.g. Windows' Base CSP) calls into the minidriver, never the
//! other way round except through the callbacks it put into `CARD_DATA`. Therefore the binding builds and tests on
//! every platform; `extern "system"` resolves to the C calling convention where there is no stdcall.
//!
//! Run `cargo test test_slot_region_is_contiguous` to check the `CARD_DATA` layout for the target in use.

#![cfg_attr(feature = "cargo-clippy", warn(clippy::all))]
#![cfg_attr(feature = "cargo-clippy", warn(clippy::pedantic))]
#![cfg_attr(feature = "cargo-clippy", allow(clippy::doc_markdown))]
#![cfg_attr(feature = "cargo-clippy", allow(clippy::module_name_repetitions))]
#![allow(non_camel_case_types, non_snake_case, non_upper_case_globals)]

#[doc = " The CARD_DATA context, function pointer types, version constants and well-known names"]
#[allow(dead_code)]
pub mod cardmod;

#[doc = " Error codes and it's associated texts"]
#[allow(dead_code)]
pub mod errors;

#[doc = " Win32 scalar types and the plain structs of cardmod.h"]
#[allow(dead_code)]
pub mod types;
