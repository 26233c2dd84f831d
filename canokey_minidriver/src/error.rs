/*
 * error.rs: Driver 'canokey_minidriver' - The closed set of outcomes an entry point may report
 *
 * Copyright (C) 2019-  Carsten Blüggel <bluecars@posteo.eu>
 *
 * This library is free software; you can redistribute it and/or
 * modify it under the terms of the GNU Lesser General Public
 * License as published by the Free Software Foundation; either
 * version 2.1 of the License, or (at your option) any later version.
 *
 * This library is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
 * Lesser General Public License for more details.
 *
 * You should have received a copy of the GNU Lesser General Public
 * License along with this library; if not, write to the Free Software
 * Foundation, 51 Franklin Street, Fifth Floor  Boston, MA 02110-1335  USA
 */

use thiserror::Error;

use cardmod_sys::types::DWORD;
use cardmod_sys::errors::{ERROR_INVALID_PARAMETER, SCARD_E_INVALID_PARAMETER, ERROR_REVISION_MISMATCH,
                          SCARD_E_INVALID_HANDLE, ERROR_INSUFFICIENT_BUFFER, SCARD_E_NO_MEMORY,
                          SCARD_E_UNSUPPORTED_FEATURE};

/// Every failure an entry point reports; the `&'static str` is the reason that goes into the log
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CardError {
    /// A required argument is null or malformed
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// The argument is understood, but its value is refused
    #[error("parameter refused: {0}")]
    InvalidParameterVariant(&'static str),

    #[error("revision mismatch: {0}")]
    RevisionMismatch(&'static str),

    #[error("invalid handle: {0}")]
    InvalidHandle(&'static str),

    /// The required size was already reported to the caller
    #[error("buffer too small, {required} bytes required")]
    InsufficientBuffer { required: DWORD },

    #[error("host allocator failed for {0} bytes")]
    OutOfMemory(usize),

    #[error("not supported: {0}")]
    Unsupported(&'static str),
}

pub type CardResult<T> = Result<T, CardError>;

impl CardError {
    /// The result code the host gets to see
    #[must_use]
    pub const fn code(&self) -> DWORD {
        match self {
            Self::InvalidParameter(_)        => ERROR_INVALID_PARAMETER,
            Self::InvalidParameterVariant(_) => SCARD_E_INVALID_PARAMETER,
            Self::RevisionMismatch(_)        => ERROR_REVISION_MISMATCH,
            Self::InvalidHandle(_)           => SCARD_E_INVALID_HANDLE,
            Self::InsufficientBuffer { .. }  => ERROR_INSUFFICIENT_BUFFER,
            Self::OutOfMemory(_)             => SCARD_E_NO_MEMORY,
            Self::Unsupported(_)             => SCARD_E_UNSUPPORTED_FEATURE,
        }
    }
}

/// `Err(InvalidParameter(why))` if `ptr` is null
pub fn require<T>(ptr: *const T, why: &'static str) -> CardResult<()> {
    if ptr.is_null() { Err(CardError::InvalidParameter(why)) } else { Ok(()) }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr::null;

    #[test]
    fn test_code() {
        assert_eq!(87,          CardError::InvalidParameter("x").code());
        assert_eq!(0x8010_0004, CardError::InvalidParameterVariant("x").code());
        assert_eq!(1306,        CardError::RevisionMismatch("x").code());
        assert_eq!(0x8010_0003, CardError::InvalidHandle("x").code());
        assert_eq!(122,         CardError::InsufficientBuffer { required: 16 }.code());
        assert_eq!(0x8010_0006, CardError::OutOfMemory(6).code());
        assert_eq!(0x8010_0022, CardError::Unsupported("x").code());
    }

    #[test]
    fn test_display_carries_reason() {
        assert_eq!("invalid parameter: pCardData is NULL", CardError::InvalidParameter("pCardData is NULL").to_string());
        assert_eq!("buffer too small, 16 bytes required", CardError::InsufficientBuffer { required: 16 }.to_string());
    }

    #[test]
    fn test_require() {
        let x = 5_u8;
        assert_eq!(Ok(()), require(&x, "x"));
        assert_eq!(Err(CardError::InvalidParameter("null")), require(null::<u8>(), "null"));
    }
}
