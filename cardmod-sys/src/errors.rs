/*
 * errors.rs: Result codes a minidriver hands back to the Base CSP / KSP
 *
 * Copyright (C) 2019-  for the binding: Carsten Blüggel <bluecars@posteo.eu>
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

use crate::types::DWORD;

/// "The operation completed successfully"
pub const SCARD_S_SUCCESS             : DWORD = 0;

/* winerror.h */
/// "Not enough memory resources are available to process this command"
pub const ERROR_NOT_ENOUGH_MEMORY     : DWORD = 8;
/// "The parameter is incorrect"
pub const ERROR_INVALID_PARAMETER     : DWORD = 87;
/// "The data area passed to a system call is too small"
pub const ERROR_INSUFFICIENT_BUFFER   : DWORD = 122;
/// "Indicates two revision levels are incompatible"
pub const ERROR_REVISION_MISMATCH     : DWORD = 1306;

/* SCARD_E_* from winerror.h, facility 0x10 */
/// "An internal consistency check failed"
pub const SCARD_F_INTERNAL_ERROR      : DWORD = 0x8010_0001;
/// "The supplied handle was invalid"
pub const SCARD_E_INVALID_HANDLE      : DWORD = 0x8010_0003;
/// "One or more of the supplied parameters could not be properly interpreted"
pub const SCARD_E_INVALID_PARAMETER   : DWORD = 0x8010_0004;
/// "Not enough memory available to complete this command"
pub const SCARD_E_NO_MEMORY           : DWORD = 0x8010_0006;
/// "The data buffer to receive returned data is too small for the returned data"
pub const SCARD_E_INSUFFICIENT_BUFFER : DWORD = 0x8010_0008;
/// "This smart card does not support the requested feature"
pub const SCARD_E_UNSUPPORTED_FEATURE : DWORD = 0x8010_0022;
/// "The identified file does not exist in the smart card"
pub const SCARD_E_FILE_NOT_FOUND      : DWORD = 0x8010_002C;
/// "The identified directory does not exist in the smart card"
pub const SCARD_E_DIR_NOT_FOUND       : DWORD = 0x8010_0023;
/// "The card cannot be accessed because the wrong PIN was presented"
pub const SCARD_W_WRONG_CHV           : DWORD = 0x8010_006B;

/// Returns the text associated with `code`, the counterpart of `FormatMessage` for the codes above.
/// Unknown codes get "Unknown error".
#[must_use]
pub fn md_strerror(code: DWORD) -> &'static str {
    match code {
        SCARD_S_SUCCESS             => "Success",
        ERROR_NOT_ENOUGH_MEMORY     => "Not enough memory",
        ERROR_INVALID_PARAMETER     => "The parameter is incorrect",
        ERROR_INSUFFICIENT_BUFFER   => "The data area passed is too small",
        ERROR_REVISION_MISMATCH     => "Incompatible revision levels",
        SCARD_F_INTERNAL_ERROR      => "Internal consistency check failed",
        SCARD_E_INVALID_HANDLE      => "Invalid handle",
        SCARD_E_INVALID_PARAMETER   => "Parameter recognized, but refused",
        SCARD_E_NO_MEMORY           => "Not enough memory available",
        SCARD_E_INSUFFICIENT_BUFFER => "Receive buffer too small",
        SCARD_E_UNSUPPORTED_FEATURE => "Feature not supported by this card",
        SCARD_E_FILE_NOT_FOUND      => "File not found",
        SCARD_E_DIR_NOT_FOUND       => "Directory not found",
        SCARD_W_WRONG_CHV           => "Wrong PIN",
        _                           => "Unknown error",
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_md_strerror() {
        assert_eq!("Success", md_strerror(SCARD_S_SUCCESS));
        assert_eq!("Feature not supported by this card", md_strerror(SCARD_E_UNSUPPORTED_FEATURE));
        assert_eq!("Unknown error", md_strerror(0xDEAD_BEEF));
        assert_ne!(md_strerror(ERROR_INVALID_PARAMETER), md_strerror(SCARD_E_INVALID_PARAMETER));
    }
}
