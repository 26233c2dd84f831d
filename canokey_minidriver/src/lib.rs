/*
 * lib.rs: Driver 'canokey_minidriver' - main library file
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

/*
 Smart card minidriver for CanoKey, loaded by the Windows Base CSP / Smart Card KSP (msclmd.dll and friends).
 https://learn.microsoft.com/en-us/previous-versions/windows/hardware/design/dn631754(v=vs.85)  (Smart Card Minidriver Specification)
 https://www.canokeys.org/

 The host resolves exactly one symbol: CardAcquireContext. It hands over a CARD_DATA with its own services filled in and
 expects every operation slot filled in on return. All other entry points are reached through those slots only.
 There is no card I/O here yet: the entries answer from memory what a host asks before touching the card, anything
 else reports SCARD_E_UNSUPPORTED_FEATURE.
*/

#![cfg_attr(feature = "cargo-clippy", warn(clippy::all))]
#![cfg_attr(feature = "cargo-clippy", warn(clippy::pedantic))]
#![cfg_attr(feature = "cargo-clippy", allow(clippy::doc_markdown))]
#![cfg_attr(feature = "cargo-clippy", allow(clippy::module_name_repetitions))]
#![cfg_attr(feature = "cargo-clippy", allow(clippy::similar_names))]
#![cfg_attr(feature = "cargo-clippy", allow(clippy::not_unsafe_ptr_arg_deref))]
#![cfg_attr(feature = "cargo-clippy", allow(clippy::too_many_arguments))]

#![allow(non_snake_case)]

use function_name::named;

use cardmod_sys::types::DWORD;
use cardmod_sys::cardmod::PCARD_DATA;

#[macro_use]
mod macros;

pub mod config;
pub mod constants_types;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod negotiate;

mod credentials;
mod property;
mod stubs;
mod virtual_file;
mod wrappers;

pub use constants_types::{session_state, SessionState};
pub use error::{CardError, CardResult};

/// The one and only library export
///
/// Validates what the host filled into `*pCardData`, then fills in every operation slot and the vendor block.
/// On any failure nothing gets installed and nothing stays allocated, `dwVersion` included.
/// Calling it again on an already negotiated descriptor overwrites `pvVendorSpecific`: the previous vendor block
/// is not freed and leaks unless the host called `pfnCardDeleteContext` first.
///
/// @return SCARD_S_SUCCESS or the code of the first defect found
#[no_mangle]
#[named]
pub extern "system" fn CardAcquireContext(pCardData: PCARD_DATA, dwFlags: DWORD) -> DWORD
{
    logging::init_once();
    let f = function_name!();
    log3if!(f, line!(), "called with dwFlags: 0x{:X}", dwFlags);
    log3ifr_ret!(f, line!(), negotiate::acquire_context(f, pCardData, dwFlags))
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr::null_mut;
    use cardmod_sys::cardmod::{CARD_DATA, CARD_SECURE_KEY_INJECTION_NO_CARD_MODE};
    use cardmod_sys::errors::{ERROR_INVALID_PARAMETER, SCARD_E_INVALID_PARAMETER, ERROR_REVISION_MISMATCH};

    #[test]
    fn test_acquire_context_rejects() {
        assert_eq!(ERROR_INVALID_PARAMETER, CardAcquireContext(null_mut(), 0));
        assert_eq!(ERROR_INVALID_PARAMETER, CardAcquireContext(null_mut(), CARD_SECURE_KEY_INJECTION_NO_CARD_MODE));
        let mut card = CARD_DATA::default();
        assert_eq!(SCARD_E_INVALID_PARAMETER, CardAcquireContext(&mut card, 1));
        assert_eq!(ERROR_REVISION_MISMATCH, CardAcquireContext(&mut card, 0));
        /* nothing got installed */
        assert_eq!(SessionState::Uninitialized, session_state(&card));
        assert!(card.pfnCardDeleteContext.is_none());
    }
}
