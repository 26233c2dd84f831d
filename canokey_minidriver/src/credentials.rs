/*
 * credentials.rs: Driver 'canokey_minidriver' - Containers, keys and PIN authentication entry points
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
 These entries are wired into CARD_DATA and check their arguments, but nothing behind them talks to the card (yet):
 after the checks they report 'unsupported'.
*/

#![allow(non_snake_case)]

use function_name::named;

use cardmod_sys::types::{BYTE, DWORD, PBYTE, PDWORD, LPWSTR, PIN_ID, PIN_SET, PCONTAINER_INFO, PCARD_SIGNING_INFO,
                         PCARD_KEY_SIZES};
use cardmod_sys::cardmod::PCARD_DATA;

use crate::error::{CardError, CardResult, require};

fn context(pCardData: PCARD_DATA) -> CardResult<()> {
    require(pCardData, "pCardData is NULL")
}

/*
 * Implements CARD_DATA function 'pfnCardGetContainerInfo'
 */
#[named]
pub extern "system" fn CardGetContainerInfo(pCardData: PCARD_DATA, bContainerIndex: BYTE, dwFlags: DWORD,
                                            pContainerInfo: PCONTAINER_INFO) -> DWORD
{
    let f = function_name!();
    log3if!(f, line!(), "called with bContainerIndex: {}, dwFlags: 0x{:X}", bContainerIndex, dwFlags);
    let res = context(pCardData)
        .and_then(|()| require(pContainerInfo, "pContainerInfo is NULL"))
        .and(Err(CardError::Unsupported("no key container")));
    log3ifr_ret!(f, line!(), res)
}

/*
 * Implements CARD_DATA function 'pfnCardSignData'
 */
#[named]
pub extern "system" fn CardSignData(pCardData: PCARD_DATA, pInfo: PCARD_SIGNING_INFO) -> DWORD
{
    let f = function_name!();
    log3ifc!(f, line!());
    let res = context(pCardData)
        .and_then(|()| require(pInfo, "pInfo is NULL"))
        .and(Err(CardError::Unsupported("signing")));
    log3ifr_ret!(f, line!(), res)
}

/*
 * Implements CARD_DATA function 'pfnCardQueryKeySizes'
 */
#[named]
pub extern "system" fn CardQueryKeySizes(pCardData: PCARD_DATA, dwKeySpec: DWORD, dwFlags: DWORD,
                                         pKeySizes: PCARD_KEY_SIZES) -> DWORD
{
    let f = function_name!();
    log3if!(f, line!(), "called with dwKeySpec: 0x{:X}, dwFlags: 0x{:X}", dwKeySpec, dwFlags);
    let res = context(pCardData)
        .and_then(|()| require(pKeySizes, "pKeySizes is NULL"))
        .and(Err(CardError::Unsupported("key sizes")));
    log3ifr_ret!(f, line!(), res)
}

/*
 * Implements CARD_DATA function 'pfnCardAuthenticatePin'
 * The PIN itself never gets logged
 */
#[named]
pub extern "system" fn CardAuthenticatePin(pCardData: PCARD_DATA, pwszUserId: LPWSTR, pbPin: PBYTE, cbPin: DWORD,
                                           pcAttemptsRemaining: PDWORD) -> DWORD
{
    let f = function_name!();
    log3if!(f, line!(), "called with cbPin: {}", cbPin);
    let _ = pcAttemptsRemaining;
    let res = context(pCardData)
        .and_then(|()| require(pwszUserId, "pwszUserId is NULL"))
        .and_then(|()| require(pbPin, "pbPin is NULL"))
        .and(Err(CardError::Unsupported("PIN verification")));
    log3ifr_ret!(f, line!(), res)
}

/*
 * Implements CARD_DATA function 'pfnCardAuthenticateEx'
 */
#[named]
pub extern "system" fn CardAuthenticateEx(pCardData: PCARD_DATA, PinId: PIN_ID, dwFlags: DWORD, pbPinData: PBYTE,
                                          cbPinData: DWORD, ppbSessionPin: *mut PBYTE, pcbSessionPin: PDWORD,
                                          pcAttemptsRemaining: PDWORD) -> DWORD
{
    let f = function_name!();
    log3if!(f, line!(), "called with PinId: {}, dwFlags: 0x{:X}, cbPinData: {}", PinId, dwFlags, cbPinData);
    let _ = (pbPinData, ppbSessionPin, pcbSessionPin, pcAttemptsRemaining);
    log3ifr_ret!(f, line!(), context(pCardData).and(Err(CardError::Unsupported("PIN verification"))))
}

/*
 * Implements CARD_DATA function 'pfnCardDeauthenticateEx'
 */
#[named]
pub extern "system" fn CardDeauthenticateEx(pCardData: PCARD_DATA, PinId: PIN_SET, dwFlags: DWORD) -> DWORD
{
    let f = function_name!();
    log3if!(f, line!(), "called with PinId (set): 0x{:02X}, dwFlags: 0x{:X}", PinId, dwFlags);
    log3ifr_ret!(f, line!(), context(pCardData).and(Err(CardError::Unsupported("deauthentication"))))
}
