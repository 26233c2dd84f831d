/*
 * negotiate.rs: Driver 'canokey_minidriver' - CardAcquireContext and CardDeleteContext
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

#![allow(non_snake_case)]

use std::ptr::null_mut;
use std::slice::from_raw_parts;

use function_name::named;
use log::Level;

use cardmod_sys::types::DWORD;
use cardmod_sys::cardmod::{CARD_DATA, PCARD_DATA, CARD_DATA_VERSION_SEVEN, CARD_SECURE_KEY_INJECTION_NO_CARD_MODE,
                           wide_from_ptr};

use crate::constants_types::{DataPrivate, HostCallbacks, CacheCallbacks, CARD_DATA_MIN_VERSION,
                             CARD_DATA_MAX_VERSION, MAX_ATR_SIZE, ATR_TS_DIRECT, ATR_TS_INVERSE};
use crate::dispatch::{DispatchTable, Handler, Operation, unset_slots, slot_name_at};
use crate::error::{CardError, CardResult};
use crate::wrappers::dump_hex;

/// Checks what the host filled in, in exactly this order: the first defect wins.
/// Returns the host's allocator triple.
pub fn validate(card: &CARD_DATA, dwFlags: DWORD) -> CardResult<HostCallbacks> {
    if dwFlags & CARD_SECURE_KEY_INJECTION_NO_CARD_MODE != 0 {
        return Err(CardError::InvalidParameterVariant("CARD_SECURE_KEY_INJECTION_NO_CARD_MODE is not supported"));
    }
    if card.dwVersion < CARD_DATA_MIN_VERSION {
        return Err(CardError::RevisionMismatch("dwVersion is below CARD_DATA_VERSION_FOUR"));
    }
    if card.hSCardCtx == 0 || card.hScard == 0 {
        return Err(CardError::InvalidHandle("hSCardCtx or hScard is NULL"));
    }
    let (Some(alloc), Some(realloc), Some(free)) = (card.pfnCspAlloc, card.pfnCspReAlloc, card.pfnCspFree) else {
        return Err(CardError::InvalidParameter("pfnCspAlloc, pfnCspReAlloc or pfnCspFree is NULL"));
    };
    if card.pbAtr.is_null() || card.cbAtr == 0 {
        return Err(CardError::InvalidParameter("pbAtr is NULL or cbAtr is 0"));
    }
    if card.pwszCardName.is_null() {
        return Err(CardError::InvalidParameter("pwszCardName is NULL"));
    }
    Ok(HostCallbacks { alloc, realloc, free })
}

/// The cache triple goes into the session only complete
#[named]
fn import_cache(card: &CARD_DATA) -> Option<CacheCallbacks> {
    match (card.pfnCspCacheAddFile, card.pfnCspCacheLookupFile, card.pfnCspCacheDeleteFile) {
        (Some(add), Some(lookup), Some(delete)) => Some(CacheCallbacks { add, lookup, delete, context: card.pvCacheContext }),
        (None, None, None) => None,
        _ => {
            logif!(Level::Warn, function_name!(), line!(), "incomplete cache triple provided, caching won't be used");
            None
        }
    }
}

/// Returns what looks odd about an ATR (it never gets rejected for that)
#[must_use]
pub fn atr_anomaly(atr: &[u8]) -> Option<&'static str> {
    if atr.len() > MAX_ATR_SIZE {
        Some("ATR is longer than 33 bytes")
    }
    else if !matches!(atr.first(), Some(&(ATR_TS_DIRECT | ATR_TS_INVERSE))) {
        Some("ATR starts with an unusual TS byte")
    }
    else {
        None
    }
}

/// Debug dump of a validated descriptor
fn log_descriptor(f: &str, card: &CARD_DATA, atr: &[u8]) {
    if !crate::logging::is_active() {
        return;
    }
    let name = unsafe { wide_from_ptr(card.pwszCardName) }.map(String::from_utf16_lossy).unwrap_or_default();
    log3if!(f, line!(), "dwVersion: {}, ATR: {}, card name: '{}', hSCardCtx: 0x{:X}, hScard: 0x{:X}",
        card.dwVersion, dump_hex(atr), name, card.hSCardCtx, card.hScard);
    log3if!(f, line!(), "host provides cache: {}, pad: {}, unpad: {}", card.pfnCspCacheAddFile.is_some(),
        card.pfnCspPadData.is_some(), card.dwVersion >= CARD_DATA_VERSION_SEVEN && card.pfnCspUnpadData.is_some());
}

pub fn acquire_context(f: &str, pCardData: PCARD_DATA, dwFlags: DWORD) -> CardResult<()> {
    let Some(card) = (unsafe { pCardData.as_mut() }) else {
        return Err(CardError::InvalidParameter("pCardData is NULL"));
    };
    let callbacks = validate(card, dwFlags)?;

    let atr = unsafe { from_raw_parts(card.pbAtr, card.cbAtr as usize) };
    log_descriptor(f, card, atr);
    if let Some(anomaly) = atr_anomaly(atr) {
        logif!(Level::Warn, f, line!(), "{}: {}", anomaly, dump_hex(atr));
    }
    let version = card.dwVersion.min(CARD_DATA_MAX_VERSION);
    if version != card.dwVersion {
        log3if!(f, line!(), "dwVersion {} will be lowered to {}", card.dwVersion, version);
    }
    if !card.pvVendorSpecific.is_null() {
        logif!(Level::Warn, f, line!(), "pvVendorSpecific is already set: CardDeleteContext wasn't called? Overwriting");
    }

    let cache = import_cache(card);
    let unpad = if version >= CARD_DATA_VERSION_SEVEN { card.pfnCspUnpadData } else { None };
    /* the descriptor stays untouched until this succeeded */
    let block = DataPrivate::allocate(&callbacks)?;

    card.dwVersion = version;
    let table = DispatchTable::populate(card);
    for offset in unset_slots(card) {
        logif!(Level::Error, f, line!(), "integrity defect: CARD_DATA.{} (since CARD_DATA_VERSION {}) is NULL after populating",
            slot_name_at(offset), Operation::at(offset).map_or(0, Operation::since));
    }
    log3if!(f, line!(), "installed {} handlers and {} 'unsupported' stubs", table.count(Handler::Real),
        table.count(Handler::UnsupportedStub));

    unsafe { DataPrivate::new(callbacks, cache, version, unpad, table).store(block) };
    card.pvVendorSpecific = block;
    Ok(())
}

/*
 * Implements CARD_DATA function 'pfnCardDeleteContext'
 * Releases the vendor block through the host's free of this session. Calling it again is harmless.
 */
#[named]
pub extern "system" fn CardDeleteContext(pCardData: PCARD_DATA) -> DWORD
{
    let f = function_name!();
    log3ifc!(f, line!());
    log3ifr_ret!(f, line!(), delete_context(pCardData))
}

fn delete_context(pCardData: PCARD_DATA) -> CardResult<()> {
    let card = unsafe { pCardData.as_mut() }.ok_or(CardError::InvalidParameter("pCardData is NULL"))?;
    if let Some(dp) = DataPrivate::load(card) {
        dp.callbacks.free(card.pvVendorSpecific);
        card.pvVendorSpecific = null_mut();
    }
    Ok(())
}
