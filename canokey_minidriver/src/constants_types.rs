/*
 * constants_types.rs: Driver 'canokey_minidriver' - Constants and the types that hang on CARD_DATA
 *
 * Copyright (C) 2019  Carsten Blüggel <bluecars@posteo.eu>
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

use std::mem::size_of;

use cardmod_sys::types::{BYTE, DWORD, PBYTE, PDWORD, PVOID, LPVOID, LPWSTR, SIZE_T, PCARD_RSA_DECRYPT_INFO};
use cardmod_sys::cardmod::{CARD_DATA, CARD_DATA_VERSION_FOUR, CARD_DATA_VERSION_SEVEN, CARD_GUID_LEN};

use crate::dispatch::DispatchTable;
use crate::error::{CardError, CardResult};

/* CARD_DATA.dwVersion: accepted range; anything newer gets lowered to the max. */
pub const CARD_DATA_MIN_VERSION : DWORD = CARD_DATA_VERSION_FOUR;
pub const CARD_DATA_MAX_VERSION : DWORD = CARD_DATA_VERSION_SEVEN;

/// CanoKey doesn't personalize a card GUID (yet)
pub const CARD_GUID : [BYTE; CARD_GUID_LEN] = [0; CARD_GUID_LEN];

/* ISO 7816-3 ATR */
pub const MAX_ATR_SIZE     : usize = 33;
pub const ATR_TS_DIRECT    : BYTE = 0x3B;
pub const ATR_TS_INVERSE   : BYTE = 0x3F;

/// The allocator triple a host must provide; only ever constructed from non-null pointers
#[derive(Debug, Copy, Clone)]
pub struct HostCallbacks {
    pub alloc   : unsafe extern "system" fn(Size: SIZE_T) -> LPVOID,
    pub realloc : unsafe extern "system" fn(Address: LPVOID, Size: SIZE_T) -> LPVOID,
    pub free    : unsafe extern "system" fn(Address: LPVOID),
}

impl HostCallbacks {
    /// Allocates `size` bytes through the host, `OutOfMemory` if it declines
    pub fn alloc(&self, size: usize) -> CardResult<LPVOID> {
        let ptr = unsafe { (self.alloc)(size) };
        if ptr.is_null() { Err(CardError::OutOfMemory(size)) } else { Ok(ptr) }
    }

    /// Allocates through the host and fills with `data`; the buffer belongs to the host afterwards
    pub fn alloc_copy(&self, data: &[u8]) -> CardResult<PBYTE> {
        let ptr = self.alloc(data.len())?.cast::<u8>();
        unsafe { std::ptr::copy_nonoverlapping(data.as_ptr(), ptr, data.len()) };
        Ok(ptr)
    }

    pub fn free(&self, ptr: LPVOID) {
        if !ptr.is_null() {
            unsafe { (self.free)(ptr) };
        }
    }
}

/// The optional cache triple, imported only if the host provides all of it
#[derive(Debug, Copy, Clone)]
pub struct CacheCallbacks {
    pub add     : unsafe extern "system" fn(pvCacheContext: PVOID, wszTag: LPWSTR, dwFlags: DWORD,
                                            pbData: PBYTE, cbData: DWORD) -> DWORD,
    pub lookup  : unsafe extern "system" fn(pvCacheContext: PVOID, wszTag: LPWSTR, dwFlags: DWORD,
                                            ppbData: *mut PBYTE, pcbData: PDWORD) -> DWORD,
    pub delete  : unsafe extern "system" fn(pvCacheContext: PVOID, wszTag: LPWSTR, dwFlags: DWORD) -> DWORD,
    pub context : PVOID,
}

pub type UnpadFn = unsafe extern "system" fn(pRSADecryptInfo: PCARD_RSA_DECRYPT_INFO, cbUnpaddedData: DWORD,
                                             pcbUnpaddedData: PDWORD, pbUnpaddedData: PBYTE) -> DWORD;

/// Lives in host memory at `CARD_DATA.pvVendorSpecific` from `CardAcquireContext` until `CardDeleteContext`.
/// Everything an entry point needs from the session is in here, nothing is process global.
/// Plain old data: it is written to and read from host memory bytewise (unaligned), never dropped.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct DataPrivate {
    pub callbacks : HostCallbacks,
    pub cache     : Option<CacheCallbacks>,
    pub version   : DWORD, // negotiated CARD_DATA.dwVersion
    unpad         : Option<UnpadFn>,
    pub table     : DispatchTable,
}

impl DataPrivate {
    #[must_use]
    pub fn new(callbacks: HostCallbacks, cache: Option<CacheCallbacks>, version: DWORD, unpad: Option<UnpadFn>,
               table: DispatchTable) -> Self {
        Self { callbacks, cache, version, unpad: if version >= CARD_DATA_VERSION_SEVEN { unpad } else { None }, table }
    }

    /// The host's unpad service; only a CARD_DATA_VERSION_SEVEN host has one
    #[must_use]
    pub fn unpad(&self) -> Option<UnpadFn> {
        if self.version >= CARD_DATA_VERSION_SEVEN { self.unpad } else { None }
    }

    /// Host allocation that will take a `DataPrivate`
    pub fn allocate(callbacks: &HostCallbacks) -> CardResult<PVOID> {
        callbacks.alloc(size_of::<Self>())
    }

    /// Moves `self` into `block`
    ///
    /// # Safety
    /// `block` must come from `DataPrivate::allocate` and not be freed yet
    pub unsafe fn store(self, block: PVOID) {
        block.cast::<Self>().write_unaligned(self);
    }

    /// Copy of the session's vendor block, `None` if there is no (more) session
    #[must_use]
    pub fn load(card: &CARD_DATA) -> Option<Self> {
        if card.pvVendorSpecific.is_null() {
            None
        }
        else {
            Some(unsafe { card.pvVendorSpecific.cast::<Self>().read_unaligned() })
        }
    }
}

/// Where a `CARD_DATA` is in its life
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Never successfully passed `CardAcquireContext`
    Uninitialized,
    Negotiated,
    /// `CardDeleteContext` released the vendor block; the slots are still populated
    TornDown,
}

#[must_use]
pub fn session_state(card: &CARD_DATA) -> SessionState {
    if !card.pvVendorSpecific.is_null() {
        SessionState::Negotiated
    }
    else if card.pfnCardDeleteContext.is_some() {
        SessionState::TornDown
    }
    else {
        SessionState::Uninitialized
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr::null_mut;

    unsafe extern "system" fn no_alloc(_size: SIZE_T) -> LPVOID { null_mut() }
    unsafe extern "system" fn no_realloc(_ptr: LPVOID, _size: SIZE_T) -> LPVOID { null_mut() }
    unsafe extern "system" fn no_free(_ptr: LPVOID) {}
    unsafe extern "system" fn unpad(_info: PCARD_RSA_DECRYPT_INFO, _cb: DWORD, _pcb: PDWORD, _pb: PBYTE) -> DWORD { 0 }

    fn callbacks() -> HostCallbacks {
        HostCallbacks { alloc: no_alloc, realloc: no_realloc, free: no_free }
    }

    #[test]
    fn test_unpad_is_version_gated() {
        let dp = DataPrivate::new(callbacks(), None, 6, Some(unpad), DispatchTable::default());
        assert!(dp.unpad().is_none());
        let dp = DataPrivate::new(callbacks(), None, 7, Some(unpad), DispatchTable::default());
        assert!(dp.unpad().is_some());
        let dp = DataPrivate::new(callbacks(), None, 7, None, DispatchTable::default());
        assert!(dp.unpad().is_none());
    }

    #[test]
    fn test_allocation_declined_by_host() {
        assert_eq!(Err(CardError::OutOfMemory(size_of::<DataPrivate>())), DataPrivate::allocate(&callbacks()));
        assert_eq!(Err(CardError::OutOfMemory(6)), callbacks().alloc_copy(&[0; 6]));
    }

    #[test]
    fn test_store_load() {
        let mut block = [0_u8; size_of::<DataPrivate>() + 1];
        let mut card = CARD_DATA::default();
        /* deliberately misaligned */
        card.pvVendorSpecific = unsafe { block.as_mut_ptr().add(1) }.cast();
        unsafe { DataPrivate::new(callbacks(), None, 6, Some(unpad), DispatchTable::default()).store(card.pvVendorSpecific) };
        let dp = DataPrivate::load(&card).unwrap();
        assert_eq!(6, dp.version);
        assert!(dp.cache.is_none());
        assert!(dp.unpad().is_none());
        assert_eq!(DispatchTable::default(), dp.table);
    }

    #[test]
    fn test_session_state() {
        let mut card = CARD_DATA::default();
        assert_eq!(SessionState::Uninitialized, session_state(&card));
        assert!(DataPrivate::load(&card).is_none());
        let mut block = 0_u64;
        card.pvVendorSpecific = (&mut block as *mut u64).cast();
        assert_eq!(SessionState::Negotiated, session_state(&card));
        card.pvVendorSpecific = null_mut();
        card.pfnCardDeleteContext = Some(crate::negotiate::CardDeleteContext);
        assert_eq!(SessionState::TornDown, session_state(&card));
    }
}
