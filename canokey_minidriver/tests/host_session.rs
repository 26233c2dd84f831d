/*
 * host_session.rs: Driver 'canokey_minidriver' - Plays the host: negotiate, call through CARD_DATA, tear down
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

use std::cell::Cell;
use std::ffi::CStr;
use std::ptr::{null, null_mut};

use cardmod_sys::types::{BYTE, DWORD, PBYTE, WCHAR, LPVOID, SIZE_T, PDWORD, PCARD_RSA_DECRYPT_INFO, TRUE,
                         CARD_CAPABILITIES};
use cardmod_sys::cardmod::{CARD_DATA, CP_CARD_GUID, CP_CARD_READ_ONLY, CP_CARD_SERIAL_NO};
use cardmod_sys::errors::{SCARD_S_SUCCESS, ERROR_INVALID_PARAMETER, ERROR_INSUFFICIENT_BUFFER,
                          SCARD_E_INVALID_HANDLE, SCARD_E_NO_MEMORY, SCARD_E_UNSUPPORTED_FEATURE};

use canokey_minidriver::{CardAcquireContext, session_state, SessionState};
use canokey_minidriver::constants_types::DataPrivate;
use canokey_minidriver::dispatch::unset_slots;

thread_local! {
    static ALLOCS  : Cell<usize> = const { Cell::new(0) };
    static FREES   : Cell<usize> = const { Cell::new(0) };
    static DECLINE : Cell<bool>  = const { Cell::new(false) };
}

fn bump(counter: &'static std::thread::LocalKey<Cell<usize>>) {
    counter.with(|c| c.set(c.get() + 1));
}

unsafe extern "system" fn host_alloc(size: SIZE_T) -> LPVOID {
    if DECLINE.with(Cell::get) {
        return null_mut();
    }
    bump(&ALLOCS);
    libc::malloc(size).cast()
}

unsafe extern "system" fn host_realloc(ptr: LPVOID, size: SIZE_T) -> LPVOID {
    libc::realloc(ptr.cast(), size).cast()
}

unsafe extern "system" fn host_free(ptr: LPVOID) {
    bump(&FREES);
    libc::free(ptr.cast());
}

unsafe extern "system" fn host_unpad(_info: PCARD_RSA_DECRYPT_INFO, _cb: DWORD, _pcb: PDWORD, _pb: PBYTE) -> DWORD {
    SCARD_S_SUCCESS
}

fn counts() -> (usize, usize) {
    (ALLOCS.with(Cell::get), FREES.with(Cell::get))
}

/// What a host owns for the duration of a session
struct Host {
    atr  : Vec<BYTE>,
    name : Vec<WCHAR>,
}

impl Host {
    fn new() -> Self {
        Self { atr: vec![0x3B, 0xF8, 0x13, 0x00, 0x00, 0x81, 0x31, 0xFE], name: "CanoKey Canary\0".encode_utf16().collect() }
    }

    fn card_data(&mut self, dwVersion: DWORD) -> CARD_DATA {
        CARD_DATA {
            dwVersion,
            pbAtr: self.atr.as_mut_ptr(),
            cbAtr: self.atr.len() as DWORD,
            pwszCardName: self.name.as_mut_ptr(),
            pfnCspAlloc: Some(host_alloc),
            pfnCspReAlloc: Some(host_realloc),
            pfnCspFree: Some(host_free),
            pfnCspUnpadData: Some(host_unpad),
            hSCardCtx: 0x1000,
            hScard: 0x2000,
            ..CARD_DATA::default()
        }
    }
}

fn read_file(card: &mut CARD_DATA, dir: Option<&CStr>, file: &CStr) -> (DWORD, PBYTE, DWORD) {
    let read = card.pfnCardReadFile.unwrap();
    let mut pb: PBYTE = null_mut();
    let mut cb: DWORD = 0xDEAD;
    let dir = dir.map_or(null_mut(), |d| d.as_ptr().cast_mut());
    let rv = unsafe { read(card, dir, file.as_ptr().cast_mut(), 0, &mut pb, &mut cb) };
    (rv, pb, cb)
}

#[test]
fn test_session_lifecycle() {
    let mut host = Host::new();
    let mut card = host.card_data(7);
    assert_eq!(SessionState::Uninitialized, session_state(&card));
    let (allocs, frees) = counts();

    assert_eq!(SCARD_S_SUCCESS, CardAcquireContext(&mut card, 0));
    assert_eq!(SessionState::Negotiated, session_state(&card));
    assert!(unset_slots(&card).is_empty());
    assert_eq!((allocs + 1, frees), counts());
    /* the host's own unpad service is left alone */
    assert!(card.pfnCspUnpadData.is_some());

    let mut caps = CARD_CAPABILITIES { dwVersion: 1, ..CARD_CAPABILITIES::default() };
    assert_eq!(SCARD_S_SUCCESS, unsafe { card.pfnCardQueryCapabilities.unwrap()(&mut card, &mut caps) });
    assert_eq!(TRUE, caps.fKeyGen);

    let delete = card.pfnCardDeleteContext.unwrap();
    assert_eq!(SCARD_S_SUCCESS, unsafe { delete(&mut card) });
    assert_eq!(SessionState::TornDown, session_state(&card));
    assert_eq!((allocs + 1, frees + 1), counts());
    /* again: no double free */
    assert_eq!(SCARD_S_SUCCESS, unsafe { delete(&mut card) });
    assert_eq!((allocs + 1, frees + 1), counts());

    /* the slots stay callable, but there is no session any more */
    assert_eq!(ERROR_INVALID_PARAMETER, read_file(&mut card, None, c"cardcf").0);
}

#[test]
fn test_properties_through_the_table() {
    let mut host = Host::new();
    let mut card = host.card_data(7);
    assert_eq!(SCARD_S_SUCCESS, CardAcquireContext(&mut card, 0));
    let get = card.pfnCardGetProperty.unwrap();
    let set = card.pfnCardSetProperty.unwrap();

    let mut buf = [0xAA_u8; 16];
    let mut len: DWORD = 0;
    assert_eq!(ERROR_INSUFFICIENT_BUFFER, unsafe { get(&mut card, CP_CARD_GUID.as_ptr(), buf.as_mut_ptr(), 8, &mut len, 0) });
    assert_eq!(16, len);
    assert_eq!([0xAA_u8; 16], buf);
    assert_eq!(SCARD_S_SUCCESS, unsafe { get(&mut card, CP_CARD_GUID.as_ptr(), buf.as_mut_ptr(), 16, &mut len, 0) });
    assert_eq!([0_u8; 16], buf);

    assert_eq!(SCARD_S_SUCCESS, unsafe { get(&mut card, CP_CARD_READ_ONLY.as_ptr(), buf.as_mut_ptr(), 16, &mut len, 0) });
    assert_eq!(4, len);
    assert_eq!(SCARD_E_UNSUPPORTED_FEATURE,
               unsafe { get(&mut card, CP_CARD_SERIAL_NO.as_ptr(), buf.as_mut_ptr(), 16, &mut len, 0) });
    assert_eq!(SCARD_E_UNSUPPORTED_FEATURE, unsafe { set(&mut card, CP_CARD_GUID.as_ptr(), buf.as_mut_ptr(), 16, 0) });
    assert_eq!(ERROR_INVALID_PARAMETER, unsafe { get(&mut card, null(), buf.as_mut_ptr(), 16, &mut len, 0) });

    assert_eq!(SCARD_S_SUCCESS, unsafe { card.pfnCardDeleteContext.unwrap()(&mut card) });
}

#[test]
fn test_virtual_files_through_the_table() {
    let mut host = Host::new();
    let mut card = host.card_data(7);
    assert_eq!(SCARD_S_SUCCESS, CardAcquireContext(&mut card, 0));
    let (allocs, _) = counts();

    let (rv, pb, cb) = read_file(&mut card, None, c"cardcf");
    assert_eq!((SCARD_S_SUCCESS, 6), (rv, cb));
    assert!(!pb.is_null());
    assert_eq!(allocs + 1, counts().0);
    assert_eq!([0_u8; 6], unsafe { std::slice::from_raw_parts(pb, 6) });
    /* the buffer is the host's */
    unsafe { host_free(pb.cast()) };

    assert_eq!((SCARD_S_SUCCESS, null_mut(), 0), read_file(&mut card, Some(c"mscp"), c"cmapfile"));
    assert_eq!(SCARD_E_UNSUPPORTED_FEATURE, read_file(&mut card, Some(c"x"), c"y").0);

    DECLINE.with(|d| d.set(true));
    assert_eq!(SCARD_E_NO_MEMORY, read_file(&mut card, None, c"cardcf").0);
    DECLINE.with(|d| d.set(false));

    assert_eq!(SCARD_S_SUCCESS, unsafe { card.pfnCardDeleteContext.unwrap()(&mut card) });
}

#[test]
fn test_stubs_through_the_table() {
    let mut host = Host::new();
    let mut card = host.card_data(7);
    assert_eq!(SCARD_S_SUCCESS, CardAcquireContext(&mut card, 0));
    assert_eq!(SCARD_E_UNSUPPORTED_FEATURE, unsafe { card.pfnCardRSADecrypt.unwrap()(&mut card, null_mut()) });
    assert_eq!(SCARD_E_UNSUPPORTED_FEATURE, unsafe { card.pfnCardDestroyKey.unwrap()(&mut card, 0) });
    assert_eq!(ERROR_INVALID_PARAMETER, unsafe { card.pfnCardDeleteContainer.unwrap()(null_mut(), 0, 0) });
    assert_eq!(SCARD_S_SUCCESS, unsafe { card.pfnCardDeleteContext.unwrap()(&mut card) });
}

#[test]
fn test_version_negotiation() {
    let mut host = Host::new();
    let mut card = host.card_data(9);
    assert_eq!(SCARD_S_SUCCESS, CardAcquireContext(&mut card, 0));
    assert_eq!(7, card.dwVersion);
    assert!(DataPrivate::load(&card).unwrap().unpad().is_some());
    assert_eq!(SCARD_S_SUCCESS, unsafe { card.pfnCardDeleteContext.unwrap()(&mut card) });

    /* below 7 the host's unpad isn't imported, still every slot gets filled */
    let mut card = host.card_data(6);
    assert_eq!(SCARD_S_SUCCESS, CardAcquireContext(&mut card, 0));
    assert_eq!(6, card.dwVersion);
    let dp = DataPrivate::load(&card).unwrap();
    assert!(dp.unpad().is_none());
    assert_eq!(6, dp.version);
    assert!(card.pfnCardCreateContainerEx.is_some());
    assert_eq!(SCARD_S_SUCCESS, unsafe { card.pfnCardDeleteContext.unwrap()(&mut card) });
}

#[test]
fn test_rejected_descriptor_allocates_nothing() {
    let mut host = Host::new();
    let mut card = CARD_DATA { hScard: 0, ..host.card_data(7) };
    let before = counts();
    assert_eq!(SCARD_E_INVALID_HANDLE, CardAcquireContext(&mut card, 0));
    assert_eq!(before, counts());
    assert_eq!(SessionState::Uninitialized, session_state(&card));

    let mut card = host.card_data(7);
    DECLINE.with(|d| d.set(true));
    assert_eq!(SCARD_E_NO_MEMORY, CardAcquireContext(&mut card, 0));
    DECLINE.with(|d| d.set(false));
    assert_eq!(SessionState::Uninitialized, session_state(&card));
}

#[test]
fn test_declined_memory_keeps_host_version() {
    let mut host = Host::new();
    let mut card = host.card_data(9);
    DECLINE.with(|d| d.set(true));
    assert_eq!(SCARD_E_NO_MEMORY, CardAcquireContext(&mut card, 0));
    DECLINE.with(|d| d.set(false));
    assert_eq!(9, card.dwVersion);
    assert!(card.pvVendorSpecific.is_null());
    assert!(card.pfnCardDeleteContext.is_none());

    /* a later attempt negotiates down as usual */
    assert_eq!(SCARD_S_SUCCESS, CardAcquireContext(&mut card, 0));
    assert_eq!(7, card.dwVersion);
    assert_eq!(SCARD_S_SUCCESS, unsafe { card.pfnCardDeleteContext.unwrap()(&mut card) });
}

#[test]
fn test_independent_sessions() {
    let mut host_a = Host::new();
    let mut host_b = Host::new();
    let mut a = host_a.card_data(7);
    let mut b = host_b.card_data(6);
    assert_eq!(SCARD_S_SUCCESS, CardAcquireContext(&mut a, 0));
    assert_eq!(SCARD_S_SUCCESS, CardAcquireContext(&mut b, 0));
    assert_ne!(a.pvVendorSpecific, b.pvVendorSpecific);

    assert_eq!(SCARD_S_SUCCESS, unsafe { a.pfnCardDeleteContext.unwrap()(&mut a) });
    assert_eq!(SessionState::TornDown, session_state(&a));
    assert_eq!(SessionState::Negotiated, session_state(&b));
    let (rv, pb, cb) = read_file(&mut b, Some(c""), c"cardcf");
    assert_eq!((SCARD_S_SUCCESS, 6), (rv, cb));
    unsafe { host_free(pb.cast()) };
    assert_eq!(SCARD_S_SUCCESS, unsafe { b.pfnCardDeleteContext.unwrap()(&mut b) });
}
