/*
 * virtual_file.rs: Driver 'canokey_minidriver' - The pseudo files a host reads before any card I/O
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

use std::ffi::CStr;
use std::mem::size_of;
use std::ptr::null_mut;

use function_name::named;

use cardmod_sys::types::{DWORD, PBYTE, PDWORD, LPDWORD, LPSTR, CARD_CACHE_FILE_FORMAT, PCARD_FILE_INFO,
                         PCARD_FREE_SPACE_INFO};
use cardmod_sys::cardmod::{PCARD_DATA, szBASE_CSP_DIR, szCACHE_FILE, szCONTAINER_MAP_FILE};

use crate::constants_types::DataPrivate;
use crate::error::{CardError, CardResult, require};

/// Files answered from memory; everything else would need card I/O
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VirtualFile {
    /// `cardcf` in the root: freshness counters, always zero since nothing gets cached
    CacheFile,
    /// `mscp/cmapfile`: no container exists, thus empty
    ContainerMap,
}

impl VirtualFile {
    /// `dir` None or empty denotes the root directory
    #[must_use]
    pub fn lookup(dir: Option<&CStr>, file: &CStr) -> Option<Self> {
        match dir.filter(|d| !d.is_empty()) {
            None if file == szCACHE_FILE => Some(Self::CacheFile),
            Some(d) if d == szBASE_CSP_DIR && file == szCONTAINER_MAP_FILE => Some(Self::ContainerMap),
            _ => None,
        }
    }

    /// The content's length in bytes
    #[must_use]
    pub const fn content_len(self) -> usize {
        match self {
            Self::CacheFile => size_of::<CARD_CACHE_FILE_FORMAT>(),
            Self::ContainerMap => 0,
        }
    }
}

/// # Safety
/// `psz` must be null or point to a NUL-terminated string that outlives `'a`
unsafe fn c_str<'a>(psz: LPSTR) -> Option<&'a CStr> {
    if psz.is_null() { None } else { Some(CStr::from_ptr(psz)) }
}

/*
 * Implements CARD_DATA function 'pfnCardReadFile'
 * The buffer returned via ppbData is allocated by the host's allocator and belongs to the host
 */
#[named]
pub extern "system" fn CardReadFile(pCardData: PCARD_DATA, pszDirectoryName: LPSTR, pszFileName: LPSTR, dwFlags: DWORD,
                                    ppbData: *mut PBYTE, pcbData: PDWORD) -> DWORD
{
    let f = function_name!();
    log3ifc!(f, line!());
    log3ifr_ret!(f, line!(), read_file(f, pCardData, pszDirectoryName, pszFileName, dwFlags, ppbData, pcbData))
}

fn read_file(f: &str, pCardData: PCARD_DATA, pszDirectoryName: LPSTR, pszFileName: LPSTR, dwFlags: DWORD,
             ppbData: *mut PBYTE, pcbData: PDWORD) -> CardResult<()> {
    let card = unsafe { pCardData.as_ref() }.ok_or(CardError::InvalidParameter("pCardData is NULL"))?;
    let file = unsafe { c_str(pszFileName) }.ok_or(CardError::InvalidParameter("pszFileName is NULL"))?;
    require(ppbData, "ppbData is NULL")?;
    require(pcbData, "pcbData is NULL")?;
    let dir = unsafe { c_str(pszDirectoryName) };
    log3if!(f, line!(), "directory: {:?}, file: {:?}, dwFlags: 0x{:X}", dir, file, dwFlags);

    let dp = DataPrivate::load(card).ok_or(CardError::InvalidParameter("no negotiated session"))?;
    let virtual_file = VirtualFile::lookup(dir, file).ok_or(CardError::Unsupported("file isn't virtual"))?;
    let data = match virtual_file {
        VirtualFile::CacheFile => dp.callbacks.alloc_copy(&[0; size_of::<CARD_CACHE_FILE_FORMAT>()])?,
        VirtualFile::ContainerMap => null_mut(),
    };
    unsafe {
        ppbData.write_unaligned(data);
        pcbData.write_unaligned(virtual_file.content_len() as DWORD);
    }
    Ok(())
}

/*
 * Implements CARD_DATA function 'pfnCardGetFileInfo'
 */
#[named]
pub extern "system" fn CardGetFileInfo(pCardData: PCARD_DATA, pszDirectoryName: LPSTR, pszFileName: LPSTR,
                                       pCardFileInfo: PCARD_FILE_INFO) -> DWORD
{
    let f = function_name!();
    log3ifc!(f, line!());
    let _ = pszDirectoryName;
    let res = require(pCardData, "pCardData is NULL")
        .and_then(|()| require(pszFileName, "pszFileName is NULL"))
        .and_then(|()| require(pCardFileInfo, "pCardFileInfo is NULL"))
        .and(Err(CardError::Unsupported("file information")));
    log3ifr_ret!(f, line!(), res)
}

/*
 * Implements CARD_DATA function 'pfnCardEnumFiles'
 */
#[named]
pub extern "system" fn CardEnumFiles(pCardData: PCARD_DATA, pszDirectoryName: LPSTR, pmszFileNames: *mut LPSTR,
                                     pdwcbFileName: LPDWORD, dwFlags: DWORD) -> DWORD
{
    let f = function_name!();
    log3ifc!(f, line!());
    let _ = (pszDirectoryName, pmszFileNames, dwFlags);
    let res = require(pCardData, "pCardData is NULL")
        .and_then(|()| require(pdwcbFileName, "pdwcbFileName is NULL"))
        .and(Err(CardError::Unsupported("file enumeration")));
    log3ifr_ret!(f, line!(), res)
}

/*
 * Implements CARD_DATA function 'pfnCardQueryFreeSpace'
 */
#[named]
pub extern "system" fn CardQueryFreeSpace(pCardData: PCARD_DATA, dwFlags: DWORD,
                                          pCardFreeSpaceInfo: PCARD_FREE_SPACE_INFO) -> DWORD
{
    let f = function_name!();
    log3ifc!(f, line!());
    let _ = dwFlags;
    let res = require(pCardData, "pCardData is NULL")
        .and_then(|()| require(pCardFreeSpaceInfo, "pCardFreeSpaceInfo is NULL"))
        .and(Err(CardError::Unsupported("free space")));
    log3ifr_ret!(f, line!(), res)
}
