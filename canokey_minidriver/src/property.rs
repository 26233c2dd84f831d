/*
 * property.rs: Driver 'canokey_minidriver' - Capabilities and the card/container property registry
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

use std::mem::size_of;
use std::ptr::copy_nonoverlapping;
use std::slice::from_raw_parts;

use function_name::named;

use cardmod_sys::types::{BYTE, DWORD, PBYTE, PDWORD, LPCWSTR, WCHAR, FALSE, TRUE, PIN_ID, ROLE_USER, ROLE_ADMIN,
                         PIN_SET_NONE, create_pin_set, CARD_CAPABILITIES_CURRENT_VERSION, PCARD_CAPABILITIES,
                         PIN_INFO, PIN_INFO_CURRENT_VERSION, PIN_CACHE_POLICY, PIN_CACHE_POLICY_CURRENT_VERSION,
                         AlphaNumericPinType, AuthenticationPin, AdministratorPin, PinCacheNormal,
                         CP_CACHE_MODE_NO_CACHE};
use cardmod_sys::cardmod::{PCARD_DATA, CP_CARD_GUID, CP_CARD_READ_ONLY, CP_CARD_CACHE_MODE,
                           CP_SUPPORTS_WIN_X509_ENROLLMENT, CP_CARD_PIN_INFO, wide_from_ptr, wide_eq};

use crate::constants_types::CARD_GUID;
use crate::error::{CardError, CardResult, require};

/// The card properties this driver answers; any other name is unsupported
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Property {
    CardGuid,
    ReadOnly,
    CacheMode,
    X509Enrollment,
    PinInfo,
}

const REGISTRY : [(&[WCHAR], Property); 5] = [
    (CP_CARD_GUID,                    Property::CardGuid),
    (CP_CARD_READ_ONLY,               Property::ReadOnly),
    (CP_CARD_CACHE_MODE,              Property::CacheMode),
    (CP_SUPPORTS_WIN_X509_ENROLLMENT, Property::X509Enrollment),
    (CP_CARD_PIN_INFO,                Property::PinInfo),
];

impl Property {
    /// `name` without its terminating NUL
    #[must_use]
    pub fn from_name(name: &[WCHAR]) -> Option<Self> {
        REGISTRY.iter().find(|(wsz, _)| wide_eq(name, wsz)).map(|(_, property)| *property)
    }

    /// The value in the representation the host expects; `dwFlags` is the PIN id for `PinInfo`, otherwise ignored
    pub fn value(self, dwFlags: DWORD) -> CardResult<Vec<BYTE>> {
        Ok(match self {
            Self::CardGuid       => CARD_GUID.to_vec(),
            Self::ReadOnly       => FALSE.to_ne_bytes().to_vec(),
            Self::CacheMode      => CP_CACHE_MODE_NO_CACHE.to_ne_bytes().to_vec(),
            Self::X509Enrollment => FALSE.to_ne_bytes().to_vec(),
            Self::PinInfo        => {
                let info = pin_info(dwFlags)?;
                unsafe { from_raw_parts((&info as *const PIN_INFO).cast::<BYTE>(), size_of::<PIN_INFO>()) }.to_vec()
            }
        })
    }
}

/// User PIN: may be changed by the user, unblocked by the admin; admin PIN: may be changed by the admin only
pub fn pin_info(pin_id: PIN_ID) -> CardResult<PIN_INFO> {
    let (purpose, change, unblock) = match pin_id {
        ROLE_USER  => (AuthenticationPin, create_pin_set(ROLE_USER),  create_pin_set(ROLE_ADMIN)),
        ROLE_ADMIN => (AdministratorPin,  create_pin_set(ROLE_ADMIN), PIN_SET_NONE),
        _ => return Err(CardError::InvalidParameter("dwFlags is neither ROLE_USER nor ROLE_ADMIN")),
    };
    Ok(PIN_INFO {
        dwVersion: PIN_INFO_CURRENT_VERSION,
        PinType: AlphaNumericPinType,
        PinPurpose: purpose,
        dwChangePermission: change,
        dwUnblockPermission: unblock,
        PinCachePolicy: PIN_CACHE_POLICY {
            dwVersion: PIN_CACHE_POLICY_CURRENT_VERSION,
            PinCachePolicyType: PinCacheNormal,
            dwPinCachePolicyInfo: 0,
        },
        dwFlags: 0,
    })
}

/// Size first, then data: `*pdwDataLen` always gets the required size, `pbData` gets all of `value` or nothing
pub fn copy_out(value: &[BYTE], pbData: PBYTE, cbData: DWORD, pdwDataLen: PDWORD) -> CardResult<()> {
    let required = DWORD::try_from(value.len()).unwrap_or(DWORD::MAX);
    unsafe { pdwDataLen.write_unaligned(required) };
    if cbData < required {
        return Err(CardError::InsufficientBuffer { required });
    }
    require(pbData, "pbData is NULL")?;
    unsafe { copy_nonoverlapping(value.as_ptr(), pbData, value.len()) };
    Ok(())
}

/*
 * Implements CARD_DATA function 'pfnCardQueryCapabilities'
 * @return SCARD_S_SUCCESS, ERROR_REVISION_MISMATCH if the host asks for other than CARD_CAPABILITIES_CURRENT_VERSION
 */
#[named]
pub extern "system" fn CardQueryCapabilities(pCardData: PCARD_DATA, pCardCapabilities: PCARD_CAPABILITIES) -> DWORD
{
    let f = function_name!();
    log3ifc!(f, line!());
    log3ifr_ret!(f, line!(), query_capabilities(pCardData, pCardCapabilities))
}

fn query_capabilities(pCardData: PCARD_DATA, pCardCapabilities: PCARD_CAPABILITIES) -> CardResult<()> {
    require(pCardData, "pCardData is NULL")?;
    let caps = unsafe { pCardCapabilities.as_mut() }.ok_or(CardError::InvalidParameter("pCardCapabilities is NULL"))?;
    if caps.dwVersion != CARD_CAPABILITIES_CURRENT_VERSION {
        return Err(CardError::RevisionMismatch("CARD_CAPABILITIES.dwVersion isn't CARD_CAPABILITIES_CURRENT_VERSION"));
    }
    caps.fCertificateCompression = FALSE;
    caps.fKeyGen = TRUE;
    Ok(())
}

/*
 * Implements CARD_DATA function 'pfnCardGetProperty'
 */
#[named]
pub extern "system" fn CardGetProperty(pCardData: PCARD_DATA, wszProperty: LPCWSTR, pbData: PBYTE, cbData: DWORD,
                                       pdwDataLen: PDWORD, dwFlags: DWORD) -> DWORD
{
    let f = function_name!();
    log3ifc!(f, line!());
    log3ifr_ret!(f, line!(), get_property(f, pCardData, wszProperty, pbData, cbData, pdwDataLen, dwFlags))
}

fn get_property(f: &str, pCardData: PCARD_DATA, wszProperty: LPCWSTR, pbData: PBYTE, cbData: DWORD,
                pdwDataLen: PDWORD, dwFlags: DWORD) -> CardResult<()> {
    require(pCardData, "pCardData is NULL")?;
    let name = unsafe { wide_from_ptr(wszProperty) }.ok_or(CardError::InvalidParameter("wszProperty is NULL"))?;
    require(pdwDataLen, "pdwDataLen is NULL")?;
    log3if!(f, line!(), "property '{}', cbData: {}, dwFlags: 0x{:X}",
        String::from_utf16_lossy(name), cbData, dwFlags);
    let property = Property::from_name(name).ok_or(CardError::Unsupported("unknown card property"))?;
    copy_out(&property.value(dwFlags)?, pbData, cbData, pdwDataLen)
}

/*
 * Implements CARD_DATA function 'pfnCardSetProperty'
 * There is no writable property
 */
#[named]
pub extern "system" fn CardSetProperty(pCardData: PCARD_DATA, wszProperty: LPCWSTR, pbData: PBYTE, cbDataLen: DWORD,
                                       dwFlags: DWORD) -> DWORD
{
    let f = function_name!();
    log3ifc!(f, line!());
    let _ = (pbData, cbDataLen, dwFlags);
    let res = require(pCardData, "pCardData is NULL")
        .and_then(|()| require(wszProperty, "wszProperty is NULL"))
        .and(Err(CardError::Unsupported("no card property is writable")));
    log3ifr_ret!(f, line!(), res)
}

/*
 * Implements CARD_DATA function 'pfnCardGetContainerProperty'
 * No container exists (yet), thus no container property either
 */
#[named]
pub extern "system" fn CardGetContainerProperty(pCardData: PCARD_DATA, bContainerIndex: BYTE, wszProperty: LPCWSTR,
                                                pbData: PBYTE, cbData: DWORD, pdwDataLen: PDWORD, dwFlags: DWORD) -> DWORD
{
    let f = function_name!();
    log3if!(f, line!(), "called with bContainerIndex: {}, dwFlags: 0x{:X}", bContainerIndex, dwFlags);
    let _ = (pbData, cbData);
    let res = require(pCardData, "pCardData is NULL")
        .and_then(|()| require(wszProperty, "wszProperty is NULL"))
        .and_then(|()| require(pdwDataLen, "pdwDataLen is NULL"))
        .and(Err(CardError::Unsupported("container properties")));
    log3ifr_ret!(f, line!(), res)
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr::{null, null_mut};
    use cardmod_sys::types::CARD_CAPABILITIES;
    use cardmod_sys::cardmod::{CARD_DATA, CP_CARD_SERIAL_NO, CCP_CONTAINER_INFO};
    use cardmod_sys::errors::{SCARD_S_SUCCESS, ERROR_INVALID_PARAMETER, ERROR_INSUFFICIENT_BUFFER,
                              ERROR_REVISION_MISMATCH, SCARD_E_UNSUPPORTED_FEATURE};

    fn get(card: PCARD_DATA, property: &[WCHAR], buf: &mut [u8], dwFlags: DWORD) -> (DWORD, DWORD) {
        let mut len: DWORD = 0xDEAD;
        let rv = CardGetProperty(card, property.as_ptr(), buf.as_mut_ptr(), buf.len() as DWORD, &mut len, dwFlags);
        (rv, len)
    }

    #[test]
    fn test_query_capabilities() {
        let mut card = CARD_DATA::default();
        let mut caps = CARD_CAPABILITIES { dwVersion: 1, fCertificateCompression: TRUE, fKeyGen: FALSE };
        assert_eq!(SCARD_S_SUCCESS, CardQueryCapabilities(&mut card, &mut caps));
        assert_eq!(CARD_CAPABILITIES { dwVersion: 1, fCertificateCompression: FALSE, fKeyGen: TRUE }, caps);

        let mut caps = CARD_CAPABILITIES { dwVersion: 2, fCertificateCompression: TRUE, fKeyGen: FALSE };
        assert_eq!(ERROR_REVISION_MISMATCH, CardQueryCapabilities(&mut card, &mut caps));
        assert_eq!(TRUE, caps.fCertificateCompression);
        assert_eq!(ERROR_INVALID_PARAMETER, CardQueryCapabilities(null_mut(), &mut caps));
        assert_eq!(ERROR_INVALID_PARAMETER, CardQueryCapabilities(&mut card, null_mut()));
    }

    #[test]
    fn test_card_guid() {
        let mut card = CARD_DATA::default();
        let mut small = [0xFF_u8; 8];
        assert_eq!((ERROR_INSUFFICIENT_BUFFER, 16), get(&mut card, CP_CARD_GUID, &mut small, 0));
        assert_eq!([0xFF_u8; 8], small);
        let mut buf = [0xFF_u8; 20];
        assert_eq!((SCARD_S_SUCCESS, 16), get(&mut card, CP_CARD_GUID, &mut buf, 0));
        assert_eq!([0_u8; 16], buf[..16]);
        assert_eq!([0xFF_u8; 4], buf[16..]);
    }

    #[test]
    fn test_fixed_answers() {
        let mut card = CARD_DATA::default();
        let mut buf = [0xFF_u8; 4];
        assert_eq!((SCARD_S_SUCCESS, 4), get(&mut card, CP_CARD_READ_ONLY, &mut buf, 0));
        assert_eq!(FALSE, i32::from_ne_bytes(buf));
        assert_eq!((SCARD_S_SUCCESS, 4), get(&mut card, CP_CARD_CACHE_MODE, &mut buf, 0));
        assert_eq!(CP_CACHE_MODE_NO_CACHE, u32::from_ne_bytes(buf));
        buf = [0xFF; 4];
        assert_eq!((SCARD_S_SUCCESS, 4), get(&mut card, CP_SUPPORTS_WIN_X509_ENROLLMENT, &mut buf, 0));
        assert_eq!(FALSE, i32::from_ne_bytes(buf));
    }

    #[test]
    fn test_pin_info() {
        let mut card = CARD_DATA::default();
        /* garbage in the caller's buffer, including its version field, doesn't matter */
        let mut buf = [0xA5_u8; size_of::<PIN_INFO>()];
        assert_eq!((SCARD_S_SUCCESS, 36), get(&mut card, CP_CARD_PIN_INFO, &mut buf, ROLE_USER));
        let info = unsafe { buf.as_ptr().cast::<PIN_INFO>().read_unaligned() };
        assert_eq!(pin_info(ROLE_USER).unwrap(), info);
        assert_eq!(PIN_INFO_CURRENT_VERSION, info.dwVersion);
        assert_eq!(0x02, info.dwChangePermission);
        assert_eq!(0x04, info.dwUnblockPermission);

        let admin = pin_info(ROLE_ADMIN).unwrap();
        assert_eq!(AdministratorPin, admin.PinPurpose);
        assert_eq!(PIN_SET_NONE, admin.dwUnblockPermission);

        assert_eq!(ERROR_INVALID_PARAMETER, get(&mut card, CP_CARD_PIN_INFO, &mut buf, 3).0);
        assert_eq!(ERROR_INVALID_PARAMETER, get(&mut card, CP_CARD_PIN_INFO, &mut buf, 0).0);
    }

    #[test]
    fn test_get_property_arguments() {
        let mut card = CARD_DATA::default();
        let mut len: DWORD = 0;
        /* size query with NULL buffer */
        assert_eq!(ERROR_INSUFFICIENT_BUFFER, CardGetProperty(&mut card, CP_CARD_GUID.as_ptr(), null_mut(), 0, &mut len, 0));
        assert_eq!(16, len);
        assert_eq!(ERROR_INVALID_PARAMETER, CardGetProperty(&mut card, CP_CARD_GUID.as_ptr(), null_mut(), 16, &mut len, 0));
        assert_eq!(ERROR_INVALID_PARAMETER, CardGetProperty(null_mut(), CP_CARD_GUID.as_ptr(), null_mut(), 16, &mut len, 0));
        assert_eq!(ERROR_INVALID_PARAMETER, CardGetProperty(&mut card, null(), null_mut(), 16, &mut len, 0));
        assert_eq!(ERROR_INVALID_PARAMETER, CardGetProperty(&mut card, CP_CARD_GUID.as_ptr(), null_mut(), 16, null_mut(), 0));
        let mut buf = [0_u8; 64];
        assert_eq!(SCARD_E_UNSUPPORTED_FEATURE, get(&mut card, CP_CARD_SERIAL_NO, &mut buf, 0).0);
    }

    #[test]
    fn test_set_property() {
        let mut card = CARD_DATA::default();
        let mut buf = [0_u8; 16];
        for (wsz, _) in REGISTRY {
            assert_eq!(SCARD_E_UNSUPPORTED_FEATURE, CardSetProperty(&mut card, wsz.as_ptr(), buf.as_mut_ptr(), 16, 0));
        }
        assert_eq!(SCARD_E_UNSUPPORTED_FEATURE, CardSetProperty(&mut card, CP_CARD_SERIAL_NO.as_ptr(), null_mut(), 0, 0));
        assert_eq!(ERROR_INVALID_PARAMETER, CardSetProperty(&mut card, null(), buf.as_mut_ptr(), 16, 0));
        assert_eq!(ERROR_INVALID_PARAMETER, CardSetProperty(null_mut(), CP_CARD_GUID.as_ptr(), buf.as_mut_ptr(), 16, 0));
    }

    #[test]
    fn test_get_container_property() {
        let mut card = CARD_DATA::default();
        let mut len: DWORD = 0;
        assert_eq!(SCARD_E_UNSUPPORTED_FEATURE,
                   CardGetContainerProperty(&mut card, 0, CCP_CONTAINER_INFO.as_ptr(), null_mut(), 0, &mut len, 0));
        assert_eq!(ERROR_INVALID_PARAMETER,
                   CardGetContainerProperty(&mut card, 0, CCP_CONTAINER_INFO.as_ptr(), null_mut(), 0, null_mut(), 0));
        assert_eq!(ERROR_INVALID_PARAMETER, CardGetContainerProperty(&mut card, 0, null(), null_mut(), 0, &mut len, 0));
    }

    #[test]
    fn test_from_name() {
        let name: Vec<WCHAR> = "Card Cache Mode".encode_utf16().collect();
        assert_eq!(Some(Property::CacheMode), Property::from_name(&name));
        let name: Vec<WCHAR> = "card cache mode".encode_utf16().collect();
        assert_eq!(None, Property::from_name(&name));
    }
}
